//! Update-operator application for the in-memory store.
//!
//! Supports `$set` (field-level merge, dotted paths create intermediate
//! documents) and `$unset`. `_id` can never change.

use bson::{Bson, Document};

use crate::error::{Result, StoreError};
use crate::query::{get_path, remove_path, set_path, values_equal};

/// Check an update document before touching any data.
///
/// The store rejects malformed updates even when nothing matches, so the
/// in-memory store validates up front as well.
pub fn validate_update(update: &Document) -> Result<()> {
    if update.is_empty() {
        return Err(StoreError::InvalidQuery("update document is empty".into()));
    }
    for (op, operand) in update {
        match op.as_str() {
            "$set" | "$unset" => {
                let Bson::Document(fields) = operand else {
                    return Err(StoreError::InvalidQuery(format!("{op} expects a document")));
                };
                if fields.is_empty() {
                    return Err(StoreError::InvalidQuery(format!("{op} is empty")));
                }
            }
            other if other.starts_with('$') => {
                return Err(StoreError::UnsupportedOperator(other.to_string()));
            }
            other => {
                return Err(StoreError::InvalidQuery(format!(
                    "update document must contain only operators, found '{other}'"
                )));
            }
        }
    }
    Ok(())
}

/// Apply a validated update to `doc`, returning whether anything changed.
///
/// The document is left untouched when any part of the update fails.
pub fn apply_update(doc: &mut Document, update: &Document) -> Result<bool> {
    let mut working = doc.clone();
    for (op, operand) in update {
        let Bson::Document(fields) = operand else {
            continue;
        };
        for (path, value) in fields {
            if path == "_id" || path.starts_with("_id.") {
                let unchanged = op == "$set"
                    && get_path(doc, path).is_some_and(|current| values_equal(current, value));
                if unchanged {
                    continue;
                }
                return Err(StoreError::InvalidQuery("the field '_id' is immutable".into()));
            }
            match op.as_str() {
                "$set" => set_path(&mut working, path, value.clone())?,
                "$unset" => {
                    remove_path(&mut working, path);
                }
                other => return Err(StoreError::UnsupportedOperator(other.to_string())),
            }
        }
    }
    let changed = working != *doc;
    *doc = working;
    Ok(changed)
}
