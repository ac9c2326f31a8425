//! Core types shared by every document store backend.
//!
//! - `MovieId`: a parsed, validated document identifier
//! - `FindOptions`: the skip/limit window applied to a `find`
//! - `InsertAck`, `UpdateAck`, `DeleteAck`: write acknowledgments

use std::fmt;
use std::str::FromStr;

use bson::oid::ObjectId;
use bson::Bson;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

// =============================================================================
// Identifiers
// =============================================================================

/// Unique, store-assigned identifier of a movie document.
///
/// Wraps the store's 12-byte object id so that parsing client input is an
/// explicit step: a `MovieId` can only be obtained from a well-formed
/// 24-digit hex string or from the store itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieId(ObjectId);

impl MovieId {
    /// Parse a 24-character hexadecimal identifier.
    pub fn parse(raw: &str) -> Result<Self> {
        ObjectId::parse_str(raw)
            .map(MovieId)
            .map_err(|_| StoreError::InvalidId(raw.to_string()))
    }

    /// Generate a fresh identifier, as the store does on insert.
    pub fn generate() -> Self {
        MovieId(ObjectId::new())
    }

    /// The underlying object id
    pub fn object_id(&self) -> ObjectId {
        self.0
    }

    /// Filter document selecting exactly this identifier: `{ _id: <id> }`
    pub fn filter(&self) -> bson::Document {
        bson::doc! { "_id": self.0 }
    }
}

impl From<ObjectId> for MovieId {
    fn from(oid: ObjectId) -> Self {
        MovieId(oid)
    }
}

impl FromStr for MovieId {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        MovieId::parse(s)
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}

/// Returns true when `raw` has the shape of an identifier (24 hex digits).
///
/// Used to tell an identifier path segment apart from a page number.
pub fn looks_like_id(raw: &str) -> bool {
    raw.len() == 24 && raw.bytes().all(|b| b.is_ascii_hexdigit())
}

// =============================================================================
// Query options
// =============================================================================

/// Window applied to a `find` cursor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindOptions {
    /// Number of matching documents to skip
    pub skip: u64,
    /// Maximum number of documents to return (`None` = unbounded)
    pub limit: Option<i64>,
}

impl FindOptions {
    /// A window of at most `limit` documents after skipping `skip`.
    pub fn window(skip: u64, limit: i64) -> Self {
        Self {
            skip,
            limit: Some(limit),
        }
    }
}

// =============================================================================
// Acknowledgments
// =============================================================================

/// Result of an insert: the identifier the document was stored under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertAck {
    pub acknowledged: bool,
    pub inserted_id: Bson,
}

/// Result of an update: how many documents matched and how many changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAck {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_id: Option<Bson>,
}

/// Result of a delete: how many documents were removed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAck {
    pub acknowledged: bool,
    pub deleted_count: u64,
}
