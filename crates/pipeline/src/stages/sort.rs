//! Sort stage.

use crate::traits::Stage;
use store::{Document, doc};

/// Direction of a sort key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    fn as_i32(self) -> i32 {
        match self {
            SortOrder::Ascending => 1,
            SortOrder::Descending => -1,
        }
    }
}

/// `$sort` stage over one or more keys, applied in order.
///
/// Documents missing a key sort as null, which is below every number:
/// they come last in descending order and first in ascending order.
#[derive(Debug, Clone, PartialEq)]
pub struct SortBy {
    keys: Vec<(String, SortOrder)>,
}

impl SortBy {
    /// Sort by `field`, highest first.
    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            keys: vec![(field.into(), SortOrder::Descending)],
        }
    }

    /// Sort by `field`, lowest first.
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            keys: vec![(field.into(), SortOrder::Ascending)],
        }
    }

    /// Break ties with another key (builder pattern).
    pub fn then(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.keys.push((field.into(), order));
        self
    }
}

impl Stage for SortBy {
    fn name(&self) -> &str {
        "SortBy"
    }

    fn to_document(&self) -> Document {
        let mut keys = Document::new();
        for (field, order) in &self.keys {
            keys.insert(field.clone(), order.as_i32());
        }
        doc! { "$sort": keys }
    }
}
