//! Collapse movies that share a title into a single result.
//!
//! The dataset contains remakes and duplicate imports under the same title;
//! ranking should list each title once.

use crate::traits::Stage;
use store::{Document, doc};

/// `$group` stage keyed on `title`, keeping the first-seen value of each field.
#[derive(Debug, Clone, PartialEq)]
pub struct DedupByTitle {
    fields: Vec<String>,
}

impl DedupByTitle {
    /// Create a dedup stage carrying `fields` through the grouping.
    ///
    /// `title` is always carried, whether or not it is listed.
    pub fn new(fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mut fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        if !fields.iter().any(|f| f == "title") {
            fields.insert(0, "title".to_string());
        }
        Self { fields }
    }
}

impl Stage for DedupByTitle {
    fn name(&self) -> &str {
        "DedupByTitle"
    }

    fn to_document(&self) -> Document {
        let mut group = doc! { "_id": "$title" };
        for field in &self.fields {
            let path = format!("${field}");
            group.insert(field.clone(), doc! { "$first": path });
        }
        doc! { "$group": group }
    }
}
