//! Projection stage trimming documents down to a fixed field list.

use crate::traits::Stage;
use store::{Document, doc};

/// `$project` stage including only the listed fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    fields: Vec<String>,
    include_id: bool,
}

impl Projection {
    /// Include `fields` and drop `_id`.
    pub fn fields(fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            include_id: false,
        }
    }

    /// Keep `_id` in the output as well (builder pattern).
    pub fn with_id(mut self) -> Self {
        self.include_id = true;
        self
    }
}

impl Stage for Projection {
    fn name(&self) -> &str {
        "Projection"
    }

    fn to_document(&self) -> Document {
        let mut project = doc! { "_id": i32::from(self.include_id) };
        for field in &self.fields {
            project.insert(field.clone(), 1);
        }
        doc! { "$project": project }
    }
}
