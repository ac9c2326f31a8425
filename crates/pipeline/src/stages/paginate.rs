//! Skip and limit stages.

use crate::traits::Stage;
use store::{Document, doc};

/// `$skip` stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Skip(pub u64);

/// `$limit` stage (must be positive)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit(pub u32);

impl Stage for Skip {
    fn name(&self) -> &str {
        "Skip"
    }

    fn to_document(&self) -> Document {
        // The store expects a signed 64-bit integer
        doc! { "$skip": i64::try_from(self.0).unwrap_or(i64::MAX) }
    }
}

impl Stage for Limit {
    fn name(&self) -> &str {
        "Limit"
    }

    fn to_document(&self) -> Document {
        doc! { "$limit": i64::from(self.0) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_and_limit_documents() {
        assert_eq!(Skip(40).to_document(), doc! { "$skip": 40_i64 });
        assert_eq!(Limit(20).to_document(), doc! { "$limit": 20_i64 });
    }
}
