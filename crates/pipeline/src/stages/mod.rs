//! Aggregation stages used by the catalog's queries.

pub mod best_of_match;
pub mod dedup_by_title;
pub mod paginate;
pub mod projection;
pub mod sort;

pub use best_of_match::BestOfMatch;
pub use dedup_by_title::DedupByTitle;
pub use paginate::{Limit, Skip};
pub use projection::Projection;
pub use sort::{SortBy, SortOrder};
