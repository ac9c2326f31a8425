//! Aggregation pipelines for the movie catalog.
//!
//! This crate provides:
//! - Stage trait and implementations for pipeline stages
//! - AggregationPipeline for composing stages
//! - The ranked best-of query and the paging arithmetic used by the catalog
//!
//! ## Architecture
//! Pipelines are described here and executed by the store:
//! 1. Stages render themselves into documents (`$match`, `$group`, ...)
//! 2. AggregationPipeline collects them in order
//! 3. The catalog hands the rendered pipeline to `DocumentStore::aggregate`
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{best_of_pipeline, BestOfCriteria};
//!
//! let pipeline = best_of_pipeline(&BestOfCriteria::default(), 1, 2026);
//! let ranked = store.aggregate(pipeline.build()).await?;
//! ```

pub mod aggregation_pipeline;
pub mod best_of;
pub mod paging;
pub mod stages;
pub mod traits;

// Re-export main types
pub use aggregation_pipeline::AggregationPipeline;
pub use best_of::{best_of_pipeline, BestOfCriteria, BEST_OF_FIELDS};
pub use paging::{best_of_skip, list_skip, MAX_SKIP};
pub use traits::Stage;
