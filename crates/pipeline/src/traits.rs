//! Core traits for building aggregation pipelines.
//!
//! This module defines the Stage trait that lets the catalog compose
//! aggregation pipelines from small, individually testable pieces.

use store::Document;

/// One stage of an aggregation pipeline.
///
/// All stages must implement this trait to be used in an AggregationPipeline.
///
/// ## Design Note
/// - `Send + Sync` allows pipelines to be built inside request handlers
/// - Stages only describe work; the store executes it
pub trait Stage: Send + Sync {
    /// Returns the name of this stage (for logging/debugging)
    fn name(&self) -> &str;

    /// Render this stage as a pipeline document, e.g. `{ "$limit": 20 }`.
    fn to_document(&self) -> Document;
}
