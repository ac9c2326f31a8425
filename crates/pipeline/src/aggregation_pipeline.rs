//! The AggregationPipeline orchestrates multiple stages.
//!
//! This module provides the main AggregationPipeline struct that chains
//! stages together using the builder pattern and renders them into the
//! document list the store executes.

use crate::traits::Stage;
use store::Document;

/// Chains multiple stages together into an aggregation pipeline.
///
/// ## Usage
/// ```ignore
/// let pipeline = AggregationPipeline::new()
///     .add_stage(BestOfMatch::new(10, 2016))
///     .add_stage(SortBy::descending("metacritic"))
///     .add_stage(Limit(20));
///
/// let results = store.aggregate(pipeline.build()).await?;
/// ```
pub struct AggregationPipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl AggregationPipeline {
    /// Create a new empty AggregationPipeline.
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Add a stage to the pipeline (builder pattern).
    ///
    /// # Arguments
    /// * `stage` - Any type implementing the Stage trait
    ///
    /// # Returns
    /// Self for method chaining
    pub fn add_stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Number of stages in the pipeline
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns true if no stages were added
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stage names in execution order
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Render every stage, in order, into pipeline documents.
    pub fn build(&self) -> Vec<Document> {
        self.stages
            .iter()
            .map(|stage| {
                let rendered = stage.to_document();
                tracing::debug!("Rendered stage: {} => {}", stage.name(), rendered);
                rendered
            })
            .collect()
    }
}

impl Default for AggregationPipeline {
    fn default() -> Self {
        Self::new()
    }
}
