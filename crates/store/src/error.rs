//! Error types for the store crate.
//!
//! Every failure that originates below the catalog (driver errors, bad
//! queries, poisoned locks) is reported through `StoreError`. `InvalidId` is
//! the only variant raised before a store call, while parsing an identifier;
//! every other variant means the store call itself failed.

use thiserror::Error;

/// Errors that can occur while talking to a document store
#[derive(Error, Debug)]
pub enum StoreError {
    /// The MongoDB driver reported a failure (network, auth, server-side error)
    #[error("MongoDB error: {0}")]
    Driver(#[from] mongodb::error::Error),

    /// A string could not be parsed as a document identifier
    #[error("Invalid document id: {0}")]
    InvalidId(String),

    /// A filter or update used an operator the store does not understand
    #[error("Unsupported query operator: {0}")]
    UnsupportedOperator(String),

    /// An aggregation pipeline used a stage the store does not understand
    #[error("Unsupported pipeline stage: {0}")]
    UnsupportedStage(String),

    /// An insert reused an identifier that already exists
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// The query was structurally malformed
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// The in-memory collection lock was poisoned by a panicking writer
    #[error("Store lock poisoned")]
    Poisoned,
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, StoreError>;
