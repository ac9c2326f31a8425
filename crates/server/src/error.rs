//! Error types for the catalog API.
//!
//! Two outcomes reach a client: the request was wrong (400) or the store
//! failed (500). Both are rendered as `{"error": "<message>"}`. Any error
//! from a store call is a 500 whichever backend raised it.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use store::StoreError;

/// Errors returned by catalog operations
#[derive(Error, Debug)]
pub enum ApiError {
    /// A path parameter or request body could not be used
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The document store failed while serving a valid request
    #[error("Store failure: {0}")]
    Store(#[source] StoreError),
}

impl ApiError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ApiError::InvalidArgument(message.into())
    }

    /// HTTP status this error maps to
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            // Raised while parsing a path parameter, before any store call
            StoreError::InvalidId(_) => ApiError::InvalidArgument(err.to_string()),
            other => ApiError::Store(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::InvalidArgument(message) => warn!("Rejected request: {}", message),
            ApiError::Store(err) => error!("Store failure: {}", err),
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Convenience type alias for catalog results
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::invalid("bad page").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(StoreError::Poisoned).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_only_invalid_ids_become_invalid_arguments() {
        let err = ApiError::from(StoreError::InvalidId("nope".into()));
        assert!(matches!(err, ApiError::InvalidArgument(_)));
        assert!(err.to_string().contains("nope"));

        for store_err in [
            StoreError::DuplicateKey("7".into()),
            StoreError::UnsupportedOperator("$where".into()),
            StoreError::InvalidQuery("bad".into()),
            StoreError::UnsupportedStage("$lookup".into()),
        ] {
            let err = ApiError::from(store_err);
            assert!(matches!(err, ApiError::Store(_)));
            assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}
