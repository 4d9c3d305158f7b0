//! Error types for the refresh cache
//!
//! Provides unified error handling using thiserror.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the refresh cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Update interval must be strictly positive
    #[error("Invalid update interval {0:?}: must be greater than zero")]
    InvalidInterval(Duration),

    /// A registered update function failed during a refresh cycle
    #[error("Failed to update cache for {key}: {source}")]
    Update {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// Key was never written
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Key holds the empty value left behind by close
    #[error("Cached value is empty: {0}")]
    Empty(String),

    /// Stored value is not of the type the reader asked for
    #[error("Cached value for {key} is not of type {expected}")]
    TypeMismatch { key: String, expected: &'static str },

    /// Engine was closed and cannot be restarted
    #[error("Cache is closed")]
    Closed,
}

impl CacheError {
    /// Key the error refers to, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            CacheError::Update { key, .. }
            | CacheError::TypeMismatch { key, .. }
            | CacheError::NotFound(key)
            | CacheError::Empty(key) => Some(key.as_str()),
            CacheError::InvalidInterval(_) | CacheError::Closed => None,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) | CacheError::Empty(_) => StatusCode::NOT_FOUND,
            CacheError::Update { .. } => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::InvalidInterval(_)
            | CacheError::TypeMismatch { .. }
            | CacheError::Closed => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the refresh cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_error_names_key_and_cause() {
        let err = CacheError::Update {
            key: "error_update_func".to_string(),
            source: anyhow::anyhow!("unexpected error"),
        };

        assert_eq!(
            err.to_string(),
            "Failed to update cache for error_update_func: unexpected error"
        );
        assert_eq!(err.key(), Some("error_update_func"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_status_codes() {
        let not_found = CacheError::NotFound("k".to_string()).into_response();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let empty = CacheError::Empty("k".to_string()).into_response();
        assert_eq!(empty.status(), StatusCode::NOT_FOUND);

        let update = CacheError::Update {
            key: "k".to_string(),
            source: anyhow::anyhow!("boom"),
        }
        .into_response();
        assert_eq!(update.status(), StatusCode::SERVICE_UNAVAILABLE);

        let closed = CacheError::Closed.into_response();
        assert_eq!(closed.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
