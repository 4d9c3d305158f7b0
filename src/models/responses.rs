//! Response DTOs for the demo server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::topics::TopicItem;

/// Response body for GET /topics/:key
#[derive(Debug, Clone, Serialize)]
pub struct TopicResponse {
    /// The requested key
    pub key: String,
    /// The cached topic
    pub topic: TopicItem,
}

impl TopicResponse {
    /// Creates a new TopicResponse
    pub fn new(key: impl Into<String>, topic: TopicItem) -> Self {
        Self {
            key: key.into(),
            topic,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
