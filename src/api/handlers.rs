//! API Handlers
//!
//! HTTP request handlers serving values from the topic cache.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::Result;
use crate::models::{HealthResponse, TopicResponse};
use crate::topics::TopicCache;

/// Application state shared across all handlers.
///
/// The topic cache is a cheap handle, reads never block on a refresh.
#[derive(Clone, Debug)]
pub struct AppState {
    pub topics: TopicCache,
}

impl AppState {
    /// Creates a new AppState around the given topic cache.
    pub fn new(topics: TopicCache) -> Self {
        Self { topics }
    }
}

/// Handler for GET /topics/:key
///
/// Returns the cached topic stored under `key`.
pub async fn topic_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<TopicResponse>> {
    let topic = state.topics.get(&key)?;

    Ok(Json(TopicResponse::new(key, (*topic).clone())))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
