//! API Module
//!
//! HTTP handlers and routing for the demo topic server.
//!
//! # Endpoints
//! - `GET /topics/:key` - Retrieve a cached topic
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
