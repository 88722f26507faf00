//! Public HTTP API.
//!
//! - `routes`: router, request tracking middleware, server lifecycle
//! - `handlers`: one async fn per endpoint
//! - `types`: request/response wire shapes
//! - `error`: `ApiError` and its status mapping

pub mod error;
pub mod handlers;
pub mod routes;
pub mod types;

pub use error::ApiError;
pub use routes::{ApiServer, AppState, router};
