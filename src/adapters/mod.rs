//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies and exposes the use cases over HTTP. Each
//! sub-module groups adapters by infrastructure concern.
//!
//! Adapter categories:
//! - `api`: public axum HTTP API
//! - `http`: shared outbound reqwest client (timeouts, retries, concurrency)
//! - `llm`: Cohere Chat API client
//! - `market`: Yahoo Finance client and TTL cache decorator
//! - `metrics`: Prometheus metrics export and health checks
//! - `news`: simulated headline feed

pub mod api;
pub mod http;
pub mod llm;
pub mod market;
pub mod metrics;
pub mod news;
