//! Metrics and Monitoring Adapters
//!
//! Provides the Prometheus registry and the operational server that
//! exposes /live, /ready and /metrics via axum 0.7.

pub mod health;
pub mod prometheus;

pub use self::health::{HealthServer, HealthState};
pub use self::prometheus::MetricsRegistry;
