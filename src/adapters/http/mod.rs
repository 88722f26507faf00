//! Outbound HTTP plumbing shared by the provider adapters.

pub mod client;

pub use client::{HttpClient, HttpClientConfig};
