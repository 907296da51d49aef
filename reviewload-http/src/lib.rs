//! HTTP client functionality for reviewload
//!
//! This crate provides the client seam every request goes through, a
//! reqwest-backed implementation with offline mock support, and optional
//! in-memory request recording.

pub mod client;
pub mod config;
pub mod errors;
pub mod types;

#[cfg(feature = "recording")]
pub mod recording;

// Re-export main types for convenience
pub use client::{HttpClient, HttpManager, MockResponse};
pub use config::HttpConfig;
pub use errors::HttpError;
pub use types::{ApiRequest, ApiResponse, HttpMethod};

#[cfg(feature = "recording")]
pub use recording::{RecordedRequest, RequestRecorder};
