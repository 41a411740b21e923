//! Access to the external prediction service.
//!
//! `PredictionApi` is the seam: `HttpPredictionClient` talks to the real
//! service over blocking HTTP, `MockPredictionClient` stands in for it in
//! tests and demos. Callers on the async side run these calls through
//! `tokio::task::spawn_blocking`.

pub mod http;
pub mod payload;
pub mod types;

pub use http::*;
pub use payload::*;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    #[error("Prediction service is not reachable at {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Prediction service returned error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("Malformed service response: {0}")]
    MalformedResponse(String),

    #[error("Invalid chart name: {0}")]
    InvalidChartName(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Background task failed: {0}")]
    TaskFailed(String),
}
