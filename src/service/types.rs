use super::payload::PredictPayload;
use super::ServiceError;
use crate::models::{ModelInfo, PredictionResult};

/// A static chart image as served by `GET /charts/{filename}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartImage {
    Available {
        content_type: Option<String>,
        bytes: Vec<u8>,
    },
    /// The service has no such file (404).
    Missing,
}

/// Prediction service client abstraction (allows mocking).
///
/// Implementations block; async callers go through `spawn_blocking`.
pub trait PredictionApi: Send + Sync {
    /// `POST /predict`, validated into a `PredictionResult`.
    fn predict(&self, payload: &PredictPayload) -> Result<PredictionResult, ServiceError>;

    /// `GET /model-info`.
    fn model_info(&self) -> Result<ModelInfo, ServiceError>;

    /// `GET /charts/{filename}`. A 404 is `Ok(ChartImage::Missing)`.
    fn chart(&self, filename: &str) -> Result<ChartImage, ServiceError>;

    /// `GET /`, returning the service banner.
    fn health_check(&self) -> Result<String, ServiceError>;

    /// Origin every request is sent to.
    fn base_url(&self) -> &str;
}
