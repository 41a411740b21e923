use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use serde::Deserialize;

use super::payload::PredictPayload;
use super::types::{ChartImage, PredictionApi};
use super::ServiceError;
use crate::config::ServiceConfig;
use crate::models::{ModelInfo, PredictionResponse, PredictionResult};

/// HTTP client for the prediction service.
pub struct HttpPredictionClient {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl HttpPredictionClient {
    /// Build a client for `config.base_url`. No authentication header is sent.
    pub fn new(config: &ServiceConfig) -> Result<Self, ServiceError> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ServiceError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs: config.request_timeout.as_secs(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn transport_error(&self, e: reqwest::Error) -> ServiceError {
        if e.is_timeout() {
            ServiceError::Timeout(self.timeout_secs)
        } else if e.is_connect() {
            ServiceError::Connection(self.base_url.clone())
        } else {
            ServiceError::HttpClient(e.to_string())
        }
    }

    fn get(&self, path: &str) -> Result<reqwest::blocking::Response, ServiceError> {
        let url = self.url(path);
        tracing::debug!(url = %url, "GET");
        self.client
            .get(&url)
            .send()
            .map_err(|e| self.transport_error(e))
    }
}

/// Non-2xx responses become `ServiceError::Status` carrying the body text.
fn ensure_success(
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(ServiceError::Status {
        status: status.as_u16(),
        body,
    })
}

/// Chart names are plain file names: no separators, no parent references.
fn validate_chart_name(filename: &str) -> Result<(), ServiceError> {
    let plain = !filename.is_empty()
        && !filename.contains("..")
        && filename
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if plain {
        Ok(())
    } else {
        Err(ServiceError::InvalidChartName(filename.to_string()))
    }
}

/// Response body from `GET /`
#[derive(Deserialize)]
struct BannerResponse {
    message: String,
}

impl PredictionApi for HttpPredictionClient {
    fn predict(&self, payload: &PredictPayload) -> Result<PredictionResult, ServiceError> {
        let url = self.url("/predict");
        tracing::debug!(url = %url, "POST");

        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .map_err(|e| self.transport_error(e))?;

        let parsed: PredictionResponse = ensure_success(response)?
            .json()
            .map_err(|e| ServiceError::MalformedResponse(e.to_string()))?;

        PredictionResult::try_from(parsed)
            .map_err(|e| ServiceError::MalformedResponse(e.to_string()))
    }

    fn model_info(&self) -> Result<ModelInfo, ServiceError> {
        ensure_success(self.get("/model-info")?)?
            .json()
            .map_err(|e| ServiceError::MalformedResponse(e.to_string()))
    }

    fn chart(&self, filename: &str) -> Result<ChartImage, ServiceError> {
        validate_chart_name(filename)?;

        let response = self.get(&format!("/charts/{filename}"))?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            tracing::debug!(filename, "Chart not found");
            return Ok(ChartImage::Missing);
        }

        let response = ensure_success(response)?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .map_err(|e| self.transport_error(e))?
            .to_vec();

        Ok(ChartImage::Available {
            content_type,
            bytes,
        })
    }

    fn health_check(&self) -> Result<String, ServiceError> {
        let banner: BannerResponse = ensure_success(self.get("/")?)?
            .json()
            .map_err(|e| ServiceError::MalformedResponse(e.to_string()))?;
        Ok(banner.message)
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Mock prediction client for tests and demos. Returns configured responses and
/// counts calls.
pub struct MockPredictionClient {
    prediction: Result<PredictionResult, ServiceError>,
    model_info: Result<ModelInfo, ServiceError>,
    charts: Vec<String>,
    delay: Duration,
    predict_calls: AtomicUsize,
    model_info_calls: AtomicUsize,
    last_payload: Mutex<Option<PredictPayload>>,
}

impl MockPredictionClient {
    pub fn new(prediction: PredictionResult) -> Self {
        Self {
            prediction: Ok(prediction),
            model_info: Err(ServiceError::Status {
                status: 500,
                body: "Model not loaded.".into(),
            }),
            charts: Vec::new(),
            delay: Duration::ZERO,
            predict_calls: AtomicUsize::new(0),
            model_info_calls: AtomicUsize::new(0),
            last_payload: Mutex::new(None),
        }
    }

    /// Every prediction fails with `error`.
    pub fn failing(error: ServiceError) -> Self {
        let mut mock = Self::new(PredictionResult {
            risk: crate::models::RiskClass::Low,
            probability: 0.0,
            message: String::new(),
            analysis: None,
        });
        mock.prediction = Err(error);
        mock
    }

    pub fn with_model_info(mut self, info: ModelInfo) -> Self {
        self.model_info = Ok(info);
        self
    }

    pub fn with_model_info_error(mut self, error: ServiceError) -> Self {
        self.model_info = Err(error);
        self
    }

    /// Filenames that `chart` reports as available.
    pub fn with_charts(mut self, charts: Vec<String>) -> Self {
        self.charts = charts;
        self
    }

    /// Block every call for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn predict_calls(&self) -> usize {
        self.predict_calls.load(Ordering::SeqCst)
    }

    pub fn model_info_calls(&self) -> usize {
        self.model_info_calls.load(Ordering::SeqCst)
    }

    pub fn last_payload(&self) -> Option<PredictPayload> {
        self.last_payload.lock().ok()?.clone()
    }

    fn pause(&self) {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
    }
}

impl PredictionApi for MockPredictionClient {
    fn predict(&self, payload: &PredictPayload) -> Result<PredictionResult, ServiceError> {
        self.predict_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_payload.lock() {
            *last = Some(payload.clone());
        }
        self.pause();
        self.prediction.clone()
    }

    fn model_info(&self) -> Result<ModelInfo, ServiceError> {
        self.model_info_calls.fetch_add(1, Ordering::SeqCst);
        self.pause();
        self.model_info.clone()
    }

    fn chart(&self, filename: &str) -> Result<ChartImage, ServiceError> {
        validate_chart_name(filename)?;
        if self.charts.iter().any(|c| c == filename) {
            Ok(ChartImage::Available {
                content_type: Some("image/png".into()),
                bytes: vec![0x89, b'P', b'N', b'G'],
            })
        } else {
            Ok(ChartImage::Missing)
        }
    }

    fn health_check(&self) -> Result<String, ServiceError> {
        Ok("Cardio Risk Prediction API is running.".into())
    }

    fn base_url(&self) -> &str {
        "http://mock.invalid"
    }
}
