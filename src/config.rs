use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "Cardio Risk";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prediction service origin used when `CARDIO_API_URL` is unset.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Connect timeout for the prediction service.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Whole-request timeout for the prediction service.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const ENV_BASE_URL: &str = "CARDIO_API_URL";
const ENV_CONNECT_TIMEOUT: &str = "CARDIO_CONNECT_TIMEOUT_SECS";
const ENV_REQUEST_TIMEOUT: &str = "CARDIO_REQUEST_TIMEOUT_SECS";

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "cardio_risk_lib=info,warn"
}

/// Where and how to reach the prediction service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl ServiceConfig {
    /// Defaults overridden by `CARDIO_API_URL`, `CARDIO_CONNECT_TIMEOUT_SECS`
    /// and `CARDIO_REQUEST_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` but reads variables through `lookup`.
    ///
    /// Blank or unparseable values fall back to the default with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let base_url = match lookup(ENV_BASE_URL) {
            Some(url) if !url.trim().is_empty() => url.trim().trim_end_matches('/').to_string(),
            Some(_) => {
                tracing::warn!(var = ENV_BASE_URL, "Blank service URL, using default");
                defaults.base_url
            }
            None => defaults.base_url,
        };

        Self {
            base_url,
            connect_timeout: secs_or(&lookup, ENV_CONNECT_TIMEOUT, defaults.connect_timeout),
            request_timeout: secs_or(&lookup, ENV_REQUEST_TIMEOUT, defaults.request_timeout),
        }
    }
}

fn secs_or(lookup: &impl Fn(&str) -> Option<String>, key: &str, fallback: Duration) -> Duration {
    let Some(raw) = lookup(key) else {
        return fallback;
    };
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Duration::from_secs(secs),
        _ => {
            tracing::warn!(var = key, value = %raw, "Invalid timeout, using default");
            fallback
        }
    }
}
