pub mod analysis;
pub mod charts;
pub mod config;
pub mod console;
pub mod core_state;
pub mod insights;
pub mod models;
pub mod navigation;
pub mod questionnaire;
pub mod render;
pub mod service;
pub mod submission;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use crate::service::{HttpPredictionClient, PredictionApi};

pub fn run() {
    // Initialize tracing. Logs go to stderr so the console owns stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let service_config = config::ServiceConfig::from_env();

    // The blocking client must be created and dropped outside the runtime.
    let client: Arc<dyn PredictionApi> = match HttpPredictionClient::new(&service_config) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            tracing::error!(error = %e, "Failed to build prediction client");
            return;
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!(error = %e, "Failed to start async runtime");
            return;
        }
    };

    let session_client = Arc::clone(&client);
    let outcome = runtime.block_on(async move {
        let mut state = core_state::CoreState::new(session_client);
        match state.health_check().await {
            Ok(banner) => {
                tracing::info!(url = state.base_url(), %banner, "Prediction service reachable")
            }
            Err(e) => tracing::warn!(error = %e, "Prediction service not reachable yet"),
        }

        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let mut stdout = std::io::stdout();
        console::run_console(&mut state, stdin, &mut stdout).await
    });

    if let Err(e) = outcome {
        tracing::error!(error = %e, "Console stopped");
    }

    // Stdin reads park a blocking thread; don't wait on it forever.
    runtime.shutdown_timeout(Duration::from_secs(1));
    drop(client);
    tracing::info!("{} stopped", config::APP_NAME);
}
