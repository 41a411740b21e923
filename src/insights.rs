//! Background fetch of `GET /model-info` for the insights panel.
//!
//! The fetch runs as a tokio task whose handle the loader keeps. `cancel()`
//! (also run on drop) aborts it and bumps a generation counter under the
//! channel's write lock, so a response that was already in flight can never
//! be published afterwards. `reload()` cancels before it restarts, which makes
//! the latest request the only one that can land.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::models::ModelInfo;
use crate::service::{PredictionApi, ServiceError};

/// Shown when the model info could not be fetched.
pub const UNAVAILABLE_TEXT: &str = "Model insights unavailable.";

#[derive(Debug, Clone, PartialEq)]
pub enum InsightsState {
    Loading,
    Ready(ModelInfo),
    /// Fetch failed. Not fatal; the panel degrades to a notice.
    Unavailable,
}

pub struct InsightsLoader {
    client: Arc<dyn PredictionApi>,
    tx: Arc<watch::Sender<InsightsState>>,
    rx: watch::Receiver<InsightsState>,
    generation: Arc<AtomicU64>,
    task: Option<JoinHandle<()>>,
}

impl InsightsLoader {
    /// Start fetching immediately. Must be called inside a tokio runtime.
    pub fn spawn(client: Arc<dyn PredictionApi>) -> Self {
        let (tx, rx) = watch::channel(InsightsState::Loading);
        let mut loader = Self {
            client,
            tx: Arc::new(tx),
            rx,
            generation: Arc::new(AtomicU64::new(0)),
            task: None,
        };
        loader.start();
        loader
    }

    pub fn state(&self) -> InsightsState {
        self.rx.borrow().clone()
    }

    /// Wait for the outstanding fetch to publish, then return the state.
    ///
    /// With no fetch outstanding (after `cancel()`) this returns the current
    /// state immediately.
    pub async fn settled(&self) -> InsightsState {
        if self.task.is_none() {
            return self.state();
        }
        let mut rx = self.rx.clone();
        let settled = rx
            .wait_for(|state| !matches!(state, InsightsState::Loading))
            .await
            .map(|state| state.clone());
        settled.unwrap_or_else(|_| self.state())
    }

    /// Abort the outstanding fetch. Its response, if any, is discarded.
    pub fn cancel(&mut self) {
        self.tx.send_if_modified(|_| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            false
        });
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!("Model info fetch cancelled");
        }
    }

    /// Drop whatever is outstanding and fetch again.
    pub fn reload(&mut self) {
        self.cancel();
        self.tx.send_replace(InsightsState::Loading);
        self.start();
    }

    fn start(&mut self) {
        let generation = self.generation.load(Ordering::SeqCst);
        let current = Arc::clone(&self.generation);
        let client = Arc::clone(&self.client);
        let tx = Arc::clone(&self.tx);

        self.task = Some(tokio::spawn(async move {
            let fetched = tokio::task::spawn_blocking(move || client.model_info())
                .await
                .map_err(|e| ServiceError::TaskFailed(e.to_string()))
                .and_then(|r| r);

            let next = match fetched {
                Ok(info) => {
                    tracing::info!(
                        model_type = %info.model_type,
                        features = info.feature_importances.len(),
                        "Model info loaded"
                    );
                    InsightsState::Ready(info)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to fetch model info");
                    InsightsState::Unavailable
                }
            };

            tx.send_if_modified(|state| {
                if current.load(Ordering::SeqCst) != generation {
                    return false;
                }
                *state = next;
                true
            });
        }));
    }
}

impl Drop for InsightsLoader {
    fn drop(&mut self) {
        self.cancel();
    }
}
