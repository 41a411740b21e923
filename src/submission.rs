//! Single-flight submission of the questionnaire.
//!
//! A second "Predict Risk" while a request is outstanding must not dispatch a
//! duplicate request. The controller owns a `SubmissionGate`: `try_acquire()`
//! succeeds for exactly one caller at a time and the returned guard clears the
//! loading flag when dropped. The guard travels with the blocking request, so
//! the gate stays closed until the request itself finishes, even when the
//! submitting future is dropped first.
//!
//! This is the only place `POST /predict` is issued.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use crate::models::{PatientInput, PredictionResult};
use crate::service::{PredictPayload, PredictionApi, ServiceError};

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// Snapshot of the submission currently in flight.
#[derive(Debug, Clone)]
pub struct ActiveSubmission {
    pub id: Uuid,
    /// When the request was dispatched (RFC 3339).
    pub started_at: String,
}

/// What happened to one call of `SubmissionController::submit`.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    /// The service answered with a valid prediction.
    Completed(PredictionResult),
    /// Transport, status or parsing failure. Nothing downstream changed.
    Failed(ServiceError),
    /// Another submission was in flight; no request was dispatched.
    Refused,
}

// ═══════════════════════════════════════════════════════════
// SubmissionGate
// ═══════════════════════════════════════════════════════════

/// Mutual-exclusion gate doubling as the UI loading flag.
pub struct SubmissionGate {
    in_flight: AtomicBool,
    current: Mutex<Option<ActiveSubmission>>,
}

impl SubmissionGate {
    pub fn new() -> Self {
        Self {
            in_flight: AtomicBool::new(false),
            current: Mutex::new(None),
        }
    }

    /// Claim the gate without waiting. `None` while another submission holds it.
    pub fn try_acquire(self: &Arc<Self>) -> Option<InFlightGuard> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;

        let id = Uuid::new_v4();
        if let Ok(mut current) = self.current.lock() {
            *current = Some(ActiveSubmission {
                id,
                started_at: chrono::Utc::now().to_rfc3339(),
            });
        }
        Some(InFlightGuard {
            gate: Arc::clone(self),
            id,
        })
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn current(&self) -> Option<ActiveSubmission> {
        self.current.lock().ok()?.clone()
    }

    fn release(&self) {
        if let Ok(mut current) = self.current.lock() {
            *current = None;
        }
        self.in_flight.store(false, Ordering::Release);
    }
}

impl Default for SubmissionGate {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII token for the in-flight submission. Dropping it reopens the gate.
pub struct InFlightGuard {
    gate: Arc<SubmissionGate>,
    pub id: Uuid,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.gate.release();
    }
}

// ═══════════════════════════════════════════════════════════
// SubmissionController
// ═══════════════════════════════════════════════════════════

pub struct SubmissionController {
    client: Arc<dyn PredictionApi>,
    gate: Arc<SubmissionGate>,
}

impl SubmissionController {
    pub fn new(client: Arc<dyn PredictionApi>) -> Self {
        Self {
            client,
            gate: Arc::new(SubmissionGate::new()),
        }
    }

    /// True while a request is outstanding.
    pub fn is_loading(&self) -> bool {
        self.gate.is_loading()
    }

    pub fn current(&self) -> Option<ActiveSubmission> {
        self.gate.current()
    }

    /// Send `input` to the service.
    ///
    /// `on_complete` runs only for a valid prediction, before the loading flag
    /// clears. On failure the error is logged and returned; nothing else is
    /// touched.
    pub async fn submit<F>(&self, input: &PatientInput, on_complete: F) -> SubmissionOutcome
    where
        F: FnOnce(&PredictionResult),
    {
        let Some(guard) = self.gate.try_acquire() else {
            tracing::info!("Submission refused: a request is already in flight");
            return SubmissionOutcome::Refused;
        };

        let id = guard.id;
        let payload = PredictPayload::from_input(input);
        let client = Arc::clone(&self.client);
        tracing::info!(submission_id = %id, url = client.base_url(), "Submitting questionnaire");

        // The guard rides along with the request. If this future is dropped,
        // the task's output (and the guard) is dropped when the request ends.
        let joined = tokio::task::spawn_blocking(move || {
            let response = client.predict(&payload);
            (response, guard)
        })
        .await;
        let (response, guard) = match joined {
            Ok((response, guard)) => (response, Some(guard)),
            Err(e) => (Err(ServiceError::TaskFailed(e.to_string())), None),
        };

        let outcome = match response {
            Ok(result) => {
                tracing::info!(
                    submission_id = %id,
                    risk = %result.risk,
                    probability = result.probability,
                    "Prediction received"
                );
                on_complete(&result);
                SubmissionOutcome::Completed(result)
            }
            Err(e) => {
                tracing::warn!(submission_id = %id, error = %e, "Prediction request failed");
                SubmissionOutcome::Failed(e)
            }
        };

        drop(guard);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RiskClass;
    use crate::service::MockPredictionClient;
    use std::time::Duration;

    fn high_risk() -> PredictionResult {
        PredictionResult {
            risk: RiskClass::High,
            probability: 0.734,
            message: "High Risk".into(),
            analysis: None,
        }
    }

    #[test]
    fn gate_admits_one_holder() {
        let gate = Arc::new(SubmissionGate::new());
        let first = gate.try_acquire().unwrap();
        assert!(gate.is_loading());
        assert!(gate.try_acquire().is_none());
        assert_eq!(gate.current().unwrap().id, first.id);

        drop(first);
        assert!(!gate.is_loading());
        assert!(gate.current().is_none());
        assert!(gate.try_acquire().is_some());
    }

    #[tokio::test]
    async fn success_invokes_callback_and_clears_loading() {
        let mock = Arc::new(MockPredictionClient::new(high_risk()));
        let controller = SubmissionController::new(mock.clone());

        let mut seen = None;
        let outcome = controller
            .submit(&PatientInput::default(), |r| seen = Some(r.clone()))
            .await;

        assert_eq!(outcome, SubmissionOutcome::Completed(high_risk()));
        assert_eq!(seen, Some(high_risk()));
        assert!(!controller.is_loading());
        assert_eq!(mock.predict_calls(), 1);
        assert_eq!(
            mock.last_payload(),
            Some(PredictPayload::from_input(&PatientInput::default()))
        );
    }

    #[tokio::test]
    async fn failure_skips_callback_and_clears_loading() {
        let mock = Arc::new(MockPredictionClient::failing(ServiceError::Connection(
            "http://localhost:8000".into(),
        )));
        let controller = SubmissionController::new(mock);

        let mut called = false;
        let outcome = controller
            .submit(&PatientInput::default(), |_| called = true)
            .await;

        assert!(matches!(
            outcome,
            SubmissionOutcome::Failed(ServiceError::Connection(_))
        ));
        assert!(!called);
        assert!(!controller.is_loading());
    }

    #[tokio::test]
    async fn submitting_while_in_flight_is_refused() {
        let mock = Arc::new(
            MockPredictionClient::new(high_risk()).with_delay(Duration::from_millis(200)),
        );
        let controller = SubmissionController::new(mock.clone());
        let input = PatientInput::default();

        let (first, second) = tokio::join!(controller.submit(&input, |_| {}), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            assert!(controller.is_loading());
            controller.submit(&input, |_| {}).await
        });

        assert!(matches!(first, SubmissionOutcome::Completed(_)));
        assert_eq!(second, SubmissionOutcome::Refused);
        assert_eq!(mock.predict_calls(), 1);
    }

    #[tokio::test]
    async fn dropped_submit_keeps_gate_closed_until_request_ends() {
        let mock = Arc::new(
            MockPredictionClient::new(high_risk()).with_delay(Duration::from_millis(400)),
        );
        let controller = SubmissionController::new(mock.clone());
        let input = PatientInput::default();

        let abandoned =
            tokio::time::timeout(Duration::from_millis(50), controller.submit(&input, |_| {}))
                .await;
        assert!(abandoned.is_err());
        assert!(controller.is_loading());

        let second = controller.submit(&input, |_| {}).await;
        assert_eq!(second, SubmissionOutcome::Refused);
        assert_eq!(mock.predict_calls(), 1);

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(!controller.is_loading());
        assert!(matches!(
            controller.submit(&input, |_| {}).await,
            SubmissionOutcome::Completed(_)
        ));
        assert_eq!(mock.predict_calls(), 2);
    }

    #[tokio::test]
    async fn gate_reopens_after_completion() {
        let mock = Arc::new(MockPredictionClient::new(high_risk()));
        let controller = SubmissionController::new(mock.clone());

        controller.submit(&PatientInput::default(), |_| {}).await;
        controller.submit(&PatientInput::default(), |_| {}).await;

        assert_eq!(mock.predict_calls(), 2);
    }
}
