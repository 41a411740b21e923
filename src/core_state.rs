//! Application state: the explicit record behind every view.
//!
//! `CoreState` owns the questionnaire, the navigator, the latest prediction,
//! the submission controller and the insights loader. Front ends drive it
//! through the methods below and render from its accessors; nothing else
//! holds mutable UI state.

use std::sync::Arc;

use crate::charts::{ChartAsset, CHART_GALLERY};
use crate::insights::{InsightsLoader, InsightsState};
use crate::models::PredictionResult;
use crate::navigation::{NavEvent, Navigator, ViewState};
use crate::questionnaire::{Field, FieldError, FieldErrors, PatientForm};
use crate::service::{ChartImage, PredictionApi, ServiceError};
use crate::submission::{SubmissionController, SubmissionOutcome};

/// Generic message surfaced when a submission fails.
pub const SUBMIT_FAILED_TEXT: &str = "Prediction failed. Please try again.";

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("No chart numbered {0}")]
    UnknownChart(usize),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

pub struct CoreState {
    client: Arc<dyn PredictionApi>,
    form: PatientForm,
    field_errors: FieldErrors,
    navigator: Navigator,
    /// Latest successful prediction. Replaced whole, never merged.
    result: Option<PredictionResult>,
    last_error: Option<String>,
    controller: SubmissionController,
    insights: InsightsLoader,
}

impl CoreState {
    /// Fresh state on the Intro view with a default form. Starts the model
    /// info fetch, so it must be created inside a tokio runtime.
    pub fn new(client: Arc<dyn PredictionApi>) -> Self {
        Self {
            form: PatientForm::default(),
            field_errors: FieldErrors::default(),
            navigator: Navigator::new(),
            result: None,
            last_error: None,
            controller: SubmissionController::new(Arc::clone(&client)),
            insights: InsightsLoader::spawn(Arc::clone(&client)),
            client,
        }
    }

    // ── Navigation ──────────────────────────────────────────

    pub fn active_view(&self) -> ViewState {
        self.navigator.active()
    }

    pub fn select_tab(&mut self, tab: ViewState) {
        self.navigator.apply(NavEvent::SelectTab(tab));
    }

    // ── Questionnaire ───────────────────────────────────────

    pub fn form(&self) -> &PatientForm {
        &self.form
    }

    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    /// Apply an edit and re-check that field.
    pub fn edit_field(&mut self, field: Field, value: &str) -> Result<(), FieldError> {
        self.form.set(field, value)?;
        self.field_errors.clear(field);
        if let Err(e) = self.form.validate_field(field) {
            self.field_errors.record(e);
        }
        Ok(())
    }

    // ── Submission ──────────────────────────────────────────

    pub fn is_loading(&self) -> bool {
        self.controller.is_loading()
    }

    pub fn result(&self) -> Option<&PredictionResult> {
        self.result.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Validate and submit the questionnaire.
    ///
    /// Field errors block dispatch and are returned as `Err`. On success the
    /// new result replaces the old one and the view moves to Analysis. On
    /// failure the previous result and the view are left alone.
    pub async fn submit(&mut self) -> Result<SubmissionOutcome, FieldErrors> {
        let input = match self.form.validate() {
            Ok(input) => input,
            Err(errors) => {
                self.field_errors = errors.clone();
                return Err(errors);
            }
        };
        self.field_errors = FieldErrors::default();

        let result = &mut self.result;
        let navigator = &mut self.navigator;
        let outcome = self
            .controller
            .submit(&input, |r| {
                *result = Some(r.clone());
                navigator.apply(NavEvent::SubmissionSucceeded);
            })
            .await;

        match &outcome {
            SubmissionOutcome::Completed(_) => self.last_error = None,
            SubmissionOutcome::Failed(_) => self.last_error = Some(SUBMIT_FAILED_TEXT.to_string()),
            SubmissionOutcome::Refused => {}
        }
        Ok(outcome)
    }

    // ── Insights & charts ───────────────────────────────────

    pub fn insights(&self) -> InsightsState {
        self.insights.state()
    }

    pub async fn settled_insights(&self) -> InsightsState {
        self.insights.settled().await
    }

    pub fn reload_insights(&mut self) {
        self.insights.reload();
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    /// Fetch gallery chart `index` (zero-based).
    pub async fn chart_image(&self, index: usize) -> Result<(ChartAsset, ChartImage), CoreError> {
        let asset = *CHART_GALLERY.get(index).ok_or(CoreError::UnknownChart(index))?;
        let client = Arc::clone(&self.client);
        let image = tokio::task::spawn_blocking(move || client.chart(asset.filename))
            .await
            .map_err(|e| ServiceError::TaskFailed(e.to_string()))??;
        if image == ChartImage::Missing {
            tracing::warn!(filename = asset.filename, "Chart image not found");
        }
        Ok((asset, image))
    }

    /// `GET /` banner, for the startup check.
    pub async fn health_check(&self) -> Result<String, ServiceError> {
        let client = Arc::clone(&self.client);
        tokio::task::spawn_blocking(move || client.health_check())
            .await
            .map_err(|e| ServiceError::TaskFailed(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{gauge_series, RiskBranch};
    use crate::models::{Analysis, ModelInfo, RiskClass};
    use crate::service::MockPredictionClient;

    fn high_risk() -> PredictionResult {
        PredictionResult {
            risk: RiskClass::High,
            probability: 0.734,
            message: "High Risk".into(),
            analysis: Some(Analysis {
                bmi: 25.7,
                risk_factors: vec![],
            }),
        }
    }

    #[tokio::test]
    async fn successful_submission_moves_predict_to_analysis() {
        let mock = Arc::new(MockPredictionClient::new(high_risk()));
        let mut state = CoreState::new(mock.clone());
        state.select_tab(ViewState::Predict);

        let outcome = state.submit().await.unwrap();

        assert!(matches!(outcome, SubmissionOutcome::Completed(_)));
        assert_eq!(state.active_view(), ViewState::Analysis);
        let result = state.result().unwrap();
        assert_eq!(gauge_series(result).display, "73.4%");
        assert_eq!(RiskBranch::of(result), RiskBranch::High);
        assert!(!state.is_loading());
        assert_eq!(mock.predict_calls(), 1);
    }

    #[tokio::test]
    async fn invalid_age_blocks_dispatch() {
        let mock = Arc::new(MockPredictionClient::new(high_risk()));
        let mut state = CoreState::new(mock.clone());
        state.select_tab(ViewState::Predict);
        state.edit_field(Field::Age, "abc").unwrap();
        assert_eq!(
            state.field_errors().get(Field::Age),
            Some("Age must be a number")
        );

        let errors = state.submit().await.unwrap_err();

        assert_eq!(errors.get(Field::Age), Some("Age must be a number"));
        assert_eq!(mock.predict_calls(), 0);
        assert_eq!(state.active_view(), ViewState::Predict);
    }

    #[tokio::test]
    async fn correcting_a_field_clears_its_error() {
        let mock = Arc::new(MockPredictionClient::new(high_risk()));
        let mut state = CoreState::new(mock);
        state.edit_field(Field::Weight, "5").unwrap();
        assert!(state.field_errors().get(Field::Weight).is_some());

        state.edit_field(Field::Weight, "65").unwrap();
        assert!(state.field_errors().is_empty());
    }

    #[tokio::test]
    async fn failure_keeps_previous_result_and_view() {
        let ok = Arc::new(MockPredictionClient::new(high_risk()));
        let mut state = CoreState::new(ok);
        state.submit().await.unwrap();
        let previous = state.result().cloned();

        // Swap in a failing service while keeping the rest of the state.
        let failing: Arc<dyn PredictionApi> = Arc::new(MockPredictionClient::failing(
            ServiceError::Status {
                status: 500,
                body: "Model not loaded.".into(),
            },
        ));
        state.controller = SubmissionController::new(failing);
        state.select_tab(ViewState::Predict);

        let outcome = state.submit().await.unwrap();

        assert!(matches!(outcome, SubmissionOutcome::Failed(_)));
        assert_eq!(state.result().cloned(), previous);
        assert_eq!(state.active_view(), ViewState::Predict);
        assert_eq!(state.last_error(), Some(SUBMIT_FAILED_TEXT));
        assert!(!state.is_loading());
    }

    #[tokio::test]
    async fn insights_load_on_creation() {
        let info = ModelInfo {
            model_type: "Random Forest Classifier".into(),
            accuracy: 0.73,
            feature_importances: vec![],
        };
        let mock = Arc::new(MockPredictionClient::new(high_risk()).with_model_info(info.clone()));
        let state = CoreState::new(mock);

        assert_eq!(state.settled_insights().await, InsightsState::Ready(info));
    }

    #[tokio::test]
    async fn chart_lookup_reports_missing_and_unknown() {
        let available = CHART_GALLERY[0].filename.to_string();
        let mock = Arc::new(MockPredictionClient::new(high_risk()).with_charts(vec![available]));
        let state = CoreState::new(mock);

        let (asset, image) = state.chart_image(0).await.unwrap();
        assert_eq!(asset.title, "Correlation Heatmap");
        assert!(matches!(image, ChartImage::Available { .. }));

        let (_, image) = state.chart_image(1).await.unwrap();
        assert_eq!(image, ChartImage::Missing);

        assert!(matches!(
            state.chart_image(8).await,
            Err(CoreError::UnknownChart(8))
        ));
    }
}
