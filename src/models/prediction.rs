use serde::{Deserialize, Serialize};

use super::enums::{RiskClass, Severity};

/// Body returned by `POST /predict`, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionResponse {
    pub risk_prediction: i64,
    pub risk_probability: f64,
    pub message: String,
    #[serde(default)]
    pub analysis: Option<Analysis>,
}

/// Why a syntactically valid response was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResultError {
    #[error("risk_prediction must be 0 or 1, got {0}")]
    InvalidPrediction(i64),

    #[error("risk_probability must lie in [0, 1], got {0}")]
    ProbabilityOutOfRange(f64),
}

/// A validated prediction. Only built from a successful response.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub risk: RiskClass,
    pub probability: f64,
    pub message: String,
    pub analysis: Option<Analysis>,
}

impl PredictionResult {
    pub fn is_high_risk(&self) -> bool {
        self.risk == RiskClass::High
    }
}

impl TryFrom<PredictionResponse> for PredictionResult {
    type Error = ResultError;

    fn try_from(resp: PredictionResponse) -> Result<Self, Self::Error> {
        let risk = RiskClass::from_code(resp.risk_prediction)
            .map_err(|_| ResultError::InvalidPrediction(resp.risk_prediction))?;
        // NaN fails this check too.
        if !(0.0..=1.0).contains(&resp.risk_probability) {
            return Err(ResultError::ProbabilityOutOfRange(resp.risk_probability));
        }
        Ok(Self {
            risk,
            probability: resp.risk_probability,
            message: resp.message,
            analysis: resp.analysis,
        })
    }
}

/// Per-patient breakdown computed by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub bmi: f64,
    /// In the order the service returned them.
    pub risk_factors: Vec<RiskFactor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub factor: String,
    pub value: String,
    pub status: String,
    pub severity: Severity,
}

/// Body returned by `GET /model-info`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model_type: String,
    pub accuracy: f64,
    /// Pre-sorted by the service, most important first.
    pub feature_importances: Vec<FeatureImportance>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> PredictionResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn parses_full_response() {
        let resp = response(
            r#"{
                "risk_prediction": 1,
                "risk_probability": 0.734,
                "message": "High Risk",
                "analysis": {
                    "bmi": 31.2,
                    "risk_factors": [
                        {"factor": "BMI", "value": "31.2", "status": "Obese", "severity": "High"},
                        {"factor": "Age", "value": "64", "status": "Senior", "severity": "Medium"}
                    ]
                }
            }"#,
        );
        let result = PredictionResult::try_from(resp).unwrap();
        assert!(result.is_high_risk());
        assert_eq!(result.probability, 0.734);
        let analysis = result.analysis.unwrap();
        assert_eq!(analysis.bmi, 31.2);
        assert_eq!(analysis.risk_factors[0].factor, "BMI");
        assert_eq!(analysis.risk_factors[1].severity, Severity::Medium);
    }

    #[test]
    fn analysis_is_optional() {
        let resp = response(
            r#"{"risk_prediction": 0, "risk_probability": 0.12, "message": "Low Risk"}"#,
        );
        let result = PredictionResult::try_from(resp).unwrap();
        assert_eq!(result.risk, RiskClass::Low);
        assert!(result.analysis.is_none());
    }

    #[test]
    fn rejects_prediction_outside_binary() {
        let resp = response(r#"{"risk_prediction": 2, "risk_probability": 0.5, "message": ""}"#);
        assert_eq!(
            PredictionResult::try_from(resp),
            Err(ResultError::InvalidPrediction(2))
        );
    }

    #[test]
    fn rejects_probability_out_of_range() {
        let resp = response(r#"{"risk_prediction": 1, "risk_probability": 1.2, "message": ""}"#);
        assert!(matches!(
            PredictionResult::try_from(resp),
            Err(ResultError::ProbabilityOutOfRange(_))
        ));
    }

    #[test]
    fn unknown_severity_fails_parsing() {
        let json = r#"{
            "risk_prediction": 1, "risk_probability": 0.9, "message": "",
            "analysis": {"bmi": 22.0, "risk_factors": [
                {"factor": "X", "value": "1", "status": "?", "severity": "Extreme"}
            ]}
        }"#;
        assert!(serde_json::from_str::<PredictionResponse>(json).is_err());
    }

    #[test]
    fn model_info_keeps_order() {
        let info: ModelInfo = serde_json::from_str(
            r#"{"model_type": "Random Forest Classifier", "accuracy": 0.73,
                "feature_importances": [
                    {"feature": "AP Hi", "importance": 0.31},
                    {"feature": "Age", "importance": 0.22},
                    {"feature": "BMI", "importance": 0.25}
                ]}"#,
        )
        .unwrap();
        let names: Vec<_> = info
            .feature_importances
            .iter()
            .map(|f| f.feature.as_str())
            .collect();
        assert_eq!(names, ["AP Hi", "Age", "BMI"]);
    }
}
