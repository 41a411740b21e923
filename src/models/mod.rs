pub mod enums;
pub mod patient;
pub mod prediction;

pub use enums::{Gender, Level, ParseError, RiskClass, Severity};
pub use patient::PatientInput;
pub use prediction::{
    Analysis, FeatureImportance, ModelInfo, PredictionResponse, PredictionResult, ResultError,
    RiskFactor,
};
