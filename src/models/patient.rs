use super::enums::{Gender, Level};

/// A fully validated questionnaire, ready for submission.
///
/// User input reaches this type only through `PatientForm::validate`.
#[derive(Debug, Clone, PartialEq)]
pub struct PatientInput {
    /// Years.
    pub age: u32,
    pub gender: Gender,
    /// Centimetres.
    pub height: f64,
    /// Kilograms.
    pub weight: f64,
    pub systolic_bp: f64,
    pub diastolic_bp: f64,
    pub cholesterol: Level,
    pub glucose: Level,
    pub smoke: bool,
    pub alcohol: bool,
    pub active: bool,
}

impl Default for PatientInput {
    fn default() -> Self {
        Self {
            age: 50,
            gender: Gender::Female,
            height: 165.0,
            weight: 70.0,
            systolic_bp: 120.0,
            diastolic_bp: 80.0,
            cholesterol: Level::Normal,
            glucose: Level::Normal,
            smoke: false,
            alcohol: false,
            active: true,
        }
    }
}
