//! Patient questionnaire: editable form state, coercion and validation.
//!
//! Numeric answers are kept as the raw text the user typed and only coerced
//! when validated. Selections and switches are typed as soon as they are set.
//! `PatientForm::validate` is the only way from the form to a `PatientInput`.

use std::collections::BTreeMap;
use std::str::FromStr;

use crate::models::{Gender, Level, PatientInput};

// ═══════════════════════════════════════════════════════════
// Fields
// ═══════════════════════════════════════════════════════════

/// One questionnaire field, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Age,
    Gender,
    Height,
    Weight,
    SystolicBp,
    DiastolicBp,
    Cholesterol,
    Glucose,
    Smoke,
    Alcohol,
    Active,
}

impl Field {
    pub const ALL: [Field; 11] = [
        Field::Age,
        Field::Gender,
        Field::Height,
        Field::Weight,
        Field::SystolicBp,
        Field::DiastolicBp,
        Field::Cholesterol,
        Field::Glucose,
        Field::Smoke,
        Field::Alcohol,
        Field::Active,
    ];

    /// Key used by the prediction service for this field.
    pub fn key(self) -> &'static str {
        match self {
            Field::Age => "age",
            Field::Gender => "gender",
            Field::Height => "height",
            Field::Weight => "weight",
            Field::SystolicBp => "ap_hi",
            Field::DiastolicBp => "ap_lo",
            Field::Cholesterol => "cholesterol",
            Field::Glucose => "gluc",
            Field::Smoke => "smoke",
            Field::Alcohol => "alco",
            Field::Active => "active",
        }
    }

    /// Form label shown next to the input.
    pub fn label(self) -> &'static str {
        match self {
            Field::Age => "Age (Years)",
            Field::Gender => "Gender",
            Field::Height => "Height (cm)",
            Field::Weight => "Weight (kg)",
            Field::SystolicBp => "Systolic BP (ap_hi)",
            Field::DiastolicBp => "Diastolic BP (ap_lo)",
            Field::Cholesterol => "Cholesterol",
            Field::Glucose => "Glucose",
            Field::Smoke => "Smoking",
            Field::Alcohol => "Alcohol",
            Field::Active => "Physical Activity",
        }
    }

    fn kind(self) -> FieldKind {
        match self {
            Field::Age
            | Field::Height
            | Field::Weight
            | Field::SystolicBp
            | Field::DiastolicBp => FieldKind::Numeric,
            Field::Gender | Field::Cholesterol | Field::Glucose => FieldKind::Choice,
            Field::Smoke | Field::Alcohol | Field::Active => FieldKind::Switch,
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Field {
    type Err = FieldError;

    /// Accepts the service key or a spelled-out alias.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        let field = match name.as_str() {
            "age" => Field::Age,
            "gender" | "sex" => Field::Gender,
            "height" => Field::Height,
            "weight" => Field::Weight,
            "ap_hi" | "systolic" | "systolic_bp" => Field::SystolicBp,
            "ap_lo" | "diastolic" | "diastolic_bp" => Field::DiastolicBp,
            "cholesterol" => Field::Cholesterol,
            "gluc" | "glucose" => Field::Glucose,
            "smoke" | "smoking" => Field::Smoke,
            "alco" | "alcohol" => Field::Alcohol,
            "active" | "activity" => Field::Active,
            _ => {
                return Err(FieldError {
                    field: None,
                    message: format!("Unknown field: {}", s.trim()),
                })
            }
        };
        Ok(field)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Numeric,
    Choice,
    Switch,
}

// ═══════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════

/// A validation failure scoped to one field.
///
/// `field` is `None` only when the field name itself could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct FieldError {
    pub field: Option<Field>,
    pub message: String,
}

impl FieldError {
    fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field: Some(field),
            message: message.into(),
        }
    }
}

/// Every field that failed validation, with its message. Never empty when
/// returned as an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("{} field(s) failed validation", .0.len())]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }

    pub fn record(&mut self, err: FieldError) {
        if let Some(field) = err.field {
            self.0.insert(field, err.message);
        }
    }

    pub fn clear(&mut self, field: Field) {
        self.0.remove(&field);
    }
}

// ═══════════════════════════════════════════════════════════
// Numeric rules
// ═══════════════════════════════════════════════════════════

struct NumericRule {
    name: &'static str,
    min: f64,
    below_min: &'static str,
}

fn numeric_rule(field: Field) -> Option<NumericRule> {
    let rule = match field {
        Field::Age => NumericRule {
            name: "Age",
            min: 1.0,
            below_min: "Age is required",
        },
        Field::Height => NumericRule {
            name: "Height",
            min: 50.0,
            below_min: "Height must be valid",
        },
        Field::Weight => NumericRule {
            name: "Weight",
            min: 10.0,
            below_min: "Weight must be valid",
        },
        Field::SystolicBp => NumericRule {
            name: "Systolic BP",
            min: 50.0,
            below_min: "Systolic BP must be valid",
        },
        Field::DiastolicBp => NumericRule {
            name: "Diastolic BP",
            min: 30.0,
            below_min: "Diastolic BP must be valid",
        },
        _ => return None,
    };
    Some(rule)
}

/// Coerce free text to a number. Blank text coerces to 0 so it trips the
/// minimum check; anything unparseable or non-finite is `None`.
fn coerce_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_switch(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

fn switch_text(on: bool) -> &'static str {
    if on {
        "yes"
    } else {
        "no"
    }
}

// ═══════════════════════════════════════════════════════════
// PatientForm
// ═══════════════════════════════════════════════════════════

/// Editable questionnaire state.
#[derive(Debug, Clone, PartialEq)]
pub struct PatientForm {
    age: String,
    gender: Gender,
    height: String,
    weight: String,
    systolic_bp: String,
    diastolic_bp: String,
    cholesterol: Level,
    glucose: Level,
    smoke: bool,
    alcohol: bool,
    active: bool,
}

impl Default for PatientForm {
    fn default() -> Self {
        Self::from_input(&PatientInput::default())
    }
}

impl PatientForm {
    /// Pre-fill the form from an existing input.
    pub fn from_input(input: &PatientInput) -> Self {
        Self {
            age: input.age.to_string(),
            gender: input.gender,
            height: input.height.to_string(),
            weight: input.weight.to_string(),
            systolic_bp: input.systolic_bp.to_string(),
            diastolic_bp: input.diastolic_bp.to_string(),
            cholesterol: input.cholesterol,
            glucose: input.glucose,
            smoke: input.smoke,
            alcohol: input.alcohol,
            active: input.active,
        }
    }

    /// Apply one edit.
    ///
    /// Numeric text is stored as typed and checked on validation. A selection
    /// or switch value that does not parse is rejected and the previous value
    /// is kept.
    pub fn set(&mut self, field: Field, value: &str) -> Result<(), FieldError> {
        match field.kind() {
            FieldKind::Numeric => {
                *self.text_mut(field) = value.trim().to_string();
                Ok(())
            }
            FieldKind::Choice => {
                let invalid = |_| {
                    let message = format!("{} must be one of the listed options", field.label());
                    FieldError::new(field, message)
                };
                match field {
                    Field::Gender => self.gender = Gender::from_str(value).map_err(invalid)?,
                    Field::Cholesterol => {
                        self.cholesterol = Level::from_str(value).map_err(invalid)?
                    }
                    _ => self.glucose = Level::from_str(value).map_err(invalid)?,
                }
                Ok(())
            }
            FieldKind::Switch => {
                let on = parse_switch(value).ok_or_else(|| {
                    FieldError::new(field, format!("{} must be yes or no", field.label()))
                })?;
                match field {
                    Field::Smoke => self.smoke = on,
                    Field::Alcohol => self.alcohol = on,
                    _ => self.active = on,
                }
                Ok(())
            }
        }
    }

    /// Current value as display text (labels for selections).
    pub fn display_value(&self, field: Field) -> String {
        match field {
            Field::Gender => self.gender.label().to_string(),
            Field::Cholesterol => self.cholesterol.label().to_string(),
            Field::Glucose => self.glucose.label().to_string(),
            Field::Smoke => switch_text(self.smoke).to_string(),
            Field::Alcohol => switch_text(self.alcohol).to_string(),
            Field::Active => switch_text(self.active).to_string(),
            _ => self.text(field).to_string(),
        }
    }

    /// Check a single field.
    pub fn validate_field(&self, field: Field) -> Result<(), FieldError> {
        match field.kind() {
            FieldKind::Numeric => self.numeric(field).map(|_| ()),
            // Selections and switches are typed on `set`.
            FieldKind::Choice | FieldKind::Switch => Ok(()),
        }
    }

    /// Check every field. Either a complete `PatientInput` or every error.
    pub fn validate(&self) -> Result<PatientInput, FieldErrors> {
        let mut errors = FieldErrors::default();
        let mut checked = |field| match self.numeric(field) {
            Ok(v) => v,
            Err(e) => {
                errors.record(e);
                f64::NAN
            }
        };

        let age = checked(Field::Age);
        let height = checked(Field::Height);
        let weight = checked(Field::Weight);
        let systolic_bp = checked(Field::SystolicBp);
        let diastolic_bp = checked(Field::DiastolicBp);

        if !errors.is_empty() {
            tracing::debug!(error_count = errors.len(), "Questionnaire validation failed");
            return Err(errors);
        }

        Ok(PatientInput {
            // Checked whole and within u32 by `numeric`.
            age: age as u32,
            gender: self.gender,
            height,
            weight,
            systolic_bp,
            diastolic_bp,
            cholesterol: self.cholesterol,
            glucose: self.glucose,
            smoke: self.smoke,
            alcohol: self.alcohol,
            active: self.active,
        })
    }

    // ── Internal ────────────────────────────────────────────

    fn numeric(&self, field: Field) -> Result<f64, FieldError> {
        let Some(rule) = numeric_rule(field) else {
            return Err(FieldError::new(field, format!("{} is not numeric", field.label())));
        };
        let value = coerce_number(self.text(field))
            .ok_or_else(|| FieldError::new(field, format!("{} must be a number", rule.name)))?;
        if value < rule.min {
            return Err(FieldError::new(field, rule.below_min));
        }
        if field == Field::Age {
            if value.fract() != 0.0 {
                return Err(FieldError::new(field, "Age must be a whole number"));
            }
            if value > f64::from(u32::MAX) {
                return Err(FieldError::new(field, "Age is out of range"));
            }
        }
        Ok(value)
    }

    fn text(&self, field: Field) -> &str {
        match field {
            Field::Age => &self.age,
            Field::Height => &self.height,
            Field::Weight => &self.weight,
            Field::SystolicBp => &self.systolic_bp,
            Field::DiastolicBp => &self.diastolic_bp,
            _ => "",
        }
    }

    fn text_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Age => &mut self.age,
            Field::Height => &mut self.height,
            Field::Weight => &mut self.weight,
            Field::SystolicBp => &mut self.systolic_bp,
            _ => &mut self.diastolic_bp,
        }
    }
}
