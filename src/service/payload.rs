use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::models::{Gender, Level, ParseError, PatientInput};

/// Largest magnitude at which every whole f64 is exactly representable.
const MAX_EXACT_WHOLE: f64 = 9_007_199_254_740_992.0;

/// A measurement as sent on the wire.
///
/// Whole values serialize as JSON integers (`165`, not `165.0`); fractional
/// values stay floats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WireNumber(pub f64);

impl Serialize for WireNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let v = self.0;
        if v.fract() == 0.0 && v.abs() <= MAX_EXACT_WHOLE {
            serializer.serialize_i64(v as i64)
        } else {
            serializer.serialize_f64(v)
        }
    }
}

impl<'de> Deserialize<'de> for WireNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        f64::deserialize(deserializer).map(WireNumber)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PayloadError {
    #[error(transparent)]
    Code(#[from] ParseError),

    #[error("{field} must be 0 or 1, got {value}")]
    Flag { field: &'static str, value: u8 },
}

/// Request body for `POST /predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictPayload {
    pub age: u32,
    pub gender: u8,
    pub height: WireNumber,
    pub weight: WireNumber,
    pub ap_hi: WireNumber,
    pub ap_lo: WireNumber,
    pub cholesterol: u8,
    pub gluc: u8,
    pub smoke: u8,
    pub alco: u8,
    pub active: u8,
}

impl PredictPayload {
    /// Enums become their codes, switches become 0/1, measurements pass through.
    pub fn from_input(input: &PatientInput) -> Self {
        Self {
            age: input.age,
            gender: input.gender.code(),
            height: WireNumber(input.height),
            weight: WireNumber(input.weight),
            ap_hi: WireNumber(input.systolic_bp),
            ap_lo: WireNumber(input.diastolic_bp),
            cholesterol: input.cholesterol.code(),
            gluc: input.glucose.code(),
            smoke: flag(input.smoke),
            alco: flag(input.alcohol),
            active: flag(input.active),
        }
    }

    /// Inverse of `from_input`.
    pub fn to_input(&self) -> Result<PatientInput, PayloadError> {
        Ok(PatientInput {
            age: self.age,
            gender: Gender::from_code(i64::from(self.gender))?,
            height: self.height.0,
            weight: self.weight.0,
            systolic_bp: self.ap_hi.0,
            diastolic_bp: self.ap_lo.0,
            cholesterol: Level::from_code(i64::from(self.cholesterol))?,
            glucose: Level::from_code(i64::from(self.gluc))?,
            smoke: unflag("smoke", self.smoke)?,
            alcohol: unflag("alco", self.alco)?,
            active: unflag("active", self.active)?,
        })
    }
}

fn flag(on: bool) -> u8 {
    u8::from(on)
}

fn unflag(field: &'static str, value: u8) -> Result<bool, PayloadError> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(PayloadError::Flag { field, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_input_maps_to_documented_payload() {
        let payload = PredictPayload::from_input(&PatientInput::default());
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "age": 50, "gender": 1, "height": 165, "weight": 70,
                "ap_hi": 120, "ap_lo": 80, "cholesterol": 1, "gluc": 1,
                "smoke": 0, "alco": 0, "active": 1
            })
        );
    }

    #[test]
    fn fractional_measurements_stay_floats() {
        let input = PatientInput {
            weight: 72.5,
            height: 171.3,
            ..PatientInput::default()
        };
        let value = serde_json::to_value(PredictPayload::from_input(&input)).unwrap();
        assert_eq!(value["weight"], json!(72.5));
        assert_eq!(value["height"], json!(171.3));
        assert_eq!(value["ap_hi"], json!(120));
    }

    #[test]
    fn decoding_recovers_every_enum_and_switch_combination() {
        for gender in Gender::ALL {
            for level in Level::ALL {
                for bits in 0u8..8 {
                    let input = PatientInput {
                        gender: *gender,
                        cholesterol: *level,
                        glucose: *level,
                        smoke: bits & 1 != 0,
                        alcohol: bits & 2 != 0,
                        active: bits & 4 != 0,
                        ..PatientInput::default()
                    };
                    let payload = PredictPayload::from_input(&input);
                    assert!(payload.smoke <= 1 && payload.alco <= 1 && payload.active <= 1);
                    assert_eq!(payload.to_input().unwrap(), input);
                }
            }
        }
    }

    #[test]
    fn decoding_survives_json() {
        let input = PatientInput {
            age: 63,
            gender: Gender::Male,
            weight: 88.2,
            smoke: true,
            ..PatientInput::default()
        };
        let text = serde_json::to_string(&PredictPayload::from_input(&input)).unwrap();
        let back: PredictPayload = serde_json::from_str(&text).unwrap();
        assert_eq!(back.to_input().unwrap(), input);
    }

    #[test]
    fn decoding_rejects_out_of_range_values() {
        let mut payload = PredictPayload::from_input(&PatientInput::default());
        payload.smoke = 2;
        assert_eq!(
            payload.to_input(),
            Err(PayloadError::Flag {
                field: "smoke",
                value: 2
            })
        );

        let mut payload = PredictPayload::from_input(&PatientInput::default());
        payload.gluc = 4;
        assert!(matches!(payload.to_input(), Err(PayloadError::Code(_))));
    }
}
