use serde::{Deserialize, Serialize};

/// Error raised when a coded selection cannot be resolved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Unknown {field} code: {code}")]
    UnknownCode { field: &'static str, code: i64 },

    #[error("Unknown {field} option: {value:?}")]
    UnknownOption { field: &'static str, value: String },
}

/// Lowercase alphanumerics only, so "Above Normal", "above_normal" and
/// "AboveNormal" all compare equal.
fn normalize_option(s: &str) -> String {
    s.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Macro to generate a coded enum: integer code on the wire, label in the UI.
///
/// `FromStr` accepts either the code in string form ("2") or the label in any
/// casing/spacing ("well above normal").
macro_rules! code_enum {
    ($name:ident { $($variant:ident => $code:literal, $label:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            pub fn code(self) -> u8 {
                match self {
                    $(Self::$variant => $code),+
                }
            }

            pub fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }

            pub fn from_code(code: i64) -> Result<Self, ParseError> {
                match code {
                    $($code => Ok(Self::$variant),)+
                    _ => Err(ParseError::UnknownCode {
                        field: stringify!($name),
                        code,
                    }),
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = ParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                if let Ok(code) = trimmed.parse::<i64>() {
                    return Self::from_code(code);
                }
                let wanted = normalize_option(trimmed);
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| !wanted.is_empty() && normalize_option(v.label()) == wanted)
                    .ok_or_else(|| ParseError::UnknownOption {
                        field: stringify!($name),
                        value: trimmed.to_string(),
                    })
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

code_enum!(Gender {
    Female => 1, "Female",
    Male => 2, "Male",
});

code_enum!(Level {
    Normal => 1, "Normal",
    AboveNormal => 2, "Above Normal",
    WellAboveNormal => 3, "Well Above Normal",
});

code_enum!(RiskClass {
    Low => 0, "Low Risk",
    High => 1, "High Risk",
});

/// Severity attached to a risk factor by the prediction service.
///
/// Deserialization is strict: any other string fails the whole response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::High, Severity::Medium, Severity::Low];

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}
