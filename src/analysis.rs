//! Render-ready classification of the risk factors returned with a prediction.

use crate::models::{Analysis, RiskFactor, Severity};

/// Shown in place of an empty factor list.
pub const REASSURANCE_TEXT: &str =
    "No specific high-risk factors identified in the basic analysis. Maintain healthy habits!";

/// Presentation tier for one severity: card background, card border, icon accent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TierStyle {
    pub background: &'static str,
    pub border: &'static str,
    pub accent: &'static str,
}

const HIGH_TIER: TierStyle = TierStyle {
    background: "red-50",
    border: "red-200",
    accent: "red-600",
};

const MEDIUM_TIER: TierStyle = TierStyle {
    background: "orange-50",
    border: "orange-200",
    accent: "orange-600",
};

const LOW_TIER: TierStyle = TierStyle {
    background: "yellow-50",
    border: "yellow-200",
    accent: "yellow-600",
};

/// Severity → tier. Total and injective.
pub const fn tier_style(severity: Severity) -> TierStyle {
    match severity {
        Severity::High => HIGH_TIER,
        Severity::Medium => MEDIUM_TIER,
        Severity::Low => LOW_TIER,
    }
}

/// A risk factor paired with its presentation tier.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedFactor<'a> {
    pub factor: &'a RiskFactor,
    pub tier: TierStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisView<'a> {
    /// No factors were flagged.
    Reassurance { bmi: f64 },
    /// Flagged factors in the order the service returned them.
    Factors {
        bmi: f64,
        factors: Vec<ClassifiedFactor<'a>>,
    },
}

impl AnalysisView<'_> {
    pub fn bmi(&self) -> f64 {
        match self {
            AnalysisView::Reassurance { bmi } | AnalysisView::Factors { bmi, .. } => *bmi,
        }
    }
}

pub fn derive_analysis(analysis: &Analysis) -> AnalysisView<'_> {
    if analysis.risk_factors.is_empty() {
        return AnalysisView::Reassurance { bmi: analysis.bmi };
    }
    AnalysisView::Factors {
        bmi: analysis.bmi,
        factors: analysis
            .risk_factors
            .iter()
            .map(|factor| ClassifiedFactor {
                factor,
                tier: tier_style(factor.severity),
            })
            .collect(),
    }
}

/// BMI exactly as the service sent it.
pub fn bmi_display(bmi: f64) -> String {
    bmi.to_string()
}
