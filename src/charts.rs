//! Chart-ready series for the result gauge, the model insights bars and the
//! static chart gallery.

use crate::models::{ModelInfo, PredictionResult, RiskClass};

/// Fill for the unused part of the gauge.
pub const SAFETY_COLOR: &str = "#e2e8f0";

// ═══════════════════════════════════════════════════════════
// Risk branch
// ═══════════════════════════════════════════════════════════

/// The binary that drives gauge color, headline and recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskBranch {
    High,
    Low,
}

impl RiskBranch {
    pub fn of(result: &PredictionResult) -> Self {
        match result.risk {
            RiskClass::High => RiskBranch::High,
            RiskClass::Low => RiskBranch::Low,
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            RiskBranch::High => "#ef4444",
            RiskBranch::Low => "#22c55e",
        }
    }

    pub fn headline(self) -> &'static str {
        match self {
            RiskBranch::High => "High Risk Detected",
            RiskBranch::Low => "Low Risk Detected",
        }
    }

    pub fn summary(self) -> &'static str {
        match self {
            RiskBranch::High => "The analysis indicates a significant probability of cardiovascular issues. Please consider the feedback below.",
            RiskBranch::Low => "The analysis indicates your risk is currently low. Continue maintaining healthy habits.",
        }
    }

    pub fn recommendation(self) -> Option<&'static str> {
        match self {
            RiskBranch::High => Some("Consult a cardiologist immediately."),
            RiskBranch::Low => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Gauge
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct GaugeSegment {
    pub name: &'static str,
    pub value: f64,
    pub color: &'static str,
}

/// Semicircular risk indicator: risk share against safety share.
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeSeries {
    pub risk: GaugeSegment,
    pub safety: GaugeSegment,
    /// Centre label, e.g. "73.4%".
    pub display: String,
}

/// A probability in [0, 1] as a percentage with one decimal.
pub fn format_percentage(probability: f64) -> String {
    format!("{:.1}%", probability.clamp(0.0, 1.0) * 100.0)
}

pub fn gauge_series(result: &PredictionResult) -> GaugeSeries {
    let risk = result.probability * 100.0;
    GaugeSeries {
        risk: GaugeSegment {
            name: "Risk",
            value: risk,
            color: RiskBranch::of(result).color(),
        },
        safety: GaugeSegment {
            name: "Safety",
            value: 100.0 - risk,
            color: SAFETY_COLOR,
        },
        display: format_percentage(result.probability),
    }
}

// ═══════════════════════════════════════════════════════════
// Model insights
// ═══════════════════════════════════════════════════════════

/// One bar of the feature-importance chart.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureBar {
    pub feature: String,
    pub importance: f64,
    /// Importance to 4 decimals.
    pub tooltip: String,
    pub color: String,
}

/// Bars in the order the service supplied; no re-sorting.
pub fn feature_importance_series(info: &ModelInfo) -> Vec<FeatureBar> {
    info.feature_importances
        .iter()
        .enumerate()
        .map(|(i, f)| FeatureBar {
            feature: f.feature.clone(),
            importance: f.importance,
            tooltip: format!("{:.4}", f.importance),
            color: format!("hsl({}, 80%, {}%)", 210 + i * 5, 50 + i * 2),
        })
        .collect()
}

pub fn accuracy_display(accuracy: f64) -> String {
    format!("{:.1}%", accuracy * 100.0)
}

// ═══════════════════════════════════════════════════════════
// Chart gallery
// ═══════════════════════════════════════════════════════════

/// A static EDA chart produced by the training pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartAsset {
    pub title: &'static str,
    pub description: &'static str,
    pub filename: &'static str,
}

/// Shown where a chart image could not be loaded.
pub const MISSING_CHART_TEXT: &str = "Image not found";

pub const CHART_GALLERY: [ChartAsset; 8] = [
    ChartAsset {
        title: "Correlation Heatmap",
        description: "Relationships between various health metrics. Darker/Lighter colors indicate stronger positive/negative correlations.",
        filename: "step_14_correlation_heatmap.png",
    },
    ChartAsset {
        title: "Age Distribution",
        description: "The spread of age groups within the training dataset.",
        filename: "step_07_age_distribution.png",
    },
    ChartAsset {
        title: "Cardio Risk vs Age",
        description: "Analysis of how cardiovascular risk probability changes with age.",
        filename: "step_15_cardio_risk_vs_age.png",
    },
    ChartAsset {
        title: "Blood Pressure Analysis",
        description: "Scatter plot showing Systolic (ap_hi) vs Diastolic (ap_lo) blood pressure distributions.",
        filename: "step_19_bp_scatter_by_cardio.png",
    },
    ChartAsset {
        title: "BMI vs Risk",
        description: "Boxplot comparison of Body Mass Index (BMI) for patients with and without cardiovascular disease.",
        filename: "step_17_bmi_vs_cardio_boxplot.png",
    },
    ChartAsset {
        title: "Risk Distribution",
        description: "Overall balance of cardiovascular disease cases in the dataset.",
        filename: "step_10_cardio_distribution_raw.png",
    },
    ChartAsset {
        title: "Lifestyle Factors Risk",
        description: "Combined risk heatmap for Smoking and Alcohol consumption.",
        filename: "step_20_smoke_alco_combined_risk_heatmap.png",
    },
    ChartAsset {
        title: "Systolic BP & Risk",
        description: "Boxplots showing the impact of Systolic BP on cardiovascular health.",
        filename: "step_18_bp_vs_cardio_boxplots.png",
    },
];

pub fn chart_url(base_url: &str, filename: &str) -> String {
    format!("{}/charts/{}", base_url.trim_end_matches('/'), filename)
}
