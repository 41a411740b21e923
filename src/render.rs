//! Plain-text rendering of each view.
//!
//! Everything here reads from `CoreState` and the pure adapters in
//! `analysis` and `charts`; nothing mutates state.

use std::fmt::{self, Write};

use crate::analysis::{bmi_display, derive_analysis, AnalysisView, REASSURANCE_TEXT};
use crate::charts::{
    accuracy_display, chart_url, feature_importance_series, gauge_series, RiskBranch,
    CHART_GALLERY,
};
use crate::config::APP_NAME;
use crate::core_state::CoreState;
use crate::insights::{InsightsState, UNAVAILABLE_TEXT};
use crate::models::{Analysis, ModelInfo, PredictionResult};
use crate::navigation::ViewState;
use crate::questionnaire::Field;

pub const INTRO_HEADLINE: &str = "Cardiovascular Disease Prediction System";

/// Shown on the Analysis view before any prediction exists.
pub const NO_RESULT_TEXT: &str = "Run a prediction in the \"Predict\" tab to see results here.";

const TECH_STACK: [(&str, &[&str]); 3] = [
    ("Frontend", &["Rust", "tokio", "Terminal console"]),
    ("Backend", &["FastAPI", "Python", "Joblib", "Uvicorn"]),
    ("Machine Learning", &["Scikit-learn", "Pandas", "Random Forest"]),
];

const DEVELOPER_SKILLS: [&str; 6] = [
    "Next.js",
    "Python",
    "FastAPI",
    "Machine Learning",
    "Tailwind",
    "PostgreSQL",
];

/// Render the active view, preceded by the tab bar.
pub fn render_view(state: &CoreState) -> String {
    ActiveView(state).to_string()
}

struct ActiveView<'a>(&'a CoreState);

impl fmt::Display for ActiveView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.0;
        write_tabs(f, state.active_view())?;
        match state.active_view() {
            ViewState::Intro => write_intro(f),
            ViewState::Predict => write_predict(f, state),
            ViewState::Analysis => write_analysis(f, state),
            ViewState::Charts => write_charts(f, state.base_url()),
            ViewState::Developer => write_developer(f),
        }
    }
}

fn write_tabs(f: &mut impl Write, active: ViewState) -> fmt::Result {
    write!(f, "{APP_NAME} |")?;
    for tab in ViewState::ALL {
        if tab == active {
            write!(f, " [{tab}]")?;
        } else {
            write!(f, "  {tab} ")?;
        }
    }
    writeln!(f)?;
    writeln!(f)
}

// ═══════════════════════════════════════════════════════════
// Intro
// ═══════════════════════════════════════════════════════════

fn write_intro(f: &mut impl Write) -> fmt::Result {
    writeln!(f, "{INTRO_HEADLINE}")?;
    writeln!(
        f,
        "Enter patient details and get a machine-learning estimate of cardiovascular risk."
    )?;
    writeln!(f)?;
    writeln!(f, "Technology Stack")?;
    for (group, items) in TECH_STACK {
        writeln!(f, "  {group}")?;
        for item in items {
            writeln!(f, "    • {item}")?;
        }
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════
// Predict
// ═══════════════════════════════════════════════════════════

fn write_predict(f: &mut impl Write, state: &CoreState) -> fmt::Result {
    writeln!(f, "Patient Diagnostics Form")?;
    writeln!(f, "Enter patient details for real-time risk assessment.")?;
    writeln!(f)?;

    let form = state.form();
    let errors = state.field_errors();
    for field in Field::ALL {
        writeln!(
            f,
            "  {:<12} {:<22} {}",
            field.key(),
            field.label(),
            form.display_value(field)
        )?;
        if let Some(message) = errors.get(field) {
            writeln!(f, "  {:<12} ! {message}", "")?;
        }
    }
    writeln!(f)?;

    let action = if state.is_loading() {
        "Analyzing..."
    } else {
        "Predict Risk"
    };
    writeln!(f, "[{action}]")?;
    if let Some(error) = state.last_error() {
        writeln!(f, "{error}")?;
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════
// Analysis
// ═══════════════════════════════════════════════════════════

fn write_analysis(f: &mut impl Write, state: &CoreState) -> fmt::Result {
    match state.result() {
        Some(result) => write_dashboard(f, result)?,
        None => writeln!(f, "{NO_RESULT_TEXT}")?,
    }
    writeln!(f)?;

    match state.insights() {
        InsightsState::Loading => writeln!(f, "Model Insights: loading...")?,
        InsightsState::Unavailable => writeln!(f, "{UNAVAILABLE_TEXT}")?,
        InsightsState::Ready(info) => write_insights(f, &info)?,
    }

    if let Some(analysis) = state.result().and_then(|r| r.analysis.as_ref()) {
        writeln!(f)?;
        write_detailed_analysis(f, analysis)?;
    }
    Ok(())
}

fn write_dashboard(f: &mut impl Write, result: &PredictionResult) -> fmt::Result {
    let branch = RiskBranch::of(result);
    let gauge = gauge_series(result);

    writeln!(f, "Risk Assessment")?;
    writeln!(f, "  {}", gauge_bar(gauge.risk.value))?;
    writeln!(f, "  {} probability ({})", gauge.display, gauge.risk.color)?;
    writeln!(f)?;
    writeln!(f, "{}", branch.headline())?;
    writeln!(f, "{}", branch.summary())?;
    if let Some(recommendation) = branch.recommendation() {
        writeln!(f, "Recommendation: {recommendation}")?;
    }
    Ok(())
}

/// 20-cell bar for the risk share, e.g. `[##########..........]`.
fn gauge_bar(risk_percent: f64) -> String {
    const CELLS: usize = 20;
    let filled = ((risk_percent.clamp(0.0, 100.0) / 100.0) * CELLS as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(CELLS - filled))
}

fn write_insights(f: &mut impl Write, info: &ModelInfo) -> fmt::Result {
    writeln!(f, "Model Insights")?;
    writeln!(f, "  Model: {}", info.model_type)?;
    writeln!(f, "  Accuracy: {}", accuracy_display(info.accuracy))?;
    writeln!(f, "  Feature importance:")?;
    for bar in feature_importance_series(info) {
        writeln!(f, "    {:<20} {}", bar.feature, bar.tooltip)?;
    }
    Ok(())
}

fn write_detailed_analysis(f: &mut impl Write, analysis: &Analysis) -> fmt::Result {
    let view = derive_analysis(analysis);
    writeln!(f, "Detailed Analysis")?;
    writeln!(f, "  BMI: {}", bmi_display(view.bmi()))?;
    match view {
        AnalysisView::Reassurance { .. } => {
            writeln!(f, "  {REASSURANCE_TEXT}")?;
        }
        AnalysisView::Factors { factors, .. } => {
            for c in factors {
                writeln!(
                    f,
                    "  [{}] {}: {} ({}) [{}]",
                    c.factor.severity.as_str(),
                    c.factor.factor,
                    c.factor.value,
                    c.factor.status,
                    c.tier.accent
                )?;
            }
        }
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════
// Charts & Developer
// ═══════════════════════════════════════════════════════════

fn write_charts(f: &mut impl Write, base_url: &str) -> fmt::Result {
    writeln!(f, "Data Analysis Visualizations")?;
    writeln!(
        f,
        "Exploratory Data Analysis (EDA) charts generated directly from the machine learning training pipeline."
    )?;
    writeln!(f)?;
    for (i, chart) in CHART_GALLERY.iter().enumerate() {
        writeln!(f, "  {}. {}", i + 1, chart.title)?;
        writeln!(f, "     {}", chart.description)?;
        writeln!(f, "     {}", chart_url(base_url, chart.filename))?;
    }
    writeln!(f)?;
    writeln!(f, "Use `chart <n>` to fetch one.")
}

fn write_developer(f: &mut impl Write) -> fmt::Result {
    writeln!(f, "Ayush Parmar")?;
    writeln!(f, "Full-Stack & ML Developer")?;
    writeln!(f)?;
    writeln!(f, "About Me")?;
    writeln!(
        f,
        "  This project showcases my ability to bridge the gap between AI models and user-centric interfaces."
    )?;
    writeln!(f)?;
    writeln!(f, "Core Expertise: {}", DEVELOPER_SKILLS.join(", "))?;
    writeln!(f, "GitHub:   https://github.com/AyushParmar9106/cardio_disease")?;
    writeln!(f, "LinkedIn: https://www.linkedin.com/in/ayush-parmar-1791972b5")
}
