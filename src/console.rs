//! Line-oriented terminal front end.
//!
//! Reads one command per line, applies it to `CoreState` and re-renders the
//! active view. Input is any tokio `AsyncBufRead` so tests can script it.

use std::io::Write;
use std::str::FromStr;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::charts::{ChartAsset, CHART_GALLERY, MISSING_CHART_TEXT};
use crate::core_state::{CoreError, CoreState, SUBMIT_FAILED_TEXT};
use crate::navigation::{UnknownTab, ViewState};
use crate::questionnaire::{Field, FieldError};
use crate::render::render_view;
use crate::service::ChartImage;
use crate::submission::SubmissionOutcome;

pub const HELP_TEXT: &str = "\
Commands:
  tab <intro|predict|analysis|charts|developer>   switch view
  set <field> <value>                              edit a questionnaire field
  show                                             render the current view
  submit                                           send the questionnaire
  chart <1-8>                                      fetch a gallery chart
  reload                                           fetch model insights again
  help                                             this text
  quit                                             exit";

#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error("Console I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Tab(ViewState),
    Set(Field, String),
    Show,
    Submit,
    /// One-based gallery position.
    Chart(usize),
    Reload,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    #[error("Unknown command: {0} (try `help`)")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error(transparent)]
    Tab(#[from] UnknownTab),

    #[error(transparent)]
    Field(#[from] FieldError),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.trim().splitn(2, char::is_whitespace);
        let verb = parts.next().unwrap_or_default().to_ascii_lowercase();
        let rest = parts.next().map(str::trim).unwrap_or_default();

        match verb.as_str() {
            "tab" | "view" if !rest.is_empty() => Ok(Command::Tab(rest.parse()?)),
            "tab" | "view" => Err(CommandError::Usage("tab <name>")),
            "set" => {
                let (field, value) = rest
                    .split_once(char::is_whitespace)
                    .ok_or(CommandError::Usage("set <field> <value>"))?;
                Ok(Command::Set(field.parse()?, value.trim().to_string()))
            }
            "chart" => rest
                .parse::<usize>()
                .ok()
                .filter(|n| (1..=CHART_GALLERY.len()).contains(n))
                .map(Command::Chart)
                .ok_or(CommandError::Usage("chart <1-8>")),
            "show" => Ok(Command::Show),
            "submit" | "predict" => Ok(Command::Submit),
            "reload" => Ok(Command::Reload),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// Drive `state` from `input` until `quit` or end of input.
pub async fn run_console<R, W>(
    state: &mut CoreState,
    input: R,
    out: &mut W,
) -> Result<(), ConsoleError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(out, "{}", render_view(state))?;
    writeln!(out, "Type `help` for commands.")?;
    out.flush()?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                writeln!(out, "{e}")?;
                out.flush()?;
                continue;
            }
        };
        tracing::debug!(?command, "Console command");

        match command {
            Command::Quit => break,
            Command::Help => {
                writeln!(out, "{HELP_TEXT}")?;
                out.flush()?;
                continue;
            }
            Command::Tab(tab) => state.select_tab(tab),
            Command::Set(field, value) => {
                if let Err(e) = state.edit_field(field, &value) {
                    writeln!(out, "{e}")?;
                }
            }
            Command::Show => {}
            Command::Submit => submit(state, out).await?,
            Command::Chart(n) => fetch_chart(state, n, out).await?,
            Command::Reload => state.reload_insights(),
        }

        writeln!(out, "{}", render_view(state))?;
        out.flush()?;
    }

    tracing::info!("Console closed");
    Ok(())
}

// ── Internal ────────────────────────────────────────────────

async fn submit<W: Write>(state: &mut CoreState, out: &mut W) -> Result<(), ConsoleError> {
    match state.submit().await {
        Ok(SubmissionOutcome::Completed(_)) => {}
        Ok(SubmissionOutcome::Failed(_)) => writeln!(out, "{SUBMIT_FAILED_TEXT}")?,
        Ok(SubmissionOutcome::Refused) => writeln!(out, "A prediction is already in progress.")?,
        Err(errors) => {
            writeln!(out, "Please fix {} field(s) before submitting:", errors.len())?;
            for (field, message) in errors.iter() {
                writeln!(out, "  {field}: {message}")?;
            }
        }
    }
    Ok(())
}

async fn fetch_chart<W: Write>(
    state: &CoreState,
    n: usize,
    out: &mut W,
) -> Result<(), ConsoleError> {
    match state.chart_image(n - 1).await {
        Ok((ChartAsset { title, .. }, ChartImage::Available { content_type, bytes })) => {
            writeln!(
                out,
                "{title}: {} bytes ({})",
                bytes.len(),
                content_type.as_deref().unwrap_or("unknown type")
            )?;
        }
        Ok((ChartAsset { title, .. }, ChartImage::Missing)) => {
            writeln!(out, "{title}: {MISSING_CHART_TEXT}")?;
        }
        Err(CoreError::UnknownChart(_)) => writeln!(out, "Usage: chart <1-8>")?,
        Err(CoreError::Service(e)) => {
            tracing::warn!(error = %e, "Chart fetch failed");
            writeln!(out, "{MISSING_CHART_TEXT}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PredictionResult, RiskClass};
    use crate::service::MockPredictionClient;
    use std::sync::Arc;

    fn high_risk() -> PredictionResult {
        PredictionResult {
            risk: RiskClass::High,
            probability: 0.734,
            message: "High Risk".into(),
            analysis: None,
        }
    }

    async fn run_script(mock: Arc<MockPredictionClient>, script: &str) -> (CoreState, String) {
        let mut state = CoreState::new(mock);
        let mut out = Vec::new();
        run_console(&mut state, script.as_bytes(), &mut out).await.unwrap();
        (state, String::from_utf8(out).unwrap())
    }

    #[test]
    fn parses_commands() {
        assert_eq!(
            "tab Predict".parse::<Command>().unwrap(),
            Command::Tab(ViewState::Predict)
        );
        assert_eq!(
            "set cholesterol Well Above Normal".parse::<Command>().unwrap(),
            Command::Set(Field::Cholesterol, "Well Above Normal".into())
        );
        assert_eq!("chart 8".parse::<Command>().unwrap(), Command::Chart(8));
        assert_eq!("  QUIT ".parse::<Command>().unwrap(), Command::Quit);
    }

    #[test]
    fn rejects_bad_commands() {
        assert_eq!(
            "dance".parse::<Command>(),
            Err(CommandError::Unknown("dance".into()))
        );
        assert!(matches!("tab settings".parse::<Command>(), Err(CommandError::Tab(_))));
        assert!(matches!("set bogus 1".parse::<Command>(), Err(CommandError::Field(_))));
        assert_eq!("set age".parse::<Command>(), Err(CommandError::Usage("set <field> <value>")));
        assert_eq!("chart 0".parse::<Command>(), Err(CommandError::Usage("chart <1-8>")));
        assert_eq!("chart 9".parse::<Command>(), Err(CommandError::Usage("chart <1-8>")));
    }

    #[tokio::test]
    async fn scripted_session_reaches_analysis() {
        let mock = Arc::new(MockPredictionClient::new(high_risk()));
        let script = "tab predict\nset age 50\nset ap_hi 150\nsubmit\nquit\nsubmit\n";
        let (state, out) = run_script(mock.clone(), script).await;

        assert_eq!(state.active_view(), ViewState::Analysis);
        assert!(out.contains("73.4%"));
        assert!(out.contains("High Risk Detected"));
        // Nothing after `quit` runs.
        assert_eq!(mock.predict_calls(), 1);
        let payload = mock.last_payload().unwrap();
        assert_eq!(payload.age, 50);
    }

    #[tokio::test]
    async fn invalid_field_blocks_submission() {
        let mock = Arc::new(MockPredictionClient::new(high_risk()));
        let script = "tab charts\nset age abc\nsubmit\n";
        let (state, out) = run_script(mock.clone(), script).await;

        assert_eq!(mock.predict_calls(), 0);
        assert_eq!(state.active_view(), ViewState::Charts);
        assert!(out.contains("Please fix 1 field(s) before submitting:"));
        assert!(out.contains("  age: Age must be a number"));
    }

    #[tokio::test]
    async fn unknown_commands_do_not_stop_the_loop() {
        let mock = Arc::new(MockPredictionClient::new(high_risk()));
        let (state, out) = run_script(mock, "dance\ntab charts\n").await;

        assert!(out.contains("Unknown command: dance"));
        assert_eq!(state.active_view(), ViewState::Charts);
    }

    #[tokio::test]
    async fn chart_command_reports_missing_images() {
        let mock = Arc::new(
            MockPredictionClient::new(high_risk())
                .with_charts(vec![CHART_GALLERY[0].filename.to_string()]),
        );
        let (_, out) = run_script(mock, "chart 1\nchart 2\n").await;

        assert!(out.contains("Correlation Heatmap: 4 bytes (image/png)"));
        assert!(out.contains("Age Distribution: Image not found"));
    }
}
