//! View navigation: which tab is showing.
//!
//! `transition` is a pure function of (state, event). `Navigator` owns the
//! active view and `apply` is the only way to change it.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewState {
    #[default]
    Intro,
    Predict,
    Analysis,
    Charts,
    Developer,
}

impl ViewState {
    /// Tab order.
    pub const ALL: [ViewState; 5] = [
        ViewState::Intro,
        ViewState::Predict,
        ViewState::Analysis,
        ViewState::Charts,
        ViewState::Developer,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ViewState::Intro => "Intro",
            ViewState::Predict => "Predict",
            ViewState::Analysis => "Analysis",
            ViewState::Charts => "Charts",
            ViewState::Developer => "Developer",
        }
    }
}

impl std::fmt::Display for ViewState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown tab: {0}")]
pub struct UnknownTab(pub String);

impl FromStr for ViewState {
    type Err = UnknownTab;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        ViewState::ALL
            .into_iter()
            .find(|v| v.title().eq_ignore_ascii_case(name))
            .ok_or_else(|| UnknownTab(name.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavEvent {
    /// The user picked a tab. Always allowed.
    SelectTab(ViewState),
    /// A submission produced a prediction. Overrides the current tab.
    SubmissionSucceeded,
}

pub fn transition(_state: ViewState, event: NavEvent) -> ViewState {
    match event {
        NavEvent::SelectTab(tab) => tab,
        NavEvent::SubmissionSucceeded => ViewState::Analysis,
    }
}

/// Holder of the active view. Starts on Intro, keeps no history.
#[derive(Debug, Default)]
pub struct Navigator {
    active: ViewState,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> ViewState {
        self.active
    }

    pub fn apply(&mut self, event: NavEvent) -> ViewState {
        let next = transition(self.active, event);
        if next != self.active {
            tracing::debug!(from = %self.active, to = %next, ?event, "View changed");
        }
        self.active = next;
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_intro() {
        assert_eq!(Navigator::new().active(), ViewState::Intro);
    }

    #[test]
    fn any_tab_can_be_selected_from_any_tab() {
        for from in ViewState::ALL {
            for to in ViewState::ALL {
                assert_eq!(transition(from, NavEvent::SelectTab(to)), to);
            }
        }
    }

    #[test]
    fn success_always_lands_on_analysis() {
        for from in ViewState::ALL {
            assert_eq!(
                transition(from, NavEvent::SubmissionSucceeded),
                ViewState::Analysis
            );
        }
    }

    #[test]
    fn navigator_applies_events_in_order() {
        let mut nav = Navigator::new();
        nav.apply(NavEvent::SelectTab(ViewState::Predict));
        assert_eq!(nav.active(), ViewState::Predict);
        nav.apply(NavEvent::SubmissionSucceeded);
        assert_eq!(nav.active(), ViewState::Analysis);
        nav.apply(NavEvent::SelectTab(ViewState::Charts));
        assert_eq!(nav.active(), ViewState::Charts);
    }

    #[test]
    fn tabs_parse_case_insensitively() {
        assert_eq!("predict".parse::<ViewState>().unwrap(), ViewState::Predict);
        assert_eq!(" CHARTS ".parse::<ViewState>().unwrap(), ViewState::Charts);
        assert_eq!(
            "settings".parse::<ViewState>(),
            Err(UnknownTab("settings".into()))
        );
    }
}
