//! Maps connection state and the selected tab to what the panel shows, and
//! routes failures either to the internal error panel or to the host.

use std::fmt;

use clap::ValueEnum;
use tracing::error;

use crate::connection::{ConnectionState, FailureReason};

/// Shown instead of causes that carry internal detail.
pub const GENERIC_ERROR_MESSAGE: &str = "An error has occurred";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum ActiveTab {
    #[default]
    Timeline,
    BondingCurve,
}

impl ActiveTab {
    pub const ALL: [ActiveTab; 2] = [ActiveTab::Timeline, ActiveTab::BondingCurve];

    pub fn title(self) -> &'static str {
        match self {
            ActiveTab::Timeline => "Timeline",
            ActiveTab::BondingCurve => "Bonding Curve",
        }
    }

    pub fn index(self) -> usize {
        match self {
            ActiveTab::Timeline => 0,
            ActiveTab::BondingCurve => 1,
        }
    }

    pub fn next(self) -> ActiveTab {
        match self {
            ActiveTab::Timeline => ActiveTab::BondingCurve,
            ActiveTab::BondingCurve => ActiveTab::Timeline,
        }
    }
}

impl fmt::Display for ActiveTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActiveTab::Timeline => write!(f, "timeline"),
            ActiveTab::BondingCurve => write!(f, "bonding-curve"),
        }
    }
}

/// Tab switch. Touches nothing but the tab.
pub fn select_tab(_current: ActiveTab, tab: ActiveTab) -> ActiveTab {
    tab
}

/// The two faces of a failure: what the user sees and what gets logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub display: String,
    pub detail: String,
}

impl From<&FailureReason> for ErrorReport {
    fn from(reason: &FailureReason) -> Self {
        match reason.cause() {
            Some(cause) => ErrorReport {
                display: GENERIC_ERROR_MESSAGE.to_string(),
                detail: cause.to_string(),
            },
            None => {
                let text = reason.to_string();
                ErrorReport {
                    display: text.clone(),
                    detail: text,
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorRoute {
    /// Render this message in the error panel.
    Internal(String),
    /// The host took the failure; render nothing.
    Delegated,
}

pub type ErrorHook = Box<dyn Fn(&str) + Send + Sync>;

/// Sends every failure to the log, then either to the host hook or back to
/// the caller for internal display.
pub struct ErrorRouter {
    on_error: Option<ErrorHook>,
}

impl ErrorRouter {
    pub fn internal() -> Self {
        Self { on_error: None }
    }

    pub fn delegating(hook: ErrorHook) -> Self {
        Self {
            on_error: Some(hook),
        }
    }

    pub fn is_delegating(&self) -> bool {
        self.on_error.is_some()
    }

    pub fn route(&self, reason: &FailureReason) -> ErrorRoute {
        let report = ErrorReport::from(reason);
        error!(detail = %report.detail, "{}", report.display);

        match &self.on_error {
            Some(hook) => {
                hook(&report.detail);
                ErrorRoute::Delegated
            }
            None => ErrorRoute::Internal(report.display),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pane {
    Visualization(ActiveTab),
    Error(String),
    Hidden,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewModel {
    /// Loader only: no tab strip, no content.
    Loading,
    Tabs { active: ActiveTab, pane: Pane },
}

/// Decide what to render. `routed` is the routing outcome of the failure
/// currently on screen, from the connection or from the active visualization.
pub fn select_view(
    state: &ConnectionState,
    active: ActiveTab,
    routed: Option<&ErrorRoute>,
) -> ViewModel {
    let pane = match (state, routed) {
        (ConnectionState::Loading, _) => return ViewModel::Loading,
        (_, Some(ErrorRoute::Internal(message))) => Pane::Error(message.clone()),
        (_, Some(ErrorRoute::Delegated)) => Pane::Hidden,
        (ConnectionState::Ready(_), None) => Pane::Visualization(active),
        (ConnectionState::Failed(_), None) => Pane::Hidden,
    };
    ViewModel::Tabs { active, pane }
}
