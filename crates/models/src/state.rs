use std::fmt;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JobKind {
    CreateLabels,
    Merge,
    StripHashes,
    Classify,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateLabels => write!(f, "creating labels"),
            Self::Merge => write!(f, "merging"),
            Self::StripHashes => write!(f, "stripping hashes"),
            Self::Classify => write!(f, "classifying"),
        }
    }
}

/// Lifecycle of a tool instance.
///
/// `Idle -> Scanning -> (Idle | GroupsFound) -> Deleting -> Idle`, plus the
/// one-shot jobs which go `Idle -> Working -> Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum AppState {
    #[default]
    Idle,
    Scanning,
    GroupsFound,
    Deleting,
    Working(JobKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    ScanStarted,
    ScanFinished { groups_found: bool },
    ScanFailed,
    DeleteStarted,
    DeleteFinished,
    JobStarted(JobKind),
    JobFinished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot apply {event:?} while in state {from:?}")]
pub struct TransitionError {
    pub from: AppState,
    pub event: AppEvent,
}

impl AppState {
    /// Returns the state reached by applying `event`, or an error if the
    /// event is not valid from this state.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] for any transition outside the lifecycle.
    pub fn apply(self, event: AppEvent) -> Result<Self, TransitionError> {
        use AppEvent as E;
        use AppState as S;

        match (self, event) {
            (S::Idle | S::GroupsFound, E::ScanStarted) => Ok(S::Scanning),
            (S::Scanning, E::ScanFinished { groups_found: true }) => Ok(S::GroupsFound),
            (S::Scanning, E::ScanFinished { groups_found: false } | E::ScanFailed) => Ok(S::Idle),
            (S::GroupsFound, E::DeleteStarted) => Ok(S::Deleting),
            (S::Deleting, E::DeleteFinished) => Ok(S::Idle),
            (S::Idle | S::GroupsFound, E::JobStarted(kind)) => Ok(S::Working(kind)),
            (S::Working(_), E::JobFinished) => Ok(S::Idle),
            (from, event) => Err(TransitionError { from, event }),
        }
    }

    /// True while a background task owns the tool.
    #[must_use]
    pub fn is_busy(self) -> bool {
        matches!(self, Self::Scanning | Self::Deleting | Self::Working(_))
    }
}

impl fmt::Display for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Scanning => write!(f, "scanning"),
            Self::GroupsFound => write!(f, "duplicates found"),
            Self::Deleting => write!(f, "deleting"),
            Self::Working(kind) => write!(f, "{kind}"),
        }
    }
}

/// Answer from the presentation layer before an irreversible operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Granted,
    Declined,
}

impl From<bool> for Confirmation {
    fn from(value: bool) -> Self {
        if value { Self::Granted } else { Self::Declined }
    }
}
