use datasetkit_core::CoreError;
use datasetkit_models::{AppState, TransitionError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("Another operation is running ({0})")]
    Busy(AppState),

    #[error("No duplicate scan to act on; run a scan first")]
    NoScan,

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ControllerError {
    /// True when the operation found nothing to work on.
    #[must_use]
    pub fn is_empty_input(&self) -> bool {
        matches!(self, Self::Core(e) if e.is_empty_input())
    }
}
