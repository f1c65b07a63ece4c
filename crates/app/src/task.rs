use datasetkit_core::CoreError;
use datasetkit_utils::ProgressEvent;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

use crate::ControllerError;

/// A running operation: its progress stream and its eventual result.
///
/// The controller's state has already moved back to a resting state by
/// the time [`Task::finish`] returns.
#[derive(Debug)]
pub struct Task<T> {
    events: UnboundedReceiver<ProgressEvent>,
    handle: JoinHandle<Result<T, CoreError>>,
}

impl<T> Task<T> {
    pub(crate) fn new(events: UnboundedReceiver<ProgressEvent>, handle: JoinHandle<Result<T, CoreError>>) -> Self {
        Self { events, handle }
    }

    /// Next progress event, or `None` once the operation is done and every
    /// event has been received.
    pub async fn next_event(&mut self) -> Option<ProgressEvent> {
        self.events.recv().await
    }

    /// Waits for the result, dropping any unread progress events.
    ///
    /// # Errors
    ///
    /// Returns the operation's error, or [`CoreError::Task`] if it panicked.
    pub async fn finish(self) -> Result<T, ControllerError> {
        let result = self.handle.await.map_err(CoreError::from)?;
        Ok(result?)
    }
}
