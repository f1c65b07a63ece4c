use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// One observation emitted by a running operation.
///
/// `percent` is `None` for events that are not a fraction of the total
/// work, such as a per-file error.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    pub percent: Option<f64>,
    pub message: String,
}

/// Optional progress hook handed to long-running operations.
///
/// A sink either forwards to a channel or drops everything. Sub-sinks made
/// with [`ProgressSink::band`] rescale their `0..=100` range into a slice
/// of the parent's, so a two-phase operation can report 0-50 and 50-100.
#[derive(Debug, Clone)]
pub struct ProgressSink {
    tx: Option<UnboundedSender<ProgressEvent>>,
    offset: f64,
    span: f64,
}

impl Default for ProgressSink {
    fn default() -> Self {
        Self::none()
    }
}

impl ProgressSink {
    #[must_use]
    pub fn none() -> Self {
        Self {
            tx: None,
            offset: 0.0,
            span: 100.0,
        }
    }

    #[must_use]
    pub fn channel() -> (Self, UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = Self {
            tx: Some(tx),
            ..Self::none()
        };
        (sink, rx)
    }

    /// A sink reporting into `[start, start + span]` of this sink's range.
    #[must_use]
    pub fn band(&self, start: f64, span: f64) -> Self {
        Self {
            tx: self.tx.clone(),
            offset: self.offset + self.span * start / 100.0,
            span: self.span * span / 100.0,
        }
    }

    pub fn report(&self, percent: Option<f64>, message: impl Into<String>) {
        let Some(tx) = &self.tx else {
            return;
        };
        let event = ProgressEvent {
            percent: percent.map(|p| self.offset + self.span * p.clamp(0.0, 100.0) / 100.0),
            message: message.into(),
        };
        if tx.send(event).is_err() {
            tracing::trace!("Progress receiver dropped");
        }
    }

    /// Reports `done` out of `total` items.
    #[allow(clippy::cast_precision_loss)]
    pub fn step(&self, done: usize, total: usize, message: impl Into<String>) {
        let percent = if total == 0 {
            100.0
        } else {
            done as f64 / total as f64 * 100.0
        };
        self.report(Some(percent), message);
    }

    /// Reports a message that carries no completion fraction.
    pub fn note(&self, message: impl Into<String>) {
        self.report(None, message);
    }
}
