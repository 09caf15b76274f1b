//! Signal sinks
//!
//! A sink performs the out-of-band visual update. Implementations must return
//! promptly: anything slow (spawning a process, writing to a tty) has to be
//! handed off rather than awaited inside `send`.

use std::sync::{Arc, Mutex};

use crate::error::SinkError;
use crate::state::SignalState;

/// Best-effort, non-blocking receiver of visual signals
pub trait SignalSink: Send + Sync {
    /// Issue the visual update for `state` without waiting for it to finish
    fn send(&self, state: SignalState) -> Result<(), SinkError>;

    /// Whether the sink can currently deliver anything at all
    fn is_available(&self) -> bool {
        true
    }
}

impl<S: SignalSink + ?Sized> SignalSink for Arc<S> {
    fn send(&self, state: SignalState) -> Result<(), SinkError> {
        (**self).send(state)
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }
}

impl<S: SignalSink + ?Sized> SignalSink for Box<S> {
    fn send(&self, state: SignalState) -> Result<(), SinkError> {
        (**self).send(state)
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }
}

/// Sink used when nothing can render signals
#[derive(Clone, Debug, Default)]
pub struct NullSink;

impl SignalSink for NullSink {
    fn send(&self, _state: SignalState) -> Result<(), SinkError> {
        Err(SinkError::Unavailable("no signal sink configured".into()))
    }

    fn is_available(&self) -> bool {
        false
    }
}

/// Sink that remembers every signal it was asked to send.
///
/// Clones share the same history, so a test can keep one clone and hand the
/// other to a coordinator.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    sent: Arc<Mutex<Vec<SignalState>>>,
    fail: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A recording sink whose every dispatch reports `InvocationFailed`
    pub fn failing() -> Self {
        Self {
            sent: Arc::default(),
            fail: true,
        }
    }

    /// Signals received so far, in order
    pub fn sent(&self) -> Vec<SignalState> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn clear(&self) {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

impl SignalSink for RecordingSink {
    fn send(&self, state: SignalState) -> Result<(), SinkError> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(state);
        if self.fail {
            return Err(SinkError::InvocationFailed(format!(
                "refusing to send {}",
                state
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_sink_is_unavailable() {
        let sink = NullSink;
        assert!(!sink.is_available());
        assert!(matches!(
            sink.send(SignalState::Reset),
            Err(SinkError::Unavailable(_))
        ));
    }

    #[test]
    fn test_recording_sink_clones_share_history() {
        let sink = RecordingSink::new();
        let other = sink.clone();
        other.send(SignalState::Processing).unwrap();
        other.send(SignalState::Complete).unwrap();
        assert_eq!(
            sink.sent(),
            vec![SignalState::Processing, SignalState::Complete]
        );

        sink.clear();
        assert!(other.sent().is_empty());
    }

    #[test]
    fn test_failing_sink_still_records_attempts() {
        let sink = RecordingSink::failing();
        assert!(matches!(
            sink.send(SignalState::Idle),
            Err(SinkError::InvocationFailed(_))
        ));
        assert_eq!(sink.sent(), vec![SignalState::Idle]);
    }

    #[test]
    fn test_boxed_dyn_sink_forwards() {
        let recorder = RecordingSink::new();
        let boxed: Box<dyn SignalSink> = Box::new(recorder.clone());
        boxed.send(SignalState::Reset).unwrap();
        assert!(boxed.is_available());
        assert_eq!(recorder.sent(), vec![SignalState::Reset]);
    }
}
