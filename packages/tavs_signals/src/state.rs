//! Signal and Lifecycle Types
//!
//! `SignalState` is what leaves the coordinator; `LifecycleEvent` is what
//! comes in from the host adapter.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A visual state communicated to the terminal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalState {
    /// Agent is working on a task
    Processing,

    /// Agent finished responding
    Complete,

    /// Agent has been waiting for input past the idle timeout
    Idle,

    /// Clear any visual state
    Reset,
}

impl SignalState {
    pub const ALL: [SignalState; 4] = [
        SignalState::Processing,
        SignalState::Complete,
        SignalState::Idle,
        SignalState::Reset,
    ];

    /// Name understood by the trigger script
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalState::Processing => "processing",
            SignalState::Complete => "complete",
            SignalState::Idle => "idle",
            SignalState::Reset => "reset",
        }
    }

    /// Returns true if a repeat of this state should be suppressed.
    ///
    /// Processing is never debounced: a dropped processing signal would
    /// otherwise leave the terminal stuck on the previous color.
    pub fn is_debounced(&self) -> bool {
        !matches!(self, SignalState::Processing)
    }
}

impl fmt::Display for SignalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown signal name
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown signal state: {0}")]
pub struct UnknownSignal(pub String);

impl FromStr for SignalState {
    type Err = UnknownSignal;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SignalState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| UnknownSignal(s.to_string()))
    }
}

/// Lifecycle events delivered by the host adapter.
///
/// Payloads are opaque to the coordinator; only the event kind and the
/// completion flag of agent responses drive transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleEvent {
    SessionStart,
    SessionEnd,
    UserPrompt,
    ToolCall,
    ToolResult,
    AgentResponse { done: bool },
}
