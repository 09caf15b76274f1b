//! Signal Coordinator
//!
//! Maps lifecycle events to visual signals. Owns three pieces of state:
//! whether the agent is processing, the last signal dispatched (for
//! debouncing), and the deadline of the single pending idle transition.
//!
//! ## Transitions
//!
//! ```text
//! Reset      --user prompt--------> Processing
//! Processing --tool call/result---> Processing (absorbed)
//! Processing --response (done)----> Complete   (arms idle timer)
//! Complete   --idle timer---------> Idle
//! any        --session start/end--> Reset
//! ```
//!
//! The coordinator is synchronous. Something else has to call
//! [`SignalCoordinator::fire_idle_timer`] once [`SignalCoordinator::idle_deadline`]
//! passes; `spawn_coordinator` does that on the tokio runtime.

use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace, warn};

use crate::error::SinkError;
use crate::sink::SignalSink;
use crate::state::{LifecycleEvent, SignalState};

/// Default delay between Complete and Idle
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Values the coordinator consumes; loading them is the host's business
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// When false, bookkeeping continues but the sink is never called
    pub enabled: bool,
    /// Delay before Complete graduates to Idle. Zero disables the transition.
    pub idle_timeout: Duration,
    /// Surface sink failures as warnings
    pub debug: bool,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            debug: false,
        }
    }
}

impl CoordinatorConfig {
    pub fn with_idle_timeout_ms(mut self, millis: u64) -> Self {
        self.idle_timeout = Duration::from_millis(millis);
        self
    }
}

/// Point-in-time view of the coordinator's state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoordinatorSnapshot {
    pub is_processing: bool,
    pub last_sent: Option<SignalState>,
    pub idle_pending: bool,
}

pub struct SignalCoordinator<S> {
    sink: S,
    config: CoordinatorConfig,
    is_processing: bool,
    last_sent: Option<SignalState>,
    /// Deadline of the pending idle transition, if one is armed
    idle_deadline: Option<Instant>,
}

impl<S: SignalSink> SignalCoordinator<S> {
    pub fn new(config: CoordinatorConfig, sink: S) -> Self {
        if config.debug && !sink.is_available() {
            warn!("Signal sink unavailable - visual signals disabled");
        }
        Self {
            sink,
            config,
            is_processing: false,
            last_sent: None,
            idle_deadline: None,
        }
    }

    /// Route a lifecycle event to its handler.
    ///
    /// Returns the signal that was dispatched, if any.
    pub fn handle(&mut self, event: LifecycleEvent) -> Option<SignalState> {
        match event {
            LifecycleEvent::SessionStart => self.on_session_start(),
            LifecycleEvent::SessionEnd => self.on_session_end(),
            LifecycleEvent::UserPrompt => self.on_user_prompt(),
            LifecycleEvent::ToolCall => self.on_tool_call(),
            LifecycleEvent::ToolResult => self.on_tool_result(),
            LifecycleEvent::AgentResponse { done } => self.on_agent_response(done),
        }
    }

    /// Session started: clear whatever the previous session left behind
    pub fn on_session_start(&mut self) -> Option<SignalState> {
        self.cancel_idle_timer();
        self.is_processing = false;
        self.emit(SignalState::Reset, true)
    }

    /// Session ended, possibly abnormally: leave the terminal neutral
    pub fn on_session_end(&mut self) -> Option<SignalState> {
        self.cancel_idle_timer();
        self.is_processing = false;
        self.emit(SignalState::Reset, true)
    }

    /// A new user turn always signals processing
    pub fn on_user_prompt(&mut self) -> Option<SignalState> {
        self.cancel_idle_timer();
        self.is_processing = true;
        self.emit(SignalState::Processing, false)
    }

    pub fn on_tool_call(&mut self) -> Option<SignalState> {
        self.resume_processing()
    }

    /// More tools may follow, so a result never ends processing
    pub fn on_tool_result(&mut self) -> Option<SignalState> {
        self.resume_processing()
    }

    /// Only the final chunk of a response changes anything
    pub fn on_agent_response(&mut self, done: bool) -> Option<SignalState> {
        if !done {
            return None;
        }
        self.is_processing = false;
        let sent = self.emit(SignalState::Complete, false);
        self.start_idle_timer();
        sent
    }

    /// The deferred idle action. A no-op unless a timer is armed.
    pub fn fire_idle_timer(&mut self) -> Option<SignalState> {
        self.idle_deadline.take()?;
        self.emit(SignalState::Idle, false)
    }

    /// Disarm the idle timer. Safe to call when nothing is armed.
    pub fn cancel_idle_timer(&mut self) {
        if self.idle_deadline.take().is_some() {
            trace!("Idle timer cancelled");
        }
    }

    pub fn is_processing(&self) -> bool {
        self.is_processing
    }

    pub fn last_sent(&self) -> Option<SignalState> {
        self.last_sent
    }

    pub fn idle_pending(&self) -> bool {
        self.idle_deadline.is_some()
    }

    pub fn idle_deadline(&self) -> Option<Instant> {
        self.idle_deadline
    }

    /// True when signals can actually reach the terminal
    pub fn is_available(&self) -> bool {
        self.config.enabled && self.sink.is_available()
    }

    pub fn snapshot(&self) -> CoordinatorSnapshot {
        CoordinatorSnapshot {
            is_processing: self.is_processing,
            last_sent: self.last_sent,
            idle_pending: self.idle_pending(),
        }
    }

    fn resume_processing(&mut self) -> Option<SignalState> {
        if self.is_processing {
            return None;
        }
        self.is_processing = true;
        self.emit(SignalState::Processing, false)
    }

    /// Arm (or re-arm) the idle timer. Replacing the deadline is what keeps
    /// the number of pending timers at zero or one.
    fn start_idle_timer(&mut self) {
        if self.config.idle_timeout.is_zero() {
            return;
        }
        self.idle_deadline = Some(Instant::now() + self.config.idle_timeout);
        trace!("Idle timer armed for {:?}", self.config.idle_timeout);
    }

    fn emit(&mut self, state: SignalState, force: bool) -> Option<SignalState> {
        if state != SignalState::Idle {
            self.cancel_idle_timer();
        }

        if !force && state.is_debounced() && self.last_sent == Some(state) {
            trace!("Suppressed repeated signal: {}", state);
            return None;
        }
        self.last_sent = Some(state);

        if !self.config.enabled {
            return Some(state);
        }

        // Delivered or not, the terminal is assumed to show `state` now
        match self.sink.send(state) {
            Ok(()) => debug!("Sent signal: {}", state),
            Err(err) => self.report_sink_failure(state, &err),
        }
        Some(state)
    }

    fn report_sink_failure(&self, state: SignalState, err: &SinkError) {
        if self.config.debug {
            warn!("Error sending signal {}: {}", state, err);
        } else {
            trace!("Error sending signal {}: {}", state, err);
        }
    }
}
