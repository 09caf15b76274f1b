//! TAVS Signals - terminal signal coordination for agent sessions
//!
//! Turns the lifecycle events of a coding-agent session into a small set of
//! visual signals (processing, complete, idle, reset) and hands each one to a
//! [`SignalSink`]. It never builds escape sequences itself; rendering is the
//! sink's job.
//!
//! # Example
//!
//! ```no_run
//! use tavs_signals::{CoordinatorConfig, RecordingSink, spawn_coordinator};
//!
//! #[tokio::main]
//! async fn main() {
//!     let sink = RecordingSink::new();
//!     let handle = spawn_coordinator(CoordinatorConfig::default(), sink.clone());
//!
//!     handle.on_session_start();
//!     handle.on_user_prompt();
//!     handle.on_tool_call();
//!     handle.on_agent_response(true);
//!
//!     // Idle follows 30 seconds later unless another prompt arrives
//!     let snapshot = handle.snapshot().await.unwrap();
//!     assert!(snapshot.idle_pending);
//!
//!     handle.on_session_end();
//!     handle.shutdown().await.unwrap();
//!     println!("{:?}", sink.sent());
//! }
//! ```

mod coordinator;
mod error;
mod manager;
mod sink;
mod state;

pub use coordinator::{
    CoordinatorConfig, CoordinatorSnapshot, DEFAULT_IDLE_TIMEOUT, SignalCoordinator,
};
pub use error::{CoordinatorError, SinkError};
pub use manager::{CoordinatorHandle, spawn_coordinator};
pub use sink::{NullSink, RecordingSink, SignalSink};
pub use state::{LifecycleEvent, SignalState, UnknownSignal};
