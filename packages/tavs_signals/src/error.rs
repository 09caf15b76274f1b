/// Errors reported by a signal sink.
///
/// The coordinator never propagates these; they only reach the diagnostic log.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SinkError {
    /// No sink is reachable or configured
    #[error("signal sink unavailable: {0}")]
    Unavailable(String),

    /// A single dispatch attempt failed at the boundary
    #[error("signal dispatch failed: {0}")]
    InvocationFailed(String),
}

/// Errors from talking to a spawned coordinator task
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CoordinatorError {
    /// The coordinator task has stopped
    #[error("coordinator task is no longer running")]
    Closed,

    /// The coordinator task panicked or was aborted
    #[error("coordinator task failed: {0}")]
    TaskFailed(String),
}
