//! Coordinator task
//!
//! Runs a [`SignalCoordinator`] on the tokio runtime so the idle timer can
//! fire on its own. Events arrive over an unbounded channel, which keeps every
//! handle method synchronous and non-blocking for the host.
//!
//! The task waits on two things: the next message, and the idle deadline if
//! one is armed. The deadline is re-read from the coordinator on every loop
//! iteration, so cancelling or re-arming it needs no separate timer handle.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

use crate::coordinator::{CoordinatorConfig, CoordinatorSnapshot, SignalCoordinator};
use crate::error::CoordinatorError;
use crate::sink::SignalSink;
use crate::state::LifecycleEvent;

/// Messages accepted by the coordinator task
enum CoordinatorMessage {
    Event(LifecycleEvent),
    Snapshot {
        respond_to: oneshot::Sender<CoordinatorSnapshot>,
    },
}

/// Handle to a running coordinator task.
///
/// One handle per session. Dropping it stops the task and discards any
/// pending idle transition.
pub struct CoordinatorHandle {
    sender: mpsc::UnboundedSender<CoordinatorMessage>,
    task: JoinHandle<()>,
}

impl CoordinatorHandle {
    pub fn on_session_start(&self) {
        self.send(LifecycleEvent::SessionStart);
    }

    pub fn on_session_end(&self) {
        self.send(LifecycleEvent::SessionEnd);
    }

    pub fn on_user_prompt(&self) {
        self.send(LifecycleEvent::UserPrompt);
    }

    pub fn on_tool_call(&self) {
        self.send(LifecycleEvent::ToolCall);
    }

    pub fn on_tool_result(&self) {
        self.send(LifecycleEvent::ToolResult);
    }

    pub fn on_agent_response(&self, done: bool) {
        self.send(LifecycleEvent::AgentResponse { done });
    }

    /// Queue an event. Never blocks; events sent after shutdown are dropped.
    pub fn send(&self, event: LifecycleEvent) {
        if self.sender.send(CoordinatorMessage::Event(event)).is_err() {
            debug!("Coordinator stopped, dropping {:?}", event);
        }
    }

    /// Current state, as seen after every previously queued event
    pub async fn snapshot(&self) -> Result<CoordinatorSnapshot, CoordinatorError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(CoordinatorMessage::Snapshot { respond_to: tx })
            .map_err(|_| CoordinatorError::Closed)?;
        rx.await.map_err(|_| CoordinatorError::Closed)
    }

    /// Process every queued event, then stop the task
    pub async fn shutdown(self) -> Result<(), CoordinatorError> {
        let CoordinatorHandle { sender, task } = self;
        drop(sender);
        task.await
            .map_err(|e| CoordinatorError::TaskFailed(e.to_string()))
    }
}

/// Spawn a coordinator task owning `sink`
pub fn spawn_coordinator<S>(config: CoordinatorConfig, sink: S) -> CoordinatorHandle
where
    S: SignalSink + 'static,
{
    let (sender, mut receiver) = mpsc::unbounded_channel();

    let task = tokio::spawn(async move {
        let mut coordinator = SignalCoordinator::new(config, sink);

        loop {
            let deadline = coordinator.idle_deadline();

            tokio::select! {
                // Events queued before the deadline win over the timer
                biased;

                message = receiver.recv() => match message {
                    Some(CoordinatorMessage::Event(event)) => {
                        coordinator.handle(event);
                    }
                    Some(CoordinatorMessage::Snapshot { respond_to }) => {
                        let _ = respond_to.send(coordinator.snapshot());
                    }
                    None => break,
                },
                _ = wait_for(deadline) => {
                    coordinator.fire_idle_timer();
                }
            }
        }

        debug!("Coordinator task stopped");
    });

    CoordinatorHandle { sender, task }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::RecordingSink;
    use crate::state::SignalState;
    use std::time::Duration;

    fn spawn_recording(idle_ms: u64) -> (CoordinatorHandle, RecordingSink) {
        let sink = RecordingSink::new();
        let config = CoordinatorConfig::default().with_idle_timeout_ms(idle_ms);
        (spawn_coordinator(config, sink.clone()), sink)
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_start_resets() {
        let (handle, sink) = spawn_recording(30_000);
        handle.on_session_start();

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.last_sent, Some(SignalState::Reset));
        assert_eq!(sink.sent(), vec![SignalState::Reset]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_prompt_then_tools_sends_processing_once() {
        let (handle, sink) = spawn_recording(30_000);
        handle.on_user_prompt();
        handle.on_tool_call();
        handle.on_tool_call();

        let snapshot = handle.snapshot().await.unwrap();
        assert!(snapshot.is_processing);
        assert_eq!(sink.sent(), vec![SignalState::Processing]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_fires_after_timeout() {
        let (handle, sink) = spawn_recording(30_000);
        handle.on_user_prompt();
        handle.on_agent_response(true);

        let snapshot = handle.snapshot().await.unwrap();
        assert!(snapshot.idle_pending);
        assert!(!snapshot.is_processing);

        tokio::time::sleep(Duration::from_millis(29_000)).await;
        assert_eq!(
            sink.sent(),
            vec![SignalState::Processing, SignalState::Complete]
        );

        tokio::time::sleep(Duration::from_millis(2_000)).await;
        let snapshot = handle.snapshot().await.unwrap();
        assert!(!snapshot.idle_pending);
        assert_eq!(snapshot.last_sent, Some(SignalState::Idle));
        assert_eq!(
            sink.sent(),
            vec![
                SignalState::Processing,
                SignalState::Complete,
                SignalState::Idle
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_prompt_before_timeout_cancels_idle() {
        let (handle, sink) = spawn_recording(30_000);
        handle.on_user_prompt();
        handle.on_agent_response(true);

        tokio::time::sleep(Duration::from_millis(10_000)).await;
        handle.on_user_prompt();

        tokio::time::sleep(Duration::from_millis(60_000)).await;
        let snapshot = handle.snapshot().await.unwrap();
        assert!(!snapshot.idle_pending);
        assert!(snapshot.is_processing);
        assert_eq!(
            sink.sent(),
            vec![
                SignalState::Processing,
                SignalState::Complete,
                SignalState::Processing
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearming_restarts_the_delay() {
        let (handle, sink) = spawn_recording(1_000);
        handle.on_user_prompt();
        handle.on_agent_response(true);

        tokio::time::sleep(Duration::from_millis(600)).await;
        handle.on_tool_call();
        handle.on_agent_response(true);

        // The first deadline has passed; only the re-armed one is pending
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(!sink.sent().contains(&SignalState::Idle));

        tokio::time::sleep(Duration::from_millis(600)).await;
        let idles = sink
            .sent()
            .into_iter()
            .filter(|s| *s == SignalState::Idle)
            .count();
        assert_eq!(idles, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_timeout_never_idles() {
        let (handle, sink) = spawn_recording(0);
        handle.on_user_prompt();
        handle.on_agent_response(true);

        tokio::time::sleep(Duration::from_secs(3_600)).await;
        let snapshot = handle.snapshot().await.unwrap();
        assert!(!snapshot.idle_pending);
        assert_eq!(
            sink.sent(),
            vec![SignalState::Processing, SignalState::Complete]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_drains_queued_events() {
        let (handle, sink) = spawn_recording(30_000);
        handle.on_user_prompt();
        handle.on_session_end();
        handle.shutdown().await.unwrap();

        assert_eq!(
            sink.sent(),
            vec![SignalState::Processing, SignalState::Reset]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_discards_pending_idle() {
        let (handle, sink) = spawn_recording(1_000);
        handle.on_user_prompt();
        handle.on_agent_response(true);
        handle.shutdown().await.unwrap();

        tokio::time::sleep(Duration::from_millis(5_000)).await;
        assert!(!sink.sent().contains(&SignalState::Idle));
    }
}
