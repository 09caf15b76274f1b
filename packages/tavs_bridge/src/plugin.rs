//! Lifecycle hooks
//!
//! `LifecyclePlugin` is the surface a host calls into. Every hook has a no-op
//! default so a plugin only implements the events it cares about.
//! `TavsPlugin` forwards all six to its own coordinator task.

use tracing::{debug, trace};

use tavs_signals::{
    CoordinatorConfig, CoordinatorError, CoordinatorHandle, CoordinatorSnapshot, SignalSink,
    spawn_coordinator,
};

use crate::events::{AgentResponse, HostEvent, SessionInfo, ToolCall, ToolResult};

/// Hooks invoked by the host during a session
pub trait LifecyclePlugin {
    /// Plugin name for identification
    fn name(&self) -> &str;

    /// A new session started
    fn on_session_start(&self, _session: &SessionInfo) {}

    /// The session ended
    fn on_session_end(&self, _session: &SessionInfo) {}

    /// The user submitted a prompt
    fn on_user_prompt(&self, _prompt: &str) {}

    /// A tool is about to run
    fn on_tool_call(&self, _tool: &ToolCall) {}

    /// A tool finished
    fn on_tool_result(&self, _result: &ToolResult) {}

    /// The agent produced a response chunk (called repeatedly while streaming)
    fn on_agent_response(&self, _response: &AgentResponse) {}
}

/// Deliver one host event to the matching hook
pub fn dispatch<P: LifecyclePlugin + ?Sized>(plugin: &P, event: &HostEvent) {
    match event {
        HostEvent::SessionStart { session } => plugin.on_session_start(session),
        HostEvent::SessionEnd { session } => plugin.on_session_end(session),
        HostEvent::UserPrompt { prompt } => plugin.on_user_prompt(prompt),
        HostEvent::ToolCall { tool } => plugin.on_tool_call(tool),
        HostEvent::ToolResult { result } => plugin.on_tool_result(result),
        HostEvent::AgentResponse { response } => plugin.on_agent_response(response),
    }
}

/// Visual terminal signals for one session
pub struct TavsPlugin {
    coordinator: CoordinatorHandle,
}

impl TavsPlugin {
    pub const NAME: &'static str = "tavs";

    pub fn new(coordinator: CoordinatorHandle) -> Self {
        Self { coordinator }
    }

    pub async fn snapshot(&self) -> Result<CoordinatorSnapshot, CoordinatorError> {
        self.coordinator.snapshot().await
    }

    /// Let queued events reach the sink, then stop the coordinator
    pub async fn shutdown(self) -> Result<(), CoordinatorError> {
        self.coordinator.shutdown().await
    }
}

impl LifecyclePlugin for TavsPlugin {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn on_session_start(&self, session: &SessionInfo) {
        debug!("Session {} started", session.id);
        self.coordinator.on_session_start();
    }

    fn on_session_end(&self, session: &SessionInfo) {
        debug!("Session {} ended", session.id);
        self.coordinator.on_session_end();
    }

    fn on_user_prompt(&self, _prompt: &str) {
        self.coordinator.on_user_prompt();
    }

    fn on_tool_call(&self, tool: &ToolCall) {
        trace!("Tool call: {}", tool.name);
        self.coordinator.on_tool_call();
    }

    fn on_tool_result(&self, result: &ToolResult) {
        if let Some(error) = &result.error {
            trace!("Tool {} failed: {}", result.name, error);
        }
        self.coordinator.on_tool_result();
    }

    fn on_agent_response(&self, response: &AgentResponse) {
        self.coordinator.on_agent_response(response.done);
    }
}

/// Build a plugin with its own coordinator. Must be called inside a tokio runtime.
pub fn create_plugin<S>(config: CoordinatorConfig, sink: S) -> TavsPlugin
where
    S: SignalSink + 'static,
{
    TavsPlugin::new(spawn_coordinator(config, sink))
}
