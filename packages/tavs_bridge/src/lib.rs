// Library interface for tavs_bridge
// Connects an agent host's lifecycle hooks to the terminal trigger script

pub mod config;
pub mod discovery;
pub mod events;
pub mod host;
pub mod plugin;
pub mod script_sink;

pub use config::BridgeConfig;
pub use discovery::find_trigger_script;
pub use events::{AgentResponse, HostEvent, SessionInfo, ToolCall, ToolResult};
pub use host::{PumpSummary, pump_events, run_bridge};
pub use plugin::{LifecyclePlugin, TavsPlugin, create_plugin, dispatch};
pub use script_sink::ScriptSink;
