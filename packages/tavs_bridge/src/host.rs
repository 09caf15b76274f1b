//! Event pump: reads protocol lines and hands each event to a plugin.

use anyhow::{Context, Result};
use tavs_signals::{CoordinatorConfig, SignalState};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

use crate::events::{HostEvent, parse_line};
use crate::plugin::{LifecyclePlugin, create_plugin, dispatch};
use crate::script_sink::ScriptSink;

/// What the pump saw before its input ended
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PumpSummary {
    pub dispatched: usize,
    pub skipped: usize,
    /// True if events arrived after the last session end, leaving the
    /// terminal in a non-neutral state
    pub needs_reset: bool,
}

/// Dispatch every event from `reader` until EOF.
///
/// Malformed lines are logged and skipped; only I/O errors end the pump early.
pub async fn pump_events<R, P>(reader: R, plugin: &P) -> std::io::Result<PumpSummary>
where
    R: AsyncBufRead + Unpin,
    P: LifecyclePlugin + ?Sized,
{
    let mut summary = PumpSummary::default();
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            Ok(Some(event)) => {
                summary.needs_reset = !matches!(event, HostEvent::SessionEnd { .. });
                dispatch(plugin, &event);
                summary.dispatched += 1;
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Skipping malformed event: {}", e);
                summary.skipped += 1;
            }
        }
    }

    Ok(summary)
}

/// Drive one coordinator from `reader` until EOF, then leave the terminal neutral.
///
/// Every background script run finishes before the final reset, so the reset
/// is the last thing the terminal sees.
pub async fn run_bridge<R>(
    reader: R,
    config: CoordinatorConfig,
    sink: ScriptSink,
) -> Result<PumpSummary>
where
    R: AsyncBufRead + Unpin,
{
    let enabled = config.enabled;
    let plugin = create_plugin(config, sink.clone());

    let summary = pump_events(reader, &plugin)
        .await
        .context("Failed to read lifecycle events")?;
    debug!(
        "Input closed after {} events ({} skipped)",
        summary.dispatched, summary.skipped
    );

    plugin
        .shutdown()
        .await
        .context("Coordinator did not shut down cleanly")?;
    sink.drain().await;

    if summary.needs_reset && enabled {
        sink.send_final(SignalState::Reset).await;
    }

    Ok(summary)
}
