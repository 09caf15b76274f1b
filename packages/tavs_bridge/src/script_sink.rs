//! Trigger script sink
//!
//! Runs `bash <trigger.sh> <state>` for each signal. `send` spawns the script
//! and returns immediately; a background task reaps it and kills it if it
//! outlives the timeout. `send_blocking` is for exit paths where the process
//! would otherwise end before the script ran.
//!
//! Background runs are tracked so [`ScriptSink::drain`] can wait for them. A
//! late run would otherwise repaint the terminal after a final reset.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tavs_signals::{SignalSink, SignalState, SinkError};
use tokio::task::JoinSet;
use tracing::{debug, warn};

pub const DEFAULT_SCRIPT_TIMEOUT: Duration = Duration::from_millis(5_000);

const SHELL: &str = "bash";
const BLOCKING_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Clones share the set of in-flight runs
#[derive(Clone, Debug)]
pub struct ScriptSink {
    script: Option<PathBuf>,
    timeout: Duration,
    in_flight: Arc<Mutex<JoinSet<()>>>,
}

impl ScriptSink {
    pub fn new(script: Option<PathBuf>) -> Self {
        Self {
            script,
            timeout: DEFAULT_SCRIPT_TIMEOUT,
            in_flight: Arc::new(Mutex::new(JoinSet::new())),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Wait until every script started by `send` has exited or been killed.
    ///
    /// Runs started while draining are waited for too.
    pub async fn drain(&self) {
        loop {
            let mut pending =
                std::mem::take(&mut *self.in_flight.lock().unwrap_or_else(PoisonError::into_inner));
            if pending.is_empty() {
                return;
            }
            while let Some(joined) = pending.join_next().await {
                if let Err(e) = joined {
                    debug!("Trigger script task failed: {}", e);
                }
            }
        }
    }

    /// `send_blocking` on the blocking pool, logging the outcome
    pub async fn send_final(&self, state: SignalState) {
        let sink = self.clone();
        match tokio::task::spawn_blocking(move || sink.send_blocking(state)).await {
            Ok(Ok(())) => debug!("Sent signal: {}", state),
            Ok(Err(e)) => warn!("Error sending signal {}: {}", state, e),
            Err(e) => warn!("Signal task failed: {}", e),
        }
    }

    fn require_script(&self) -> Result<&Path, SinkError> {
        self.script
            .as_deref()
            .ok_or_else(|| SinkError::Unavailable("trigger script not found".into()))
    }

    /// Run the script and wait for it, bounded by the timeout
    pub fn send_blocking(&self, state: SignalState) -> Result<(), SinkError> {
        let script = self.require_script()?;

        let mut child = std::process::Command::new(SHELL)
            .arg(script)
            .arg(state.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| spawn_error(script, e))?;

        let deadline = std::time::Instant::now() + self.timeout;
        loop {
            match child.try_wait() {
                Ok(Some(status)) if status.success() => return Ok(()),
                Ok(Some(status)) => {
                    return Err(SinkError::InvocationFailed(format!(
                        "trigger script exited with {}",
                        status
                    )));
                }
                Ok(None) if std::time::Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(SinkError::InvocationFailed(format!(
                        "trigger script timed out after {:?}",
                        self.timeout
                    )));
                }
                Ok(None) => std::thread::sleep(BLOCKING_POLL_INTERVAL),
                Err(e) => {
                    return Err(SinkError::InvocationFailed(format!(
                        "failed to wait for trigger script: {}",
                        e
                    )));
                }
            }
        }
    }
}

impl SignalSink for ScriptSink {
    fn send(&self, state: SignalState) -> Result<(), SinkError> {
        let script = self.require_script()?;
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| SinkError::InvocationFailed(format!("no async runtime: {}", e)))?;

        let mut command = tokio::process::Command::new(SHELL);
        command
            .arg(script)
            .arg(state.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        // Detach from our process group so terminal signals aimed at the host skip it
        #[cfg(unix)]
        command.process_group(0);

        let mut child = command.spawn().map_err(|e| spawn_error(script, e))?;
        let timeout = self.timeout;

        let reap = async move {
            match tokio::time::timeout(timeout, child.wait()).await {
                Ok(Ok(status)) if !status.success() => {
                    debug!("Trigger script for {} exited with {}", state, status);
                }
                Ok(Ok(_)) => {}
                Ok(Err(e)) => debug!("Failed to wait for trigger script: {}", e),
                Err(_) => {
                    debug!("Trigger script for {} timed out, killing it", state);
                    let _ = child.kill().await;
                }
            }
        };

        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        // Drop finished runs so a long session does not accumulate them
        while in_flight.try_join_next().is_some() {}
        in_flight.spawn_on(reap, &runtime);

        Ok(())
    }

    fn is_available(&self) -> bool {
        self.script.is_some()
    }
}

fn spawn_error(script: &Path, err: std::io::Error) -> SinkError {
    SinkError::InvocationFailed(format!("failed to run {}: {}", script.display(), err))
}
