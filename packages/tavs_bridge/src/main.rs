use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tavs_signals::SignalState;
use tokio::io::BufReader;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use tavs_bridge::config::default_config_path;
use tavs_bridge::{BridgeConfig, ScriptSink, find_trigger_script, run_bridge};

#[derive(Parser)]
#[command(name = "tavs-bridge")]
#[command(about = "Terminal visual signals driven by agent lifecycle events on stdin")]
struct Args {
    /// Config file (defaults to <config dir>/tavs/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the trigger script (auto-detected if not set)
    #[arg(short, long)]
    trigger_script: Option<PathBuf>,

    /// Milliseconds between complete and idle (0 disables idle)
    #[arg(long)]
    idle_timeout_ms: Option<u64>,

    /// Track state but never run the trigger script
    #[arg(long)]
    disable: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Send a single signal synchronously and exit
    #[arg(long, value_name = "STATE")]
    signal: Option<SignalState>,
}

impl Args {
    fn apply(&self, config: &mut BridgeConfig) {
        if let Some(script) = &self.trigger_script {
            config.trigger_script = Some(script.clone());
        }
        if let Some(ms) = self.idle_timeout_ms {
            config.idle_timeout_ms = ms;
        }
        if self.disable {
            config.enabled = false;
        }
        if self.debug {
            config.debug = true;
        }
    }
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        "tavs_bridge=debug,tavs_signals=debug"
    } else {
        "tavs_bridge=info,tavs_signals=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match args.config.clone().or_else(default_config_path) {
        Some(path) => BridgeConfig::load(&path)?,
        None => BridgeConfig::default(),
    };
    args.apply(&mut config);

    init_tracing(config.debug);

    let script = find_trigger_script(config.trigger_script.as_deref());
    match &script {
        Some(path) => debug!("Using trigger script: {}", path.display()),
        None => debug!("Trigger script not found - signals disabled"),
    }
    let sink = ScriptSink::new(script).with_timeout(config.script_timeout());

    if let Some(state) = args.signal {
        if config.enabled {
            sink.send_final(state).await;
        }
        return Ok(());
    }

    info!("Listening for lifecycle events on stdin");
    run_bridge(
        BufReader::new(tokio::io::stdin()),
        config.coordinator_config(),
        sink,
    )
    .await?;

    Ok(())
}
