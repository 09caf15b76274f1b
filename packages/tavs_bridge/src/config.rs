use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tavs_signals::CoordinatorConfig;

// =============================================================================
// Bridge config (figment-deserialized from defaults / config.toml / env vars)
// =============================================================================
//
//   config.toml:     idle_timeout_ms = 60000
//   env var:         TAVS_IDLE_TIMEOUT_MS=60000
//
// CLI flags are applied on top by the binary.

/// Tunable configuration, deserialized by figment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Path to the trigger script (auto-detected if not set)
    #[serde(default)]
    pub trigger_script: Option<PathBuf>,
    /// Delay before Complete graduates to Idle; 0 disables it
    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,
    #[serde(default)]
    pub debug: bool,
    /// How long a single trigger script run may take before it is killed
    #[serde(default = "default_script_timeout_ms")]
    pub script_timeout_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            trigger_script: None,
            idle_timeout_ms: default_idle_timeout_ms(),
            debug: false,
            script_timeout_ms: default_script_timeout_ms(),
        }
    }
}

fn default_enabled() -> bool {
    true
}
fn default_idle_timeout_ms() -> u64 {
    30_000
}
fn default_script_timeout_ms() -> u64 {
    5_000
}

impl BridgeConfig {
    /// Values the coordinator consumes
    pub fn coordinator_config(&self) -> CoordinatorConfig {
        CoordinatorConfig {
            enabled: self.enabled,
            idle_timeout: Duration::from_millis(self.idle_timeout_ms),
            debug: self.debug,
        }
    }

    pub fn script_timeout(&self) -> Duration {
        Duration::from_millis(self.script_timeout_ms)
    }

    /// Extract from [`load_config`]
    pub fn load(config_file: &Path) -> Result<Self> {
        let config: Self = load_config(config_file)
            .extract()
            .with_context(|| format!("Invalid configuration in {}", config_file.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// A zero script timeout would kill every run before it starts
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.script_timeout_ms > 0,
            "script_timeout_ms must be greater than 0"
        );
        Ok(())
    }
}

/// `$XDG_CONFIG_HOME/tavs/config.toml` (or the platform equivalent)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tavs").join("config.toml"))
}

/// Build a figment that layers: defaults → config.toml → TAVS_* env vars.
///
/// A missing config file is not an error; its layer is simply empty.
pub fn load_config(config_file: &Path) -> figment::Figment {
    use figment::{
        Figment,
        providers::{Env, Format, Serialized, Toml},
    };

    Figment::from(Serialized::defaults(BridgeConfig::default()))
        .merge(Toml::file(config_file))
        .merge(Env::prefixed("TAVS_"))
}
