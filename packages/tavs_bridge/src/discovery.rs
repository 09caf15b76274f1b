//! Trigger script discovery
//!
//! Search order:
//! 1. Explicit path from config or CLI
//! 2. Next to the running executable (`trigger.sh`, `../share/tavs/trigger.sh`)
//! 3. Common installation locations under the home directory and `/usr/local`

use std::path::{Path, PathBuf};
use tracing::debug;

pub const SCRIPT_NAME: &str = "trigger.sh";

const HOME_CANDIDATES: &[&str] = &[
    ".claude/hooks/tavs/src/core/trigger.sh",
    ".opencode/plugins/tavs/trigger.sh",
];

const SYSTEM_CANDIDATES: &[&str] = &["/usr/local/share/tavs/trigger.sh"];

/// Candidate paths, most specific first
pub fn candidate_paths(
    explicit: Option<&Path>,
    exe_dir: Option<&Path>,
    home: Option<&Path>,
) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(path) = explicit {
        candidates.push(path.to_path_buf());
    }

    if let Some(dir) = exe_dir {
        candidates.push(dir.join(SCRIPT_NAME));
        candidates.push(dir.join("../share/tavs").join(SCRIPT_NAME));
    }

    if let Some(home) = home {
        candidates.extend(HOME_CANDIDATES.iter().map(|rel| home.join(rel)));
    }

    candidates.extend(SYSTEM_CANDIDATES.iter().map(PathBuf::from));
    candidates
}

/// First existing file among `candidates`
pub fn first_existing(candidates: &[PathBuf]) -> Option<PathBuf> {
    candidates.iter().find(|path| path.is_file()).cloned()
}

/// Locate the trigger script, or `None` if signals cannot be rendered
pub fn find_trigger_script(explicit: Option<&Path>) -> Option<PathBuf> {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    let home = dirs::home_dir();

    let candidates = candidate_paths(explicit, exe_dir.as_deref(), home.as_deref());
    let found = first_existing(&candidates);
    if found.is_none() {
        debug!("No trigger script among {} candidates", candidates.len());
    }
    found
}
