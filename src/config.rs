//! Configuration from the environment.

use std::{env, path::PathBuf};

use crate::history::FileStore;

/// Overrides the directory the analysis history is stored in.
pub const HISTORY_DIR_VAR: &str = "POSEVIEW_HISTORY_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub history_dir: PathBuf,
}

impl Config {
    /// Reads the configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_vars(env::var_os(HISTORY_DIR_VAR).map(PathBuf::from))
    }

    fn from_vars(history_dir: Option<PathBuf>) -> Self {
        let history_dir = match history_dir {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => default_history_dir(),
        };
        log::trace!("history directory: {}", history_dir.display());
        Self { history_dir }
    }

    pub fn history_store(&self) -> FileStore {
        FileStore::new(&self.history_dir)
    }
}

/// `poseview` inside the platform's local data directory, or the working directory if the
/// platform has none.
fn default_history_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("poseview")
}
