// Application state module
// Read-only state shared by every connection

use std::path::PathBuf;

use super::messages::Messages;
use super::types::Config;

/// Application state
pub struct AppState {
    pub config: Config,
    /// Absolute directory files are resolved in
    pub root_dir: PathBuf,
    pub messages: Messages,
}

impl AppState {
    /// Build state around an already resolved root directory
    pub fn new(config: Config, root_dir: PathBuf) -> Self {
        let messages = config.messages();
        Self {
            config,
            root_dir,
            messages,
        }
    }

    pub const fn access_log_enabled(&self) -> bool {
        self.config.logging.access_log
    }
}
