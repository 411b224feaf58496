// Configuration module entry point
// Loads layered configuration and builds the shared application state

mod messages;
mod state;
mod types;

use std::net::SocketAddr;
use std::path::PathBuf;

pub use messages::{Locale, MessageOverrides, Messages};
pub use state::AppState;
pub use types::{Config, FilesConfig, LoggingConfig, PerformanceConfig, ServerConfig};

/// Config file looked up when no path is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Prefix of environment overrides, e.g. `DEBUG_SERVER_SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "DEBUG_SERVER";

type Builder = config::ConfigBuilder<config::builder::DefaultState>;

impl Config {
    /// Load configuration from specified file path (extension optional)
    ///
    /// Sources in increasing priority: built-in defaults, the file (if present),
    /// environment variables.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::with_defaults()?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }

    /// Built-in defaults only, ignoring files and environment
    pub fn defaults() -> Result<Self, config::ConfigError> {
        Self::with_defaults()?.build()?.try_deserialize()
    }

    fn with_defaults() -> Result<Builder, config::ConfigError> {
        config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 9808)?
            .set_default("files.root_dir", "test_files")?
            .set_default("files.locale", "en")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.header_read_timeout", 0)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Absolute root directory; relative paths are joined to the working directory
    pub fn resolve_root_dir(&self) -> std::io::Result<PathBuf> {
        let root = PathBuf::from(&self.files.root_dir);
        if root.is_absolute() {
            Ok(root)
        } else {
            Ok(std::env::current_dir()?.join(root))
        }
    }

    pub fn messages(&self) -> Messages {
        Messages::resolve(self.files.locale, &self.files.messages)
    }
}
