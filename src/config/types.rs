// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

use super::messages::{Locale, MessageOverrides};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub files: FilesConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
}

/// Listener configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Tokio worker threads, CPU count when unset
    #[serde(default)]
    pub workers: Option<usize>,
}

/// Served directory and response language
#[derive(Debug, Deserialize, Clone)]
pub struct FilesConfig {
    /// Directory files are served from; relative paths resolve against the working directory
    pub root_dir: String,
    /// Language of probe and error messages
    #[serde(default)]
    pub locale: Locale,
    /// Per-message overrides applied on top of the locale table
    #[serde(default)]
    pub messages: MessageOverrides,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Connection handling configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    /// Seconds a client may take to send a request's headers, 0 disables it.
    /// Response bodies are never cut short.
    pub header_read_timeout: u64,
}
