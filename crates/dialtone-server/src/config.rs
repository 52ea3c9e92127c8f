//! Server configuration loading from file and environment variables.

use dialtone_calls::StoreFailurePolicy;
use dialtone_voice::ElevenLabsConfig;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;
use thiserror::Error;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Database settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Text-to-speech provider settings.
    #[serde(default)]
    pub elevenlabs: ElevenLabsConfig,

    /// Call simulation settings.
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// Network and HTTP surface configuration.
#[derive(Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory served under `/static`; generated audio is written here.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    /// Shared secret expected in the `X-API-Key` header on protected routes.
    #[serde(default = "default_api_key")]
    pub api_key: String,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,

    /// SQLite busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Maximum pooled connections.
    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "dialtone_calls=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

/// Call simulation configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    /// How long each non-terminal call status is held, in milliseconds.
    #[serde(default = "default_step_interval_ms")]
    pub step_interval_ms: u64,

    /// Events buffered per real-time subscriber before it starts missing them.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Stop a simulation at the first failed call log write instead of
    /// logging the failure and carrying on.
    #[serde(default)]
    pub abort_on_store_failure: bool,
}

impl SimulationConfig {
    pub fn step_interval(&self) -> Duration {
        Duration::from_millis(self.step_interval_ms)
    }

    pub fn failure_policy(&self) -> StoreFailurePolicy {
        if self.abort_on_store_failure {
            StoreFailurePolicy::Abort
        } else {
            StoreFailurePolicy::LogAndContinue
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    5000
}

fn default_static_dir() -> String {
    "static".to_string()
}

fn default_api_key() -> String {
    "voicecall".to_string()
}

fn default_db_path() -> String {
    "calls.db".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

fn default_pool_max_size() -> u32 {
    8
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_step_interval_ms() -> u64 {
    2_000
}

fn default_channel_capacity() -> usize {
    256
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
            api_key: default_api_key(),
        }
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("static_dir", &self.static_dir)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
            pool_max_size: default_pool_max_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            step_interval_ms: default_step_interval_ms(),
            channel_capacity: default_channel_capacity(),
            abort_on_store_failure: false,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults, then
/// applies environment overrides.
///
/// Environment variable overrides:
/// - `DIALTONE_HOST` overrides `server.host`
/// - `DIALTONE_PORT` overrides `server.port`
/// - `DIALTONE_STATIC_DIR` overrides `server.static_dir`
/// - `DIALTONE_API_KEY` overrides `server.api_key`
/// - `DIALTONE_DB_PATH` overrides `database.path`
/// - `DIALTONE_LOG_LEVEL` overrides `logging.level`
/// - `DIALTONE_LOG_JSON` overrides `logging.json` (set to "true" to enable)
/// - `ELEVENLABS_API_KEY` overrides `elevenlabs.api_key`
/// - `ELEVENLABS_BASE_URL` overrides `elevenlabs.base_url`
/// - `DIALTONE_STEP_INTERVAL_MS` overrides `simulation.step_interval_ms`
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    Ok(config)
}

fn apply_env_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(parsed) = var("DIALTONE_HOST").and_then(|v| v.parse().ok()) {
        config.server.host = parsed;
    }
    if let Some(parsed) = var("DIALTONE_PORT").and_then(|v| v.parse().ok()) {
        config.server.port = parsed;
    }
    if let Some(dir) = var("DIALTONE_STATIC_DIR") {
        config.server.static_dir = dir;
    }
    if let Some(key) = var("DIALTONE_API_KEY") {
        config.server.api_key = key;
    }
    if let Some(db_path) = var("DIALTONE_DB_PATH") {
        config.database.path = db_path;
    }
    if let Some(level) = var("DIALTONE_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = var("DIALTONE_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
    if let Some(key) = var("ELEVENLABS_API_KEY") {
        config.elevenlabs.api_key = Some(key);
    }
    if let Some(url) = var("ELEVENLABS_BASE_URL") {
        config.elevenlabs.base_url = url;
    }
    if let Some(parsed) = var("DIALTONE_STEP_INTERVAL_MS").and_then(|v| v.parse().ok()) {
        config.simulation.step_interval_ms = parsed;
    }
}
