//! Configuration management for RiskZone
//!
//! Environment-based configuration with defaults, TOML files and validation.

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt::Display;
use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

mod error;

pub use error::ConfigError;

use crate::logging::LogLevel;
use crate::zones::{DEFAULT_HIGH_RISK_MESSAGE, DEFAULT_MAX_POLYGON_POINTS, MIN_POLYGON_POINTS};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP / WebSocket server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Sync hub configuration
    #[serde(default)]
    pub hub: HubConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address
    pub bind_address: SocketAddr,

    /// Maximum live push-channel connections
    pub max_connections: usize,

    /// Upper bound on draining in-flight requests at shutdown
    #[serde(with = "humantime_serde")]
    pub shutdown_timeout: Duration,
}

/// Sync hub configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    /// Pending operations the hub will queue before callers wait
    pub command_queue_capacity: usize,

    /// Per-connection outbound event buffer; overflowing it drops the connection
    pub connection_buffer: usize,

    /// Largest polygon admitted
    pub max_polygon_points: usize,

    /// Text of the high-risk alert banner
    pub alert_message: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON formatting
    pub json_format: bool,

    /// Include target module
    pub with_target: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 5000)),
            max_connections: 10_000,
            shutdown_timeout: Duration::from_secs(10),
        }
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            command_queue_capacity: 1024,
            connection_buffer: 256,
            max_polygon_points: DEFAULT_MAX_POLYGON_POINTS,
            alert_message: DEFAULT_HIGH_RISK_MESSAGE.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            with_target: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Environment variables follow the pattern: RISKZONE_<SECTION>_<KEY>
    /// Example: RISKZONE_SERVER_BIND_ADDRESS=0.0.0.0:5000
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay any RISKZONE_* variables onto this configuration
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        // Server config
        if let Some(addr) = env_parse("RISKZONE_SERVER_BIND_ADDRESS")? {
            self.server.bind_address = addr;
        }
        if let Some(max_conn) = env_parse("RISKZONE_SERVER_MAX_CONNECTIONS")? {
            self.server.max_connections = max_conn;
        }
        if let Ok(timeout) = env::var("RISKZONE_SERVER_SHUTDOWN_TIMEOUT") {
            self.server.shutdown_timeout =
                humantime::parse_duration(&timeout).map_err(|e| ConfigError::InvalidValue {
                    key: "RISKZONE_SERVER_SHUTDOWN_TIMEOUT",
                    message: e.to_string(),
                })?;
        }

        // Hub config
        if let Some(capacity) = env_parse("RISKZONE_HUB_COMMAND_QUEUE_CAPACITY")? {
            self.hub.command_queue_capacity = capacity;
        }
        if let Some(buffer) = env_parse("RISKZONE_HUB_CONNECTION_BUFFER")? {
            self.hub.connection_buffer = buffer;
        }
        if let Some(max_points) = env_parse("RISKZONE_HUB_MAX_POLYGON_POINTS")? {
            self.hub.max_polygon_points = max_points;
        }
        if let Ok(message) = env::var("RISKZONE_HUB_ALERT_MESSAGE") {
            self.hub.alert_message = message;
        }

        // Logging config
        if let Ok(level) = env::var("RISKZONE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(json) = env_parse("RISKZONE_LOG_JSON")? {
            self.logging.json_format = json;
        }

        Ok(())
    }

    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &'static str, message: &str| -> Result<(), ConfigError> {
            Err(ConfigError::ValidationFailed {
                key,
                message: message.to_string(),
            })
        };

        if self.server.max_connections == 0 {
            return invalid("server.max_connections", "must be greater than 0");
        }
        if self.hub.command_queue_capacity == 0 {
            return invalid("hub.command_queue_capacity", "must be greater than 0");
        }
        if self.hub.connection_buffer == 0 {
            return invalid("hub.connection_buffer", "must be greater than 0");
        }
        if self.hub.max_polygon_points < MIN_POLYGON_POINTS {
            return invalid(
                "hub.max_polygon_points",
                &format!("must be at least {}", MIN_POLYGON_POINTS),
            );
        }
        if self.hub.alert_message.trim().is_empty() {
            return invalid("hub.alert_message", "must not be empty");
        }
        if self.logging.level.parse::<LogLevel>().is_err() {
            return invalid(
                "logging.level",
                &format!("unknown level '{}'", self.logging.level),
            );
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = toml::to_string_pretty(self)?;

        std::fs::write(path, contents).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(())
    }
}

/// Parse `key` from the environment if it is set
fn env_parse<T>(key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                key,
                message: format!("'{}': {}", raw, e),
            }),
        Err(_) => Ok(None),
    }
}
