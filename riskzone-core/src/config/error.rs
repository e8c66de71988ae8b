//! Configuration error types

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read or written
    #[error("Cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Cannot serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// An environment override did not parse; `key` is the variable name
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },

    /// `key` is the dotted setting name, e.g. `hub.connection_buffer`
    #[error("Invalid setting {key}: {message}")]
    ValidationFailed { key: &'static str, message: String },
}

impl ConfigError {
    /// Setting or variable the error is about, if it names one
    pub fn key(&self) -> Option<&'static str> {
        match self {
            ConfigError::InvalidValue { key, .. } | ConfigError::ValidationFailed { key, .. } => {
                Some(key)
            }
            _ => None,
        }
    }
}
