use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while resolving configuration.
///
/// Every variant is fatal: configuration problems are reported before any
/// diff is processed and are never retried.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config from {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Unknown compression strategy '{name}' (valid: {valid})")]
    UnknownStrategy { name: String, valid: String },

    #[error("{key}={value} is out of range (expected {expected})")]
    OutOfRange {
        key: String,
        value: u64,
        expected: String,
    },

    #[error("Invalid path pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;
