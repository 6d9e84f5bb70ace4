//! # diffpress-core
//!
//! Shared configuration and logging for diffpress.
//!
//! ## Modules
//!
//! - `config`: layered configuration (defaults, global file, repo file, environment)
//! - `error`: configuration errors
//! - `logging`: tracing subscriber setup

pub mod config;
pub mod error;
pub mod logging;

pub use config::{
    get_config_home, parse_bool, CompressionSettings, Config, ConfigFile, LogSettings,
    PromptFileSettings,
};
pub use error::{ConfigError, ConfigResult};
pub use logging::{init_logging, parse_level};
