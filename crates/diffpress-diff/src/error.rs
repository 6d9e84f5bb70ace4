use diffpress_core::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Malformed diff input. Reported before any compression happens.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Malformed diff at line {line_number}: {reason}: {line:?}")]
pub struct ParseError {
    /// 1-based line number in the raw input
    pub line_number: usize,
    pub line: String,
    pub reason: String,
}

impl ParseError {
    pub(crate) fn new(line_number: usize, line: &str, reason: impl Into<String>) -> Self {
        Self {
            line_number,
            line: line.to_string(),
            reason: reason.into(),
        }
    }
}

/// Temp prompt file could not be created, written or removed
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Failed to create prompt directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write prompt file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove prompt file {path}: {source}")]
    Cleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DeliveryError {
    pub fn path(&self) -> &PathBuf {
        match self {
            DeliveryError::CreateDir { path, .. }
            | DeliveryError::Write { path, .. }
            | DeliveryError::Cleanup { path, .. } => path,
        }
    }
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
