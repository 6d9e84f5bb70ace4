//! Compression strategies
//!
//! Each strategy is a pure function of the parsed document and the validated
//! config, so identical inputs always produce identical output.

mod compact;
mod filtered;
mod function_context;
mod smart;
mod stat;

use crate::config::CompressionConfig;
use crate::types::{DiffDocument, FileInclusion, InclusionMode};
use diffpress_core::ConfigError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

pub use function_context::{FUNCTION_LOOKAHEAD_LINES, FUNCTION_LOOKBACK_LINES};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Per-file counts only
    Stat,
    /// One line of context around each changed region
    Compact,
    /// Full rendering minus low-signal files
    Filtered,
    /// Context widened or trimmed to the enclosing declaration
    FunctionContext,
    /// Top-scored files in full, the rest as counts
    #[default]
    Smart,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::Stat,
        Strategy::Compact,
        Strategy::Filtered,
        Strategy::FunctionContext,
        Strategy::Smart,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Stat => "stat",
            Strategy::Compact => "compact",
            Strategy::Filtered => "filtered",
            Strategy::FunctionContext => "function-context",
            Strategy::Smart => "smart",
        }
    }

    pub fn compress(&self, doc: &DiffDocument, config: &CompressionConfig) -> CompressionResult {
        let (text, files) = match self {
            Strategy::Stat => stat::compress(doc),
            Strategy::Compact => compact::compress(doc),
            Strategy::Filtered => filtered::compress(doc, config),
            Strategy::FunctionContext => function_context::compress(doc),
            Strategy::Smart => smart::compress(doc, config),
        };

        let result = CompressionResult {
            strategy: *self,
            original_size: doc.total_bytes,
            compressed_size: text.len(),
            compressed_text: text,
            files,
        };
        tracing::debug!(summary = %result.summary(), "compressed diff");
        result
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase().replace('_', "-");
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == name)
            .ok_or_else(|| ConfigError::UnknownStrategy {
                name: s.to_string(),
                valid: Strategy::ALL
                    .iter()
                    .map(Strategy::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompressionResult {
    pub strategy: Strategy,
    pub original_size: usize,
    pub compressed_size: usize,
    pub compressed_text: String,
    pub files: Vec<FileInclusion>,
}

impl CompressionResult {
    /// Human-readable line such as `smart: 600.0 KB -> 80.2 KB (86.6% reduction)`
    pub fn summary(&self) -> String {
        let reduction = if self.original_size == 0 {
            0.0
        } else {
            (1.0 - self.compressed_size as f64 / self.original_size as f64) * 100.0
        };
        format!(
            "{}: {} -> {} ({:.1}% reduction)",
            self.strategy,
            format_size(self.original_size),
            format_size(self.compressed_size),
            reduction
        )
    }

    pub fn count(&self, mode: InclusionMode) -> usize {
        self.files.iter().filter(|f| f.mode == mode).count()
    }

    pub fn paths_with(&self, mode: InclusionMode) -> Vec<&str> {
        self.files
            .iter()
            .filter(|f| f.mode == mode)
            .map(|f| f.path.as_str())
            .collect()
    }
}

pub fn format_size(bytes: usize) -> String {
    if bytes < 1_000 {
        format!("{bytes} B")
    } else {
        format!("{:.1} KB", bytes as f64 / 1_000.0)
    }
}

pub(crate) fn inclusion(path: &str, mode: InclusionMode) -> FileInclusion {
    FileInclusion {
        path: path.to_string(),
        mode,
    }
}
