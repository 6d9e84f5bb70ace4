//! Validated settings consumed by the pipeline

use crate::rules::ExclusionRules;
use crate::strategy::Strategy;
use diffpress_core::{CompressionSettings, ConfigError, ConfigResult, PromptFileSettings};
use std::path::PathBuf;

pub const MAX_PRIORITY_FILES_RANGE: (usize, usize) = (1, 50);
pub const MIN_TOKEN_LIMIT: usize = 10_000;
pub const MIN_PROMPT_FILE_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub strategy: Strategy,
    pub size_threshold_bytes: usize,
    pub files_threshold: usize,
    pub max_priority_files: usize,
    /// Hard character ceiling for the assembled prompt; `smart` checks its
    /// output against it in bytes
    pub token_limit: usize,
    pub smart_priority_enabled: bool,
    /// Paths the `filtered` strategy drops from full rendering
    pub filter_rules: ExclusionRules,
    /// Paths the scorer penalizes
    pub score_rules: ExclusionRules,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            strategy: Strategy::Smart,
            size_threshold_bytes: 50_000,
            files_threshold: 100,
            max_priority_files: 15,
            token_limit: 100_000,
            smart_priority_enabled: true,
            filter_rules: ExclusionRules::default(),
            score_rules: ExclusionRules::default(),
        }
    }
}

impl CompressionConfig {
    /// Validate raw settings. Unknown strategies and out-of-range values are
    /// rejected rather than clamped.
    pub fn from_settings(settings: &CompressionSettings) -> ConfigResult<Self> {
        let strategy: Strategy = settings.strategy.parse()?;

        let (min_files, max_files) = MAX_PRIORITY_FILES_RANGE;
        if !(min_files..=max_files).contains(&settings.max_priority_files) {
            return Err(out_of_range(
                "compression.max_priority_files",
                settings.max_priority_files,
                format!("{min_files}..={max_files}"),
            ));
        }
        if settings.token_limit < MIN_TOKEN_LIMIT {
            return Err(out_of_range(
                "compression.token_limit",
                settings.token_limit,
                format!(">= {MIN_TOKEN_LIMIT}"),
            ));
        }
        if settings.size_threshold_bytes == 0 {
            return Err(out_of_range(
                "compression.size_threshold_bytes",
                0,
                ">= 1".to_string(),
            ));
        }
        if settings.files_threshold == 0 {
            return Err(out_of_range(
                "compression.files_threshold",
                0,
                ">= 1".to_string(),
            ));
        }

        Ok(Self {
            enabled: settings.enabled,
            strategy,
            size_threshold_bytes: settings.size_threshold_bytes,
            files_threshold: settings.files_threshold,
            max_priority_files: settings.max_priority_files,
            token_limit: settings.token_limit,
            smart_priority_enabled: settings.smart_priority_enabled,
            filter_rules: ExclusionRules::new(&settings.exclude_patterns)?,
            score_rules: ExclusionRules::new(&settings.score_penalty_patterns)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryConfig {
    pub enabled: bool,
    pub threshold_bytes: usize,
    /// Scoped directory for prompt files, relative to the working tree
    pub temp_dir: PathBuf,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold_bytes: 50_000,
            temp_dir: PathBuf::from(".diffpress/tmp"),
        }
    }
}

impl DeliveryConfig {
    pub fn from_settings(settings: &PromptFileSettings) -> ConfigResult<Self> {
        if settings.threshold_bytes < MIN_PROMPT_FILE_THRESHOLD {
            return Err(out_of_range(
                "prompt_file.threshold_bytes",
                settings.threshold_bytes,
                format!(">= {MIN_PROMPT_FILE_THRESHOLD}"),
            ));
        }
        if settings.temp_dir.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "prompt_file.temp_dir".to_string(),
                value: settings.temp_dir.clone(),
                reason: "must not be empty".to_string(),
            });
        }

        Ok(Self {
            enabled: settings.enabled,
            threshold_bytes: settings.threshold_bytes,
            temp_dir: PathBuf::from(&settings.temp_dir),
        })
    }
}

fn out_of_range(key: &str, value: usize, expected: String) -> ConfigError {
    ConfigError::OutOfRange {
        key: key.to_string(),
        value: value as u64,
        expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = CompressionConfig::from_settings(&CompressionSettings::default()).unwrap();
        assert_eq!(config.strategy, Strategy::Smart);
        assert_eq!(config.max_priority_files, 15);
        assert_eq!(config.token_limit, 100_000);

        let delivery = DeliveryConfig::from_settings(&PromptFileSettings::default()).unwrap();
        assert_eq!(delivery, DeliveryConfig::default());
    }

    #[test]
    fn test_unknown_strategy_is_rejected() {
        let settings = CompressionSettings {
            strategy: "zip".to_string(),
            ..Default::default()
        };
        let err = CompressionConfig::from_settings(&settings).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownStrategy { .. }));
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        let cases = [
            CompressionSettings {
                max_priority_files: 0,
                ..Default::default()
            },
            CompressionSettings {
                max_priority_files: 51,
                ..Default::default()
            },
            CompressionSettings {
                token_limit: 9_999,
                ..Default::default()
            },
            CompressionSettings {
                size_threshold_bytes: 0,
                ..Default::default()
            },
            CompressionSettings {
                files_threshold: 0,
                ..Default::default()
            },
        ];
        for settings in cases {
            let err = CompressionConfig::from_settings(&settings).unwrap_err();
            assert!(matches!(err, ConfigError::OutOfRange { .. }), "{settings:?}");
        }

        let settings = PromptFileSettings {
            threshold_bytes: 512,
            ..Default::default()
        };
        let err = DeliveryConfig::from_settings(&settings).unwrap_err();
        assert!(err.to_string().contains("prompt_file.threshold_bytes"));
    }

    #[test]
    fn test_rule_sets_are_independent() {
        let settings = CompressionSettings {
            exclude_patterns: vec![r"^docs/".to_string()],
            ..Default::default()
        };
        let config = CompressionConfig::from_settings(&settings).unwrap();
        assert!(config.filter_rules.is_match("docs/a.md"));
        assert!(!config.filter_rules.is_match("Cargo.lock"));
        assert!(config.score_rules.is_match("Cargo.lock"));
        assert!(!config.score_rules.is_match("docs/a.md"));
    }
}
