//! Configuration management for diffpress
//!
//! Supports feature-specific configuration sections:
//! - [compression] - diff compression thresholds and strategy
//! - [prompt_file] - file-based prompt delivery settings
//! - [log] - logging level and optional log file

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Current configuration version
pub const CURRENT_CONFIG_VERSION: &str = "1";

/// Supported configuration versions
pub const SUPPORTED_CONFIG_VERSIONS: &[&str] = &["1"];

/// Repo-local config file name, looked up in the current directory
pub const REPO_CONFIG_FILE: &str = ".diffpress.toml";

const TRUTHY_VALUES: &[&str] = &["1", "true", "yes", "on"];

/// Fully resolved configuration. Every field carries a value; layers are
/// merged into this with [`Config::merge`] and [`Config::apply_env`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_config_version")]
    pub version: String,

    #[serde(default)]
    pub compression: CompressionSettings,

    #[serde(default)]
    pub prompt_file: PromptFileSettings,

    #[serde(default)]
    pub log: LogSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_config_version(),
            compression: CompressionSettings::default(),
            prompt_file: PromptFileSettings::default(),
            log: LogSettings::default(),
        }
    }
}

/// Diff compression settings, still unvalidated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionSettings {
    pub enabled: bool,
    pub strategy: String,
    pub size_threshold_bytes: usize,
    pub files_threshold: usize,
    pub max_priority_files: usize,
    /// Character ceiling for the assembled prompt
    pub token_limit: usize,
    pub smart_priority_enabled: bool,
    /// Path regexes excluded by the `filtered` strategy. Empty means built-in rules.
    pub exclude_patterns: Vec<String>,
    /// Path regexes penalized by the file scorer. Empty means built-in rules.
    pub score_penalty_patterns: Vec<String>,
}

impl Default for CompressionSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            strategy: "smart".to_string(),
            size_threshold_bytes: 50_000,
            files_threshold: 100,
            max_priority_files: 15,
            token_limit: 100_000,
            smart_priority_enabled: true,
            exclude_patterns: vec![],
            score_penalty_patterns: vec![],
        }
    }
}

/// File-based prompt delivery settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptFileSettings {
    pub enabled: bool,
    pub threshold_bytes: usize,
    /// Directory for prompt files, relative to the working tree
    pub temp_dir: String,
}

impl Default for PromptFileSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold_bytes: 50_000,
            temp_dir: ".diffpress/tmp".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
        }
    }
}

/// One configuration file as written on disk. Every key is optional so a
/// repo file can override a single value from the global file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    pub version: Option<String>,
    pub compression: Option<CompressionLayer>,
    pub prompt_file: Option<PromptFileLayer>,
    pub log: Option<LogLayer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompressionLayer {
    pub enabled: Option<bool>,
    pub strategy: Option<String>,
    pub size_threshold_bytes: Option<usize>,
    pub files_threshold: Option<usize>,
    pub max_priority_files: Option<usize>,
    pub token_limit: Option<usize>,
    pub smart_priority_enabled: Option<bool>,
    pub exclude_patterns: Option<Vec<String>>,
    pub score_penalty_patterns: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromptFileLayer {
    pub enabled: Option<bool>,
    pub threshold_bytes: Option<usize>,
    pub temp_dir: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogLayer {
    pub level: Option<String>,
    pub file: Option<String>,
}

fn default_config_version() -> String {
    CURRENT_CONFIG_VERSION.to_string()
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

/// Returns the config home, respecting `XDG_CONFIG_HOME`
pub fn get_config_home() -> Option<PathBuf> {
    match std::env::var_os("XDG_CONFIG_HOME") {
        Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => dirs::home_dir().map(|h| h.join(".config")),
    }
}

impl ConfigFile {
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl Config {
    /// Check if the configuration version is supported
    pub fn is_version_supported(&self) -> bool {
        SUPPORTED_CONFIG_VERSIONS.contains(&self.version.as_str())
    }

    /// Get the global config file path (`$XDG_CONFIG_HOME/diffpress/config.toml`)
    pub fn global_config_path() -> Option<PathBuf> {
        get_config_home().map(|h| h.join("diffpress").join("config.toml"))
    }

    /// Load configuration with priority:
    /// 1. Defaults
    /// 2. Global config
    /// 3. Repo config (.diffpress.toml)
    /// 4. Custom config passed on the command line
    /// 5. Environment variables
    ///
    /// CLI flags are applied by the caller on the returned value.
    pub fn load(custom: Option<&Path>) -> ConfigResult<Self> {
        let mut optional = Vec::new();
        if let Some(global) = Self::global_config_path() {
            optional.push(global);
        }
        optional.push(PathBuf::from(REPO_CONFIG_FILE));

        Self::load_from(&optional, custom, |key| std::env::var(key).ok())
    }

    /// Layered load with explicit paths and environment lookup.
    ///
    /// Missing `optional` files are skipped; a missing `custom` file is an error.
    pub fn load_from<F>(optional: &[PathBuf], custom: Option<&Path>, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        for path in optional {
            if path.exists() {
                tracing::debug!(path = %path.display(), "loading config layer");
                config = config.merge(ConfigFile::from_path(path)?);
            }
        }

        if let Some(path) = custom {
            tracing::debug!(path = %path.display(), "loading custom config");
            config = config.merge(ConfigFile::from_path(path)?);
        }

        config.apply_env(lookup)?;

        if !config.is_version_supported() {
            tracing::warn!(
                version = %config.version,
                supported = %SUPPORTED_CONFIG_VERSIONS.join(", "),
                "configuration version is not supported, using defaults where needed"
            );
        }

        Ok(config)
    }

    /// Merge a file layer into this config (the layer takes precedence)
    pub fn merge(mut self, other: ConfigFile) -> Self {
        set(&mut self.version, other.version);

        if let Some(layer) = other.compression {
            let c = &mut self.compression;
            set(&mut c.enabled, layer.enabled);
            set(&mut c.strategy, layer.strategy);
            set(&mut c.size_threshold_bytes, layer.size_threshold_bytes);
            set(&mut c.files_threshold, layer.files_threshold);
            set(&mut c.max_priority_files, layer.max_priority_files);
            set(&mut c.token_limit, layer.token_limit);
            set(&mut c.smart_priority_enabled, layer.smart_priority_enabled);
            set(&mut c.exclude_patterns, layer.exclude_patterns);
            set(&mut c.score_penalty_patterns, layer.score_penalty_patterns);
        }

        if let Some(layer) = other.prompt_file {
            let p = &mut self.prompt_file;
            set(&mut p.enabled, layer.enabled);
            set(&mut p.threshold_bytes, layer.threshold_bytes);
            set(&mut p.temp_dir, layer.temp_dir);
        }

        if let Some(layer) = other.log {
            set(&mut self.log.level, layer.level);
            if layer.file.is_some() {
                self.log.file = layer.file;
            }
        }

        self
    }

    /// Apply `DIFFPRESS_*` environment overrides read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let c = &mut self.compression;

        // Long form takes precedence over the short form
        if let Some(value) = lookup("DIFFPRESS_COMPRESSION_ENABLED") {
            c.enabled = parse_bool(&value);
        } else if let Some(value) = lookup("DIFFPRESS_COMPRESSION") {
            c.enabled = parse_bool(&value);
        }

        if let Some(value) = lookup("DIFFPRESS_STRATEGY").filter(|v| !v.is_empty()) {
            c.strategy = value;
        }
        set(
            &mut c.size_threshold_bytes,
            parse_usize_env(&lookup, "DIFFPRESS_SIZE_THRESHOLD")?,
        );
        set(
            &mut c.files_threshold,
            parse_usize_env(&lookup, "DIFFPRESS_FILES_THRESHOLD")?,
        );
        set(
            &mut c.max_priority_files,
            parse_usize_env(&lookup, "DIFFPRESS_MAX_PRIORITY_FILES")?,
        );
        set(
            &mut c.token_limit,
            parse_usize_env(&lookup, "DIFFPRESS_TOKEN_LIMIT")?,
        );
        if let Some(value) = lookup("DIFFPRESS_SMART_PRIORITY_ENABLED") {
            c.smart_priority_enabled = parse_bool(&value);
        }

        let p = &mut self.prompt_file;
        if let Some(value) = lookup("DIFFPRESS_PROMPT_FILE_ENABLED") {
            p.enabled = parse_bool(&value);
        }
        set(
            &mut p.threshold_bytes,
            parse_usize_env(&lookup, "DIFFPRESS_PROMPT_FILE_THRESHOLD")?,
        );

        if let Some(value) = lookup("DIFFPRESS_LOG_LEVEL").filter(|v| !v.is_empty()) {
            self.log.level = value;
        }
        if let Some(value) = lookup("DIFFPRESS_LOG_FILE").filter(|v| !v.is_empty()) {
            self.log.file = Some(value);
        }

        Ok(())
    }
}

/// `1/true/yes/on` in any case are true, everything else is false
pub fn parse_bool(value: &str) -> bool {
    TRUTHY_VALUES.contains(&value.trim().to_lowercase().as_str())
}

fn parse_usize_env<F>(lookup: &F, key: &str) -> ConfigResult<Option<usize>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<usize>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw.clone(),
                reason: e.to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.version, "1");
        assert!(config.compression.enabled);
        assert_eq!(config.compression.strategy, "smart");
        assert_eq!(config.compression.size_threshold_bytes, 50_000);
        assert_eq!(config.compression.files_threshold, 100);
        assert_eq!(config.compression.max_priority_files, 15);
        assert_eq!(config.compression.token_limit, 100_000);
        assert!(config.prompt_file.enabled);
        assert_eq!(config.prompt_file.threshold_bytes, 50_000);
        assert_eq!(config.log.level, "warn");
    }

    #[test]
    fn test_partial_layer_keeps_other_values() {
        let toml_str = r#"
[compression]
strategy = "compact"
"#;
        let layer: ConfigFile = toml::from_str(toml_str).unwrap();
        let config = Config::default().merge(layer);

        assert_eq!(config.compression.strategy, "compact");
        assert_eq!(config.compression.token_limit, 100_000);
        assert!(config.prompt_file.enabled);
    }

    #[test]
    fn test_later_layers_take_precedence() {
        let temp_dir = TempDir::new().unwrap();
        let global = temp_dir.path().join("global.toml");
        let repo = temp_dir.path().join("repo.toml");
        let missing = temp_dir.path().join("missing.toml");

        fs::write(
            &global,
            "[compression]\nstrategy = \"stat\"\nfiles_threshold = 10\n",
        )
        .unwrap();
        fs::write(&repo, "[compression]\nstrategy = \"filtered\"\n").unwrap();

        let config =
            Config::load_from(&[global, missing, repo], None, env(&[])).unwrap();
        assert_eq!(config.compression.strategy, "filtered");
        assert_eq!(config.compression.files_threshold, 10);
    }

    #[test]
    fn test_missing_custom_config_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope.toml");

        let err = Config::load_from(&[], Some(&missing), env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.toml");
        fs::write(&path, "[compression\nstrategy = ").unwrap();

        let err = Config::load_from(&[path], None, env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_env_overrides_files() {
        let mut config = Config::default();
        config
            .apply_env(env(&[
                ("DIFFPRESS_STRATEGY", "function-context"),
                ("DIFFPRESS_SIZE_THRESHOLD", "1234"),
                ("DIFFPRESS_PROMPT_FILE_ENABLED", "no"),
                ("DIFFPRESS_SMART_PRIORITY_ENABLED", "OFF"),
                ("DIFFPRESS_LOG_LEVEL", "debug"),
            ]))
            .unwrap();

        assert_eq!(config.compression.strategy, "function-context");
        assert_eq!(config.compression.size_threshold_bytes, 1234);
        assert!(!config.prompt_file.enabled);
        assert!(!config.compression.smart_priority_enabled);
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn test_long_enable_flag_wins_over_short() {
        let mut config = Config::default();
        config
            .apply_env(env(&[
                ("DIFFPRESS_COMPRESSION_ENABLED", "true"),
                ("DIFFPRESS_COMPRESSION", "0"),
            ]))
            .unwrap();
        assert!(config.compression.enabled);

        let mut config = Config::default();
        config
            .apply_env(env(&[("DIFFPRESS_COMPRESSION", "0")]))
            .unwrap();
        assert!(!config.compression.enabled);
    }

    #[test]
    fn test_invalid_env_number_is_rejected() {
        let mut config = Config::default();
        let err = config
            .apply_env(env(&[("DIFFPRESS_TOKEN_LIMIT", "lots")]))
            .unwrap_err();

        match err {
            ConfigError::InvalidValue { key, value, .. } => {
                assert_eq!(key, "DIFFPRESS_TOKEN_LIMIT");
                assert_eq!(value, "lots");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_bool() {
        for value in ["1", "true", "TRUE", "yes", "On", " on "] {
            assert!(parse_bool(value), "{value} should be true");
        }
        for value in ["0", "false", "off", "", "maybe"] {
            assert!(!parse_bool(value), "{value} should be false");
        }
    }

    #[test]
    fn test_config_version_validation() {
        let config = Config::default();
        assert!(config.is_version_supported());

        let unsupported = Config {
            version: "999".to_string(),
            ..Default::default()
        };
        assert!(!unsupported.is_version_supported());
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = Config::default();
        let rendered = toml::to_string_pretty(&config).unwrap();
        assert!(rendered.contains("[compression]"));
        assert!(rendered.contains("strategy = \"smart\""));

        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }
}
