//! Tracing subscriber setup shared by the diffpress binaries

use crate::config::LogSettings;
use crate::error::{ConfigError, ConfigResult};
use std::path::Path;
use std::str::FromStr;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;

/// Parse a level name such as `warn` or `debug` (`off` disables logging)
pub fn parse_level(level: &str) -> ConfigResult<LevelFilter> {
    LevelFilter::from_str(level.trim()).map_err(|e| ConfigError::InvalidValue {
        key: "log.level".to_string(),
        value: level.to_string(),
        reason: e.to_string(),
    })
}

/// Install the global fmt subscriber.
///
/// Logs go to stderr unless `settings.file` is set, in which case they are
/// appended to that file through a non-blocking writer. The returned guard
/// must be held until exit so buffered lines are flushed. Installing twice
/// is a no-op.
pub fn init_logging(settings: &LogSettings) -> ConfigResult<Option<WorkerGuard>> {
    let level = parse_level(&settings.level)?;

    let Some(file) = settings.file.as_deref() else {
        let _ = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init();
        return Ok(None);
    };

    let path = Path::new(file);
    let file_name = path
        .file_name()
        .ok_or_else(|| ConfigError::InvalidValue {
            key: "log.file".to_string(),
            value: file.to_string(),
            reason: "path has no file name".to_string(),
        })?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(writer)
        .try_init();

    Ok(Some(guard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("warn").unwrap(), LevelFilter::WARN);
        assert_eq!(parse_level("DEBUG").unwrap(), LevelFilter::DEBUG);
        assert_eq!(parse_level("off").unwrap(), LevelFilter::OFF);
        assert!(matches!(
            parse_level("loud"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_log_file_without_name_is_rejected() {
        let settings = LogSettings {
            level: "info".to_string(),
            file: Some("/".to_string()),
        };
        assert!(init_logging(&settings).is_err());
    }
}
