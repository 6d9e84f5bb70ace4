//! Decides whether a diff is large enough to compress

use crate::config::CompressionConfig;
use crate::types::DiffDocument;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdDecision {
    Skip,
    Compress,
}

/// Compress when either the byte size or the file count is over its threshold
pub fn evaluate(doc: &DiffDocument, config: &CompressionConfig) -> ThresholdDecision {
    if !config.enabled {
        return ThresholdDecision::Skip;
    }
    let over_size = doc.total_bytes > config.size_threshold_bytes;
    let over_files = doc.file_count() > config.files_threshold;
    if over_size || over_files {
        ThresholdDecision::Compress
    } else {
        ThresholdDecision::Skip
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FileChange, FileStatus};

    fn doc(files: usize, total_bytes: usize) -> DiffDocument {
        let files = (0..files)
            .map(|i| FileChange {
                path: format!("src/f{i}.rs"),
                old_path: None,
                status: FileStatus::Modified,
                is_binary: false,
                additions: 1,
                deletions: 0,
                header_lines: vec![],
                hunks: vec![],
            })
            .collect();
        DiffDocument { files, total_bytes }
    }

    #[test]
    fn test_small_diff_is_skipped() {
        let config = CompressionConfig::default();
        assert_eq!(evaluate(&doc(3, 4_000), &config), ThresholdDecision::Skip);
    }

    #[test]
    fn test_thresholds_are_exclusive() {
        let config = CompressionConfig::default();
        assert_eq!(evaluate(&doc(100, 50_000), &config), ThresholdDecision::Skip);
        assert_eq!(evaluate(&doc(101, 10), &config), ThresholdDecision::Compress);
        assert_eq!(evaluate(&doc(1, 50_001), &config), ThresholdDecision::Compress);
    }

    #[test]
    fn test_disabled_always_skips() {
        let config = CompressionConfig {
            enabled: false,
            ..Default::default()
        };
        assert_eq!(evaluate(&doc(500, 900_000), &config), ThresholdDecision::Skip);
    }
}
