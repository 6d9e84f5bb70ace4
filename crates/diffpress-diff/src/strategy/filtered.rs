use super::inclusion;
use crate::config::CompressionConfig;
use crate::render::{marker_header, push_file, push_section, push_stat_line};
use crate::types::{DiffDocument, FileChange, FileInclusion, InclusionMode};

/// Full rendering of every file except binaries and paths matching the
/// filter rules, which are listed with their counts instead
pub(super) fn compress(
    doc: &DiffDocument,
    config: &CompressionConfig,
) -> (String, Vec<FileInclusion>) {
    let mut out = marker_header("filtered", doc);
    let mut files = Vec::with_capacity(doc.file_count());
    let mut excluded: Vec<&FileChange> = Vec::new();

    for file in &doc.files {
        if file.is_binary || config.filter_rules.is_match(&file.path) {
            tracing::trace!(path = %file.path, "excluding file from full rendering");
            excluded.push(file);
            files.push(inclusion(&file.path, InclusionMode::Excluded));
            continue;
        }
        push_file(&mut out, file);
        files.push(inclusion(&file.path, InclusionMode::Full));
    }

    if !excluded.is_empty() {
        push_section(&mut out, "Excluded files", excluded.len());
        for file in excluded {
            push_stat_line(&mut out, file);
        }
    }

    (out, files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_diff;
    use crate::rules::ExclusionRules;

    const DIFF: &str = "diff --git a/Cargo.lock b/Cargo.lock
--- a/Cargo.lock
+++ b/Cargo.lock
@@ -1,2 +1,2 @@
 [[package]]
-version = \"1.0.0\"
+version = \"1.0.1\"
diff --git a/src/main.rs b/src/main.rs
--- a/src/main.rs
+++ b/src/main.rs
@@ -1 +1 @@
-fn main() {}
+fn main() { run() }
diff --git a/img.png b/img.png
Binary files a/img.png and b/img.png differ
";

    #[test]
    fn test_low_signal_and_binary_files_are_listed_not_rendered() {
        let doc = parse_diff(DIFF).unwrap();
        let (text, files) = compress(&doc, &CompressionConfig::default());

        let modes: Vec<InclusionMode> = files.iter().map(|f| f.mode).collect();
        assert_eq!(
            modes,
            vec![
                InclusionMode::Excluded,
                InclusionMode::Full,
                InclusionMode::Excluded
            ]
        );
        assert!(text.contains("+fn main() { run() }"));
        assert!(!text.contains("version = \"1.0.1\""));
        assert!(text.contains("## Excluded files (2 files)\nCargo.lock | +1 -1 (modified)\nimg.png | binary (modified)\n"));
    }

    #[test]
    fn test_custom_filter_rules() {
        let doc = parse_diff(DIFF).unwrap();
        let config = CompressionConfig {
            filter_rules: ExclusionRules::new(&[r"^src/".to_string()]).unwrap(),
            ..Default::default()
        };
        let (text, files) = compress(&doc, &config);

        assert_eq!(files[0].mode, InclusionMode::Full);
        assert_eq!(files[1].mode, InclusionMode::Excluded);
        assert!(text.contains("version = \"1.0.1\""));
    }
}
