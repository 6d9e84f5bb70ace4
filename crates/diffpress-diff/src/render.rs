//! Text rendering shared by the compression strategies

use crate::types::{DiffDocument, FileChange, Hunk};
use std::fmt::Write;

/// Every compressed diff starts with this marker
pub const COMPRESSION_MARKER: &str = "# Compressed diff";

/// Upper bound on bytes a strategy adds beyond the rendered file content:
/// the marker header and section headings
pub const SUMMARY_OVERHEAD_BYTES: usize = 256;

/// First line of every compressed diff
pub fn marker_header(strategy: &str, doc: &DiffDocument) -> String {
    format!(
        "{COMPRESSION_MARKER} (strategy: {strategy}, files: {}, +{} -{})\n",
        doc.file_count(),
        doc.total_additions(),
        doc.total_deletions()
    )
}

/// One summary line per file, without any hunk content
pub fn stat_line(file: &FileChange) -> String {
    if file.is_binary {
        format!("{} | binary ({})", file.display_path(), file.status)
    } else {
        format!(
            "{} | +{} -{} ({})",
            file.display_path(),
            file.additions,
            file.deletions,
            file.status
        )
    }
}

pub fn push_stat_line(out: &mut String, file: &FileChange) {
    out.push_str(&stat_line(file));
    out.push('\n');
}

/// Section heading for a group of files, e.g. `## Stat only (12 files)`
pub fn push_section(out: &mut String, title: &str, count: usize) {
    let noun = if count == 1 { "file" } else { "files" };
    let _ = writeln!(out, "\n## {title} ({count} {noun})");
}

pub fn push_hunk(out: &mut String, hunk: &Hunk) {
    out.push_str(&hunk.header_line());
    out.push('\n');
    for line in &hunk.lines {
        out.push(line.kind.prefix());
        out.push_str(&line.text);
        out.push('\n');
    }
}

/// Headers and hunks of a file as they appeared, minus `index` lines
pub fn push_file(out: &mut String, file: &FileChange) {
    push_file_with_hunks(out, file, &file.hunks);
}

/// Headers of `file` followed by a replacement set of hunks
pub fn push_file_with_hunks(out: &mut String, file: &FileChange, hunks: &[Hunk]) {
    for header in &file.header_lines {
        out.push_str(header);
        out.push('\n');
    }
    for hunk in hunks {
        push_hunk(out, hunk);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_diff;

    const DIFF: &str = "diff --git a/src/lib.rs b/src/lib.rs
index 1111111..2222222 100644
--- a/src/lib.rs
+++ b/src/lib.rs
@@ -1,3 +1,3 @@ mod a;
 fn a() {}
-fn b() {}
+fn b() -> u8 { 0 }
 fn c() {}
diff --git a/logo.png b/logo.png
new file mode 100644
index 0000000..3333333
Binary files /dev/null and b/logo.png differ
";

    #[test]
    fn test_stat_lines() {
        let doc = parse_diff(DIFF).unwrap();
        assert_eq!(stat_line(&doc.files[0]), "src/lib.rs | +1 -1 (modified)");
        assert_eq!(stat_line(&doc.files[1]), "logo.png | binary (added)");
    }

    #[test]
    fn test_full_render_drops_only_index_lines() {
        let doc = parse_diff(DIFF).unwrap();
        let mut out = String::new();
        push_file(&mut out, &doc.files[0]);

        let expected: String = DIFF
            .lines()
            .take(9)
            .filter(|l| !l.starts_with("index "))
            .map(|l| format!("{l}\n"))
            .collect();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_marker_header_counts() {
        let doc = parse_diff(DIFF).unwrap();
        let header = marker_header("stat", &doc);
        assert!(header.starts_with(COMPRESSION_MARKER));
        assert_eq!(
            header,
            "# Compressed diff (strategy: stat, files: 2, +1 -1)\n"
        );
    }

    #[test]
    fn test_section_heading() {
        let mut out = String::new();
        push_section(&mut out, "Stat only", 1);
        push_section(&mut out, "Stat only", 3);
        assert_eq!(out, "\n## Stat only (1 file)\n\n## Stat only (3 files)\n");
    }
}
