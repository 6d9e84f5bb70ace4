use super::inclusion;
use crate::render::{marker_header, push_stat_line};
use crate::types::{DiffDocument, FileInclusion, InclusionMode};

/// Per-file path and counts, no hunk bodies
pub(super) fn compress(doc: &DiffDocument) -> (String, Vec<FileInclusion>) {
    let mut out = marker_header("stat", doc);
    let mut files = Vec::with_capacity(doc.file_count());

    for file in &doc.files {
        push_stat_line(&mut out, file);
        files.push(inclusion(&file.path, InclusionMode::StatOnly));
    }

    (out, files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_diff;

    #[test]
    fn test_stat_lists_every_file_without_bodies() {
        let diff = "diff --git a/a.rs b/a.rs
--- a/a.rs
+++ b/a.rs
@@ -1,2 +1,2 @@
-let x = 1;
+let x = 2;
 done();
diff --git a/b.rs b/b.rs
deleted file mode 100644
--- a/b.rs
+++ /dev/null
@@ -1,2 +0,0 @@
-one
-two
";
        let doc = parse_diff(diff).unwrap();
        let (text, files) = compress(&doc);

        assert_eq!(
            text,
            "# Compressed diff (strategy: stat, files: 2, +1 -3)\n\
             a.rs | +1 -1 (modified)\n\
             b.rs | +0 -2 (deleted)\n"
        );
        assert!(files.iter().all(|f| f.mode == InclusionMode::StatOnly));
        assert!(!text.contains("let x"));
    }
}
