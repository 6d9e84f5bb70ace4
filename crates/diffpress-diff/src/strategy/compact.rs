use super::inclusion;
use crate::render::{marker_header, push_file_with_hunks, push_section, push_stat_line};
use crate::types::{
    DiffDocument, DiffLine, FileChange, FileInclusion, Hunk, InclusionMode, LineKind,
};

/// Context lines kept on each side of a changed region
const CONTEXT_LINES: usize = 1;

/// Every change line unchanged, one line of context around each changed region
pub(super) fn compress(doc: &DiffDocument) -> (String, Vec<FileInclusion>) {
    let mut out = marker_header("compact", doc);
    let mut files = Vec::with_capacity(doc.file_count());
    let mut binaries: Vec<&FileChange> = Vec::new();

    for file in &doc.files {
        if file.is_binary {
            binaries.push(file);
            files.push(inclusion(&file.path, InclusionMode::StatOnly));
            continue;
        }
        let hunks: Vec<Hunk> = file.hunks.iter().flat_map(compact_hunk).collect();
        push_file_with_hunks(&mut out, file, &hunks);
        files.push(inclusion(&file.path, InclusionMode::Full));
    }

    if !binaries.is_empty() {
        push_section(&mut out, "Binary files", binaries.len());
        for file in binaries {
            push_stat_line(&mut out, file);
        }
    }

    (out, files)
}

/// Split a hunk into sub-hunks that keep [`CONTEXT_LINES`] of context around
/// each run of changes.
///
/// Runs whose context windows overlap or touch share a sub-hunk; any wider
/// gap is dropped.
pub(crate) fn compact_hunk(hunk: &Hunk) -> Vec<Hunk> {
    let lines = &hunk.lines;
    let mut regions: Vec<(usize, usize)> = Vec::new();

    for (index, line) in lines.iter().enumerate() {
        if !line.kind.is_change() {
            continue;
        }
        let lo = index.saturating_sub(CONTEXT_LINES);
        let hi = (index + 1 + CONTEXT_LINES).min(lines.len());
        match regions.last_mut() {
            Some(last) if lo <= last.1 => last.1 = last.1.max(hi),
            _ => regions.push((lo, hi)),
        }
    }

    if regions.is_empty() {
        return vec![hunk.clone()];
    }

    regions
        .into_iter()
        .enumerate()
        .map(|(i, (lo, hi))| sub_hunk(hunk, lo, hi, i == 0))
        .collect()
}

/// Lines `lo..hi` of `hunk` as a standalone hunk with recomputed starts
pub(crate) fn sub_hunk(hunk: &Hunk, lo: usize, hi: usize, keep_section: bool) -> Hunk {
    let skipped = &hunk.lines[..lo];
    let old_skipped = skipped.iter().filter(|l| l.kind != LineKind::Add).count();
    let new_skipped = skipped.iter().filter(|l| l.kind != LineKind::Remove).count();
    let section = if keep_section {
        hunk.section.clone()
    } else {
        String::new()
    };
    let lines: Vec<DiffLine> = hunk.lines[lo..hi].to_vec();
    Hunk::from_lines(
        hunk.old_start + old_skipped,
        hunk.new_start + new_skipped,
        section,
        lines,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_diff;

    fn context(text: &str) -> DiffLine {
        DiffLine::new(LineKind::Context, text)
    }

    #[test]
    fn test_context_trimmed_to_one_line() {
        let hunk = Hunk::from_lines(
            10,
            10,
            "impl Foo {",
            vec![
                context("a"),
                context("b"),
                context("c"),
                DiffLine::new(LineKind::Remove, "old"),
                DiffLine::new(LineKind::Add, "new"),
                context("d"),
                context("e"),
                context("f"),
            ],
        );

        let compacted = compact_hunk(&hunk);
        assert_eq!(compacted.len(), 1);
        let sub = &compacted[0];
        assert_eq!(sub.old_start, 12);
        assert_eq!(sub.new_start, 12);
        assert_eq!(sub.section, "impl Foo {");
        let texts: Vec<&str> = sub.lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["c", "old", "new", "d"]);
        assert_eq!(sub.header_line(), "@@ -12,3 +12,3 @@ impl Foo {");
    }

    #[test]
    fn test_distant_changes_split_into_sub_hunks() {
        let mut lines = vec![DiffLine::new(LineKind::Add, "first")];
        for i in 0..20 {
            lines.push(context(&format!("a fairly long unchanged context line {i}")));
        }
        lines.push(DiffLine::new(LineKind::Remove, "last"));
        let hunk = Hunk::from_lines(1, 1, "fn main() {", lines);

        let compacted = compact_hunk(&hunk);
        assert_eq!(compacted.len(), 2);
        assert_eq!(compacted[0].lines.len(), 2);
        assert_eq!(compacted[1].lines.len(), 2);
        assert_eq!(compacted[1].section, "");
        // One addition and 19 context lines precede the second sub-hunk
        assert_eq!(compacted[1].old_start, 20);
        assert_eq!(compacted[1].new_start, 21);
    }

    #[test]
    fn test_touching_windows_share_a_hunk() {
        let hunk = Hunk::from_lines(
            1,
            1,
            "",
            vec![
                DiffLine::new(LineKind::Add, "x"),
                context("p"),
                context("q"),
                DiffLine::new(LineKind::Add, "y"),
            ],
        );
        let compacted = compact_hunk(&hunk);
        assert_eq!(compacted.len(), 1);
        assert_eq!(compacted[0].lines.len(), 4);
    }

    #[test]
    fn test_three_line_gap_is_split() {
        let hunk = Hunk::from_lines(
            1,
            1,
            "",
            vec![
                DiffLine::new(LineKind::Add, "x"),
                context(""),
                context("middle"),
                context(""),
                DiffLine::new(LineKind::Add, "y"),
            ],
        );
        let compacted = compact_hunk(&hunk);
        assert_eq!(compacted.len(), 2);
        let texts: Vec<Vec<&str>> = compacted
            .iter()
            .map(|h| h.lines.iter().map(|l| l.text.as_str()).collect())
            .collect();
        assert_eq!(texts, vec![vec!["x", ""], vec!["", "y"]]);
        assert!(!texts.concat().contains(&"middle"));
        assert_eq!(compacted[1].header_line(), "@@ -3 +4,2 @@");
    }

    #[test]
    fn test_binary_files_are_stat_only() {
        let diff = "diff --git a/img.png b/img.png
index 1111111..2222222 100644
Binary files a/img.png and b/img.png differ
diff --git a/src/a.rs b/src/a.rs
--- a/src/a.rs
+++ b/src/a.rs
@@ -1,5 +1,5 @@
 one
 two
-three
+THREE
 four
 five
";
        let doc = parse_diff(diff).unwrap();
        let (text, files) = compress(&doc);

        assert_eq!(files[0].mode, InclusionMode::StatOnly);
        assert_eq!(files[1].mode, InclusionMode::Full);
        assert!(text.contains("@@ -2,3 +2,3 @@\n two\n-three\n+THREE\n four\n"));
        assert!(!text.contains(" one\n"));
        assert!(text.contains("img.png | binary (modified)"));
    }
}
