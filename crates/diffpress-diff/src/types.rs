//! Type definitions for diff processing

use serde::Serialize;
use std::fmt;

/// Kind of a single line inside a hunk body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Context,
    Add,
    Remove,
}

impl LineKind {
    pub fn prefix(self) -> char {
        match self {
            LineKind::Context => ' ',
            LineKind::Add => '+',
            LineKind::Remove => '-',
        }
    }

    pub fn is_change(self) -> bool {
        !matches!(self, LineKind::Context)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub kind: LineKind,
    /// Line content without the leading prefix character
    pub text: String,
}

impl DiffLine {
    pub fn new(kind: LineKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// A contiguous block of changes with its surrounding context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    pub old_start: usize,
    pub old_lines: usize,
    pub new_start: usize,
    pub new_lines: usize,
    /// Text git prints after the closing `@@`, usually the enclosing function
    pub section: String,
    pub lines: Vec<DiffLine>,
}

impl Hunk {
    /// Build a hunk from a slice of lines, deriving the line counts
    pub fn from_lines(
        old_start: usize,
        new_start: usize,
        section: impl Into<String>,
        lines: Vec<DiffLine>,
    ) -> Self {
        let old_lines = lines.iter().filter(|l| l.kind != LineKind::Add).count();
        let new_lines = lines.iter().filter(|l| l.kind != LineKind::Remove).count();
        Self {
            old_start,
            old_lines,
            new_start,
            new_lines,
            section: section.into(),
            lines,
        }
    }

    /// Header line in git's format, omitting counts equal to one
    pub fn header_line(&self) -> String {
        let mut header = format!(
            "@@ -{} +{} @@",
            format_range(self.old_start, self.old_lines),
            format_range(self.new_start, self.new_lines)
        );
        if !self.section.is_empty() {
            header.push(' ');
            header.push_str(&self.section);
        }
        header
    }

    pub fn additions(&self) -> usize {
        self.lines.iter().filter(|l| l.kind == LineKind::Add).count()
    }

    pub fn deletions(&self) -> usize {
        self.lines.iter().filter(|l| l.kind == LineKind::Remove).count()
    }
}

fn format_range(start: usize, count: usize) -> String {
    if count == 1 {
        start.to_string()
    } else {
        format!("{},{}", start, count)
    }
}

/// Type of change detected in a git diff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Deleted,
    Modified,
    Renamed,
}

impl FileStatus {
    pub fn as_str(&self) -> &str {
        match self {
            FileStatus::Added => "added",
            FileStatus::Deleted => "deleted",
            FileStatus::Modified => "modified",
            FileStatus::Renamed => "renamed",
        }
    }

    /// Added, deleted and renamed files change the shape of the tree
    pub fn is_structural(&self) -> bool {
        !matches!(self, FileStatus::Modified)
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents a single file change in a git diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: String,
    pub old_path: Option<String>,
    pub status: FileStatus,
    pub is_binary: bool,
    pub additions: usize,
    pub deletions: usize,
    /// Extended header lines as they appeared (`diff --git`, mode, rename,
    /// `---`/`+++`), without `index` lines
    pub header_lines: Vec<String>,
    pub hunks: Vec<Hunk>,
}

impl FileChange {
    pub fn changed_lines(&self) -> usize {
        self.additions + self.deletions
    }

    /// Path shown in summaries, `old => new` for renames
    pub fn display_path(&self) -> String {
        match (&self.old_path, self.status) {
            (Some(old), FileStatus::Renamed) if old != &self.path => {
                format!("{} => {}", old, self.path)
            }
            _ => self.path.clone(),
        }
    }
}

/// A parsed diff. Built once per invocation and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffDocument {
    pub files: Vec<FileChange>,
    /// Size of the raw diff text in bytes
    pub total_bytes: usize,
}

impl DiffDocument {
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn total_additions(&self) -> usize {
        self.files.iter().map(|f| f.additions).sum()
    }

    pub fn total_deletions(&self) -> usize {
        self.files.iter().map(|f| f.deletions).sum()
    }
}

/// How a file made it into a compressed diff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InclusionMode {
    Full,
    StatOnly,
    Excluded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileInclusion {
    pub path: String,
    pub mode: InclusionMode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_status_strings() {
        assert_eq!(FileStatus::Added.as_str(), "added");
        assert_eq!(FileStatus::Deleted.as_str(), "deleted");
        assert_eq!(FileStatus::Modified.as_str(), "modified");
        assert_eq!(FileStatus::Renamed.as_str(), "renamed");
        assert!(FileStatus::Renamed.is_structural());
        assert!(!FileStatus::Modified.is_structural());
    }

    #[test]
    fn test_header_line_omits_single_counts() {
        let hunk = Hunk::from_lines(
            7,
            7,
            "",
            vec![
                DiffLine::new(LineKind::Remove, "old"),
                DiffLine::new(LineKind::Add, "new"),
            ],
        );
        assert_eq!(hunk.header_line(), "@@ -7 +7 @@");

        let hunk = Hunk::from_lines(
            1,
            1,
            "fn main() {",
            vec![
                DiffLine::new(LineKind::Context, "a"),
                DiffLine::new(LineKind::Add, "b"),
            ],
        );
        assert_eq!(hunk.header_line(), "@@ -1 +1,2 @@ fn main() {");
    }

    #[test]
    fn test_display_path_for_rename() {
        let file = FileChange {
            path: "src/new.rs".to_string(),
            old_path: Some("src/old.rs".to_string()),
            status: FileStatus::Renamed,
            is_binary: false,
            additions: 0,
            deletions: 0,
            header_lines: vec![],
            hunks: vec![],
        };
        assert_eq!(file.display_path(), "src/old.rs => src/new.rs");
    }
}
