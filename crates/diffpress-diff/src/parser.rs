//! Unified diff parsing
//!
//! Hunk bodies are consumed according to the line counts in their `@@`
//! header, so a removed line whose text starts with `--` is still read as a
//! deletion rather than a file header.

use crate::error::ParseError;
use crate::types::{DiffDocument, DiffLine, FileChange, FileStatus, Hunk, LineKind};
use regex::Regex;
use std::sync::LazyLock;

static DIFF_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^diff --git "?a/(.*?)"? "?b/(.*?)"?$"#).expect("diff header regex")
});

static HUNK_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@ ?(.*)$").expect("hunk header regex")
});

/// Parse git diff content into a [`DiffDocument`].
///
/// Empty or whitespace-only input yields an empty document. Text before the
/// first file header (commit messages, diffstats) is ignored.
pub fn parse_diff(diff_content: &str) -> Result<DiffDocument, ParseError> {
    let lines: Vec<&str> = diff_content.lines().collect();
    let mut files = Vec::new();
    let mut current: Option<FileBuilder> = None;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let line_number = i + 1;
        i += 1;

        if let Some(file) = current.as_mut() {
            if file.accepts_body_line(line) {
                file.push_body_line(line);
                continue;
            }
        }

        if line.starts_with("diff --git ") {
            finish_file(&mut current, &mut files);
            current = Some(FileBuilder::from_git_header(line));
            continue;
        }

        // File label pair: part of a git header, or the start of a file in
        // plain `diff -u` output
        if line.starts_with("--- ") && lines.get(i).is_some_and(|next| next.starts_with("+++ ")) {
            let plus_line = lines[i];
            i += 1;

            let starts_new_file = current
                .as_ref()
                .map_or(true, |file| file.has_hunks() || file.closed);
            if starts_new_file {
                finish_file(&mut current, &mut files);
                current = Some(FileBuilder::from_labels(line, plus_line));
            } else if let Some(file) = current.as_mut() {
                file.apply_labels(line, plus_line);
            }
            continue;
        }

        match current.as_mut() {
            Some(file) => file.consume(line, line_number)?,
            None => {
                if line.starts_with("@@") {
                    return Err(ParseError::new(
                        line_number,
                        line,
                        "hunk header outside of a file section",
                    ));
                }
                if is_change_line(line) && line != "---" {
                    return Err(ParseError::new(
                        line_number,
                        line,
                        "hunk body without a hunk header",
                    ));
                }
                // Preamble text before the first file
            }
        }
    }

    finish_file(&mut current, &mut files);

    Ok(DiffDocument {
        files,
        total_bytes: diff_content.len(),
    })
}

fn finish_file(current: &mut Option<FileBuilder>, files: &mut Vec<FileChange>) {
    if let Some(builder) = current.take() {
        files.push(builder.finish());
    }
}

fn is_change_line(line: &str) -> bool {
    line.starts_with('+') || line.starts_with('-')
}

/// Path from a `---`/`+++` label, `None` for `/dev/null`
fn label_path(label: &str) -> Option<String> {
    let raw = label.get(4..).unwrap_or_default();
    let raw = raw.split('\t').next().unwrap_or_default().trim();
    let raw = raw.trim_matches('"');
    if raw.is_empty() || raw == "/dev/null" {
        return None;
    }
    let stripped = raw
        .strip_prefix("a/")
        .or_else(|| raw.strip_prefix("b/"))
        .unwrap_or(raw);
    Some(stripped.to_string())
}

struct OpenHunk {
    hunk: Hunk,
    old_remaining: usize,
    new_remaining: usize,
}

impl OpenHunk {
    fn is_exhausted(&self) -> bool {
        self.old_remaining == 0 && self.new_remaining == 0
    }
}

struct FileBuilder {
    change: FileChange,
    hunk: Option<OpenHunk>,
    /// Inside a `GIT binary patch` block or after a patch signature
    closed: bool,
}

impl FileBuilder {
    fn empty() -> Self {
        Self {
            change: FileChange {
                path: String::new(),
                old_path: None,
                status: FileStatus::Modified,
                is_binary: false,
                additions: 0,
                deletions: 0,
                header_lines: Vec::new(),
                hunks: Vec::new(),
            },
            hunk: None,
            closed: false,
        }
    }

    fn from_git_header(line: &str) -> Self {
        let mut builder = Self::empty();
        if let Some(captures) = DIFF_HEADER_RE.captures(line) {
            builder.change.path = captures
                .get(2)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
        } else {
            builder.change.path = line["diff --git ".len()..].trim().to_string();
        }
        builder.change.header_lines.push(line.to_string());
        builder
    }

    fn from_labels(minus_line: &str, plus_line: &str) -> Self {
        let mut builder = Self::empty();
        builder.apply_labels(minus_line, plus_line);
        builder
    }

    fn apply_labels(&mut self, minus_line: &str, plus_line: &str) {
        let old = label_path(minus_line);
        let new = label_path(plus_line);

        match (&old, &new) {
            (None, Some(_)) => self.change.status = FileStatus::Added,
            (Some(_), None) => self.change.status = FileStatus::Deleted,
            _ => {}
        }
        if let Some(path) = new.or(old) {
            if self.change.status != FileStatus::Renamed {
                self.change.path = path;
            }
        }

        self.change.header_lines.push(minus_line.to_string());
        self.change.header_lines.push(plus_line.to_string());
    }

    fn has_hunks(&self) -> bool {
        self.hunk.is_some() || !self.change.hunks.is_empty()
    }

    fn accepts_body_line(&self, line: &str) -> bool {
        let Some(open) = self.hunk.as_ref() else {
            return false;
        };
        if line.starts_with('\\') {
            return true;
        }
        match line.chars().next() {
            Some('+') => open.new_remaining > 0,
            Some('-') => open.old_remaining > 0,
            // git strips the trailing space of blank context lines in some setups
            Some(' ') | None => open.old_remaining > 0 && open.new_remaining > 0,
            _ => false,
        }
    }

    fn push_body_line(&mut self, line: &str) {
        let Some(open) = self.hunk.as_mut() else {
            return;
        };
        // `\ No newline at end of file`
        if line.starts_with('\\') {
            return;
        }

        let (kind, text) = match line.chars().next() {
            Some('+') => (LineKind::Add, &line[1..]),
            Some('-') => (LineKind::Remove, &line[1..]),
            Some(' ') => (LineKind::Context, &line[1..]),
            _ => (LineKind::Context, ""),
        };

        // Counts saturate at zero for bodies longer than their header
        match kind {
            LineKind::Add => open.new_remaining = open.new_remaining.saturating_sub(1),
            LineKind::Remove => open.old_remaining = open.old_remaining.saturating_sub(1),
            LineKind::Context => {
                open.old_remaining = open.old_remaining.saturating_sub(1);
                open.new_remaining = open.new_remaining.saturating_sub(1);
            }
        }
        open.hunk.lines.push(DiffLine::new(kind, text));
    }

    fn close_hunk(&mut self) {
        if let Some(open) = self.hunk.take() {
            if !open.is_exhausted() {
                tracing::debug!(
                    path = %self.change.path,
                    header = %open.hunk.header_line(),
                    "hunk ended before its declared line count"
                );
            }
            let hunk = open.hunk;
            self.change.hunks.push(Hunk::from_lines(
                hunk.old_start,
                hunk.new_start,
                hunk.section,
                hunk.lines,
            ));
        }
    }

    fn consume(&mut self, line: &str, line_number: usize) -> Result<(), ParseError> {
        if self.closed {
            return Ok(());
        }

        if line.starts_with("@@") {
            let open = parse_hunk_header(line, line_number)?;
            self.close_hunk();
            self.hunk = Some(open);
            return Ok(());
        }

        if line.starts_with('\\') {
            return Ok(());
        }

        if let Some(rest) = line.strip_prefix("rename from ") {
            self.change.old_path = Some(rest.trim().to_string());
            self.change.status = FileStatus::Renamed;
            self.change.header_lines.push(line.to_string());
            return Ok(());
        }
        if let Some(rest) = line.strip_prefix("rename to ") {
            self.change.path = rest.trim().to_string();
            self.change.status = FileStatus::Renamed;
            self.change.header_lines.push(line.to_string());
            return Ok(());
        }
        if line.starts_with("new file mode") {
            self.change.status = FileStatus::Added;
            self.change.header_lines.push(line.to_string());
            return Ok(());
        }
        if line.starts_with("deleted file mode") {
            self.change.status = FileStatus::Deleted;
            self.change.header_lines.push(line.to_string());
            return Ok(());
        }
        if line.starts_with("Binary files ") && line.ends_with(" differ") {
            self.change.is_binary = true;
            return Ok(());
        }
        if line.starts_with("GIT binary patch") {
            self.change.is_binary = true;
            self.closed = true;
            return Ok(());
        }
        if line.starts_with("index ") {
            return Ok(());
        }
        if [
            "old mode",
            "new mode",
            "similarity index",
            "dissimilarity index",
            "copy from",
            "copy to",
        ]
        .iter()
        .any(|prefix| line.starts_with(prefix))
        {
            self.change.header_lines.push(line.to_string());
            return Ok(());
        }

        // Patch signature emitted by `git format-patch`
        if line == "-- " && self.hunk.as_ref().map_or(true, OpenHunk::is_exhausted) {
            self.close_hunk();
            self.closed = true;
            return Ok(());
        }

        let has_content = !line.trim().is_empty();
        if is_change_line(line) || (line.starts_with(' ') && has_content) {
            return match self.hunk.as_mut() {
                // Body longer than the header declared
                Some(_) => {
                    tracing::debug!(line_number, "hunk body exceeds declared line count");
                    self.push_body_line(line);
                    Ok(())
                }
                None if self.change.hunks.is_empty() => Err(ParseError::new(
                    line_number,
                    line,
                    "hunk body without a hunk header",
                )),
                None => Ok(()),
            };
        }

        tracing::trace!(line_number, "ignoring unrecognized diff line");
        Ok(())
    }

    fn finish(mut self) -> FileChange {
        self.close_hunk();
        if self.change.is_binary {
            self.change.hunks.clear();
        }
        if self.change.path.is_empty() {
            self.change.path = "unknown".to_string();
        }
        if self.change.status != FileStatus::Renamed {
            self.change.old_path = None;
        }
        self.change.additions = self.change.hunks.iter().map(Hunk::additions).sum();
        self.change.deletions = self.change.hunks.iter().map(Hunk::deletions).sum();
        self.change
    }
}

fn parse_hunk_header(line: &str, line_number: usize) -> Result<OpenHunk, ParseError> {
    let captures = HUNK_HEADER_RE
        .captures(line)
        .ok_or_else(|| ParseError::new(line_number, line, "malformed hunk header"))?;

    let number = |index: usize, default: usize| -> Result<usize, ParseError> {
        match captures.get(index) {
            Some(m) => m
                .as_str()
                .parse()
                .map_err(|_| ParseError::new(line_number, line, "hunk range out of bounds")),
            None => Ok(default),
        }
    };

    let old_start = number(1, 0)?;
    let old_lines = number(2, 1)?;
    let new_start = number(3, 0)?;
    let new_lines = number(4, 1)?;
    let section = captures
        .get(5)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    Ok(OpenHunk {
        hunk: Hunk {
            old_start,
            old_lines,
            new_start,
            new_lines,
            section,
            lines: Vec::new(),
        },
        old_remaining: old_lines,
        new_remaining: new_lines,
    })
}
