//! Declaration-bounded context
//!
//! The boundary search is a language-agnostic heuristic. It only looks at the
//! context lines already present in a hunk, scanning at most
//! [`FUNCTION_LOOKBACK_LINES`] above the first change for a declaration-like
//! line that is less indented than the change, and at most
//! [`FUNCTION_LOOKAHEAD_LINES`] below the last change for the line that closes
//! that block. Declarations further away than the window, or outside the
//! hunk, are never found; such hunks keep their original context.

use super::compact::sub_hunk;
use super::inclusion;
use crate::render::{marker_header, push_file_with_hunks, push_section, push_stat_line};
use crate::types::{DiffDocument, DiffLine, FileChange, FileInclusion, Hunk, InclusionMode};
use regex::Regex;
use std::sync::LazyLock;

pub const FUNCTION_LOOKBACK_LINES: usize = 40;
pub const FUNCTION_LOOKAHEAD_LINES: usize = 40;

const TAB_WIDTH: usize = 4;

static DECLARATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?:(?:pub(?:\([^)]*\))?|export|default|public|private|protected|internal|static|final|abstract|override|async|unsafe|const|extern)\s+)*(?:fn|def|class|func|function|impl|struct|enum|trait|interface|module|mod|object|record|namespace|sub|proc)\b",
    )
    .expect("declaration regex")
});

pub(super) fn compress(doc: &DiffDocument) -> (String, Vec<FileInclusion>) {
    let mut out = marker_header("function-context", doc);
    let mut files = Vec::with_capacity(doc.file_count());
    let mut binaries: Vec<&FileChange> = Vec::new();

    for file in &doc.files {
        if file.is_binary {
            binaries.push(file);
            files.push(inclusion(&file.path, InclusionMode::StatOnly));
            continue;
        }
        let hunks: Vec<Hunk> = file
            .hunks
            .iter()
            .map(|hunk| {
                bound_to_declaration(hunk).unwrap_or_else(|| {
                    tracing::debug!(
                        path = %file.path,
                        header = %hunk.header_line(),
                        "no enclosing declaration within window, keeping hunk context"
                    );
                    hunk.clone()
                })
            })
            .collect();
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

/// Trim a hunk's context to the nearest enclosing declaration and the line
/// closing its block. `None` when no declaration lies within the window.
pub(crate) fn bound_to_declaration(hunk: &Hunk) -> Option<Hunk> {
    let lines = &hunk.lines;
    let first_change = lines.iter().position(|l| l.kind.is_change())?;
    let last_change = lines.iter().rposition(|l| l.kind.is_change())?;

    let change_indent = lines[first_change..=last_change]
        .iter()
        .filter(|l| l.kind.is_change() && !l.text.trim().is_empty())
        .map(|l| indentation(&l.text))
        .min()?;

    let window_start = first_change.saturating_sub(FUNCTION_LOOKBACK_LINES);
    let declaration = (window_start..first_change)
        .rev()
        .find(|&i| is_declaration(&lines[i]) && indentation(&lines[i].text) < change_indent)?;
    let declaration_indent = indentation(&lines[declaration].text);

    let window_end = (last_change + 1 + FUNCTION_LOOKAHEAD_LINES).min(lines.len());
    let end = (last_change + 1..window_end)
        .find(|&i| {
            let text = &lines[i].text;
            !text.trim().is_empty() && indentation(text) <= declaration_indent
        })
        .map_or(lines.len(), |i| i + 1);

    Some(sub_hunk(hunk, declaration, end, true))
}

fn is_declaration(line: &DiffLine) -> bool {
    let trimmed = line.text.trim_end();
    if trimmed.trim_start().is_empty() {
        return false;
    }
    DECLARATION_RE.is_match(trimmed) || trimmed.ends_with('{') || trimmed.ends_with(':')
}

fn indentation(text: &str) -> usize {
    text.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { TAB_WIDTH } else { 1 })
        .sum()
}
