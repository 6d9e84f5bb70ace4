//! Prompt assembly with a hard character ceiling

use regex::Regex;
use std::fmt::Write;
use std::sync::LazyLock;

/// Heading that separates the instructions from the diff
pub const DIFF_SECTION_MARKER: &str = "## Staged Changes Diff";

/// Default instructions for commit message generation
pub const COMMIT_INSTRUCTIONS: &str = "## Generate Commit Message

Analyze the diff below and write a commit message for it.

Subject line:
- Prefix with the subsystem the changed paths belong to (e.g. `parser:`, `net/http:`)
- Use the imperative mood (\"Fix leak\", not \"Fixed leak\")
- No trailing period, at most 72 characters

Body:
- Wrap at 72 characters and separate it from the subject with a blank line
- Explain the problem first, then the approach and why it was chosen
- Do not restate the diff line by line

If the diff is marked as compressed, some files are listed only with their
line counts. Describe them from their paths and counts without guessing at
their content.

Reply with the commit message only.";

static TICKET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[^/]+/)?([A-Za-z][A-Za-z0-9]*-\d+)").expect("ticket regex")
});

/// Caller-supplied context shown above the diff
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptMetadata {
    pub branch: Option<String>,
    pub ticket: Option<String>,
}

impl PromptMetadata {
    /// Metadata for a branch, with the ticket taken from its name when present
    pub fn for_branch(branch: impl Into<String>) -> Self {
        let branch = branch.into();
        let ticket = ticket_from_branch(&branch);
        Self {
            branch: Some(branch),
            ticket,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.branch.is_none() && self.ticket.is_none()
    }
}

/// Ticket key at the start of a branch name, e.g. `ABC-123` in
/// `feature/abc-123-retry-uploads`
pub fn ticket_from_branch(branch: &str) -> Option<String> {
    TICKET_RE
        .captures(branch)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_ascii_uppercase())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledPrompt {
    pub text: String,
    pub truncated: bool,
    /// Characters of the diff left out, zero unless truncated
    pub omitted_chars: usize,
}

/// Build the final prompt: instructions, optional git context, then the diff.
///
/// `token_limit` is a ceiling in characters. Only the tail of the diff is
/// ever cut, at a line boundary, and a marker records how much was dropped.
/// The header is kept whole even when it alone exceeds the limit.
pub fn assemble_prompt(
    instructions: &str,
    metadata: &PromptMetadata,
    diff_text: &str,
    token_limit: usize,
) -> AssembledPrompt {
    let header = prompt_header(instructions, metadata);
    let diff_text = diff_text.trim_end_matches('\n');

    let header_chars = header.chars().count();
    let diff_chars = diff_text.chars().count();
    if header_chars + diff_chars + 1 <= token_limit {
        return AssembledPrompt {
            text: format!("{header}{diff_text}\n"),
            truncated: false,
            omitted_chars: 0,
        };
    }

    let marker_reserve = truncation_marker(diff_chars).chars().count();
    let budget = token_limit.saturating_sub(header_chars + marker_reserve);
    let kept = cut_at_line(diff_text, budget);
    let omitted_chars = diff_chars - kept.chars().count();

    tracing::debug!(
        limit = token_limit,
        omitted_chars,
        "truncating diff to fit prompt limit"
    );

    let mut text = String::with_capacity(header.len() + kept.len() + marker_reserve);
    text.push_str(&header);
    text.push_str(kept);
    text.push_str(&truncation_marker(omitted_chars));

    AssembledPrompt {
        text,
        truncated: true,
        omitted_chars,
    }
}

fn prompt_header(instructions: &str, metadata: &PromptMetadata) -> String {
    let mut header = instructions.trim_end().to_string();
    header.push_str("\n\n");
    if !metadata.is_empty() {
        header.push_str("## Git Context\n");
        let _ = writeln!(
            header,
            "- Branch: {}",
            metadata.branch.as_deref().unwrap_or("unknown")
        );
        let _ = writeln!(
            header,
            "- Ticket: {}",
            metadata.ticket.as_deref().unwrap_or("none")
        );
        header.push('\n');
    }
    header.push_str(DIFF_SECTION_MARKER);
    header.push('\n');
    header
}

fn truncation_marker(omitted_chars: usize) -> String {
    format!("\n[... diff truncated: {omitted_chars} characters omitted ...]\n")
}

/// Longest prefix of `text` with at most `max_chars` characters that ends at
/// a line boundary
fn cut_at_line(text: &str, max_chars: usize) -> &str {
    let end = text
        .char_indices()
        .nth(max_chars)
        .map_or(text.len(), |(offset, _)| offset);
    let prefix = &text[..end];
    if end == text.len() {
        return prefix;
    }
    match prefix.rfind('\n') {
        Some(newline) => &prefix[..newline],
        None => "",
    }
}
