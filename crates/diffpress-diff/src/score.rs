//! File importance scoring for the `smart` strategy

use crate::rules::ExclusionRules;
use crate::types::{DiffDocument, FileChange};

/// Changed lines beyond this count add nothing to the score
pub const CHANGED_LINES_CAP: i64 = 300;
/// Larger than the cap so low-signal files rank below any other text change
pub const LOW_SIGNAL_PENALTY: i64 = -400;
pub const BINARY_PENALTY: i64 = -50;
pub const STRUCTURAL_STATUS_BONUS: i64 = 25;
pub const SOURCE_BONUS: i64 = 50;
pub const CONFIG_BONUS: i64 = 15;
pub const DOC_BONUS: i64 = 5;

const SOURCE_EXTENSIONS: &[&str] = &[
    "rs", "py", "go", "java", "kt", "kts", "scala", "c", "h", "cc", "cpp", "cxx", "hpp", "cs",
    "swift", "m", "mm", "js", "jsx", "mjs", "cjs", "ts", "tsx", "vue", "svelte", "rb", "php",
    "ex", "exs", "erl", "hs", "ml", "clj", "lua", "dart", "zig", "sh", "bash", "zsh", "sql",
    "proto", "graphql",
];

const CONFIG_EXTENSIONS: &[&str] = &[
    "toml", "yaml", "yml", "json", "ini", "cfg", "conf", "xml", "gradle", "properties", "env",
    "lock",
];

const DOC_EXTENSIONS: &[&str] = &["md", "markdown", "rst", "txt", "adoc", "org"];

/// Extension class of a path, used for the language bonus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Source,
    Config,
    Documentation,
    Other,
}

pub fn classify_path(path: &str) -> FileKind {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    if matches!(file_name, "Dockerfile" | "Makefile" | "Justfile") {
        return FileKind::Config;
    }
    let Some((_, ext)) = file_name.rsplit_once('.') else {
        return FileKind::Other;
    };
    let ext = ext.to_ascii_lowercase();
    if SOURCE_EXTENSIONS.contains(&ext.as_str()) {
        FileKind::Source
    } else if CONFIG_EXTENSIONS.contains(&ext.as_str()) {
        FileKind::Config
    } else if DOC_EXTENSIONS.contains(&ext.as_str()) {
        FileKind::Documentation
    } else {
        FileKind::Other
    }
}

/// Scores files by how much they matter for a change summary.
///
/// Scores are integers so ranking is a total order; equal scores fall back
/// to diff order in [`rank_files`].
#[derive(Debug, Clone, Copy)]
pub struct FileScorer<'a> {
    low_signal: &'a ExclusionRules,
}

impl<'a> FileScorer<'a> {
    pub fn new(low_signal: &'a ExclusionRules) -> Self {
        Self { low_signal }
    }

    pub fn score(&self, file: &FileChange) -> i64 {
        let changed = i64::try_from(file.changed_lines()).unwrap_or(i64::MAX);
        let mut score = changed.min(CHANGED_LINES_CAP);

        if self.low_signal.is_match(&file.path) {
            score += LOW_SIGNAL_PENALTY;
        }

        score += match classify_path(&file.path) {
            FileKind::Source => SOURCE_BONUS,
            FileKind::Config => CONFIG_BONUS,
            FileKind::Documentation => DOC_BONUS,
            FileKind::Other => 0,
        };

        if file.status.is_structural() {
            score += STRUCTURAL_STATUS_BONUS;
        }
        if file.is_binary {
            score += BINARY_PENALTY;
        }

        score
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredFile {
    /// Position in the original diff
    pub index: usize,
    pub score: i64,
}

/// Score every file and sort by score descending, diff order ascending
pub fn rank_files(doc: &DiffDocument, scorer: &FileScorer<'_>) -> Vec<ScoredFile> {
    let mut ranked: Vec<ScoredFile> = doc
        .files
        .iter()
        .enumerate()
        .map(|(index, file)| ScoredFile {
            index,
            score: scorer.score(file),
        })
        .collect();
    ranked.sort_by(|a, b| b.score.cmp(&a.score).then(a.index.cmp(&b.index)));
    ranked
}
