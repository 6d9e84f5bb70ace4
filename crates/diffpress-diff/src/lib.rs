//! Diff compression and bounded prompt delivery
//!
//! Shrinks a unified diff so it fits the prompt budget of a text generation
//! command while keeping what a change summary needs, then decides whether
//! the final prompt can be passed inline or has to go through a file.
//!
//! ```text
//! raw diff -> parse_diff -> evaluate -> Strategy::compress -> assemble_prompt -> resolve_delivery
//! ```

mod config;
mod delivery;
mod error;
mod parser;
mod pipeline;
mod prompt;
mod render;
mod rules;
mod score;
mod strategy;
mod threshold;
mod types;

pub use config::{
    CompressionConfig, DeliveryConfig, MAX_PRIORITY_FILES_RANGE, MIN_PROMPT_FILE_THRESHOLD,
    MIN_TOKEN_LIMIT,
};
pub use delivery::{
    resolve_delivery, substitute_prompt, DeliveryDecision, DeliveryMode, PromptFileGuard,
    PromptFileState, ResolvedPrompt,
};
pub use error::{DeliveryError, ParseError, PipelineError, PipelineResult};
pub use parser::parse_diff;
pub use pipeline::{build_prompt, prepare_diff, DiffPayload};
pub use prompt::{
    assemble_prompt, ticket_from_branch, AssembledPrompt, PromptMetadata, COMMIT_INSTRUCTIONS,
    DIFF_SECTION_MARKER,
};
pub use render::{COMPRESSION_MARKER, SUMMARY_OVERHEAD_BYTES};
pub use rules::{ExclusionRules, DEFAULT_EXCLUDE_PATTERNS};
pub use score::{classify_path, rank_files, FileKind, FileScorer, ScoredFile};
pub use strategy::{
    format_size, CompressionResult, Strategy, FUNCTION_LOOKAHEAD_LINES, FUNCTION_LOOKBACK_LINES,
};
pub use threshold::{evaluate, ThresholdDecision};
pub use types::{
    DiffDocument, DiffLine, FileChange, FileInclusion, FileStatus, Hunk, InclusionMode, LineKind,
};
