//! Parse, evaluate and compress in one call

use crate::config::CompressionConfig;
use crate::error::PipelineResult;
use crate::parser::parse_diff;
use crate::prompt::{assemble_prompt, AssembledPrompt, PromptMetadata};
use crate::strategy::CompressionResult;
use crate::threshold::{evaluate, ThresholdDecision};
use crate::types::DiffDocument;

/// Diff text ready for prompt assembly
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffPayload {
    /// Below the thresholds, passed through as-is
    Unchanged(String),
    Compressed(CompressionResult),
}

impl DiffPayload {
    pub fn text(&self) -> &str {
        match self {
            DiffPayload::Unchanged(raw) => raw,
            DiffPayload::Compressed(result) => &result.compressed_text,
        }
    }

    pub fn compression(&self) -> Option<&CompressionResult> {
        match self {
            DiffPayload::Unchanged(_) => None,
            DiffPayload::Compressed(result) => Some(result),
        }
    }

    pub fn is_compressed(&self) -> bool {
        matches!(self, DiffPayload::Compressed(_))
    }
}

/// Parse `raw` and compress it with the configured strategy when it is over
/// a threshold
pub fn prepare_diff(
    raw: &str,
    config: &CompressionConfig,
) -> PipelineResult<(DiffDocument, DiffPayload)> {
    let doc = parse_diff(raw)?;
    tracing::debug!(
        files = doc.file_count(),
        bytes = doc.total_bytes,
        additions = doc.total_additions(),
        deletions = doc.total_deletions(),
        "parsed diff"
    );

    let payload = match evaluate(&doc, config) {
        ThresholdDecision::Skip => {
            tracing::debug!("diff under thresholds, skipping compression");
            DiffPayload::Unchanged(raw.to_string())
        }
        ThresholdDecision::Compress => {
            let result = config.strategy.compress(&doc, config);
            tracing::info!("{}", result.summary());
            DiffPayload::Compressed(result)
        }
    };

    Ok((doc, payload))
}

/// [`prepare_diff`] followed by [`assemble_prompt`]
pub fn build_prompt(
    raw: &str,
    instructions: &str,
    metadata: &PromptMetadata,
    config: &CompressionConfig,
) -> PipelineResult<(DiffPayload, AssembledPrompt)> {
    let (_, payload) = prepare_diff(raw, config)?;
    let prompt = assemble_prompt(instructions, metadata, payload.text(), config.token_limit);
    if prompt.truncated {
        tracing::warn!(
            omitted_chars = prompt.omitted_chars,
            limit = config.token_limit,
            "prompt truncated to fit the character limit"
        );
    }
    Ok((payload, prompt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;

    #[test]
    fn test_parse_error_propagates() {
        let err = prepare_diff("+orphan line\n", &CompressionConfig::default()).unwrap_err();
        match err {
            PipelineError::Parse(parse) => assert_eq!(parse.line_number, 1),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_diff_is_unchanged() {
        let (doc, payload) = prepare_diff("", &CompressionConfig::default()).unwrap();
        assert!(doc.is_empty());
        assert_eq!(payload, DiffPayload::Unchanged(String::new()));
        assert!(payload.compression().is_none());
    }
}
