use super::inclusion;
use crate::config::CompressionConfig;
use crate::render::{marker_header, push_file, push_section, push_stat_line, stat_line};
use crate::score::{rank_files, FileScorer, ScoredFile};
use crate::types::{DiffDocument, FileInclusion, InclusionMode};

const STAT_SECTION: &str = "Stat only";

/// Top `max_priority_files` text files in full, everything else as counts.
///
/// When the output is still over `token_limit`, the lowest-ranked full file
/// is demoted until it fits or a single full file remains. Sizes are UTF-8
/// byte counts, an upper bound on the character count the limit caps.
pub(super) fn compress(
    doc: &DiffDocument,
    config: &CompressionConfig,
) -> (String, Vec<FileInclusion>) {
    let ranked: Vec<ScoredFile> = if config.smart_priority_enabled {
        let scorer = FileScorer::new(&config.score_rules);
        rank_files(doc, &scorer)
    } else {
        (0..doc.file_count())
            .map(|index| ScoredFile { index, score: 0 })
            .collect()
    };

    let mut full: Vec<usize> = ranked
        .iter()
        .map(|scored| scored.index)
        .filter(|&index| !doc.files[index].is_binary)
        .take(config.max_priority_files)
        .collect();

    let full_sizes: Vec<usize> = doc
        .files
        .iter()
        .map(|file| {
            let mut rendered = String::new();
            push_file(&mut rendered, file);
            rendered.len()
        })
        .collect();
    let stat_sizes: Vec<usize> = doc.files.iter().map(|f| stat_line(f).len() + 1).collect();

    let header = marker_header("smart", doc);
    let output_size = |full: &[usize]| -> usize {
        let stat_count = doc.file_count() - full.len();
        let full_bytes: usize = full.iter().map(|&i| full_sizes[i]).sum();
        let stat_bytes: usize = stat_sizes.iter().sum::<usize>()
            - full.iter().map(|&i| stat_sizes[i]).sum::<usize>();
        let section = if stat_count > 0 {
            section_len(stat_count)
        } else {
            0
        };
        header.len() + full_bytes + section + stat_bytes
    };

    let mut size = output_size(&full);
    while size > config.token_limit && full.len() > 1 {
        if let Some(demoted) = full.pop() {
            tracing::debug!(
                path = %doc.files[demoted].path,
                size,
                limit = config.token_limit,
                "demoting file to stat-only"
            );
        }
        size = output_size(&full);
    }

    let mut is_full = vec![false; doc.file_count()];
    for &index in &full {
        is_full[index] = true;
    }

    let mut out = header;
    let mut files = Vec::with_capacity(doc.file_count());
    for (file, &as_full) in doc.files.iter().zip(&is_full) {
        if as_full {
            push_file(&mut out, file);
            files.push(inclusion(&file.path, InclusionMode::Full));
        } else {
            files.push(inclusion(&file.path, InclusionMode::StatOnly));
        }
    }

    let stat_count = is_full.iter().filter(|full| !**full).count();
    if stat_count > 0 {
        push_section(&mut out, STAT_SECTION, stat_count);
        for (file, _) in doc.files.iter().zip(&is_full).filter(|(_, full)| !**full) {
            push_stat_line(&mut out, file);
        }
    }

    (out, files)
}

fn section_len(count: usize) -> usize {
    let mut heading = String::new();
    push_section(&mut heading, STAT_SECTION, count);
    heading.len()
}
