//! Pipeline driver and raw concordance writer
//!
//! Concordance runs go through four stages: the raw writer turns each
//! match into one tab-separated intermediate line with its columns
//! ordered for the chosen sort mode, the sort stage collates the
//! intermediate file, the final formatter renders the dialect, and the
//! intermediate file is removed. XAlign output skips the sort and the
//! formatter entirely; merge mode hands over to the rewriter instead.

use std::fs;
use std::path::PathBuf;

use crate::context::{mirror, ContextBuffers, ContextExtractor};
use crate::encoding::{EncodedWriter, OutputEncoding};
use crate::error::{ConcordError, Result};
use crate::format;
use crate::matches::MatchReader;
use crate::newlines::NewlineIndex;
use crate::options::{ConcordanceOptions, ResultMode, SortMode};
use crate::position::PositionTracker;
use crate::rewrite;
use crate::sort::{self, SortAlphabet};
use crate::text::TokenText;
use crate::thai;

/// Name of the intermediate file inside the working directory
pub const INTERMEDIATE_FILE_NAME: &str = "concord_.txt";

/// What a run produced
#[derive(Debug, Clone)]
pub struct ConcordanceSummary {
    /// Path of the file written
    pub output: PathBuf,
    /// Number of matches that reached the output stage
    pub matches: usize,
}

/// Run the pipeline: build a concordance, or rewrite the text in merge
/// mode. Matches are consumed in the order the reader delivers them.
pub fn create_concordance(
    text: &TokenText,
    matches: MatchReader<'_>,
    newlines: &NewlineIndex,
    options: &ConcordanceOptions,
) -> Result<ConcordanceSummary> {
    if options.result_mode == ResultMode::Merge {
        let output = options
            .output
            .clone()
            .ok_or(ConcordError::MissingOutputPath)?;
        match rewrite::create_modified_text(text, matches, newlines, &output, options.encoding) {
            Ok(applied) => {
                return Ok(ConcordanceSummary {
                    output,
                    matches: applied,
                })
            }
            Err(e) => {
                // A failed run must not leave a half-written file behind.
                let _ = fs::remove_file(&output);
                return Err(e);
            }
        }
    }

    let temp_path = options.working_directory.join(INTERMEDIATE_FILE_NAME);
    let final_path = options.final_output_path();
    let xalign = options.result_mode == ResultMode::Xalign;

    // XAlign output needs no sort, so it goes straight to the final file.
    let (raw_target, raw_encoding) = if xalign {
        (final_path.clone(), OutputEncoding::Utf8)
    } else {
        (temp_path.clone(), OutputEncoding::Utf16Le)
    };
    let mut writer = EncodedWriter::create(&raw_target, raw_encoding)?;

    log::info!("Constructing concordance");
    let n_matches = match write_raw_concordance(text, matches, newlines, options, &mut writer)
        .and_then(|n| writer.finish().map(|_| n))
    {
        Ok(n) => n,
        Err(e) => {
            let _ = fs::remove_file(&raw_target);
            return Err(e);
        }
    };

    if xalign {
        return Ok(ConcordanceSummary {
            output: final_path,
            matches: n_matches,
        });
    }

    if options.sort_mode != SortMode::TextOrder {
        log::info!("Sorting concordance");
        let alphabet = match &options.sort_alphabet {
            Some(path) => Some(SortAlphabet::load(path)?),
            None => None,
        };
        sort::sort_intermediate(&temp_path, alphabet.as_ref())?;
    }

    log::info!("Formatting concordance");
    if let Err(e) = format::write_final(&temp_path, &final_path, n_matches, options) {
        // A failed run must not leave a half-written final file behind.
        let _ = fs::remove_file(&final_path);
        return Err(e);
    }
    if let Err(e) = fs::remove_file(&temp_path) {
        log::warn!("could not remove {}: {}", temp_path.display(), e);
    }
    Ok(ConcordanceSummary {
        output: final_path,
        matches: n_matches,
    })
}

/// Write one intermediate line per match, columns ordered per the sort
/// mode with the left context mirrored wherever it will drive the sort.
/// Returns the number of lines written.
fn write_raw_concordance(
    text: &TokenText,
    matches: MatchReader<'_>,
    newlines: &NewlineIndex,
    options: &ConcordanceOptions,
    writer: &mut EncodedWriter,
) -> Result<usize> {
    let glossanet = options.result_mode == ResultMode::Glossanet;
    let brackets = if glossanet {
        // GlossaNet texts carry URLs between [[ and ]]; locate the
        // bracket tokens once.
        let vocab = text.vocabulary();
        (vocab.id_of("["), vocab.id_of("]"))
    } else {
        (None, None)
    };

    let extractor = ContextExtractor::new(text, options);
    let mut tracker = PositionTracker::new(text, options.result_mode == ResultMode::Uima);
    let mut buffers = ContextBuffers::for_options(options);
    let sorted = options.sort_mode != SortMode::TextOrder;
    let mut n_matches = 0usize;

    for m in matches {
        let positions = tracker.locate(&m, newlines);
        extractor.left_context(m.start_token, m.start_char, &mut buffers.left);
        extractor.match_text(&m, &mut buffers.middle);
        let match_display_len = if options.thai_mode {
            thai::displayable_len(&buffers.middle)
        } else {
            buffers.middle.chars().count()
        };
        extractor.right_context(m.end_token, m.end_char, match_display_len, &mut buffers.right);

        if glossanet
            && !extractor.url_after(m.end_token, brackets.0, brackets.1, &mut buffers.href)
        {
            // The match sits inside a URL; it is not a real match.
            continue;
        }

        if options.result_mode == ResultMode::Xalign {
            writer.write_str(&format!("{}\t{}\n", positions.eos_field(), buffers.middle))?;
            n_matches += 1;
            continue;
        }

        if sorted && options.thai_mode {
            thai::reverse_initial_vowels(&mut buffers.left);
        }
        let mirrored_left = || {
            let mut s = buffers.left.clone();
            mirror(&mut s);
            s
        };
        let (col1, col2, col3) = match options.sort_mode {
            SortMode::TextOrder => (
                buffers.left.clone(),
                buffers.middle.clone(),
                buffers.right.clone(),
            ),
            SortMode::LeftCenter => (mirrored_left(), buffers.middle.clone(), buffers.right.clone()),
            SortMode::LeftRight => (mirrored_left(), buffers.right.clone(), buffers.middle.clone()),
            SortMode::CenterLeft => (buffers.middle.clone(), mirrored_left(), buffers.right.clone()),
            SortMode::CenterRight => (buffers.middle.clone(), buffers.right.clone(), mirrored_left()),
            SortMode::RightLeft => (buffers.right.clone(), mirrored_left(), buffers.middle.clone()),
            SortMode::RightCenter => (buffers.right.clone(), buffers.middle.clone(), mirrored_left()),
        };

        let mut line = format!("{}\t{}\t{}\t{}", col1, col2, col3, positions.positions_field());
        if glossanet {
            line.push('\t');
            line.push_str(&buffers.href);
        }
        line.push('\n');
        writer.write_str(&line)?;
        n_matches += 1;
    }
    Ok(n_matches)
}
