//! Text rewriting: replace matches by their outputs
//!
//! A single forward pass copies the token stream, overlaying each
//! match's output (or deleting the span when there is none). Overlaps
//! resolve left-most first; two matches starting at the same position
//! resolve to whichever comes first in the list. Token positions found
//! in the newline index are emitted as `\n` instead of their glyph,
//! restoring the line breaks the tokenizer collapsed.

use std::path::Path;

use crate::encoding::{EncodedWriter, OutputEncoding};
use crate::error::Result;
use crate::matches::MatchReader;
use crate::newlines::NewlineIndex;
use crate::text::TokenText;

/// Write the rewritten text to `output_path`. Returns the number of
/// matches applied (overlapping matches are dropped, not applied).
pub fn create_modified_text(
    text: &TokenText,
    matches: MatchReader<'_>,
    newlines: &NewlineIndex,
    output_path: &Path,
    encoding: OutputEncoding,
) -> Result<usize> {
    let mut out = EncodedWriter::create(output_path, encoding)?;
    let mut cur_token = 0usize;
    let mut cur_char = 0usize;
    let mut applied = 0usize;

    log::info!("Merging outputs with text");
    for m in matches {
        if (m.start_token, m.start_char) < (cur_token, cur_char) {
            // Overlaps an already-emitted match.
            continue;
        }
        // Tail of a partially consumed token that the match lies beyond.
        if cur_char > 0 && m.start_token > cur_token {
            let tail: String = text.token(cur_token).chars().skip(cur_char).collect();
            out.write_str(&tail)?;
            cur_token += 1;
            cur_char = 0;
        }
        // Whole tokens up to the match's first token.
        for t in cur_token..m.start_token {
            emit_token(text, newlines, t, &mut out)?;
        }
        if m.start_token > cur_token {
            cur_char = 0;
        }
        cur_token = m.start_token;
        // Unconsumed prefix of the match's first token.
        if m.start_char > cur_char {
            let prefix: String = text
                .token(m.start_token)
                .chars()
                .skip(cur_char)
                .take(m.start_char - cur_char)
                .collect();
            out.write_str(&prefix)?;
        }

        if let Some(output) = m.output.as_deref() {
            out.write_str(output)?;
        }
        applied += 1;

        if m.end_char + 1 == text.token_len(m.end_token) {
            cur_token = m.end_token + 1;
            cur_char = 0;
        } else {
            cur_token = m.end_token;
            cur_char = m.end_char + 1;
        }
    }

    // Remainder of the text after the last match.
    if cur_char > 0 {
        let tail: String = text.token(cur_token).chars().skip(cur_char).collect();
        out.write_str(&tail)?;
        cur_token += 1;
    }
    for t in cur_token..text.len() {
        emit_token(text, newlines, t, &mut out)?;
    }
    out.finish()?;
    Ok(applied)
}

fn emit_token(
    text: &TokenText,
    newlines: &NewlineIndex,
    position: usize,
    out: &mut EncodedWriter,
) -> Result<()> {
    if newlines.contains(position) {
        out.write_str("\n")
    } else {
        out.write_str(text.token(position))
    }
}
