//! The match list produced by the corpus matcher
//!
//! A match is a token-range span with per-token character offsets at
//! both ends, optionally carrying the replacement computed by the
//! matcher. The list can be very large, so it is consumed as a forward
//! stream: one `Match` is materialized per step and nothing is retained.

use std::path::Path;

use crate::encoding;
use crate::error::Result;
use crate::text::TokenText;

/// One span in the token stream, optionally with a replacement output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub start_token: usize,
    /// Character offset of the match start inside its first token
    pub start_char: usize,
    pub end_token: usize,
    /// Character offset of the match end inside its last token, inclusive
    pub end_char: usize,
    pub output: Option<String>,
}

/// Streaming reader over a match index file.
///
/// Line grammar: `START END [output]`, where `START` and `END` are
/// either `token.char` pairs or bare token positions (the bare form
/// spans whole tokens) and everything after the second field's single
/// trailing space is the replacement output. Lines starting with `#`
/// are headers and are skipped. Malformed lines are reported and
/// skipped; the rest of the file is still consumed.
pub struct MatchReader<'a> {
    text: &'a TokenText,
    content: String,
    cursor: usize,
    line_no: usize,
}

impl<'a> MatchReader<'a> {
    /// Open a match index file (BOM-sniffed encoding).
    pub fn open(path: &Path, text: &'a TokenText) -> Result<Self> {
        let content = encoding::read_to_string(path)?;
        Ok(Self::from_string(content, text))
    }

    /// Stream matches from an in-memory index.
    pub fn from_string(content: String, text: &'a TokenText) -> Self {
        Self {
            text,
            content,
            cursor: 0,
            line_no: 0,
        }
    }

    fn parse_position(&self, field: &str) -> Option<(usize, Option<usize>)> {
        match field.split_once('.') {
            Some((token, ch)) => Some((token.parse().ok()?, Some(ch.parse().ok()?))),
            None => Some((field.parse().ok()?, None)),
        }
    }

    fn parse_line(&self, line: &str) -> Option<Match> {
        let mut fields = line.splitn(3, ' ');
        let (start_token, start_char) = self.parse_position(fields.next()?)?;
        let (end_token, end_char) = self.parse_position(fields.next()?)?;
        let output = fields.next().map(str::to_string);

        if end_token >= self.text.len() {
            return None;
        }
        let start_char = start_char.unwrap_or(0);
        let end_char = match end_char {
            Some(c) => c,
            None => self.text.token_len(end_token).checked_sub(1)?,
        };
        // Enforce the span invariants before anything downstream walks it.
        if start_char >= self.text.token_len(start_token)
            || end_char >= self.text.token_len(end_token)
            || (start_token, start_char) > (end_token, end_char)
        {
            return None;
        }
        Some(Match {
            start_token,
            start_char,
            end_token,
            end_char,
            output,
        })
    }
}

impl Iterator for MatchReader<'_> {
    type Item = Match;

    fn next(&mut self) -> Option<Match> {
        while self.cursor < self.content.len() {
            let rest = &self.content[self.cursor..];
            let (line, consumed) = match rest.find('\n') {
                Some(i) => (&rest[..i], i + 1),
                None => (rest, rest.len()),
            };
            self.cursor += consumed;
            self.line_no += 1;
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match self.parse_line(line) {
                Some(m) => return Some(m),
                None => {
                    log::error!("skipping malformed match on line {}", self.line_no);
                }
            }
        }
        None
    }
}
