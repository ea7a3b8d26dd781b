//! Character-offset and sentence accounting for matches
//!
//! Matches arrive as token positions; the reported positions are
//! character offsets from the start of the text, plus a sentence number
//! and sentence-relative offsets for alignment output. The tracker keeps
//! cursors between matches so that each step only walks the token range
//! separating one match from the next, in either direction.

use crate::matches::Match;
use crate::newlines::NewlineIndex;
use crate::text::TokenText;

/// Resolved positions for one match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchPositions {
    /// Character offset of the match start, newline-shifted
    pub start: i64,
    /// Character offset one past the match end, newline-shifted
    pub end: i64,
    /// 1-based sentence number containing the match start
    pub sentence: i64,
    /// Character offset of the match's first token from the sentence start
    pub start_from_eos: i64,
    /// Character offset one past the match end from the sentence start
    pub end_from_eos: i64,
}

impl MatchPositions {
    /// The `start end sentence` field of an intermediate line
    pub fn positions_field(&self) -> String {
        format!("{} {} {}", self.start, self.end, self.sentence)
    }

    /// The sentence-relative field used by the XAlign dialect
    pub fn eos_field(&self) -> String {
        format!("{}\t{}\t{}", self.sentence, self.start_from_eos, self.end_from_eos)
    }
}

/// Walks the token stream match by match, maintaining offset cursors
pub struct PositionTracker<'a> {
    text: &'a TokenText,
    /// UIMA offsets treat the sentence marker as zero-width
    marker_is_zero_width: bool,
    position_in_tokens: usize,
    position_in_chars: i64,
    current_sentence: i64,
    position_from_eos: i64,
    start_from_eos: i64,
}

impl<'a> PositionTracker<'a> {
    pub fn new(text: &'a TokenText, marker_is_zero_width: bool) -> Self {
        Self {
            text,
            marker_is_zero_width,
            position_in_tokens: 0,
            position_in_chars: 0,
            current_sentence: 1,
            position_from_eos: 0,
            start_from_eos: 0,
        }
    }

    fn is_marker(&self, position: usize) -> bool {
        self.text.vocabulary().sentence_marker() == Some(self.text.id_at(position))
    }

    fn token_size(&self, position: usize) -> i64 {
        if self.marker_is_zero_width && self.is_marker(position) {
            0
        } else {
            self.text.token_len(position) as i64
        }
    }

    /// Advance (or back up) to `m` and compute its positions.
    pub fn locate(&mut self, m: &Match, newlines: &NewlineIndex) -> MatchPositions {
        let mut start_pos_char = self.position_in_chars;

        if self.position_in_tokens > m.start_token {
            // Backing up happens when the match list is not sorted by
            // start position. Crossing a sentence marker backward cannot
            // restore the previous sentence's offsets, so the counts are
            // best-effort from here on.
            for z in (m.start_token..self.position_in_tokens).rev() {
                let size = self.token_size(z);
                start_pos_char -= size;
                self.position_from_eos -= size;
                self.start_from_eos = self.position_from_eos;
                if self.is_marker(z) {
                    self.current_sentence -= 1;
                    log::error!(
                        "backward walk crossed a sentence marker; sentence-relative positions are unreliable from here"
                    );
                    self.position_from_eos = 0;
                    self.start_from_eos = 0;
                }
            }
        } else {
            for z in self.position_in_tokens..m.start_token {
                let size = self.token_size(z);
                start_pos_char += size;
                self.position_from_eos += size;
                self.start_from_eos = self.position_from_eos;
                if self.is_marker(z) {
                    self.current_sentence += 1;
                    self.position_from_eos = 0;
                    self.start_from_eos = 0;
                }
            }
        }
        self.position_in_tokens = m.start_token;
        self.position_in_chars = start_pos_char;

        let end_pos_char;
        let end_from_eos;
        if m.start_token < m.end_token {
            let start_of_first_token = start_pos_char;
            start_pos_char = start_of_first_token + m.start_char as i64;
            let mut end = start_of_first_token;
            let mut end_eos = self.start_from_eos;
            for z in m.start_token..m.end_token {
                let size = self.token_size(z);
                end += size;
                end_eos += size;
            }
            end_pos_char = end + m.end_char as i64 + 1;
            end_from_eos = end_eos + m.end_char as i64 + 1;
        } else {
            // Single-token match: both offsets come straight off the base.
            end_pos_char = start_pos_char + m.end_char as i64 + 1;
            end_from_eos = self.start_from_eos + m.end_char as i64 + 1;
            start_pos_char += m.start_char as i64;
        }

        // Newline shifts differ between the endpoints when a line break
        // falls inside the match.
        MatchPositions {
            start: start_pos_char + newlines.shift_at(m.start_token),
            end: end_pos_char + newlines.shift_at(m.end_token),
            sentence: self.current_sentence,
            start_from_eos: self.start_from_eos,
            end_from_eos,
        }
    }
}
