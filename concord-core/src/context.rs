//! Context extraction around a match
//!
//! The extractor produces the three columns of a concordance line: the
//! left context, the match body and the right context. Widths are
//! measured in displayable characters, which differs from codepoints in
//! Thai mode where combining marks take no column. The left context is
//! gathered walking backward, so it is naturally built mirrored and
//! flipped into reading order only once its true length is known; Thai
//! expansion makes that length unknowable up front.

use crate::matches::Match;
use crate::options::ConcordanceOptions;
use crate::text::TokenText;
use crate::thai;

/// Reverse a string's codepoints in place
pub fn mirror(s: &mut String) {
    let reversed: String = s.chars().rev().collect();
    *s = reversed;
}

/// Reusable output buffers for the per-match extraction.
///
/// One set is allocated per run and cleared between matches. Capacities
/// leave room for Thai combining marks, which can push the codepoint
/// length of a context well past its displayable width.
pub struct ContextBuffers {
    pub left: String,
    pub middle: String,
    pub right: String,
    pub href: String,
}

impl ContextBuffers {
    pub fn for_options(options: &ConcordanceOptions) -> Self {
        let slack = 4 * options.left_context.max(options.right_context) + 64;
        Self {
            left: String::with_capacity(slack),
            middle: String::with_capacity(slack),
            right: String::with_capacity(slack),
            href: String::with_capacity(64),
        }
    }
}

/// Extracts the three parts of a concordance line from the token stream
pub struct ContextExtractor<'a> {
    text: &'a TokenText,
    left_width: usize,
    right_width: usize,
    left_until_eos: bool,
    right_until_eos: bool,
    thai_mode: bool,
}

impl<'a> ContextExtractor<'a> {
    pub fn new(text: &'a TokenText, options: &ConcordanceOptions) -> Self {
        Self {
            text,
            left_width: options.left_context,
            right_width: options.right_context,
            left_until_eos: options.left_context_until_eos,
            right_until_eos: options.right_context_until_eos,
            thai_mode: options.thai_mode,
        }
    }

    /// Whether a codepoint takes a display column
    fn counts(&self, c: char) -> bool {
        !self.thai_mode || !thai::is_skippable(c)
    }

    fn sentence_marker(&self) -> Option<usize> {
        self.text.vocabulary().sentence_marker()
    }

    /// Fill `out` with the left context ending just before
    /// `(pos, pos_in_char)`, exactly `left_context` displayable
    /// characters wide, space-padded when the text starts too soon.
    pub fn left_context(&self, pos: usize, pos_in_char: usize, out: &mut String) {
        out.clear();
        if pos == 0 && pos_in_char == 0 {
            for _ in 0..self.left_width {
                out.push(' ');
            }
            return;
        }
        let marker = self.sentence_marker();
        let mut count = 0usize;

        // Prefix of the match's own first token, emitted in reverse.
        if pos_in_char > 0 {
            let prefix: Vec<char> = self.text.token(pos).chars().take(pos_in_char).collect();
            for &c in prefix.iter().rev() {
                out.push(c);
                if self.counts(c) {
                    count += 1;
                }
            }
        }

        // Walk tokens leftward until the width is reached.
        let mut p = pos as isize - 1;
        'tokens: while p >= 0 && count < self.left_width {
            let token_chars: Vec<char> = self.text.token(p as usize).chars().collect();
            for &c in token_chars.iter().rev() {
                if count == self.left_width {
                    break 'tokens;
                }
                out.push(c);
                if self.counts(c) {
                    count += 1;
                }
            }
            if self.left_until_eos
                && p > 0
                && marker == Some(self.text.id_at(p as usize - 1))
            {
                break;
            }
            p -= 1;
        }

        // Pad to the configured width, then restore reading order. The
        // mirror must happen after extraction: with combining marks the
        // buffer can be longer than the width, so filling it from the
        // far end is not possible.
        while count < self.left_width {
            out.push(' ');
            count += 1;
        }
        mirror(out);
    }

    /// Fill `out` with the matched sequence, or with the match's own
    /// output when the matcher produced one.
    pub fn match_text(&self, m: &Match, out: &mut String) {
        out.clear();
        if let Some(output) = m.output.as_deref() {
            out.push_str(output);
            return;
        }
        if m.start_token == m.end_token {
            for c in self
                .text
                .token(m.start_token)
                .chars()
                .skip(m.start_char)
                .take(m.end_char + 1 - m.start_char)
            {
                out.push(c);
            }
            return;
        }
        for c in self.text.token(m.start_token).chars().skip(m.start_char) {
            out.push(c);
        }
        for t in m.start_token + 1..m.end_token {
            out.push_str(self.text.token(t));
        }
        for c in self.text.token(m.end_token).chars().take(m.end_char + 1) {
            out.push(c);
        }
    }

    /// Fill `out` with the right context following `(pos, pos_char)`.
    ///
    /// The width is `right_context` minus the displayable length of the
    /// match; a match at least that long gets an empty right context.
    /// The tail of a partially consumed final token is emitted without
    /// counting. No padding: nothing aligns on the right side.
    pub fn right_context(
        &self,
        pos: usize,
        pos_char: usize,
        match_display_len: usize,
        out: &mut String,
    ) {
        out.clear();
        if match_display_len >= self.right_width {
            return;
        }
        let width = self.right_width - match_display_len;

        for c in self.text.token(pos).chars().skip(pos_char + 1) {
            out.push(c);
        }

        let marker = self.sentence_marker();
        let mut count = 0usize;
        let mut p = pos + 1;
        'tokens: while p < self.text.len() && count < width {
            for c in self.text.token(p).chars() {
                if count == width {
                    break 'tokens;
                }
                out.push(c);
                if self.counts(c) {
                    count += 1;
                }
            }
            if self.right_until_eos
                && p + 1 < self.text.len()
                && marker == Some(self.text.id_at(p + 1))
            {
                break;
            }
            p += 1;
        }
    }

    /// GlossaNet URL lookup: scan forward from the token after the match
    /// for a `[[url]]` block, filling `out` with the URL. Returns false
    /// when a `]]` comes first, which means the match itself sits inside
    /// a URL and must be dropped.
    pub fn url_after(
        &self,
        end_pos: usize,
        open_bracket: Option<usize>,
        close_bracket: Option<usize>,
        out: &mut String,
    ) -> bool {
        out.clear();
        let (Some(open), Some(close)) = (open_bracket, close_bracket) else {
            // Without both bracket tokens no URL can exist in the text.
            return true;
        };
        let len = self.text.len();
        let mut i = end_pos + 1;
        let mut opens = 0;
        let mut closes = 0;
        while i < len && opens != 2 && closes != 2 {
            let id = self.text.id_at(i);
            if id == open {
                opens += 1;
                closes = 0;
            } else if id == close {
                closes += 1;
                opens = 0;
            } else {
                opens = 0;
                closes = 0;
            }
            i += 1;
        }
        if closes == 2 {
            return false;
        }
        if opens != 2 {
            return true;
        }
        while i + 1 < len && !(self.text.id_at(i) == close && self.text.id_at(i + 1) == close) {
            out.push_str(self.text.token(i));
            i += 1;
        }
        if i + 1 >= len || self.text.id_at(i) != close || self.text.id_at(i + 1) != close {
            // Unterminated URL block.
            out.clear();
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::Vocabulary;

    fn sample_text() -> TokenText {
        // "The cat sat" with a sentence marker available as id 4
        let vocab = Vocabulary::from_entries(vec![
            "The".into(),
            " ".into(),
            "cat".into(),
            "sat".into(),
            "{S}".into(),
        ]);
        TokenText::from_ids(&[0, 1, 2, 1, 3], vocab).unwrap()
    }

    fn extractor_options(left: usize, right: usize) -> ConcordanceOptions {
        ConcordanceOptions {
            left_context: left,
            right_context: right,
            ..ConcordanceOptions::default()
        }
    }

    fn cat_match() -> Match {
        Match {
            start_token: 2,
            start_char: 0,
            end_token: 2,
            end_char: 2,
            output: None,
        }
    }

    #[test]
    fn left_context_is_exact_width_in_reading_order() {
        let text = sample_text();
        let options = extractor_options(4, 7);
        let ex = ContextExtractor::new(&text, &options);
        let mut left = String::new();
        ex.left_context(2, 0, &mut left);
        assert_eq!(left, "The ");
    }

    #[test]
    fn left_context_pads_at_text_start() {
        let text = sample_text();
        let options = extractor_options(6, 7);
        let ex = ContextExtractor::new(&text, &options);
        let mut left = String::new();
        ex.left_context(0, 0, &mut left);
        assert_eq!(left, "      ");
        ex.left_context(2, 0, &mut left);
        assert_eq!(left, "  The ");
    }

    #[test]
    fn left_context_takes_a_reversed_prefix_of_the_match_token() {
        let text = sample_text();
        let options = extractor_options(4, 7);
        let ex = ContextExtractor::new(&text, &options);
        let mut left = String::new();
        // Match starts at the 'a' of "cat": the prefix "c" belongs left.
        ex.left_context(2, 1, &mut left);
        assert_eq!(left, "he c");
    }

    #[test]
    fn right_context_width_subtracts_the_match_length() {
        let text = sample_text();
        let options = extractor_options(4, 7);
        let ex = ContextExtractor::new(&text, &options);
        let mut right = String::new();
        ex.right_context(2, 2, 3, &mut right);
        assert_eq!(right, " sat");
    }

    #[test]
    fn right_context_is_empty_when_the_match_fills_the_width() {
        let text = sample_text();
        let options = extractor_options(4, 3);
        let ex = ContextExtractor::new(&text, &options);
        let mut right = String::new();
        ex.right_context(2, 2, 3, &mut right);
        assert_eq!(right, "");
    }

    #[test]
    fn right_context_keeps_the_uncounted_token_tail() {
        let text = sample_text();
        let options = extractor_options(4, 4);
        let ex = ContextExtractor::new(&text, &options);
        let mut right = String::new();
        // Match ends after "ca": the tail "t" is free, then two counted chars.
        ex.right_context(2, 1, 2, &mut right);
        assert_eq!(right, "t s");
    }

    #[test]
    fn contexts_stop_at_the_sentence_marker_when_asked() {
        // "cat {S} sat" with the match on "sat"
        let vocab = Vocabulary::from_entries(vec![
            "cat".into(),
            " ".into(),
            "{S}".into(),
            "sat".into(),
        ]);
        let text = TokenText::from_ids(&[0, 1, 2, 1, 3], vocab).unwrap();
        let options = ConcordanceOptions {
            left_context: 10,
            right_context: 20,
            left_context_until_eos: true,
            right_context_until_eos: true,
            ..ConcordanceOptions::default()
        };
        let ex = ContextExtractor::new(&text, &options);

        let mut left = String::new();
        ex.left_context(4, 0, &mut left);
        // The walk stops before entering the marker; padding restores width.
        assert_eq!(left, "          ");

        let mut right = String::new();
        ex.right_context(0, 2, 3, &mut right);
        assert_eq!(right, " ");
    }

    #[test]
    fn match_text_concatenates_the_span() {
        let text = sample_text();
        let options = extractor_options(4, 7);
        let ex = ContextExtractor::new(&text, &options);
        let mut middle = String::new();
        ex.match_text(&cat_match(), &mut middle);
        assert_eq!(middle, "cat");

        // Multi-token span with offsets at both ends: "he cat sa"
        let m = Match {
            start_token: 0,
            start_char: 1,
            end_token: 4,
            end_char: 1,
            output: None,
        };
        ex.match_text(&m, &mut middle);
        assert_eq!(middle, "he cat sa");
    }

    #[test]
    fn match_output_overrides_the_text() {
        let text = sample_text();
        let options = extractor_options(4, 7);
        let ex = ContextExtractor::new(&text, &options);
        let mut middle = String::new();
        let m = Match {
            output: Some("dog".into()),
            ..cat_match()
        };
        ex.match_text(&m, &mut middle);
        assert_eq!(middle, "dog");
    }

    #[test]
    fn thai_marks_do_not_consume_width() {
        // Token of one consonant plus a combining vowel, twice
        let word: String = ['\u{0E2A}', '\u{0E35}'].iter().collect();
        let vocab = Vocabulary::from_entries(vec![word, "x".into()]);
        let text = TokenText::from_ids(&[0, 0, 1], vocab).unwrap();
        let options = ConcordanceOptions {
            left_context: 2,
            right_context: 0,
            thai_mode: true,
            ..ConcordanceOptions::default()
        };
        let ex = ContextExtractor::new(&text, &options);
        let mut left = String::new();
        ex.left_context(2, 0, &mut left);
        // Two displayable characters span four codepoints here.
        assert_eq!(left.chars().count(), 4);
        assert_eq!(thai::displayable_len(&left), 2);
    }

    #[test]
    fn url_extraction_follows_the_bracket_protocol() {
        // "cat [ [ http://x ] ] sat"
        let vocab = Vocabulary::from_entries(vec![
            "cat".into(),
            " ".into(),
            "[".into(),
            "]".into(),
            "http://x".into(),
            "sat".into(),
        ]);
        let text = TokenText::from_ids(&[0, 1, 2, 2, 4, 3, 3, 1, 5], vocab).unwrap();
        let options = extractor_options(0, 0);
        let ex = ContextExtractor::new(&text, &options);
        let open = text.vocabulary().id_of("[");
        let close = text.vocabulary().id_of("]");
        let mut href = String::new();

        // Match on "cat": the [[...]] block follows, URL extracted.
        assert!(ex.url_after(0, open, close, &mut href));
        assert_eq!(href, "http://x");

        // Match on the URL token itself: ]] comes first, reject.
        assert!(!ex.url_after(4, open, close, &mut href));

        // Match on the final token: no brackets ahead, accept with no URL.
        assert!(ex.url_after(8, open, close, &mut href));
        assert_eq!(href, "");

        // Vocabulary without brackets: always accept.
        assert!(ex.url_after(0, None, close, &mut href));
    }

    #[test]
    fn unterminated_url_block_yields_an_empty_href() {
        let vocab = Vocabulary::from_entries(vec![
            "cat".into(),
            "[".into(),
            "http://x".into(),
            "]".into(),
        ]);
        let text = TokenText::from_ids(&[0, 1, 1, 2], vocab).unwrap();
        let options = extractor_options(0, 0);
        let ex = ContextExtractor::new(&text, &options);
        let mut href = String::new();
        assert!(ex.url_after(0, Some(1), Some(3), &mut href));
        assert_eq!(href, "");
    }

    #[test]
    fn mirror_is_an_involution() {
        let mut s = "ab𝄞c".to_string();
        mirror(&mut s);
        assert_eq!(s, "c𝄞ba");
        mirror(&mut s);
        assert_eq!(s, "ab𝄞c");
    }
}
