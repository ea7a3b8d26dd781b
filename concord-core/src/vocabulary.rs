//! Token vocabulary: the id-to-string table behind the token stream

use std::path::Path;

use crate::encoding;
use crate::error::Result;

/// Spelling of the distinguished sentence-marker entry
pub const SENTENCE_MARKER: &str = "{S}";

/// Ordered list of token strings, loaded once and read-only for a run.
///
/// The table also carries the codepoint length of every entry (context
/// extraction and position tracking consult lengths constantly) and the
/// id of the sentence marker when the vocabulary has one.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    entries: Vec<String>,
    char_lens: Vec<usize>,
    sentence_marker: Option<usize>,
}

impl Vocabulary {
    /// Load a vocabulary file: one entry per line, BOM-sniffed encoding.
    ///
    /// Lines are not trimmed beyond the line terminator, so the space
    /// token is a line containing a single space.
    pub fn load(path: &Path) -> Result<Self> {
        let content = encoding::read_to_string(path)?;
        let mut lines: Vec<String> = content
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
            .collect();
        if lines.last().is_some_and(String::is_empty) {
            lines.pop();
        }
        Ok(Self::from_entries(lines))
    }

    /// Build a vocabulary from in-memory entries.
    pub fn from_entries(entries: Vec<String>) -> Self {
        let char_lens = entries.iter().map(|e| e.chars().count()).collect();
        let sentence_marker = entries.iter().position(|e| e == SENTENCE_MARKER);
        Self {
            entries,
            char_lens,
            sentence_marker,
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The string for a token id
    pub fn entry(&self, id: usize) -> &str {
        &self.entries[id]
    }

    /// Codepoint length of the entry for a token id
    pub fn char_len(&self, id: usize) -> usize {
        self.char_lens[id]
    }

    /// Id of the `{S}` entry, if the vocabulary has one
    pub fn sentence_marker(&self) -> Option<usize> {
        self.sentence_marker
    }

    /// Id of the entry equal to `s`, if any
    pub fn id_of(&self, s: &str) -> Option<usize> {
        self.entries.iter().position(|e| e == s)
    }
}
