//! Newline positions and the character-offset shift they induce
//!
//! The tokenizer collapses line breaks into the space token and records
//! where they were. Reported character offsets must count each line
//! break as two characters, and the rewriter must restore `\n` at those
//! token positions.

use std::path::Path;

use crate::error::{ConcordError, Result};

/// Sorted token positions at which the original text had a line break
#[derive(Debug, Clone, Default)]
pub struct NewlineIndex {
    positions: Vec<u32>,
}

impl NewlineIndex {
    /// Load a packed little-endian 32-bit position file.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| ConcordError::io("read", path, e))?;
        if bytes.len() % 4 != 0 {
            return Err(ConcordError::UnalignedIntFile {
                path: path.to_path_buf(),
            });
        }
        let positions = bytes
            .chunks_exact(4)
            .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        Ok(Self::from_positions(positions))
    }

    /// Build an index from in-memory positions; sorts them if needed.
    pub fn from_positions(mut positions: Vec<u32>) -> Self {
        positions.sort_unstable();
        Self { positions }
    }

    /// An index for a text without line breaks
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of line breaks at or before the given token position.
    /// This is the amount to add to a character offset so that each
    /// break counts as two characters.
    pub fn shift_at(&self, token_position: usize) -> i64 {
        self.positions
            .partition_point(|&p| (p as usize) <= token_position) as i64
    }

    /// Whether the token at this position was a line break
    pub fn contains(&self, token_position: usize) -> bool {
        token_position <= u32::MAX as usize
            && self.positions.binary_search(&(token_position as u32)).is_ok()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
