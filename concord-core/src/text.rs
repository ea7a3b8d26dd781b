//! Random-access view over the packed token-id file
//!
//! The token stream is a flat array of little-endian 32-bit vocabulary
//! indices. The view is backed by a memory map so that the pipeline can
//! seek both forward and backward without buffering; tests and embedders
//! can build one from an owned slice instead.

use std::fs::File;
use std::path::Path;

use memmap2::Mmap;

use crate::error::{ConcordError, Result};
use crate::vocabulary::Vocabulary;

#[derive(Debug)]
enum Backing {
    Mapped(Mmap),
    Owned(Vec<u32>),
}

/// Immutable token stream plus its vocabulary.
///
/// Construction validates every id against the vocabulary, so accessors
/// take plain indices and cannot fail. The mapping lives as long as the
/// view; no component retains data from it beyond a run.
#[derive(Debug)]
pub struct TokenText {
    backing: Backing,
    len: usize,
    vocab: Vocabulary,
}

impl TokenText {
    /// Memory-map a token-id file.
    pub fn open(path: &Path, vocab: Vocabulary) -> Result<Self> {
        let file = File::open(path).map_err(|e| ConcordError::io("open", path, e))?;
        let mmap =
            unsafe { Mmap::map(&file) }.map_err(|e| ConcordError::io("map", path, e))?;
        if mmap.len() % 4 != 0 {
            return Err(ConcordError::UnalignedIntFile {
                path: path.to_path_buf(),
            });
        }
        let len = mmap.len() / 4;
        let text = Self {
            backing: Backing::Mapped(mmap),
            len,
            vocab,
        };
        text.validate()?;
        Ok(text)
    }

    /// Build a view over an in-memory id slice.
    pub fn from_ids(ids: &[u32], vocab: Vocabulary) -> Result<Self> {
        let text = Self {
            backing: Backing::Owned(ids.to_vec()),
            len: ids.len(),
            vocab,
        };
        text.validate()?;
        Ok(text)
    }

    fn validate(&self) -> Result<()> {
        for position in 0..self.len {
            let id = self.raw_id(position);
            if id as usize >= self.vocab.len() {
                return Err(ConcordError::InvalidTokenId {
                    id,
                    position,
                    vocabulary_len: self.vocab.len(),
                });
            }
        }
        Ok(())
    }

    fn raw_id(&self, position: usize) -> u32 {
        match &self.backing {
            Backing::Mapped(mmap) => {
                let offset = position * 4;
                u32::from_le_bytes([
                    mmap[offset],
                    mmap[offset + 1],
                    mmap[offset + 2],
                    mmap[offset + 3],
                ])
            }
            Backing::Owned(ids) => ids[position],
        }
    }

    /// Length of the text in tokens
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Token id at a position; the position must be within `len()`.
    pub fn id_at(&self, position: usize) -> usize {
        self.raw_id(position) as usize
    }

    /// Token string at a position
    pub fn token(&self, position: usize) -> &str {
        self.vocab.entry(self.id_at(position))
    }

    /// Codepoint length of the token at a position
    pub fn token_len(&self, position: usize) -> usize {
        self.vocab.char_len(self.id_at(position))
    }

    /// The vocabulary backing this text
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }
}
