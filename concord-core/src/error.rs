//! Error types for the concordance engine

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Error type for concordance and rewrite operations
#[derive(Debug, Error)]
pub enum ConcordError {
    /// I/O failure on one of the pipeline files
    #[error("cannot {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A text file that is neither valid UTF-8 nor valid UTF-16
    #[error("{} does not decode as UTF-8 or UTF-16", path.display())]
    InvalidEncoding { path: PathBuf },

    /// A packed integer file whose size is not a multiple of four bytes
    #[error("{} is not a whole number of 32-bit values", path.display())]
    UnalignedIntFile { path: PathBuf },

    /// A token id that does not index a vocabulary entry
    #[error("token id {id} at position {position} is outside the vocabulary ({vocabulary_len} entries)")]
    InvalidTokenId {
        id: u32,
        position: usize,
        vocabulary_len: usize,
    },

    /// An intermediate concordance line with missing columns
    #[error("malformed intermediate concordance line {line}")]
    MalformedIntermediate { line: usize },

    /// Merge mode invoked without a destination for the rewritten text
    #[error("merge mode requires an explicit output path")]
    MissingOutputPath,
}

impl ConcordError {
    pub(crate) fn io(action: &'static str, path: &Path, source: io::Error) -> Self {
        ConcordError::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result type for concordance operations
pub type Result<T> = std::result::Result<T, ConcordError>;
