//! Concordance and text-rewrite engine over tokenized corpora
//!
//! The engine consumes a tokenized text (a packed file of vocabulary
//! ids), the vocabulary itself and a match index produced by a corpus
//! matcher, and produces either a concordance (a sorted, formatted list
//! of matches with their left and right contexts) in one of several
//! dialects, or a rewritten text in which matches are replaced by their
//! outputs.
//!
//! # Example
//! ```no_run
//! use concord_core::{
//!     create_concordance, ConcordanceOptions, MatchReader, NewlineIndex, ResultMode,
//!     TokenText, Vocabulary,
//! };
//!
//! # fn main() -> concord_core::Result<()> {
//! let vocab = Vocabulary::load("tokens.txt".as_ref())?;
//! let text = TokenText::open("text.cod".as_ref(), vocab)?;
//! let matches = MatchReader::open("concord.ind".as_ref(), &text)?;
//! let options = ConcordanceOptions {
//!     result_mode: ResultMode::Text,
//!     left_context: 40,
//!     right_context: 55,
//!     working_directory: "out".into(),
//!     ..ConcordanceOptions::default()
//! };
//! let summary = create_concordance(&text, matches, &NewlineIndex::empty(), &options)?;
//! println!("{} match(es) written to {}", summary.matches, summary.output.display());
//! # Ok(()) }
//! ```

pub mod concordance;
pub mod context;
pub mod encoding;
pub mod error;
pub mod format;
pub mod matches;
pub mod newlines;
pub mod options;
pub mod position;
pub mod rewrite;
pub mod sort;
pub mod text;
pub mod thai;
pub mod vocabulary;

pub use concordance::{create_concordance, ConcordanceSummary, INTERMEDIATE_FILE_NAME};
pub use encoding::OutputEncoding;
pub use error::{ConcordError, Result};
pub use matches::{Match, MatchReader};
pub use newlines::NewlineIndex;
pub use options::{ConcordanceOptions, ResultMode, SortMode};
pub use rewrite::create_modified_text;
pub use text::TokenText;
pub use vocabulary::Vocabulary;
