//! Configuration consumed by the concordance pipeline

use std::path::PathBuf;

use crate::encoding::OutputEncoding;

/// Which of the three columns drives the sort of the concordance.
///
/// `TextOrder` leaves matches in text order and skips the sort stage
/// entirely; the other six modes name the column priority, with the left
/// context collated right to left through its mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    TextOrder,
    LeftCenter,
    LeftRight,
    CenterLeft,
    CenterRight,
    RightLeft,
    RightCenter,
}

/// Output dialect produced by the final formatter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultMode {
    /// HTML table with one hyperlinked row per match
    #[default]
    Html,
    /// Tab-separated plain text
    Text,
    /// Deduplicated HTML rows hyperlinked through a GlossaNet script
    Glossanet,
    /// HTML rows hyperlinked through an arbitrary script prefix
    Script,
    /// Token position and match, one pair per line
    Index,
    /// UIMA-style character offsets and match
    Uima,
    /// Half-integer median positions for alignment tic marks
    Axis,
    /// `<concordance>` elements without a prolog
    Xml,
    /// `<concordance>` elements with an encoding-matched prolog
    XmlWithHeader,
    /// Sentence-relative offsets for the XAlign tool
    Xalign,
    /// Rewrite the text, replacing matches by their outputs
    Merge,
}

impl ResultMode {
    /// Modes rendered as UTF-8 HTML
    pub fn is_html_output(&self) -> bool {
        matches!(self, ResultMode::Html | ResultMode::Glossanet | ResultMode::Script)
    }

    /// Name of the final file inside the working directory
    pub fn final_file_name(&self) -> &'static str {
        match self {
            ResultMode::Text
            | ResultMode::Index
            | ResultMode::Uima
            | ResultMode::Axis
            | ResultMode::Xalign => "concord.txt",
            ResultMode::Xml | ResultMode::XmlWithHeader => "concord.xml",
            _ => "concord.html",
        }
    }
}

/// Options for one concordance or rewrite run
#[derive(Debug, Clone)]
pub struct ConcordanceOptions {
    pub sort_mode: SortMode,
    pub result_mode: ResultMode,
    /// Width of the left context in displayable characters
    pub left_context: usize,
    /// Width of the right context in displayable characters, counted
    /// from the start of the match
    pub right_context: usize,
    /// Stop the left context at the previous sentence marker
    pub left_context_until_eos: bool,
    /// Stop the right context at the next sentence marker
    pub right_context_until_eos: bool,
    /// Thai-aware width counting and collation fixups
    pub thai_mode: bool,
    /// Script prefix for the GLOSSANET and SCRIPT dialects
    pub script: Option<String>,
    pub fontname: String,
    pub fontsize: u32,
    /// Collation alphabet consulted by the sort stage
    pub sort_alphabet: Option<PathBuf>,
    /// Directory holding the intermediate and final files
    pub working_directory: PathBuf,
    /// Destination of the rewritten text (merge mode only)
    pub output: Option<PathBuf>,
    /// Encoding of text and XML outputs; HTML outputs are always UTF-8
    pub encoding: OutputEncoding,
}

impl Default for ConcordanceOptions {
    fn default() -> Self {
        Self {
            sort_mode: SortMode::default(),
            result_mode: ResultMode::default(),
            left_context: 0,
            right_context: 0,
            left_context_until_eos: false,
            right_context_until_eos: false,
            thai_mode: false,
            script: None,
            fontname: "Courier new".to_string(),
            fontsize: 10,
            sort_alphabet: None,
            working_directory: PathBuf::new(),
            output: None,
            encoding: OutputEncoding::default(),
        }
    }
}

impl ConcordanceOptions {
    /// Path of the final concordance file for the configured mode
    pub fn final_output_path(&self) -> PathBuf {
        self.working_directory.join(self.result_mode.final_file_name())
    }
}
