//! Command-line arguments and run logic

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use concord_core::{
    create_concordance, ConcordanceOptions, MatchReader, NewlineIndex, OutputEncoding,
    ResultMode, SortMode, TokenText, Vocabulary,
};

use crate::config::CliConfig;
use crate::error::CliError;
use crate::progress::ProgressReporter;

/// Build a concordance, or rewrite a tokenized text, from a match index
#[derive(Debug, Parser)]
#[command(name = "concord", version, about)]
pub struct ConcordArgs {
    /// Match index file produced by the corpus matcher
    #[arg(value_name = "INDEX")]
    pub index: PathBuf,

    /// Token vocabulary file (one entry per line)
    #[arg(short = 't', long, value_name = "FILE")]
    pub tokens: PathBuf,

    /// Packed 32-bit token id file for the text
    #[arg(short = 'x', long, value_name = "FILE")]
    pub text: PathBuf,

    /// Newline positions file (packed 32-bit token positions)
    #[arg(short = 'n', long, value_name = "FILE")]
    pub enter: Option<PathBuf>,

    /// Output dialect
    #[arg(short = 'm', long, value_enum, default_value = "html")]
    pub mode: ResultModeArg,

    /// Sort order of the concordance
    #[arg(short = 's', long, value_enum, default_value = "text-order")]
    pub sort: SortModeArg,

    /// Left context width in displayable characters
    #[arg(short = 'l', long, value_name = "N")]
    pub left: Option<usize>,

    /// Right context width in displayable characters, counted from the
    /// start of the match
    #[arg(short = 'r', long, value_name = "N")]
    pub right: Option<usize>,

    /// Stop the left context at the previous sentence marker
    #[arg(long)]
    pub left_eos: bool,

    /// Stop the right context at the next sentence marker
    #[arg(long)]
    pub right_eos: bool,

    /// Thai-aware width counting and collation fixups
    #[arg(long)]
    pub thai: bool,

    /// Font family for HTML output
    #[arg(long, value_name = "NAME")]
    pub font: Option<String>,

    /// Font size for HTML output
    #[arg(long, value_name = "PT")]
    pub fontsize: Option<u32>,

    /// Script prefix for the glossanet and script dialects
    #[arg(long, value_name = "URL")]
    pub script: Option<String>,

    /// Collation alphabet file for the sort stage
    #[arg(short = 'a', long, value_name = "FILE")]
    pub alphabet: Option<PathBuf>,

    /// Working directory for intermediate and final files
    /// (default: the directory of the match index)
    #[arg(short = 'w', long, value_name = "DIR")]
    pub wd: Option<PathBuf>,

    /// Destination of the rewritten text (merge mode only)
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Encoding of text and XML outputs
    #[arg(short = 'e', long, value_enum)]
    pub encoding: Option<EncodingArg>,

    /// TOML configuration file supplying defaults
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Output dialects exposed on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ResultModeArg {
    Html,
    Text,
    Glossanet,
    Script,
    Index,
    Uima,
    Axis,
    Xml,
    XmlHeader,
    Xalign,
    Merge,
}

impl From<ResultModeArg> for ResultMode {
    fn from(arg: ResultModeArg) -> Self {
        match arg {
            ResultModeArg::Html => ResultMode::Html,
            ResultModeArg::Text => ResultMode::Text,
            ResultModeArg::Glossanet => ResultMode::Glossanet,
            ResultModeArg::Script => ResultMode::Script,
            ResultModeArg::Index => ResultMode::Index,
            ResultModeArg::Uima => ResultMode::Uima,
            ResultModeArg::Axis => ResultMode::Axis,
            ResultModeArg::Xml => ResultMode::Xml,
            ResultModeArg::XmlHeader => ResultMode::XmlWithHeader,
            ResultModeArg::Xalign => ResultMode::Xalign,
            ResultModeArg::Merge => ResultMode::Merge,
        }
    }
}

/// Sort orders exposed on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortModeArg {
    TextOrder,
    LeftCenter,
    LeftRight,
    CenterLeft,
    CenterRight,
    RightLeft,
    RightCenter,
}

impl From<SortModeArg> for SortMode {
    fn from(arg: SortModeArg) -> Self {
        match arg {
            SortModeArg::TextOrder => SortMode::TextOrder,
            SortModeArg::LeftCenter => SortMode::LeftCenter,
            SortModeArg::LeftRight => SortMode::LeftRight,
            SortModeArg::CenterLeft => SortMode::CenterLeft,
            SortModeArg::CenterRight => SortMode::CenterRight,
            SortModeArg::RightLeft => SortMode::RightLeft,
            SortModeArg::RightCenter => SortMode::RightCenter,
        }
    }
}

/// Output encodings exposed on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum EncodingArg {
    Utf8,
    Utf16le,
    Utf16be,
}

impl From<EncodingArg> for OutputEncoding {
    fn from(arg: EncodingArg) -> Self {
        match arg {
            EncodingArg::Utf8 => OutputEncoding::Utf8,
            EncodingArg::Utf16le => OutputEncoding::Utf16Le,
            EncodingArg::Utf16be => OutputEncoding::Utf16Be,
        }
    }
}

fn parse_encoding(name: &str) -> Result<OutputEncoding> {
    match name {
        "utf8" => Ok(OutputEncoding::Utf8),
        "utf16le" => Ok(OutputEncoding::Utf16Le),
        "utf16be" => Ok(OutputEncoding::Utf16Be),
        other => Err(CliError::ConfigError(format!("unknown encoding '{other}'")).into()),
    }
}

impl ConcordArgs {
    /// Execute the run described by the arguments
    pub fn execute(&self) -> Result<()> {
        self.init_logging();

        let config = match &self.config {
            Some(path) => CliConfig::load(path)?,
            None => CliConfig::default(),
        };
        let options = self.build_options(&config)?;

        let progress = ProgressReporter::new(self.quiet);
        progress.stage("Loading text");
        let vocabulary = Vocabulary::load(&self.tokens)
            .with_context(|| format!("Failed to load vocabulary: {}", self.tokens.display()))?;
        let text = TokenText::open(&self.text, vocabulary)
            .with_context(|| format!("Failed to map token file: {}", self.text.display()))?;
        let newlines = match &self.enter {
            Some(path) => NewlineIndex::load(path)
                .with_context(|| format!("Failed to load newline positions: {}", path.display()))?,
            None => NewlineIndex::empty(),
        };
        let matches = MatchReader::open(&self.index, &text)
            .with_context(|| format!("Failed to open match index: {}", self.index.display()))?;

        progress.stage("Constructing concordance");
        let summary = create_concordance(&text, matches, &newlines, &options)?;
        progress.finish(&format!(
            "{} match(es) -> {}",
            summary.matches,
            summary.output.display()
        ));
        if self.quiet {
            log::info!(
                "{} match(es) written to {}",
                summary.matches,
                summary.output.display()
            );
        }
        Ok(())
    }

    fn build_options(&self, config: &CliConfig) -> Result<ConcordanceOptions> {
        let result_mode = ResultMode::from(self.mode);
        if result_mode == ResultMode::Merge && self.output.is_none() {
            return Err(CliError::MissingOutput.into());
        }
        let working_directory = match &self.wd {
            Some(dir) => dir.clone(),
            None => self
                .index
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."))
                .to_path_buf(),
        };
        let encoding = match self.encoding {
            Some(arg) => arg.into(),
            None => parse_encoding(&config.output.encoding)?,
        };
        Ok(ConcordanceOptions {
            sort_mode: self.sort.into(),
            result_mode,
            left_context: self.left.unwrap_or(config.context.left),
            right_context: self.right.unwrap_or(config.context.right),
            left_context_until_eos: self.left_eos || config.context.left_until_eos,
            right_context_until_eos: self.right_eos || config.context.right_until_eos,
            thai_mode: self.thai,
            script: self.script.clone(),
            fontname: self
                .font
                .clone()
                .unwrap_or_else(|| config.display.font.clone()),
            fontsize: self.fontsize.unwrap_or(config.display.fontsize),
            sort_alphabet: self.alphabet.clone(),
            working_directory,
            output: self.output.clone(),
            encoding,
        })
    }

    fn init_logging(&self) {
        let log_level = match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        let _ = env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(log_level),
        )
        .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> ConcordArgs {
        let mut argv = vec![
            "concord",
            "matches.ind",
            "--tokens",
            "tokens.txt",
            "--text",
            "text.cod",
        ];
        argv.extend_from_slice(extra);
        ConcordArgs::parse_from(argv)
    }

    #[test]
    fn defaults_come_from_the_config() {
        let config = CliConfig::default();
        let options = args(&[]).build_options(&config).unwrap();
        assert_eq!(options.left_context, 40);
        assert_eq!(options.right_context, 55);
        assert_eq!(options.result_mode, ResultMode::Html);
        assert_eq!(options.encoding, OutputEncoding::Utf16Le);
    }

    #[test]
    fn flags_override_the_config() {
        let config = CliConfig::default();
        let options = args(&["-l", "4", "-r", "7", "-m", "text", "-e", "utf8"])
            .build_options(&config)
            .unwrap();
        assert_eq!(options.left_context, 4);
        assert_eq!(options.right_context, 7);
        assert_eq!(options.result_mode, ResultMode::Text);
        assert_eq!(options.encoding, OutputEncoding::Utf8);
    }

    #[test]
    fn working_directory_defaults_beside_the_index() {
        let config = CliConfig::default();
        let argv = vec![
            "concord",
            "some/dir/matches.ind",
            "--tokens",
            "tokens.txt",
            "--text",
            "text.cod",
        ];
        let options = ConcordArgs::parse_from(argv).build_options(&config).unwrap();
        assert_eq!(options.working_directory, PathBuf::from("some/dir"));
    }

    #[test]
    fn merge_requires_an_output() {
        let config = CliConfig::default();
        assert!(args(&["-m", "merge"]).build_options(&config).is_err());
        assert!(args(&["-m", "merge", "-o", "out.txt"])
            .build_options(&config)
            .is_ok());
    }

    #[test]
    fn bad_config_encoding_is_reported() {
        let config = CliConfig {
            output: crate::config::OutputConfig {
                encoding: "latin1".into(),
            },
            ..CliConfig::default()
        };
        assert!(args(&[]).build_options(&config).is_err());
    }
}
