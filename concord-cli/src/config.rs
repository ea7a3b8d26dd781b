//! Configuration module

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// CLI configuration structure, loaded from a TOML file to provide
/// defaults that command-line flags override
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct CliConfig {
    /// Context extraction configuration
    #[serde(default)]
    pub context: ContextConfig,

    /// Display configuration for HTML output
    #[serde(default)]
    pub display: DisplayConfig,

    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Context-related configuration
#[derive(Debug, Deserialize, Serialize)]
pub struct ContextConfig {
    /// Left context width in displayable characters
    pub left: usize,

    /// Right context width in displayable characters
    pub right: usize,

    /// Stop the left context at the previous sentence marker
    pub left_until_eos: bool,

    /// Stop the right context at the next sentence marker
    pub right_until_eos: bool,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            left: 40,
            right: 55,
            left_until_eos: false,
            right_until_eos: false,
        }
    }
}

/// Display-related configuration
#[derive(Debug, Deserialize, Serialize)]
pub struct DisplayConfig {
    /// Font family for HTML concordances
    pub font: String,

    /// Font size for HTML concordances
    pub fontsize: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            font: "Courier new".to_string(),
            fontsize: 10,
        }
    }
}

/// Output-related configuration
#[derive(Debug, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Default encoding for text and XML outputs
    pub encoding: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            encoding: "utf16le".to_string(),
        }
    }
}

impl CliConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_are_sensible() {
        let config = CliConfig::default();
        assert_eq!(config.context.left, 40);
        assert_eq!(config.context.right, 55);
        assert_eq!(config.display.font, "Courier new");
        assert_eq!(config.output.encoding, "utf16le");
    }

    #[test]
    fn partial_files_fall_back_to_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[context]\nleft = 10\nright = 12\nleft_until_eos = false\nright_until_eos = true\n")
            .unwrap();
        let config = CliConfig::load(file.path()).unwrap();
        assert_eq!(config.context.left, 10);
        assert!(config.context.right_until_eos);
        assert_eq!(config.display.fontsize, 10);
    }
}
