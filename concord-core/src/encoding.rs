//! Encoded file I/O for the pipeline files
//!
//! The intermediate concordance is always UTF-16LE. Final outputs are
//! UTF-16 (caller-selectable) for the text and XML dialects and UTF-8 for
//! the HTML family. Input text files are sniffed by BOM, defaulting to
//! UTF-8 when none is present.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{ConcordError, Result};

/// Character encoding of a produced file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputEncoding {
    /// Little-endian UTF-16 with BOM (the historical default)
    #[default]
    Utf16Le,
    /// Big-endian UTF-16 with BOM
    Utf16Be,
    /// UTF-8 without BOM
    Utf8,
}

impl OutputEncoding {
    /// Byte-order mark written at file start, empty for UTF-8
    pub fn bom(&self) -> &'static [u8] {
        match self {
            OutputEncoding::Utf16Le => &[0xFF, 0xFE],
            OutputEncoding::Utf16Be => &[0xFE, 0xFF],
            OutputEncoding::Utf8 => &[],
        }
    }

    /// Value of the `encoding` attribute in an XML prolog
    pub fn xml_encoding(&self) -> &'static str {
        match self {
            OutputEncoding::Utf16Le | OutputEncoding::Utf16Be => "UTF-16",
            OutputEncoding::Utf8 => "UTF-8",
        }
    }
}

/// Buffered writer that transcodes `&str` data into a fixed encoding
pub struct EncodedWriter {
    inner: BufWriter<File>,
    encoding: OutputEncoding,
    path: PathBuf,
}

impl EncodedWriter {
    /// Create the file, truncating any previous content, and write the BOM
    pub fn create(path: &Path, encoding: OutputEncoding) -> Result<Self> {
        let file = File::create(path).map_err(|e| ConcordError::io("write", path, e))?;
        let mut writer = Self {
            inner: BufWriter::new(file),
            encoding,
            path: path.to_path_buf(),
        };
        let bom = encoding.bom();
        if !bom.is_empty() {
            writer.write_bytes(bom)?;
        }
        Ok(writer)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner
            .write_all(bytes)
            .map_err(|e| ConcordError::io("write", &self.path, e))
    }

    /// Append a string in the writer's encoding
    pub fn write_str(&mut self, s: &str) -> Result<()> {
        match self.encoding {
            OutputEncoding::Utf8 => self.write_bytes(s.as_bytes()),
            OutputEncoding::Utf16Le => {
                let mut bytes = Vec::with_capacity(s.len() * 2);
                for unit in s.encode_utf16() {
                    bytes.extend_from_slice(&unit.to_le_bytes());
                }
                self.write_bytes(&bytes)
            }
            OutputEncoding::Utf16Be => {
                let mut bytes = Vec::with_capacity(s.len() * 2);
                for unit in s.encode_utf16() {
                    bytes.extend_from_slice(&unit.to_be_bytes());
                }
                self.write_bytes(&bytes)
            }
        }
    }

    /// Flush and close the file
    pub fn finish(mut self) -> Result<()> {
        self.inner
            .flush()
            .map_err(|e| ConcordError::io("write", &self.path, e))
    }
}

/// Read a whole text file, decoding by BOM sniffing
pub fn read_to_string(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| ConcordError::io("read", path, e))?;
    decode_bytes(&bytes).ok_or_else(|| ConcordError::InvalidEncoding {
        path: path.to_path_buf(),
    })
}

/// Decode a byte buffer as UTF-16LE, UTF-16BE or UTF-8 depending on its BOM
pub(crate) fn decode_bytes(bytes: &[u8]) -> Option<String> {
    if bytes.starts_with(&[0xFF, 0xFE]) {
        decode_utf16(&bytes[2..], u16::from_le_bytes)
    } else if bytes.starts_with(&[0xFE, 0xFF]) {
        decode_utf16(&bytes[2..], u16::from_be_bytes)
    } else if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        String::from_utf8(bytes[3..].to_vec()).ok()
    } else {
        String::from_utf8(bytes.to_vec()).ok()
    }
}

fn decode_utf16(bytes: &[u8], read_unit: fn([u8; 2]) -> u16) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    let units = bytes.chunks_exact(2).map(|pair| read_unit([pair[0], pair[1]]));
    char::decode_utf16(units).collect::<std::result::Result<String, _>>().ok()
}
