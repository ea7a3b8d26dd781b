//! Sort stage for the intermediate concordance
//!
//! Historically this was an external sorter invoked on the intermediate
//! file with a collation alphabet. The comparator is inlined here
//! instead, which spares the temp-file round trip while keeping the
//! contract: a stable sort keyed on the three-column prefix of each
//! line, with character order taken from the alphabet file. Right-to-left
//! collation of left contexts needs no support here at all, because the
//! raw writer already mirrors them.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;

use crate::encoding::{self, EncodedWriter, OutputEncoding};
use crate::error::Result;

/// Character ranks loaded from a collation alphabet file.
///
/// Each line of the file lists characters of one rank, earlier lines
/// collating first; position within a line breaks ties. Characters
/// absent from the file collate after every listed one, by codepoint.
#[derive(Debug, Clone, Default)]
pub struct SortAlphabet {
    ranks: HashMap<char, (u32, u32)>,
}

impl SortAlphabet {
    pub fn load(path: &Path) -> Result<Self> {
        let content = encoding::read_to_string(path)?;
        Ok(Self::from_lines(content.lines()))
    }

    pub fn from_lines<'l>(lines: impl Iterator<Item = &'l str>) -> Self {
        let mut ranks = HashMap::new();
        for (line_no, line) in lines.enumerate() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            for (col, c) in line.chars().enumerate() {
                ranks.entry(c).or_insert((line_no as u32, col as u32));
            }
        }
        Self { ranks }
    }

    fn key(&self, c: char) -> (u32, u32, u32) {
        match self.ranks.get(&c) {
            Some(&(line, col)) => (line, col, 0),
            None => (u32::MAX, c as u32, 0),
        }
    }
}

/// The part of a line that drives the sort: its first three columns
fn sort_prefix(line: &str) -> &str {
    let mut tabs = 0;
    for (i, c) in line.char_indices() {
        if c == '\t' {
            tabs += 1;
            if tabs == 3 {
                return &line[..i];
            }
        }
    }
    line
}

/// Compare two intermediate lines under an optional alphabet
pub fn compare_lines(a: &str, b: &str, alphabet: Option<&SortAlphabet>) -> Ordering {
    let key = |c: char| match alphabet {
        Some(alpha) => alpha.key(c),
        None => (0, c as u32, 0),
    };
    let mut ita = sort_prefix(a).chars();
    let mut itb = sort_prefix(b).chars();
    loop {
        match (ita.next(), itb.next()) {
            (Some(ca), Some(cb)) => match key(ca).cmp(&key(cb)) {
                Ordering::Equal => continue,
                other => return other,
            },
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (None, None) => return Ordering::Equal,
        }
    }
}

/// Stable-sort the UTF-16LE intermediate file in place
pub fn sort_intermediate(path: &Path, alphabet: Option<&SortAlphabet>) -> Result<()> {
    let content = encoding::read_to_string(path)?;
    let mut lines: Vec<&str> = content.lines().collect();
    lines.sort_by(|a, b| compare_lines(a, b, alphabet));
    let mut writer = EncodedWriter::create(path, OutputEncoding::Utf16Le)?;
    for line in &lines {
        writer.write_str(line)?;
        writer.write_str("\n")?;
    }
    writer.finish()
}
