//! Final formatter: from sorted intermediate lines to the output dialect
//!
//! Each intermediate line holds three context columns in sort order, an
//! optional positions field and, for GlossaNet, a URL. The formatter
//! undoes the column permutation, restores the left context (Thai vowel
//! fixup, then un-mirror) when a sort ran, and renders one line per
//! dialect. The left column is only emitted by the dialects that display
//! it: the HTML family and plain text.

use std::collections::HashSet;
use std::path::Path;

use crate::context::mirror;
use crate::encoding::{self, EncodedWriter, OutputEncoding};
use crate::error::{ConcordError, Result};
use crate::options::{ConcordanceOptions, ResultMode, SortMode};
use crate::thai;

/// Render the intermediate file into the final output file.
pub fn write_final(
    intermediate: &Path,
    final_path: &Path,
    n_matches: usize,
    options: &ConcordanceOptions,
) -> Result<()> {
    let content = encoding::read_to_string(intermediate)?;
    let out_encoding = if options.result_mode.is_html_output() {
        OutputEncoding::Utf8
    } else {
        options.encoding
    };
    let mut out = EncodedWriter::create(final_path, out_encoding)?;

    match options.result_mode {
        ResultMode::Html | ResultMode::Glossanet | ResultMode::Script => {
            write_html_header(&mut out, n_matches, options)?;
        }
        ResultMode::XmlWithHeader => {
            out.write_str(&format!(
                "<?xml version='1.0' encoding='{}'?>\n<concord>\n",
                out_encoding.xml_encoding()
            ))?;
        }
        ResultMode::Xml => {
            out.write_str("<concord>\n")?;
        }
        _ => {}
    }

    let sorted = options.sort_mode != SortMode::TextOrder;
    let mut seen_lines: HashSet<String> = HashSet::new();

    for (line_index, line) in content.lines().enumerate() {
        if line.is_empty() {
            continue;
        }
        let line_no = line_index + 1;
        let parsed = ParsedLine::parse(line, line_no, options)?;
        let (left, middle, right) = parsed.reorder(options.sort_mode);

        if options.result_mode == ResultMode::Glossanet {
            // Duplicate rows are suppressed, keyed on the raw columns.
            let key = format!("{left}\t{middle}\t{right}");
            if !seen_lines.insert(key) {
                continue;
            }
        }

        emit_line(
            &mut out,
            options,
            sorted,
            left,
            middle,
            right,
            parsed.positions,
            parsed.href,
            line_no,
        )?;
    }

    match options.result_mode {
        ResultMode::Html | ResultMode::Glossanet => {
            out.write_str("</table></body>\n</html>\n")?;
        }
        ResultMode::Xml | ResultMode::XmlWithHeader => {
            out.write_str("</concord>\n")?;
        }
        _ => {}
    }
    out.finish()
}

struct ParsedLine<'l> {
    columns: [&'l str; 3],
    positions: &'l str,
    href: &'l str,
}

impl<'l> ParsedLine<'l> {
    fn parse(line: &'l str, line_no: usize, options: &ConcordanceOptions) -> Result<Self> {
        let mut fields = line.splitn(4, '\t');
        let a = fields.next().unwrap_or("");
        let (Some(b), Some(c)) = (fields.next(), fields.next()) else {
            return Err(ConcordError::MalformedIntermediate { line: line_no });
        };
        let (positions, href) = match fields.next() {
            Some(rest) => match rest.split_once('\t') {
                Some((positions, href)) => (positions, Some(href)),
                None => (rest, None),
            },
            None => ("", None),
        };
        if options.result_mode == ResultMode::Glossanet && href.is_none() {
            log::error!("no URL found in GlossaNet concordance line {line_no}");
        }
        let href = href.unwrap_or("");
        Ok(Self {
            columns: [a, b, c],
            positions,
            href,
        })
    }

    /// Undo the sort-mode column permutation, returning
    /// `(left, middle, right)`.
    fn reorder(&self, sort_mode: SortMode) -> (&'l str, &'l str, &'l str) {
        let [a, b, c] = self.columns;
        match sort_mode {
            SortMode::TextOrder | SortMode::LeftCenter => (a, b, c),
            SortMode::LeftRight => (a, c, b),
            SortMode::CenterLeft => (b, a, c),
            SortMode::CenterRight => (c, a, b),
            SortMode::RightLeft => (b, c, a),
            SortMode::RightCenter => (c, b, a),
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn emit_line(
    out: &mut EncodedWriter,
    options: &ConcordanceOptions,
    sorted: bool,
    left: &str,
    middle: &str,
    right: &str,
    positions: &str,
    href: &str,
    line_no: usize,
) -> Result<()> {
    // The left column reaches the output only in the dialects that
    // display context. It is stored mirrored when a sort ran, with Thai
    // initial vowels pre-swapped; both transformations are undone here.
    let restore_left = || {
        let mut restored = left.to_string();
        if sorted {
            if options.thai_mode {
                thai::reverse_initial_vowels(&mut restored);
            }
            mirror(&mut restored);
        }
        restored
    };
    let script = options.script.as_deref().unwrap_or("");

    match options.result_mode {
        ResultMode::Html => {
            out.write_str(&format!(
                "<tr><td nowrap>{}<a href=\"{}\">{}</a>{}&nbsp;</td></tr>\n",
                html_escape(&restore_left()),
                positions,
                html_escape(middle),
                html_escape(right)
            ))?;
        }
        ResultMode::Glossanet => {
            out.write_str(&format!(
                "<tr><td nowrap>{}<A HREF=\"{}?rec={}&adr={}\" style=\"color: rgb(0,0,128)\">{}</A>{}</td></tr>\n",
                html_escape(&restore_left()),
                script,
                html_escape(middle),
                html_escape(href),
                html_escape(middle),
                html_escape(right)
            ))?;
        }
        ResultMode::Script => {
            out.write_str(&format!(
                "<tr><td nowrap>{}<a href=\"{}{}\">{}</a>{}</td></tr>\n",
                html_escape(&restore_left()),
                script,
                url_escape(middle),
                html_escape(middle),
                html_escape(right)
            ))?;
        }
        ResultMode::Text => {
            out.write_str(&format!("{}\t{}\t{}\n", restore_left(), middle, right))?;
        }
        ResultMode::Index => {
            let start = positions.split_whitespace().next().unwrap_or("");
            out.write_str(&format!("{start}\t{middle}\n"))?;
        }
        ResultMode::Uima => {
            let (start, end) = parse_bounds(positions, line_no)?;
            out.write_str(&format!("{start} {end}\t{middle}\n"))?;
        }
        ResultMode::Xml | ResultMode::XmlWithHeader => {
            let (start, end) = parse_bounds(positions, line_no)?;
            out.write_str(&format!(
                "<concordance start=\"{start}\" end=\"{end}\">{middle}</concordance>\n"
            ))?;
        }
        ResultMode::Axis => {
            // med = ((end + 1 - start) + 1) / 2 + start, kept in half
            // units so that .0 and .5 print exactly.
            let (start, end) = parse_bounds(positions, line_no)?;
            let half_units = start + end + 2;
            out.write_str(&format!(
                "{}.{}\t{}\n",
                half_units.div_euclid(2),
                if half_units % 2 == 0 { '0' } else { '5' },
                middle
            ))?;
        }
        // Never reaches the formatter: XAlign writes the final file
        // directly and merge mode rewrites the text instead.
        ResultMode::Xalign | ResultMode::Merge => {}
    }
    Ok(())
}

fn parse_bounds(positions: &str, line_no: usize) -> Result<(i64, i64)> {
    let mut fields = positions.split_whitespace();
    let start = fields.next().and_then(|f| f.parse().ok());
    let end = fields.next().and_then(|f| f.parse().ok());
    match (start, end) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(ConcordError::MalformedIntermediate { line: line_no }),
    }
}

fn write_html_header(
    out: &mut EncodedWriter,
    n_matches: usize,
    options: &ConcordanceOptions,
) -> Result<()> {
    out.write_str("<html lang=en>\n<head>\n")?;
    out.write_str("   <meta http-equiv=\"Content-Type\" content=\"text/html; charset=UTF-8\">\n")?;
    out.write_str(&format!(
        "   <title>{} match{}</title>\n",
        n_matches,
        if n_matches > 1 { "es" } else { "" }
    ))?;
    out.write_str("</head>\n")?;
    out.write_str(&format!(
        "<body>\n<table border=\"0\" cellpadding=\"0\" width=\"100%\" style=\"font-family: '{}'; font-size: {}\">\n",
        options.fontname, options.fontsize
    ))?;
    Ok(())
}

fn html_escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn url_escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                escaped.push(byte as char)
            }
            _ => escaped.push_str(&format!("%{byte:02X}")),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::read_to_string;
    use tempfile::TempDir;

    fn run_formatter(lines: &str, n: usize, options: &ConcordanceOptions) -> String {
        let dir = TempDir::new().unwrap();
        let intermediate = dir.path().join("concord_.txt");
        let final_path = dir.path().join("out");
        let mut writer = EncodedWriter::create(&intermediate, OutputEncoding::Utf16Le).unwrap();
        writer.write_str(lines).unwrap();
        writer.finish().unwrap();
        write_final(&intermediate, &final_path, n, options).unwrap();
        read_to_string(&final_path).unwrap()
    }

    #[test]
    fn text_mode_untangles_a_center_left_sort() {
        let options = ConcordanceOptions {
            result_mode: ResultMode::Text,
            sort_mode: SortMode::CenterLeft,
            encoding: OutputEncoding::Utf8,
            ..ConcordanceOptions::default()
        };
        let output = run_formatter("cat\t ehT\t sat\t4 7 1\n", 1, &options);
        assert_eq!(output, "The \tcat\t sat\n");
    }

    #[test]
    fn axis_mode_prints_half_integer_medians() {
        let options = ConcordanceOptions {
            result_mode: ResultMode::Axis,
            encoding: OutputEncoding::Utf8,
            ..ConcordanceOptions::default()
        };
        let output = run_formatter("\tcat\t\t6 8 1\n\tcat\t\t4 7 1\n", 2, &options);
        assert_eq!(output, "8.0\tcat\n6.5\tcat\n");
    }

    #[test]
    fn uima_mode_echoes_the_two_bounds() {
        let options = ConcordanceOptions {
            result_mode: ResultMode::Uima,
            encoding: OutputEncoding::Utf8,
            ..ConcordanceOptions::default()
        };
        let output = run_formatter("\tcat\t\t6 9 1\n", 1, &options);
        assert_eq!(output, "6 9\tcat\n");
    }

    #[test]
    fn index_mode_takes_the_first_position_field() {
        let options = ConcordanceOptions {
            result_mode: ResultMode::Index,
            encoding: OutputEncoding::Utf8,
            ..ConcordanceOptions::default()
        };
        let output = run_formatter("\tcat\t\t12 15 2\n", 1, &options);
        assert_eq!(output, "12\tcat\n");
    }

    #[test]
    fn xml_with_header_matches_the_output_encoding() {
        let options = ConcordanceOptions {
            result_mode: ResultMode::XmlWithHeader,
            encoding: OutputEncoding::Utf8,
            ..ConcordanceOptions::default()
        };
        let output = run_formatter("\tcat\t\t4 7 1\n", 1, &options);
        assert_eq!(
            output,
            "<?xml version='1.0' encoding='UTF-8'?>\n<concord>\n\
             <concordance start=\"4\" end=\"7\">cat</concordance>\n</concord>\n"
        );

        let options = ConcordanceOptions {
            encoding: OutputEncoding::Utf16Le,
            ..options
        };
        let output = run_formatter("\tcat\t\t4 7 1\n", 1, &options);
        assert!(output.starts_with("<?xml version='1.0' encoding='UTF-16'?>"));
    }

    #[test]
    fn html_mode_wraps_rows_and_counts_matches() {
        let options = ConcordanceOptions {
            result_mode: ResultMode::Html,
            fontname: "Arial".into(),
            fontsize: 12,
            ..ConcordanceOptions::default()
        };
        let output = run_formatter("a<b\tcat\t sat\t4 7 1\n", 1, &options);
        assert!(output.contains("<title>1 match</title>"));
        assert!(output.contains("font-family: 'Arial'; font-size: 12"));
        assert!(output.contains(
            "<tr><td nowrap>a&lt;b<a href=\"4 7 1\">cat</a> sat&nbsp;</td></tr>"
        ));
        assert!(output.ends_with("</table></body>\n</html>\n"));
    }

    #[test]
    fn glossanet_mode_deduplicates_and_links_through_the_script() {
        let options = ConcordanceOptions {
            result_mode: ResultMode::Glossanet,
            script: Some("http://g/q".into()),
            ..ConcordanceOptions::default()
        };
        let lines = "l\tcat\tr\t4 7 1\thttp://x\nl\tcat\tr\t9 12 1\thttp://x\n";
        let output = run_formatter(lines, 2, &options);
        assert_eq!(output.matches("<tr>").count(), 1);
        assert!(output.contains("HREF=\"http://g/q?rec=cat&adr=http://x\""));
        assert!(output.contains("<title>2 matches</title>"));
    }

    #[test]
    fn script_mode_url_escapes_the_match() {
        let options = ConcordanceOptions {
            result_mode: ResultMode::Script,
            script: Some("lookup:".into()),
            ..ConcordanceOptions::default()
        };
        let output = run_formatter("\ta b\t\t0 2 1\n", 1, &options);
        assert!(output.contains("<a href=\"lookup:a%20b\">a b</a>"));
        // Script mode keeps the header but not the trailer.
        assert!(output.contains("<html lang=en>"));
        assert!(!output.contains("</html>"));
    }

    #[test]
    fn sorted_left_context_is_unmirrored_for_display() {
        let options = ConcordanceOptions {
            result_mode: ResultMode::Text,
            sort_mode: SortMode::LeftCenter,
            encoding: OutputEncoding::Utf8,
            ..ConcordanceOptions::default()
        };
        let output = run_formatter(" ehT\tcat\t sat\t4 7 1\n", 1, &options);
        assert_eq!(output, "The \tcat\t sat\n");
    }

    #[test]
    fn missing_columns_are_an_error() {
        let dir = TempDir::new().unwrap();
        let intermediate = dir.path().join("concord_.txt");
        let final_path = dir.path().join("out");
        let mut writer = EncodedWriter::create(&intermediate, OutputEncoding::Utf16Le).unwrap();
        writer.write_str("only one column\n").unwrap();
        writer.finish().unwrap();
        let options = ConcordanceOptions {
            result_mode: ResultMode::Text,
            ..ConcordanceOptions::default()
        };
        let err = write_final(&intermediate, &final_path, 1, &options).unwrap_err();
        assert!(matches!(err, ConcordError::MalformedIntermediate { line: 1 }));
    }
}
