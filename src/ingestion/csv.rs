//! CSV Parsing
//!
//! A deliberately lenient, single-pass line parser. Fields are split on
//! commas with surrounding whitespace and quotes stripped; embedded commas
//! inside quoted fields are not supported. A row whose field count does
//! not match the header is dropped silently rather than failing the whole
//! upload.

use super::types::{IngestError, ParsedRow};

/// Returns every non-blank line of the input, in order. Line numbers used
/// for document identifiers index into this sequence.
pub fn non_blank_lines(text: &str) -> Vec<&str> {
    text.lines().filter(|line| !line.trim().is_empty()).collect()
}

/// Splits one line into trimmed, quote-stripped field values.
pub fn split_fields(line: &str) -> Vec<String> {
    line.split(',')
        .map(|field| field.trim().trim_matches('"').trim().to_string())
        .collect()
}

/// Parses and validates the header line. Every column name must be
/// non-empty after trimming and quote-stripping.
pub fn parse_header(line: &str) -> Result<Vec<String>, IngestError> {
    let headers = split_fields(line);
    if headers.is_empty() || headers.iter().any(|header| header.is_empty()) {
        return Err(IngestError::InvalidHeader);
    }
    Ok(headers)
}

/// Parses all data rows, keeping only those whose field count matches the
/// header arity. `lines` is the full non-blank line sequence including the
/// header at index 0.
pub fn parse_rows(lines: &[&str], arity: usize) -> Vec<ParsedRow> {
    lines
        .iter()
        .enumerate()
        .skip(1)
        .filter_map(|(line_no, line)| {
            let values = split_fields(line);
            if values.len() == arity {
                Some(ParsedRow { line_no, values })
            } else {
                tracing::debug!(
                    "dropping line {}: {} fields, expected {}",
                    line_no,
                    values.len(),
                    arity
                );
                None
            }
        })
        .collect()
}
