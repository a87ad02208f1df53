//! Bordered table extraction
//!
//! EXPLAIN results pasted from a MySQL-protocol client look like:
//!
//! ```text
//! +-------------------+----------+------+---------------+
//! | id                | estRows  | task | operator info |
//! +-------------------+----------+------+---------------+
//! | TableReader_5     | 10000.00 | root | data:Table... |
//! +-------------------+----------+------+---------------+
//! ```
//!
//! Anything before the first border line or after the third one (the SQL
//! prompt, "N rows in set", warnings) is ignored.

use crate::error::{FormatError, Result};

/// The bordered block of an EXPLAIN report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplainTable<'a> {
    lines: Vec<&'a str>,
}

impl<'a> ExplainTable<'a> {
    /// All lines from the top border through the bottom border
    pub fn lines(&self) -> &[&'a str] {
        &self.lines
    }

    /// The column header row
    pub fn header(&self) -> &'a str {
        self.lines[1]
    }

    /// Operator rows, between the header separator and the bottom border
    pub fn body(&self) -> &[&'a str] {
        &self.lines[3..self.lines.len() - 1]
    }
}

/// Returns true for lines made only of `+` and `-`
pub fn is_border_line(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty() && line.chars().all(|c| c == '+' || c == '-')
}

/// Isolates the bordered block: first border line through third, inclusive
///
/// The first two borders must enclose exactly one header line.
pub fn extract_table(text: &str) -> Result<ExplainTable<'_>> {
    let lines: Vec<&str> = text.lines().collect();

    let borders: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| is_border_line(line))
        .map(|(i, _)| i)
        .take(3)
        .collect();

    if borders.len() != 3 {
        return Err(FormatError::MissingBorders {
            found: borders.len(),
        }
        .into());
    }

    // Exactly one header line between the first two borders
    let header_lines = borders[1] - borders[0] - 1;
    if header_lines != 1 {
        return Err(FormatError::MissingHeader {
            found: header_lines,
        }
        .into());
    }

    Ok(ExplainTable {
        lines: lines[borders[0]..=borders[2]].to_vec(),
    })
}

/// Splits one bordered line into its column values
///
/// The empty fields produced by the leading and trailing `|` are dropped.
/// Values keep their padding; the id column needs it to locate tree glyphs.
pub fn split_row(line: &str) -> Result<Vec<String>> {
    let trimmed = line.trim();
    if trimmed.len() < 2 || !trimmed.starts_with('|') || !trimmed.ends_with('|') {
        return Err(FormatError::MalformedRow {
            line: line.to_string(),
        }
        .into());
    }

    let inner = &trimmed[1..trimmed.len() - 1];
    Ok(inner.split('|').map(String::from).collect())
}

/// Splits every body line, preserving order
pub fn split_rows(lines: &[&str]) -> Result<Vec<Vec<String>>> {
    lines.iter().map(|line| split_row(line)).collect()
}

/// Splits the header row into trimmed column names
pub fn split_header(line: &str) -> Result<Vec<String>> {
    Ok(split_row(line)?
        .into_iter()
        .map(|name| name.trim().to_string())
        .collect())
}
