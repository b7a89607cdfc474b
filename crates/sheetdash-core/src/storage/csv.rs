//! CSV text to grid splitting

use serde::{Deserialize, Serialize};
use sheetdash_engine::engine::{Grid, Row};
use std::path::Path;

use crate::error::Result;

/// How CSV text is split into cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CsvDialect {
    /// Split on `\n` then `,`. No quoting: a cell containing a comma shifts
    /// every following cell in that row. Cell text is kept byte-for-byte,
    /// including a trailing `\r` from CRLF exports.
    #[default]
    Naive,
    /// Double-quoted fields may contain commas and `""` escapes. Still one
    /// row per line, so quoted newlines are not supported.
    Quoted,
}

/// Split CSV text into a grid. `N` lines always give `N` rows.
pub fn split_rows(text: &str, dialect: CsvDialect) -> Grid {
    match dialect {
        CsvDialect::Naive => text.split('\n').map(split_line_naive).collect(),
        CsvDialect::Quoted => text
            .split('\n')
            .map(|line| split_line_quoted(line.strip_suffix('\r').unwrap_or(line)))
            .collect(),
    }
}

/// Read a CSV file from disk into a grid.
pub fn read_grid(path: &Path, dialect: CsvDialect) -> Result<Grid> {
    let content = std::fs::read_to_string(path)?;
    Ok(split_rows(&content, dialect))
}

fn split_line_naive(line: &str) -> Row {
    line.split(',').map(String::from).collect()
}

/// Split one line of the `Quoted` dialect.
///
/// A `"` opens a quoted field only as the first non-blank character of the
/// field; elsewhere it is literal text. Inside quotes `""` is one quote and
/// commas are data. An unterminated quote runs to the end of the line.
/// Bare fields are trimmed, quoted ones are kept as written.
pub(crate) fn split_line_quoted(line: &str) -> Row {
    let mut row = Row::new();
    let mut rest = line;
    loop {
        let (cell, tail) = take_cell(rest);
        row.push(cell);
        match tail {
            Some(tail) => rest = tail,
            None => return row,
        }
    }
}

/// Take one cell off the front of `text`, returning it and the text after
/// its separating comma (None at end of line).
fn take_cell(text: &str) -> (String, Option<&str>) {
    let trimmed = text.trim_start();
    let Some(quoted) = trimmed.strip_prefix('"') else {
        return match text.split_once(',') {
            Some((cell, tail)) => (cell.trim().to_string(), Some(tail)),
            None => (text.trim().to_string(), None),
        };
    };

    let mut cell = String::new();
    let mut chars = quoted.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        if c != '"' {
            cell.push(c);
            continue;
        }
        if chars.next_if(|&(_, next)| next == '"').is_some() {
            cell.push('"');
            continue;
        }
        // Closing quote: anything up to the next comma is dropped.
        let after = &quoted[idx + 1..];
        return (cell, after.split_once(',').map(|(_, tail)| tail));
    }
    tracing::debug!("Unterminated quoted cell in CSV line");
    (cell, None)
}
