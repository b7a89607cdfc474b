//! Cell data structures for a parsed sheet export.
//!
//! - [`Row`] / [`Grid`] - Raw cell text, positionally indexed
//! - [`CellValue`] - The typed scalar extracted from a single cell

use serde::{Deserialize, Serialize};
use std::fmt;

use super::format::format_number;

/// One line of a CSV export, split into raw cell strings.
pub type Row = Vec<String>;

/// Rows of raw cell strings as produced by splitting CSV text.
///
/// Rows may be ragged. A grid built from `N` lines has `N` rows, including a
/// trailing empty row when the text ends in a newline.
pub type Grid = Vec<Row>;

/// A value extracted from a grid cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl CellValue {
    /// The value used for a cell that is missing or empty.
    pub const ABSENT: CellValue = CellValue::Number(0.0);

    /// The numeric value, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(_) => None,
        }
    }

    /// The numeric value, with text treated as `0`.
    pub fn number_or_zero(&self) -> f64 {
        self.as_number().unwrap_or(0.0)
    }

    /// Truthiness: non-zero, non-NaN numbers and non-empty text.
    pub fn is_truthy(&self) -> bool {
        match self {
            CellValue::Number(n) => *n != 0.0 && !n.is_nan(),
            CellValue::Text(s) => !s.is_empty(),
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::ABSENT
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => f.write_str(&format_number(*n)),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}
