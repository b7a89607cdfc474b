//! Single-cell value extraction from a grid.
//!
//! Only the origin cell of a range is ever read. A category maps to exactly
//! one cell of the source sheet, so multi-cell ranges are accepted but never
//! aggregated.

use regex::Regex;
use std::sync::OnceLock;

use super::cell::{CellValue, Row};
use super::range_ref::resolve;

fn float_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^\s*([+-]?(?:Infinity|(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?))",
        )
        .unwrap()
    })
}

/// Parse the leading decimal literal of `text` ("850\r" -> 850, "12kg" -> 12).
/// Returns None when the text does not start with a number.
pub fn parse_float_prefix(text: &str) -> Option<f64> {
    let caps = float_prefix_re().captures(text)?;
    caps[1].parse::<f64>().ok()
}

/// Coerce raw cell text to a [`CellValue`].
/// Empty text is absent (`0`); text without a numeric prefix is kept as-is.
pub fn coerce_cell(raw: &str) -> CellValue {
    if raw.is_empty() {
        return CellValue::ABSENT;
    }
    match parse_float_prefix(raw) {
        Some(n) => CellValue::Number(n),
        None => CellValue::Text(raw.to_string()),
    }
}

/// Extract the value at the origin cell of `range`.
///
/// Never fails: an unresolvable reference, a missing row or column, or an
/// empty cell all yield `0`.
pub fn extract_value(grid: &[Row], range: &str) -> CellValue {
    let Some((row, col)) = resolve(range).origin() else {
        return CellValue::ABSENT;
    };
    grid.get(row)
        .and_then(|cells| cells.get(col))
        .map_or(CellValue::ABSENT, |raw| coerce_cell(raw))
}

/// Extract the origin value of each range, in input order.
pub fn extract_values<S: AsRef<str>>(grid: &[Row], ranges: &[S]) -> Vec<CellValue> {
    ranges
        .iter()
        .map(|range| extract_value(grid, range.as_ref()))
        .collect()
}
