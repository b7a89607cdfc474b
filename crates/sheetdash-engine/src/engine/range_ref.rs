//! Range reference resolution.
//!
//! Converts A1-style range strings ("B5", "A2:B13") into zero-indexed
//! row/column bounds.
//!
//! Only the first character of each side is read as the column, so columns
//! past `Z` cannot be addressed: "AA1" resolves to column `A` with row text
//! "A1", which has no leading digits. Nothing is validated. Components that
//! cannot be parsed resolve to `None` rather than failing.
//!
//! # Examples
//!
//! ```
//! use sheetdash_engine::engine::{resolve, ResolvedRange};
//!
//! assert_eq!(resolve("B13"), ResolvedRange::new(12, 12, 1, 1));
//! assert_eq!(resolve("A2:B7"), ResolvedRange::new(1, 6, 0, 1));
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Zero-indexed bounds of a range reference.
///
/// Bounds are kept exactly as written: a reversed range such as "C5:A1" keeps
/// its start in the start fields. `None` marks a component with no parseable
/// content; negative values are possible (row `0`, characters before `A`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedRange {
    pub start_row: Option<i64>,
    pub end_row: Option<i64>,
    pub start_col: Option<i64>,
    pub end_col: Option<i64>,
}

impl ResolvedRange {
    /// Build a range whose every bound parsed.
    pub fn new(start_row: i64, end_row: i64, start_col: i64, end_col: i64) -> ResolvedRange {
        ResolvedRange {
            start_row: Some(start_row),
            end_row: Some(end_row),
            start_col: Some(start_col),
            end_col: Some(end_col),
        }
    }

    /// The origin (top-left as written) cell as `(row, col)` grid indices.
    /// Returns None if either start bound is missing or negative.
    pub fn origin(&self) -> Option<(usize, usize)> {
        let row = usize::try_from(self.start_row?).ok()?;
        let col = usize::try_from(self.start_col?).ok()?;
        Some((row, col))
    }

    /// True when the range names exactly one cell.
    pub fn is_single_cell(&self) -> bool {
        self.start_row == self.end_row && self.start_col == self.end_col
    }
}

impl fmt::Display for ResolvedRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn bound(v: Option<i64>) -> String {
            v.map_or_else(|| "?".to_string(), |n| n.to_string())
        }
        write!(
            f,
            "rows {}..={}, cols {}..={}",
            bound(self.start_row),
            bound(self.end_row),
            bound(self.start_col),
            bound(self.end_col)
        )
    }
}

/// Resolve a range reference such as "A2:B13" or "B5".
///
/// A reference without `:` (or with nothing after it) is both start and end.
/// Anything after a second `:` is ignored.
pub fn resolve(range: &str) -> ResolvedRange {
    let (start, end) = match range.split_once(':') {
        Some((start, rest)) => {
            let end = rest.split(':').next().unwrap_or_default();
            if end.is_empty() { (start, start) } else { (start, end) }
        }
        None => (range, range),
    };

    let (start_col, start_row) = resolve_side(start);
    let (end_col, end_row) = resolve_side(end);

    ResolvedRange {
        start_row,
        end_row,
        start_col,
        end_col,
    }
}

/// Resolve one side of a range into `(col, row)`.
fn resolve_side(side: &str) -> (Option<i64>, Option<i64>) {
    let mut chars = side.chars();
    let col = chars.next().map(|c| c as i64 - 'A' as i64);
    let row = parse_int_prefix(chars.as_str()).and_then(|n| n.checked_sub(1));
    (col, row)
}

fn int_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*([+-]?[0-9]+)").unwrap())
}

/// Parse the leading base-10 integer of `text`.
///
/// Leading whitespace and a sign are accepted, trailing characters are
/// ignored ("12abc" -> 12). Returns None when no digits lead the text or the
/// value does not fit in an `i64`.
pub(crate) fn parse_int_prefix(text: &str) -> Option<i64> {
    let caps = int_prefix_re().captures(text)?;
    caps[1].parse::<i64>().ok()
}
