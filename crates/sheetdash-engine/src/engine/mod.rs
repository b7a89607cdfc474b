//! Range resolution and grid extraction API.
//!
//! - [`resolve`], [`ResolvedRange`] - A1 range text to zero-indexed bounds
//! - [`extract_value`] - Typed scalar at a range's origin cell
//! - [`CellValue`], [`Grid`], [`Row`] - Data structures for parsed exports
//! - [`format_number`], [`format_amount`] - Values for display

mod cell;
mod extract;
mod format;
mod range_ref;

pub use cell::{CellValue, Grid, Row};
pub use extract::{coerce_cell, extract_value, extract_values, parse_float_prefix};
pub use format::{format_amount, format_number};
pub use range_ref::{ResolvedRange, resolve};
