//! Per-category amounts and placeholder data.

use rand::Rng;
use serde::{Deserialize, Serialize};
use sheetdash_engine::engine::{Row, extract_value};

use crate::config::CategoryMapping;

/// Chart colors, assigned to categories by position and repeated when there
/// are more categories than colors.
pub const PALETTE: [&str; 12] = [
    "#EF4444", "#F59E0B", "#10B981", "#3B82F6", "#8B5CF6", "#EC4899", "#14B8A6", "#F97316",
    "#6366F1", "#84CC16", "#06B6D4", "#64748B",
];

/// Range of placeholder amounts: `[PLACEHOLDER_MIN, PLACEHOLDER_MIN + PLACEHOLDER_SPAN)`.
const PLACEHOLDER_MIN: f64 = 100.0;
const PLACEHOLDER_SPAN: f64 = 500.0;

/// A labelled amount ready for charting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub name: String,
    pub value: f64,
    pub color: String,
}

/// Color for the category at `index`.
pub fn palette_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// Extract one entry per mapping from a shared grid, in mapping order.
/// Cells that hold text count as `0`.
pub fn category_entries(grid: &[Row], mappings: &[CategoryMapping]) -> Vec<CategoryEntry> {
    mappings
        .iter()
        .enumerate()
        .map(|(idx, mapping)| {
            let value = extract_value(grid, &mapping.range);
            if value.as_number().is_none() {
                tracing::debug!(
                    "Category {} at {} is not numeric: {}",
                    mapping.category,
                    mapping.range,
                    value
                );
            }
            CategoryEntry {
                name: mapping.category.clone(),
                value: value.number_or_zero(),
                color: palette_color(idx).to_string(),
            }
        })
        .collect()
}

/// Random whole amounts in `[100, 600)` for every mapping.
pub fn placeholder_categories<R: Rng>(
    mappings: &[CategoryMapping],
    rng: &mut R,
) -> Vec<CategoryEntry> {
    mappings
        .iter()
        .enumerate()
        .map(|(idx, mapping)| CategoryEntry {
            name: mapping.category.clone(),
            value: (rng.r#gen::<f64>() * PLACEHOLDER_SPAN).floor() + PLACEHOLDER_MIN,
            color: palette_color(idx).to_string(),
        })
        .collect()
}
