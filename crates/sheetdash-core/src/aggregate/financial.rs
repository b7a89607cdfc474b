//! Budget and income headline figures.

use serde::{Deserialize, Serialize};
use sheetdash_engine::engine::{CellValue, Row, extract_value, format_amount};
use std::fmt;

use crate::config::FinancialRanges;

/// Headline budget and income figures.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FinancialSummary {
    pub total_budget: f64,
    pub total_income: f64,
    /// Percentage, e.g. `8.5` for 8.5%.
    pub income_growth: f64,
}

impl FinancialSummary {
    pub const DEFAULT_TOTAL_BUDGET: f64 = 5000.0;
    pub const DEFAULT_TOTAL_INCOME: f64 = 6500.0;
    pub const DEFAULT_INCOME_GROWTH: f64 = 8.5;
}

impl Default for FinancialSummary {
    fn default() -> Self {
        FinancialSummary {
            total_budget: Self::DEFAULT_TOTAL_BUDGET,
            total_income: Self::DEFAULT_TOTAL_INCOME,
            income_growth: Self::DEFAULT_INCOME_GROWTH,
        }
    }
}

impl fmt::Display for FinancialSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "budget ${}, income ${} ({:+}%)",
            format_amount(self.total_budget),
            format_amount(self.total_income),
            self.income_growth
        )
    }
}

/// Extract the financial figures. Each field falls back to its own default
/// when its cell is zero, empty, missing or not a number.
pub fn financial_summary(grid: &[Row], ranges: &FinancialRanges) -> FinancialSummary {
    FinancialSummary {
        total_budget: field_or(grid, &ranges.total_budget, FinancialSummary::DEFAULT_TOTAL_BUDGET),
        total_income: field_or(grid, &ranges.total_income, FinancialSummary::DEFAULT_TOTAL_INCOME),
        income_growth: field_or(
            grid,
            &ranges.income_growth,
            FinancialSummary::DEFAULT_INCOME_GROWTH,
        ),
    }
}

fn field_or(grid: &[Row], range: &str, default: f64) -> f64 {
    match extract_value(grid, range) {
        CellValue::Number(n) if n != 0.0 && !n.is_nan() => n,
        _ => default,
    }
}
