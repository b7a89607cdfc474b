//! Figures derived from categories and the financial summary, in the shape a
//! renderer consumes them.

use serde::{Deserialize, Serialize};
use sheetdash_engine::engine::format_amount;

use crate::aggregate::{CategoryEntry, FinancialSummary};

/// One bar of the spending chart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BarEntry {
    /// First word of the category name ("Debt & Loan" -> "Debt").
    pub category: String,
    pub amount: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_budget: f64,
    pub spent: f64,
    pub remaining: f64,
    /// `remaining / total_budget`, or `0` for a zero budget.
    pub remaining_ratio: f64,
    pub total_income: f64,
    pub income_growth: f64,
    pub expense_total: f64,
    pub bars: Vec<BarEntry>,
}

impl DashboardSummary {
    /// One-line overview, e.g. "$2,350 remaining of $5,000 ($2,650 spent)".
    pub fn headline(&self) -> String {
        format!(
            "${} remaining of ${} (${} spent)",
            format_amount(self.remaining),
            format_amount(self.total_budget),
            format_amount(self.spent)
        )
    }
}

pub fn summarize(categories: &[CategoryEntry], financial: &FinancialSummary) -> DashboardSummary {
    let spent: f64 = categories.iter().map(|c| c.value).sum();
    let remaining = financial.total_budget - spent;
    let remaining_ratio = if financial.total_budget == 0.0 {
        0.0
    } else {
        remaining / financial.total_budget
    };

    let bars = categories
        .iter()
        .map(|c| BarEntry {
            category: c.name.split(' ').next().unwrap_or_default().to_string(),
            amount: c.value,
        })
        .collect();

    DashboardSummary {
        total_budget: financial.total_budget,
        spent,
        remaining,
        remaining_ratio,
        total_income: financial.total_income,
        income_growth: financial.income_growth,
        expense_total: spent,
        bars,
    }
}
