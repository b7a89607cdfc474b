use chrono::{DateTime, Utc};
use serde::Serialize;
use sheetdash_core::aggregate::{CategoryEntry, FinancialSummary};
use sheetdash_core::summary::{DashboardSummary, summarize};

/// Presentation state shared with whatever renders the dashboard.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DashboardState {
    pub categories: Vec<CategoryEntry>,
    pub financial: FinancialSummary,
    /// True while at least one refresh is in flight.
    pub loading: bool,
    /// Message of the most recent failed load; placeholder data is shown
    /// while this is set.
    pub error: Option<String>,
    pub refreshed_at: Option<DateTime<Utc>>,
    /// Number of refreshes that have written this state.
    pub generation: u64,
}

impl DashboardState {
    pub fn summary(&self) -> DashboardSummary {
        summarize(&self.categories, &self.financial)
    }

    /// Dismissible notice for the last failed load.
    pub fn notice(&self) -> Option<String> {
        self.error.as_ref().map(|err| {
            format!("Data Connection Issue: {err}. Using sample data until the sheet is reachable.")
        })
    }
}
