//! sheetdash - Spending dashboard data fed from a public spreadsheet CSV export.
//!
//! [`Dashboard`] fetches the sheet, extracts one amount per category plus the
//! budget/income figures, and keeps the result in a shared [`DashboardState`].
//! When the sheet cannot be fetched the state holds placeholder data and an
//! error notice instead, so there is always something to render.

pub mod dashboard;

pub use dashboard::{Dashboard, DashboardState, LoadedData, RefreshOutcome};
pub use sheetdash_core::{
    CategoryEntry, CategoryMapping, DashboardConfig, DashboardSummary, FinancialSummary,
    RefreshPolicy, SheetConfig, SheetError, SheetSource,
};
