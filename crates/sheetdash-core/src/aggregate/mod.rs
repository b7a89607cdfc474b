//! Binding labels to extracted cell values.
//!
//! - [`category_entries`] - One [`CategoryEntry`] per configured category
//! - [`financial_summary`] - Budget and income figures with per-field defaults
//! - [`placeholder_categories`] - Stand-in values when no data could be fetched

mod categories;
mod financial;

pub use categories::{CategoryEntry, PALETTE, category_entries, palette_color, placeholder_categories};
pub use financial::{FinancialSummary, financial_summary};
