//! sheetdash-core - Sheet export fetching, configuration and aggregation.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod fetch;
pub mod storage;
pub mod summary;

pub use aggregate::{CategoryEntry, FinancialSummary};
pub use config::{CategoryMapping, DashboardConfig, RefreshPolicy, SheetConfig};
pub use error::{Result, SheetError};
pub use fetch::{CsvExportClient, CsvFileSource, SheetSource};
pub use summary::{DashboardSummary, summarize};

pub use sheetdash_engine::engine::{CellValue, Grid, ResolvedRange, extract_value, resolve};
