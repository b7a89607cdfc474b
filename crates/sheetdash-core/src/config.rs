//! Static dashboard configuration.
//!
//! Loaded once at startup from TOML; every section is optional and falls back
//! to the defaults below. There is no runtime reload.
//!
//! ```toml
//! [sheet]
//! spreadsheet_id = "1AbC..."
//! dialect = "naive"
//!
//! [refresh]
//! interval_secs = 300
//! policy = "single_flight"
//!
//! [[categories]]
//! category = "Food"
//! range = "B5"
//! ```

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, SheetError};
use crate::storage::CsvDialect;

const MAX_CONFIG_FILE_BYTES: u64 = 1_048_576; // 1 MiB
const CONFIG_FILE_NAME: &str = "config.toml";

/// Categories shown by default, in display order. Column A holds the labels,
/// column B the amounts, starting at row 2.
const DEFAULT_CATEGORIES: [&str; 12] = [
    "Debt & Loan",
    "Entertainment",
    "Family",
    "Food",
    "Health",
    "Housing",
    "Investment",
    "Shopping",
    "Subscription",
    "Transport",
    "Work & Education",
    "Others",
];

/// Which spreadsheet to read and how to split its export.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SheetConfig {
    pub spreadsheet_id: String,
    /// Tab name, informational only: the export always reads gid 0.
    pub sheet_name: String,
    /// Overall data range of the sheet.
    pub range: String,
    pub dialect: CsvDialect,
}

impl Default for SheetConfig {
    fn default() -> Self {
        SheetConfig {
            spreadsheet_id: "your-spreadsheet-id-here".to_string(),
            sheet_name: "Sheet1".to_string(),
            range: "A2:B13".to_string(),
            dialect: CsvDialect::Naive,
        }
    }
}

/// A dashboard category bound to the cell holding its amount.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryMapping {
    pub category: String,
    pub range: String,
}

impl CategoryMapping {
    pub fn new(category: impl Into<String>, range: impl Into<String>) -> Self {
        CategoryMapping {
            category: category.into(),
            range: range.into(),
        }
    }
}

/// Cells holding the financial summary figures.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FinancialRanges {
    pub total_budget: String,
    pub total_income: String,
    pub income_growth: String,
}

impl Default for FinancialRanges {
    fn default() -> Self {
        FinancialRanges {
            total_budget: "E2".to_string(),
            total_income: "E3".to_string(),
            income_growth: "E4".to_string(),
        }
    }
}

/// Where the CSV export is requested from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            base_url: "https://docs.google.com".to_string(),
            timeout_secs: 15,
        }
    }
}

impl ExportConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// What happens when a refresh is triggered while another is still running.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshPolicy {
    /// Every trigger fetches; the refresh that finishes last wins.
    #[default]
    Overlapping,
    /// Triggers arriving while a refresh is in flight are dropped.
    SingleFlight,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RefreshConfig {
    pub interval_secs: u64,
    pub policy: RefreshPolicy,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        RefreshConfig {
            interval_secs: 5 * 60,
            policy: RefreshPolicy::Overlapping,
        }
    }
}

impl RefreshConfig {
    /// Timer period, never shorter than one second.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

/// Complete dashboard configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    pub sheet: SheetConfig,
    pub export: ExportConfig,
    pub refresh: RefreshConfig,
    pub financial: FinancialRanges,
    pub categories: Vec<CategoryMapping>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            sheet: SheetConfig::default(),
            export: ExportConfig::default(),
            refresh: RefreshConfig::default(),
            financial: FinancialRanges::default(),
            categories: default_categories(),
        }
    }
}

/// The twelve default categories, mapped to `B2`..`B13`.
pub fn default_categories() -> Vec<CategoryMapping> {
    DEFAULT_CATEGORIES
        .iter()
        .enumerate()
        .map(|(idx, name)| CategoryMapping::new(*name, format!("B{}", idx + 2)))
        .collect()
}

impl DashboardConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let meta = std::fs::metadata(path)?;
        if meta.len() > MAX_CONFIG_FILE_BYTES {
            return Err(SheetError::Config {
                path: path.to_path_buf(),
                message: format!(
                    "file too large ({} bytes, max {})",
                    meta.len(),
                    MAX_CONFIG_FILE_BYTES
                ),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&content).map_err(|err| SheetError::Config {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        tracing::info!(
            "Loaded dashboard config from {} ({} categories)",
            path.display(),
            config.categories.len()
        );
        Ok(config)
    }

    /// Load `config.toml` from the user config directory, or defaults when
    /// there is none.
    pub fn load_default() -> Result<Self> {
        match user_config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => {
                tracing::debug!("No dashboard config file found, using defaults");
                Ok(Self::default())
            }
        }
    }
}

/// Platform config location, e.g. `~/.config/sheetdash/config.toml`.
pub fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("com", "sheetdash", "sheetdash")?;
    Some(proj.config_dir().join(CONFIG_FILE_NAME))
}
