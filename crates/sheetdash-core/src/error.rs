//! Error types for Sheetdash core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading configuration or fetching a sheet.
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("HTTP error! status: {status}")]
    FetchStatus { status: u16 },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Response too large ({size} bytes, max {max})")]
    ResponseTooLarge { size: u64, max: u64 },

    #[error("Invalid export URL: {0}")]
    InvalidUrl(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error in {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },
}

impl SheetError {
    /// True for failures of the CSV export request itself.
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            SheetError::FetchStatus { .. }
                | SheetError::Network(_)
                | SheetError::ResponseTooLarge { .. }
                | SheetError::InvalidUrl(_)
        )
    }

    /// HTTP status code, when the server answered with a non-success status.
    pub fn status(&self) -> Option<u16> {
        match self {
            SheetError::FetchStatus { status } => Some(*status),
            SheetError::Network(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SheetError>;
