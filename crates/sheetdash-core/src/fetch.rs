//! Sheet sources: where grids come from.
//!
//! [`SheetSource`] is the seam the dashboard depends on. [`CsvExportClient`]
//! reads the public CSV export of a spreadsheet over HTTP; [`CsvFileSource`]
//! reads a previously downloaded export from disk.

use reqwest::Url;
use sheetdash_engine::engine::Grid;
use std::future::Future;
use std::path::PathBuf;

use crate::config::{ExportConfig, SheetConfig};
use crate::error::{Result, SheetError};
use crate::storage::{read_grid, split_rows};

const MAX_RESPONSE_BYTES: u64 = 10 * 1024 * 1024; // 10 MB

/// Only the first tab of a spreadsheet is exported.
const EXPORT_GID: u32 = 0;

/// Anything that can produce a grid for a sheet.
pub trait SheetSource: Send + Sync {
    fn fetch(&self, sheet: &SheetConfig) -> impl Future<Output = Result<Grid>> + Send;
}

/// HTTP client for the spreadsheet CSV export endpoint.
#[derive(Clone, Debug)]
pub struct CsvExportClient {
    http: reqwest::Client,
    base_url: String,
}

impl CsvExportClient {
    pub fn new(export: &ExportConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(export.timeout())
            .build()?;
        Ok(CsvExportClient {
            http,
            base_url: export.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build `{base}/spreadsheets/d/{id}/export?format=csv&gid=0`.
    pub fn export_url(&self, spreadsheet_id: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|err| SheetError::InvalidUrl(format!("{}: {}", self.base_url, err)))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| SheetError::InvalidUrl(self.base_url.clone()))?;
            segments
                .pop_if_empty()
                .extend(["spreadsheets", "d", spreadsheet_id, "export"]);
        }
        url.query_pairs_mut()
            .append_pair("format", "csv")
            .append_pair("gid", &EXPORT_GID.to_string());
        Ok(url)
    }

    /// Download the raw CSV text of a spreadsheet.
    pub async fn fetch_text(&self, spreadsheet_id: &str) -> Result<String> {
        let url = self.export_url(spreadsheet_id)?;
        tracing::debug!("Fetching data from: {url}");

        let response = self.http.get(url).send().await.inspect_err(|err| {
            tracing::warn!("Sheet export request failed: {err}");
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Sheet export returned HTTP {}", status.as_u16());
            return Err(SheetError::FetchStatus {
                status: status.as_u16(),
            });
        }

        if let Some(len) = response.content_length() {
            check_size(len)?;
        }
        let text = response.text().await?;
        check_size(text.len() as u64)?;
        Ok(text)
    }
}

fn check_size(size: u64) -> Result<()> {
    if size > MAX_RESPONSE_BYTES {
        return Err(SheetError::ResponseTooLarge {
            size,
            max: MAX_RESPONSE_BYTES,
        });
    }
    Ok(())
}

impl SheetSource for CsvExportClient {
    fn fetch(&self, sheet: &SheetConfig) -> impl Future<Output = Result<Grid>> + Send {
        async move {
            let text = self.fetch_text(&sheet.spreadsheet_id).await?;
            let grid = split_rows(&text, sheet.dialect);
            tracing::debug!("Fetched {} rows for {}", grid.len(), sheet.spreadsheet_id);
            Ok(grid)
        }
    }
}

/// Reads a CSV export saved on disk. The spreadsheet id is ignored.
#[derive(Clone, Debug)]
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvFileSource { path: path.into() }
    }
}

impl SheetSource for CsvFileSource {
    fn fetch(&self, sheet: &SheetConfig) -> impl Future<Output = Result<Grid>> + Send {
        let result = read_grid(&self.path, sheet.dialect);
        async move { result }
    }
}
