//! CSV-over-HTTP source.
//!
//! Downloads a CSV export (e.g. a published query result) with `reqwest`
//! and parses it with [`parse_csv`].

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::csv_file::parse_csv;
use crate::{DataSource, RawRow, SourceError};

/// Downloads and parses a CSV file on every fetch.
#[derive(Debug, Clone)]
pub struct CsvDownloadSource {
    /// URL of the CSV file to download.
    url: String,
    /// Additional HTTP headers for the download request.
    headers: BTreeMap<String, String>,
    /// Field delimiter byte (defaults to `,`).
    delimiter: u8,
    /// Request timeout. `None` leaves the client default.
    timeout: Option<Duration>,
}

impl CsvDownloadSource {
    /// Creates a new `CsvDownloadSource` for the given URL with default
    /// settings (comma-delimited, no extra headers, no timeout).
    #[must_use]
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_owned(),
            headers: BTreeMap::new(),
            delimiter: b',',
            timeout: None,
        }
    }

    /// Sets the field delimiter.
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Adds an HTTP header to include in the download request.
    #[must_use]
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_owned(), value.to_owned());
        self
    }

    /// Builds a [`reqwest::Client`] with the configured headers and timeout.
    fn build_client(&self) -> Result<reqwest::Client, SourceError> {
        let mut header_map = reqwest::header::HeaderMap::new();
        for (key, value) in &self.headers {
            let name = reqwest::header::HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
                SourceError::Config {
                    message: format!("invalid header name '{key}': {e}"),
                }
            })?;
            let val = reqwest::header::HeaderValue::from_str(value).map_err(|e| {
                SourceError::Config {
                    message: format!("invalid header value for '{key}': {e}"),
                }
            })?;
            header_map.insert(name, val);
        }

        let mut builder = reqwest::Client::builder().default_headers(header_map);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(builder.build()?)
    }
}

#[async_trait]
impl DataSource for CsvDownloadSource {
    fn name(&self) -> &str {
        "csv_download"
    }

    async fn fetch(&self, query_key: &str) -> Result<Vec<RawRow>, SourceError> {
        log::info!("[{query_key}] Downloading CSV: {}", self.url);

        let client = self.build_client()?;
        let response = client.get(&self.url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;

        log::debug!("[{query_key}] Downloaded {} bytes", bytes.len());

        let rows = parse_csv(&bytes, self.delimiter)?;
        log::info!("[{query_key}] Parsed {} rows from {}", rows.len(), self.url);
        Ok(rows)
    }
}
