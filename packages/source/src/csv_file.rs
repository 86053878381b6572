//! Local CSV file source.
//!
//! Reads the whole file and returns every row as a [`serde_json::Value`]
//! object keyed by the column headers in the first row.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::{DataSource, RawRow, SourceError};

/// Parses CSV bytes with a header row into JSON objects of strings.
///
/// Cells are trimmed. Short rows are padded with empty strings, which the
/// normalizer treats as absent.
///
/// # Errors
///
/// Returns [`SourceError`] if the CSV is malformed or has no header row.
pub fn parse_csv(bytes: &[u8], delimiter: u8) -> Result<Vec<RawRow>, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_owned())
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(SourceError::Config {
            message: "CSV file contains no header row".to_owned(),
        });
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;

        let mut map = serde_json::Map::new();
        for (i, header) in headers.iter().enumerate() {
            let value = record.get(i).unwrap_or("").trim().to_owned();
            map.insert(header.clone(), serde_json::Value::String(value));
        }
        rows.push(serde_json::Value::Object(map));
    }

    Ok(rows)
}

/// Reads rows from a CSV file on disk.
///
/// The query key is not used to select rows; the file is the dataset.
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    path: PathBuf,
    delimiter: u8,
}

impl CsvFileSource {
    /// Creates a comma-delimited CSV source for `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: b',',
        }
    }

    /// Sets the field delimiter (e.g. `b'\t'` for TSV files).
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// The file this source reads.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DataSource for CsvFileSource {
    fn name(&self) -> &str {
        "csv_file"
    }

    async fn fetch(&self, query_key: &str) -> Result<Vec<RawRow>, SourceError> {
        log::debug!("[{query_key}] Reading CSV {}", self.path.display());
        let bytes = tokio::fs::read(&self.path).await?;
        let rows = parse_csv(&bytes, self.delimiter)?;
        log::info!(
            "[{query_key}] Parsed {} rows from {}",
            rows.len(),
            self.path.display()
        );
        Ok(rows)
    }
}
