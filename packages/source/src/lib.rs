#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shelter data source trait and normalization logic.
//!
//! A [`DataSource`] delivers the raw rows for a query key as JSON objects.
//! The [`normalize`] module turns those rows into
//! [`AnimalRecord`](shelter_stats_record_models::AnimalRecord)s, coercing
//! malformed dates and ages to "unknown" rather than failing.

pub mod csv_download;
pub mod csv_file;
pub mod json_file;
pub mod memory;
pub mod normalize;
pub mod parsing;
pub mod source_def;

use async_trait::async_trait;

/// A raw row as delivered by a data source, keyed by column name.
pub type RawRow = serde_json::Value;

/// Errors that can occur while fetching rows from a data source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV parsing failed.
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error (file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The source is misconfigured or returned data of the wrong shape.
    #[error("Source configuration error: {message}")]
    Config {
        /// Description of what went wrong.
        message: String,
    },

    /// The fetch task stopped before producing a result.
    #[error("Fetch interrupted: {message}")]
    Interrupted {
        /// Description of what went wrong.
        message: String,
    },
}

/// Trait that all shelter data sources must implement.
///
/// A fetch is atomic: it returns every row for the query or an error, never
/// a silently truncated set.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Returns a short identifier for this source, used in log messages.
    fn name(&self) -> &str;

    /// Fetches all raw rows for `query_key`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the rows cannot be retrieved or decoded.
    async fn fetch(&self, query_key: &str) -> Result<Vec<RawRow>, SourceError>;
}
