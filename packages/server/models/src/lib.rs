#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the shelter stats server.
//!
//! The dashboard view itself is served as-is; these types cover the
//! query parameters and the smaller responses around it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shelter_stats_analytics_models::CategorySelection;
use shelter_stats_record_models::{NormalizationReport, Snapshot};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Human-readable description of the failure.
    pub error: String,
}

/// Query parameters for the dashboard endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardQueryParams {
    /// Comma-separated animal types to list. Absent selects every type;
    /// present but empty selects none. Labels containing a comma cannot be
    /// selected through this parameter.
    pub types: Option<String>,
}

impl DashboardQueryParams {
    /// The category selection these parameters describe.
    #[must_use]
    pub fn selection(&self) -> CategorySelection {
        self.types
            .as_deref()
            .map_or(CategorySelection::All, CategorySelection::from_csv)
    }
}

/// Metadata about the snapshot currently served.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSnapshotInfo {
    /// Query key the snapshot was fetched for.
    pub query_key: String,
    /// When the fetch completed.
    pub fetched_at: DateTime<Utc>,
    /// Number of records.
    pub record_count: usize,
    /// Unknown-value tallies from normalization.
    pub report: NormalizationReport,
}

impl From<&Snapshot> for ApiSnapshotInfo {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            query_key: snapshot.query_key.clone(),
            fetched_at: snapshot.fetched_at,
            record_count: snapshot.len(),
            report: snapshot.report,
        }
    }
}
