#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregations and category filtering over shelter snapshots.
//!
//! Every function here is pure and total: it reads a slice of normalized
//! records and returns a fresh view. An empty input yields an empty view,
//! never an error. Records with an unknown value for the field a view
//! needs are left out of that view.

pub mod aggregate;
pub mod filter;

pub use aggregate::{
    age_histogram, category_counts, compute_views, monthly_series, outcome_distribution,
};
pub use filter::{filter_records, resolve_selection, selected_labels};
