#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Derived view types for the shelter dashboard.
//!
//! Each type here is a chart-ready value computed purely from a snapshot
//! (and, for the filtered listing, a category selection). They carry no
//! rendering behavior and serialize to JSON for the API.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use shelter_stats_record_models::YearMonth;

/// Number of age histogram buckets used when none is configured.
pub const DEFAULT_HISTOGRAM_BINS: usize = 20;

/// Count of records in a single animal type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    /// Animal type label.
    pub category: String,
    /// Number of records.
    pub count: u64,
}

/// One slice of the outcome distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeShare {
    /// Outcome label.
    pub outcome: String,
    /// Number of records with this outcome.
    pub count: u64,
    /// Share of all known outcomes, `0.0..=100.0`.
    pub percent: f64,
}

impl OutcomeShare {
    /// The percentage with one decimal place, e.g. `"33.3%"`.
    #[must_use]
    pub fn percent_label(&self) -> String {
        format!("{:.1}%", self.percent)
    }
}

/// Outcome counts and percentages over records with a known outcome.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeDistribution {
    /// Number of records with a known outcome.
    pub total_known: u64,
    /// Shares, ordered by descending count then ascending label.
    pub outcomes: Vec<OutcomeShare>,
}

impl OutcomeDistribution {
    /// Whether no record had a known outcome.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// A monthly intake count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesPoint {
    /// The month.
    pub period: YearMonth,
    /// Intakes counted in the month.
    pub count: u64,
}

/// One equal-width age bucket.
///
/// Buckets are half-open `[lower, upper)` except the last, which also
/// includes `upper`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeBucket {
    /// Inclusive lower edge, in months.
    pub lower: f64,
    /// Upper edge, in months.
    pub upper: f64,
    /// Records whose age falls in this bucket.
    pub count: u64,
}

/// Distribution of known ages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeHistogram {
    /// Buckets in ascending order. Empty when no age is known.
    pub buckets: Vec<AgeBucket>,
}

impl AgeHistogram {
    /// Whether the histogram has no buckets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Sum of all bucket counts.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.buckets.iter().map(|b| b.count).sum()
    }
}

/// The four aggregate views of one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotViews {
    /// Records per animal type.
    pub category_counts: Vec<CategoryCount>,
    /// Outcome shares over known outcomes.
    pub outcome_distribution: OutcomeDistribution,
    /// Intakes per month, ascending.
    pub monthly_series: Vec<TimeSeriesPoint>,
    /// Age distribution over known ages.
    pub age_histogram: AgeHistogram,
}

/// Which animal types the record listing should include.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "mode", content = "labels")]
pub enum CategorySelection {
    /// Every type present in the snapshot.
    #[default]
    All,
    /// Only the listed types. An empty set selects nothing.
    Only(BTreeSet<String>),
}

impl CategorySelection {
    /// Selects exactly the given labels.
    #[must_use]
    pub fn only<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Only(labels.into_iter().map(Into::into).collect())
    }

    /// Parses a comma-separated label list. Blank entries are ignored, so an
    /// empty string selects nothing.
    ///
    /// Commas always separate labels, so a label that itself contains a
    /// comma cannot be expressed here. Use [`CategorySelection::only`] for
    /// those.
    #[must_use]
    pub fn from_csv(labels: &str) -> Self {
        Self::only(
            labels
                .split(',')
                .map(str::trim)
                .filter(|label| !label.is_empty()),
        )
    }

    /// Whether `label` is selected.
    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(labels) => labels.contains(label),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_label_has_one_decimal() {
        let share = OutcomeShare {
            outcome: "Adopted".to_string(),
            count: 1,
            percent: 100.0 / 3.0,
        };
        assert_eq!(share.percent_label(), "33.3%");
    }

    #[test]
    fn selection_from_csv() {
        assert_eq!(
            CategorySelection::from_csv("Dog, Cat,,"),
            CategorySelection::only(["Cat", "Dog"])
        );
        assert_eq!(
            CategorySelection::from_csv(""),
            CategorySelection::Only(BTreeSet::new())
        );
    }

    #[test]
    fn selection_from_csv_splits_labels_containing_commas() {
        let parsed = CategorySelection::from_csv("Dog, Cat");
        assert_eq!(parsed, CategorySelection::only(["Dog", "Cat"]));
        assert!(!parsed.contains("Dog, Cat"));

        let exact = CategorySelection::only(["Dog, Cat"]);
        assert!(exact.contains("Dog, Cat"));
        assert!(!exact.contains("Dog"));
    }

    #[test]
    fn selection_contains() {
        assert!(CategorySelection::All.contains("Anything"));
        let only = CategorySelection::only(["Dog"]);
        assert!(only.contains("Dog"));
        assert!(!only.contains("Cat"));
        assert!(!CategorySelection::only(Vec::<String>::new()).contains("Dog"));
    }

    #[test]
    fn time_series_point_serializes_month_label() {
        let point = TimeSeriesPoint {
            period: YearMonth::new(2024, 2).unwrap(),
            count: 3,
        };
        assert_eq!(
            serde_json::to_string(&point).unwrap(),
            r#"{"period":"2024-02","count":3}"#
        );
    }
}
