#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shelter record types shared across the shelter-stats workspace.
//!
//! Every data source produces raw rows that are normalized into
//! [`AnimalRecord`]s. A fetched-and-normalized batch of records is a
//! [`Snapshot`], which is immutable once built and shared behind an `Arc`.
//!
//! Fields that could not be parsed are represented as `None` ("unknown")
//! rather than rejected, since operator-entered shelter data routinely
//! contains gaps.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike as _, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Label assigned to records whose animal type is missing in the source.
///
/// Category counts cover every record, so a missing type is bucketed under
/// this label instead of being dropped.
pub const UNKNOWN_ANIMAL_TYPE: &str = "Unknown";

/// The calendar format a raw date-like value is expected to be in.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DateFormat {
    /// A full calendar date (`intake_date`, `outcome_date`).
    FullDate,
    /// A year-month label (`month`).
    YearMonth,
}

/// A successfully normalized date-like value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CalendarValue {
    /// A full calendar date.
    Date(NaiveDate),
    /// A year-month.
    YearMonth(YearMonth),
}

impl CalendarValue {
    /// Returns the year-month this value falls in.
    #[must_use]
    pub fn year_month(self) -> YearMonth {
        match self {
            Self::Date(date) => YearMonth::from(date),
            Self::YearMonth(ym) => ym,
        }
    }
}

/// A calendar month, ordered chronologically.
///
/// Displays and serializes as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Creates a year-month, returning `None` if `month` is not in `1..=12`.
    #[must_use]
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// The calendar year.
    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    /// The month number, `1..=12`.
    #[must_use]
    pub const fn month(self) -> u32 {
        self.month
    }

    /// The first day of this month.
    #[must_use]
    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

impl From<NaiveDate> for YearMonth {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Error returned when a string is not a strict `YYYY-MM` label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidYearMonthError {
    /// The rejected input.
    pub value: String,
}

impl fmt::Display for InvalidYearMonthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid year-month '{}': expected YYYY-MM", self.value)
    }
}

impl std::error::Error for InvalidYearMonthError {}

impl FromStr for YearMonth {
    type Err = InvalidYearMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || InvalidYearMonthError {
            value: s.to_string(),
        };

        let (year, month) = s.split_once('-').ok_or_else(err)?;
        if year.len() != 4
            || month.len() != 2
            || !year.bytes().all(|b| b.is_ascii_digit())
            || !month.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(err());
        }

        let year: i32 = year.parse().map_err(|_| err())?;
        let month: u32 = month.parse().map_err(|_| err())?;
        Self::new(year, month).ok_or_else(err)
    }
}

impl TryFrom<String> for YearMonth {
    type Error = InvalidYearMonthError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

/// One shelter intake/outcome event after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimalRecord {
    /// Opaque animal identifier. Unique per animal, not per record.
    pub animal_id: String,
    /// Category label, e.g. the species.
    pub animal_type: String,
    /// Date the animal was taken in. `None` when missing or malformed.
    pub intake_date: Option<NaiveDate>,
    /// Date of the recorded outcome. `None` when missing or malformed.
    pub outcome_date: Option<NaiveDate>,
    /// Outcome label (e.g. "Adopted"). `None` when no outcome is recorded.
    pub outcome_type: Option<String>,
    /// Age in months at the time of the record. `None` when unknown.
    pub age_months: Option<f64>,
    /// Year-month label, parsed independently of `intake_date`.
    pub month: Option<YearMonth>,
}

impl AnimalRecord {
    /// The month this record counts towards in the intake time series.
    ///
    /// Prefers the `month` field and falls back to the month of
    /// `intake_date`. Returns `None` when neither is known.
    #[must_use]
    pub fn intake_month(&self) -> Option<YearMonth> {
        self.month.or_else(|| self.intake_date.map(YearMonth::from))
    }
}

/// Per-field counts of unknown values found while normalizing a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizationReport {
    /// Number of records normalized.
    pub records: u64,
    /// Records whose animal type was missing.
    pub unknown_animal_types: u64,
    /// Records with a missing or malformed intake date.
    pub unknown_intake_dates: u64,
    /// Records with a missing or malformed outcome date.
    pub unknown_outcome_dates: u64,
    /// Records without a recorded outcome.
    pub unknown_outcome_types: u64,
    /// Records with a missing, negative or malformed age.
    pub unknown_ages: u64,
    /// Records with a missing or malformed month label.
    pub unknown_months: u64,
}

impl NormalizationReport {
    /// Adds one normalized record to the tallies.
    ///
    /// A missing animal type cannot be told apart from a source label of
    /// [`UNKNOWN_ANIMAL_TYPE`] after normalization, so
    /// `unknown_animal_types` is left to the normalizer.
    pub fn tally(&mut self, record: &AnimalRecord) {
        self.records += 1;
        self.unknown_intake_dates += u64::from(record.intake_date.is_none());
        self.unknown_outcome_dates += u64::from(record.outcome_date.is_none());
        self.unknown_outcome_types += u64::from(record.outcome_type.is_none());
        self.unknown_ages += u64::from(record.age_months.is_none());
        self.unknown_months += u64::from(record.month.is_none());
    }
}

/// One immutable fetched-and-normalized copy of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// The query key this snapshot was fetched for.
    pub query_key: String,
    /// When the fetch completed.
    pub fetched_at: DateTime<Utc>,
    /// Normalized records, in source order.
    pub records: Vec<AnimalRecord>,
    /// Unknown-value tallies from normalization.
    pub report: NormalizationReport,
}

impl Snapshot {
    /// Builds a snapshot from normalized `records` and their report.
    #[must_use]
    pub fn new(
        query_key: &str,
        fetched_at: DateTime<Utc>,
        records: Vec<AnimalRecord>,
        report: NormalizationReport,
    ) -> Self {
        Self {
            query_key: query_key.to_string(),
            fetched_at,
            records,
            report,
        }
    }

    /// Number of records in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the snapshot has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct animal types in order of first appearance.
    #[must_use]
    pub fn category_options(&self) -> Vec<String> {
        let mut seen = std::collections::BTreeSet::new();
        self.records
            .iter()
            .filter(|r| seen.insert(r.animal_type.as_str()))
            .map(|r| r.animal_type.clone())
            .collect()
    }
}
