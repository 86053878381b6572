//! Raw row to [`AnimalRecord`] normalization.
//!
//! [`FieldMapping`] names the source column for each record field. The
//! defaults are the column names of the processed shelter table
//! (`AnimalID`, `AnimalType`, ...). Each field is coerced independently; a
//! row never fails to normalize.

use serde::{Deserialize, Serialize};
use shelter_stats_record_models::{
    AnimalRecord, CalendarValue, DateFormat, NormalizationReport, UNKNOWN_ANIMAL_TYPE,
};

use crate::RawRow;
use crate::parsing::{normalize_date, parse_age_months, parse_label};

/// Maps source column names to canonical record fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMapping {
    /// Column holding the animal identifier.
    pub animal_id: String,
    /// Column holding the animal type (species).
    pub animal_type: String,
    /// Column holding the intake date.
    pub intake_date: String,
    /// Column holding the outcome date.
    pub outcome_date: String,
    /// Column holding the outcome type.
    pub outcome_type: String,
    /// Column holding the age in months.
    pub age_months: String,
    /// Column holding the `YYYY-MM` month label.
    pub month: String,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            animal_id: "AnimalID".to_string(),
            animal_type: "AnimalType".to_string(),
            intake_date: "IntakeDate".to_string(),
            outcome_date: "OutcomeDate".to_string(),
            outcome_type: "OutcomeType".to_string(),
            age_months: "AgeInMonths".to_string(),
            month: "Month".to_string(),
        }
    }
}

impl FieldMapping {
    /// Normalizes one raw row.
    ///
    /// Missing or malformed values become `None`. A missing animal type
    /// becomes [`UNKNOWN_ANIMAL_TYPE`], and an outcome literally labelled
    /// "unknown" (any case) is treated as no outcome.
    #[must_use]
    pub fn normalize(&self, row: &RawRow) -> AnimalRecord {
        self.normalize_row(row).0
    }

    /// Normalizes a batch of raw rows, preserving order, and tallies the
    /// unknown values found.
    ///
    /// Only rows whose animal type column is absent or blank count towards
    /// `unknown_animal_types`; a source label of [`UNKNOWN_ANIMAL_TYPE`] is
    /// a real category.
    #[must_use]
    pub fn normalize_batch(&self, rows: &[RawRow]) -> (Vec<AnimalRecord>, NormalizationReport) {
        let mut report = NormalizationReport::default();
        let records = rows
            .iter()
            .map(|row| {
                let (record, type_missing) = self.normalize_row(row);
                report.tally(&record);
                report.unknown_animal_types += u64::from(type_missing);
                record
            })
            .collect();
        (records, report)
    }

    /// Normalizes one row and reports whether the animal type was missing.
    fn normalize_row(&self, row: &RawRow) -> (AnimalRecord, bool) {
        let full_date = |column: &str| {
            normalize_date(row.get(column), DateFormat::FullDate).and_then(|value| match value {
                CalendarValue::Date(date) => Some(date),
                CalendarValue::YearMonth(_) => None,
            })
        };

        let month = normalize_date(row.get(&self.month), DateFormat::YearMonth)
            .map(CalendarValue::year_month);

        let animal_type = parse_label(row.get(&self.animal_type));
        let type_missing = animal_type.is_none();

        let record = AnimalRecord {
            animal_id: parse_label(row.get(&self.animal_id)).unwrap_or_default(),
            animal_type: animal_type.unwrap_or_else(|| UNKNOWN_ANIMAL_TYPE.to_string()),
            intake_date: full_date(&self.intake_date),
            outcome_date: full_date(&self.outcome_date),
            outcome_type: parse_label(row.get(&self.outcome_type))
                .filter(|outcome| !outcome.eq_ignore_ascii_case("unknown")),
            age_months: parse_age_months(row.get(&self.age_months)),
            month,
        };
        (record, type_missing)
    }
}
