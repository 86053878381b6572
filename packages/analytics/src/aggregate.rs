//! Aggregate views: category counts, outcome distribution, monthly intake
//! series and age histogram.

use std::collections::BTreeMap;
use std::num::NonZeroUsize;

use shelter_stats_analytics_models::{
    AgeBucket, AgeHistogram, CategoryCount, OutcomeDistribution, OutcomeShare, SnapshotViews,
    TimeSeriesPoint,
};
use shelter_stats_record_models::{AnimalRecord, YearMonth};

/// Counts labels and orders them by descending count, then ascending label.
fn ranked_counts<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<(String, u64)> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for label in labels {
        *counts.entry(label).or_default() += 1;
    }

    let mut ranked: Vec<(String, u64)> = counts
        .into_iter()
        .map(|(label, count)| (label.to_string(), count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
}

/// Records per animal type, covering every record.
#[must_use]
pub fn category_counts(records: &[AnimalRecord]) -> Vec<CategoryCount> {
    ranked_counts(records.iter().map(|r| r.animal_type.as_str()))
        .into_iter()
        .map(|(category, count)| CategoryCount { category, count })
        .collect()
}

/// Outcome counts and percentages over records with a known outcome.
///
/// Records without an outcome are excluded rather than bucketed. Returns an
/// empty distribution when no outcome is known.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn outcome_distribution(records: &[AnimalRecord]) -> OutcomeDistribution {
    let ranked = ranked_counts(records.iter().filter_map(|r| r.outcome_type.as_deref()));
    let total_known: u64 = ranked.iter().map(|(_, count)| count).sum();
    if total_known == 0 {
        return OutcomeDistribution::default();
    }

    let outcomes = ranked
        .into_iter()
        .map(|(outcome, count)| OutcomeShare {
            outcome,
            count,
            percent: count as f64 / total_known as f64 * 100.0,
        })
        .collect();

    OutcomeDistribution {
        total_known,
        outcomes,
    }
}

/// Intakes per month in ascending order.
///
/// A record's month is its `month` field when known, otherwise the month of
/// its intake date; records with neither are excluded. Months with no
/// intakes are not filled in.
#[must_use]
pub fn monthly_series(records: &[AnimalRecord]) -> Vec<TimeSeriesPoint> {
    let mut counts: BTreeMap<YearMonth, u64> = BTreeMap::new();
    for month in records.iter().filter_map(AnimalRecord::intake_month) {
        *counts.entry(month).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|(period, count)| TimeSeriesPoint { period, count })
        .collect()
}

/// Equal-width histogram of known ages over their observed range.
///
/// The range `[min, max]` is split into `bins` buckets; each age lands in
/// exactly one, with `max` in the last bucket. When every age is equal the
/// range is widened to `[age - 0.5, age + 0.5]`.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn age_histogram(records: &[AnimalRecord], bins: NonZeroUsize) -> AgeHistogram {
    let ages: Vec<f64> = records
        .iter()
        .filter_map(|r| r.age_months)
        .filter(|age| age.is_finite())
        .collect();

    let Some((min, max)) = ages.iter().fold(None, |range: Option<(f64, f64)>, &age| {
        Some(range.map_or((age, age), |(lo, hi)| (lo.min(age), hi.max(age))))
    }) else {
        return AgeHistogram::default();
    };

    let (lower, upper) = if max > min {
        (min, max)
    } else {
        (min - 0.5, max + 0.5)
    };
    let bins = bins.get();
    let width = (upper - lower) / bins as f64;

    let mut counts = vec![0_u64; bins];
    for age in ages {
        let index = (((age - lower) / width).floor() as usize).min(bins - 1);
        counts[index] += 1;
    }

    let buckets = counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| AgeBucket {
            lower: (i as f64).mul_add(width, lower),
            upper: if i + 1 == bins {
                upper
            } else {
                ((i + 1) as f64).mul_add(width, lower)
            },
            count,
        })
        .collect();

    AgeHistogram { buckets }
}

/// Computes all four aggregate views.
#[must_use]
pub fn compute_views(records: &[AnimalRecord], bins: NonZeroUsize) -> SnapshotViews {
    SnapshotViews {
        category_counts: category_counts(records),
        outcome_distribution: outcome_distribution(records),
        monthly_series: monthly_series(records),
        age_histogram: age_histogram(records, bins),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn record(
        animal_type: &str,
        outcome: Option<&str>,
        age: Option<f64>,
        month: Option<&str>,
    ) -> AnimalRecord {
        AnimalRecord {
            animal_id: format!("{animal_type}-{age:?}"),
            animal_type: animal_type.to_string(),
            intake_date: None,
            outcome_date: None,
            outcome_type: outcome.map(str::to_string),
            age_months: age,
            month: month.and_then(|m| m.parse().ok()),
        }
    }

    fn scenario() -> Vec<AnimalRecord> {
        vec![
            record("Dog", Some("Adopted"), Some(6.0), Some("2024-01")),
            record("Cat", None, None, Some("2024-01")),
            record("Dog", Some("Adopted"), Some(18.0), Some("2024-02")),
        ]
    }

    fn bins(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn scenario_category_counts() {
        assert_eq!(
            category_counts(&scenario()),
            vec![
                CategoryCount {
                    category: "Dog".to_string(),
                    count: 2
                },
                CategoryCount {
                    category: "Cat".to_string(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn scenario_outcome_distribution_excludes_unknown() {
        let dist = outcome_distribution(&scenario());
        assert_eq!(dist.total_known, 2);
        assert_eq!(dist.outcomes.len(), 1);
        assert_eq!(dist.outcomes[0].outcome, "Adopted");
        assert_eq!(dist.outcomes[0].count, 2);
        assert!((dist.outcomes[0].percent - 100.0).abs() < 1e-9);
    }

    #[test]
    fn scenario_monthly_series() {
        let series = monthly_series(&scenario());
        let labels: Vec<(String, u64)> = series
            .iter()
            .map(|p| (p.period.to_string(), p.count))
            .collect();
        assert_eq!(
            labels,
            vec![("2024-01".to_string(), 2), ("2024-02".to_string(), 1)]
        );
    }

    #[test]
    fn scenario_age_histogram_uses_known_ages_only() {
        let hist = age_histogram(&scenario(), bins(20));
        assert_eq!(hist.buckets.len(), 20);
        assert_eq!(hist.total(), 2);
        assert!((hist.buckets[0].lower - 6.0).abs() < 1e-9);
        assert!((hist.buckets[19].upper - 18.0).abs() < 1e-9);
        assert_eq!(hist.buckets[0].count, 1);
        assert_eq!(hist.buckets[19].count, 1);
    }

    #[test]
    fn category_ties_break_by_label() {
        let records = vec![
            record("Rabbit", None, None, None),
            record("Cat", None, None, None),
            record("Bird", None, None, None),
            record("Cat", None, None, None),
        ];
        let order: Vec<String> = category_counts(&records)
            .into_iter()
            .map(|c| c.category)
            .collect();
        assert_eq!(order, vec!["Cat", "Bird", "Rabbit"]);
    }

    #[test]
    fn category_counts_sum_to_record_count() {
        let records = scenario();
        let total: u64 = category_counts(&records).iter().map(|c| c.count).sum();
        assert_eq!(total, records.len() as u64);
    }

    #[test]
    fn outcome_percentages_sum_to_hundred() {
        let records = vec![
            record("Dog", Some("Adopted"), None, None),
            record("Dog", Some("Transfer"), None, None),
            record("Cat", Some("Euthanasia"), None, None),
            record("Cat", Some("Adopted"), None, None),
            record("Cat", None, None, None),
            record("Cat", Some("Return to Owner"), None, None),
            record("Bird", Some("Transfer"), None, None),
        ];
        let dist = outcome_distribution(&records);
        assert_eq!(dist.total_known, 6);
        let sum: f64 = dist.outcomes.iter().map(|o| o.percent).sum();
        assert!((sum - 100.0).abs() < 1e-9);
        assert_eq!(dist.outcomes[0].outcome, "Adopted");
        assert_eq!(dist.outcomes[1].outcome, "Transfer");
    }

    #[test]
    fn no_known_outcomes_is_empty() {
        let records = vec![record("Dog", None, None, None)];
        assert!(outcome_distribution(&records).is_empty());
        assert_eq!(outcome_distribution(&records).total_known, 0);
    }

    #[test]
    fn monthly_series_falls_back_to_intake_date() {
        let mut from_date = record("Dog", None, None, None);
        from_date.intake_date = NaiveDate::from_ymd_opt(2023, 12, 30);
        let mut month_wins = record("Dog", None, None, Some("2024-03"));
        month_wins.intake_date = NaiveDate::from_ymd_opt(2024, 1, 2);
        let undated = record("Cat", None, None, None);

        let series = monthly_series(&[from_date, month_wins, undated]);
        let labels: Vec<String> = series.iter().map(|p| p.period.to_string()).collect();
        assert_eq!(labels, vec!["2023-12", "2024-03"]);
        assert_eq!(series.iter().map(|p| p.count).sum::<u64>(), 2);
    }

    #[test]
    fn monthly_series_is_strictly_ascending_without_gaps_filled() {
        let records = vec![
            record("Dog", None, None, Some("2024-05")),
            record("Dog", None, None, Some("2023-11")),
            record("Dog", None, None, Some("2024-05")),
            record("Dog", None, None, Some("2024-01")),
        ];
        let series = monthly_series(&records);
        assert_eq!(series.len(), 3);
        assert!(series.windows(2).all(|w| w[0].period < w[1].period));
    }

    #[test]
    fn histogram_places_every_age_in_one_bucket() {
        let records: Vec<AnimalRecord> = [0.0, 1.5, 3.0, 7.25, 12.0, 12.0, 36.0, 120.0, 121.0]
            .into_iter()
            .map(|age| record("Dog", None, Some(age), None))
            .chain(std::iter::once(record("Cat", None, None, None)))
            .collect();

        for n in [1, 2, 7, 20] {
            let hist = age_histogram(&records, bins(n));
            assert_eq!(hist.buckets.len(), n);
            assert_eq!(hist.total(), 9);
            assert!(hist.buckets[n - 1].count >= 1);
            assert!((hist.buckets[n - 1].upper - 121.0).abs() < 1e-9);
        }
    }

    #[test]
    fn histogram_max_lands_in_last_bucket() {
        let records = vec![
            record("Dog", None, Some(0.0), None),
            record("Dog", None, Some(10.0), None),
        ];
        let hist = age_histogram(&records, bins(10));
        assert_eq!(hist.buckets[0].count, 1);
        assert_eq!(hist.buckets[9].count, 1);
        assert_eq!(hist.total(), 2);
    }

    #[test]
    fn histogram_of_identical_ages_widens_range() {
        let records = vec![
            record("Dog", None, Some(4.0), None),
            record("Dog", None, Some(4.0), None),
        ];
        let hist = age_histogram(&records, bins(4));
        assert!((hist.buckets[0].lower - 3.5).abs() < 1e-9);
        assert!((hist.buckets[3].upper - 4.5).abs() < 1e-9);
        assert_eq!(hist.total(), 2);
    }

    #[test]
    fn empty_input_yields_empty_views() {
        let views = compute_views(&[], bins(20));
        assert!(views.category_counts.is_empty());
        assert!(views.outcome_distribution.is_empty());
        assert!(views.monthly_series.is_empty());
        assert!(views.age_histogram.is_empty());
    }

    #[test]
    fn views_are_deterministic() {
        let records = scenario();
        assert_eq!(
            compute_views(&records, bins(20)),
            compute_views(&records, bins(20))
        );
    }
}
