//! Category filtering for the record listing.

use shelter_stats_analytics_models::CategorySelection;
use shelter_stats_record_models::AnimalRecord;

/// Records whose animal type is selected, in their original order.
///
/// [`CategorySelection::All`] returns every record; an empty
/// [`CategorySelection::Only`] returns none. Labels absent from the data
/// simply match nothing.
#[must_use]
pub fn filter_records(records: &[AnimalRecord], selection: &CategorySelection) -> Vec<AnimalRecord> {
    match selection {
        CategorySelection::All => records.to_vec(),
        CategorySelection::Only(labels) => records
            .iter()
            .filter(|r| labels.contains(&r.animal_type))
            .cloned()
            .collect(),
    }
}

/// Narrows `selection` to labels present in `options`.
///
/// Unknown labels are dropped. [`CategorySelection::All`] is returned as-is.
#[must_use]
pub fn resolve_selection(selection: &CategorySelection, options: &[String]) -> CategorySelection {
    match selection {
        CategorySelection::All => CategorySelection::All,
        CategorySelection::Only(labels) => {
            let (known, unknown): (Vec<&String>, Vec<&String>) =
                labels.iter().partition(|label| options.contains(label));
            if !unknown.is_empty() {
                log::debug!("Ignoring unknown category label(s): {unknown:?}");
            }
            CategorySelection::only(known.into_iter().cloned())
        }
    }
}

/// The selected labels in `options` order.
#[must_use]
pub fn selected_labels(selection: &CategorySelection, options: &[String]) -> Vec<String> {
    options
        .iter()
        .filter(|option| selection.contains(option))
        .cloned()
        .collect()
}
