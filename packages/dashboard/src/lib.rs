#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dashboard view assembly.
//!
//! [`Dashboard`] ties the pieces together: it pulls the snapshot for the
//! configured query key from the [`SnapshotCache`], computes the aggregate
//! views once per snapshot, filters the records for the requested
//! [`CategorySelection`] and hands the finished [`DashboardView`] to a
//! [`Renderer`].

pub mod config;
pub mod render;
pub mod session;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shelter_stats_analytics::{compute_views, filter_records, resolve_selection, selected_labels};
use shelter_stats_analytics_models::{CategorySelection, SnapshotViews};
use shelter_stats_record_models::{AnimalRecord, Snapshot};
use shelter_stats_snapshot::{SnapshotCache, SnapshotError};

pub use config::{ConfigError, DashboardConfig};
pub use render::{JsonRenderer, OutputFormat, RenderError, Renderer, TextRenderer};
pub use session::DashboardSession;

/// Errors that can occur while assembling or rendering a dashboard.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// The snapshot could not be fetched.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// The renderer failed.
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Everything a renderer needs to draw the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    /// Dashboard heading.
    pub title: String,
    /// Query key the snapshot was fetched for.
    pub query_key: String,
    /// When the snapshot was fetched.
    pub fetched_at: DateTime<Utc>,
    /// Number of records in the snapshot.
    pub record_count: usize,
    /// Distinct animal types in order of first appearance.
    pub category_options: Vec<String>,
    /// Selected animal types, in option order.
    pub selected_categories: Vec<String>,
    /// Aggregate views over the whole snapshot.
    #[serde(flatten)]
    pub views: SnapshotViews,
    /// Records of the selected types, in snapshot order.
    pub filtered_records: Vec<AnimalRecord>,
}

/// A snapshot with its selection-independent derived data.
#[derive(Debug)]
struct Prepared {
    snapshot: Arc<Snapshot>,
    category_options: Vec<String>,
    views: SnapshotViews,
}

impl Prepared {
    fn view(&self, config: &DashboardConfig, selection: &CategorySelection) -> DashboardView {
        let selection = resolve_selection(selection, &self.category_options);
        DashboardView {
            title: config.title.clone(),
            query_key: self.snapshot.query_key.clone(),
            fetched_at: self.snapshot.fetched_at,
            record_count: self.snapshot.len(),
            category_options: self.category_options.clone(),
            selected_categories: selected_labels(&selection, &self.category_options),
            views: self.views.clone(),
            filtered_records: filter_records(&self.snapshot.records, &selection),
        }
    }
}

/// Assembles dashboard views for one configured query.
///
/// Cloning is cheap; clones share the cache and the computed views.
#[derive(Debug, Clone)]
pub struct Dashboard {
    config: Arc<DashboardConfig>,
    cache: Arc<SnapshotCache>,
    prepared: Arc<Mutex<Option<Arc<Prepared>>>>,
}

impl Dashboard {
    /// Creates a dashboard reading snapshots from `cache`.
    #[must_use]
    pub fn new(config: DashboardConfig, cache: Arc<SnapshotCache>) -> Self {
        Self {
            config: Arc::new(config),
            cache,
            prepared: Arc::new(Mutex::new(None)),
        }
    }

    /// Builds the configured data source and a fresh cache over it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Source`] if the fetcher config is invalid.
    pub fn from_config(config: DashboardConfig) -> Result<Self, ConfigError> {
        let source = config.fetcher.build()?;
        log::info!(
            "Dashboard '{}' reading '{}' from {}",
            config.title,
            config.query_key,
            source.name()
        );
        let cache = SnapshotCache::new(source, config.fields.clone());
        Ok(Self::new(config, Arc::new(cache)))
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// The snapshot cache backing this dashboard.
    #[must_use]
    pub const fn cache(&self) -> &Arc<SnapshotCache> {
        &self.cache
    }

    /// Returns the current snapshot, fetching it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] if the fetch fails.
    pub async fn snapshot(&self) -> Result<Arc<Snapshot>, SnapshotError> {
        self.cache.get_snapshot(&self.config.query_key).await
    }

    /// Distinct animal types of the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] if the fetch fails.
    pub async fn category_options(&self) -> Result<Vec<String>, SnapshotError> {
        Ok(self.prepare().await?.category_options.clone())
    }

    /// Assembles the full view for `selection`.
    ///
    /// The aggregate views are computed once per snapshot; only the record
    /// filter depends on the selection.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] if the fetch fails.
    pub async fn assemble(
        &self,
        selection: &CategorySelection,
    ) -> Result<DashboardView, SnapshotError> {
        Ok(self.prepare().await?.view(&self.config, selection))
    }

    /// Assembles the view for `selection` and passes it to `renderer`.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError`] if the fetch or the renderer fails.
    pub async fn render(
        &self,
        selection: &CategorySelection,
        renderer: &mut dyn Renderer,
    ) -> Result<(), DashboardError> {
        let view = self.assemble(selection).await?;
        renderer.render(&view)?;
        Ok(())
    }

    /// Drops the cached snapshot and fetches it again.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] if the fetch fails.
    pub async fn refresh(&self) -> Result<Arc<Snapshot>, SnapshotError> {
        log::info!("Refreshing snapshot for '{}'", self.config.query_key);
        let snapshot = self.cache.refresh(&self.config.query_key).await?;
        self.prepare_snapshot(&snapshot);
        Ok(snapshot)
    }

    /// Opens a session with `selection` over the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] if the fetch fails.
    pub async fn session(
        &self,
        selection: CategorySelection,
    ) -> Result<DashboardSession, SnapshotError> {
        let prepared = self.prepare().await?;
        Ok(DashboardSession::new(self.clone(), prepared, selection))
    }

    async fn prepare(&self) -> Result<Arc<Prepared>, SnapshotError> {
        let snapshot = self.snapshot().await?;
        Ok(self.prepare_snapshot(&snapshot))
    }

    /// Returns the derived data for `snapshot`, computing it when the
    /// stored copy belongs to a different snapshot.
    fn prepare_snapshot(&self, snapshot: &Arc<Snapshot>) -> Arc<Prepared> {
        let cached = self
            .lock_prepared()
            .as_ref()
            .filter(|p| Arc::ptr_eq(&p.snapshot, snapshot))
            .cloned();
        if let Some(prepared) = cached {
            return prepared;
        }

        log::debug!(
            "Computing views for '{}' ({} records)",
            snapshot.query_key,
            snapshot.len()
        );
        let prepared = Arc::new(Prepared {
            snapshot: Arc::clone(snapshot),
            category_options: snapshot.category_options(),
            views: compute_views(&snapshot.records, self.config.histogram_bins),
        });
        *self.lock_prepared() = Some(Arc::clone(&prepared));
        prepared
    }

    fn lock_prepared(&self) -> MutexGuard<'_, Option<Arc<Prepared>>> {
        self.prepared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::dashboard;
    use super::*;

    #[tokio::test]
    async fn assembles_scenario_views() {
        let view = dashboard().assemble(&CategorySelection::All).await.unwrap();

        assert_eq!(view.title, "Animal Shelter Dashboard");
        assert_eq!(view.record_count, 3);
        assert_eq!(view.category_options, vec!["Dog", "Cat"]);
        assert_eq!(view.selected_categories, vec!["Dog", "Cat"]);
        assert_eq!(view.views.category_counts[0].category, "Dog");
        assert_eq!(view.views.category_counts[0].count, 2);
        assert_eq!(view.views.outcome_distribution.outcomes.len(), 1);
        assert_eq!(view.views.monthly_series.len(), 2);
        assert_eq!(view.views.age_histogram.total(), 2);
        assert_eq!(view.filtered_records.len(), 3);
    }

    #[tokio::test]
    async fn selection_filters_records_only() {
        let dashboard = dashboard();
        let all = dashboard.assemble(&CategorySelection::All).await.unwrap();
        let cats = dashboard
            .assemble(&CategorySelection::only(["Cat", "Lizard"]))
            .await
            .unwrap();

        assert_eq!(cats.views, all.views);
        assert_eq!(cats.selected_categories, vec!["Cat"]);
        assert_eq!(cats.filtered_records.len(), 1);
        assert_eq!(cats.filtered_records[0].animal_id, "A2");

        let none = dashboard
            .assemble(&CategorySelection::only(Vec::<String>::new()))
            .await
            .unwrap();
        assert!(none.filtered_records.is_empty());
        assert!(none.selected_categories.is_empty());
    }

    #[tokio::test]
    async fn views_are_computed_once_per_snapshot() {
        let dashboard = dashboard();
        let first = dashboard.prepare().await.unwrap();
        let second = dashboard.prepare().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        dashboard.refresh().await.unwrap();
        let third = dashboard.prepare().await.unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
    }

    #[tokio::test]
    async fn json_renderer_round_trips_view() {
        let dashboard = dashboard();
        let mut renderer = JsonRenderer::new(Vec::new());
        dashboard
            .render(&CategorySelection::All, &mut renderer)
            .await
            .unwrap();

        let parsed: DashboardView = serde_json::from_slice(&renderer.into_inner()).unwrap();
        let view = dashboard.assemble(&CategorySelection::All).await.unwrap();
        assert_eq!(parsed.title, view.title);
        assert_eq!(parsed.fetched_at, view.fetched_at);
        assert_eq!(parsed.category_options, view.category_options);
        assert_eq!(parsed.views.category_counts, view.views.category_counts);
        assert_eq!(parsed.views.monthly_series, view.views.monthly_series);
        assert_eq!(parsed.views.age_histogram.total(), 2);
        assert_eq!(parsed.filtered_records, view.filtered_records);
    }

    #[tokio::test]
    async fn json_view_uses_camel_case_keys() {
        let view = dashboard().assemble(&CategorySelection::All).await.unwrap();
        let value = serde_json::to_value(&view).unwrap();
        assert!(value.get("categoryCounts").is_some());
        assert!(value.get("outcomeDistribution").is_some());
        assert!(value.get("filteredRecords").is_some());
        assert_eq!(value["monthlySeries"][0]["period"], "2024-01");
    }

    #[tokio::test]
    async fn text_renderer_writes_report() {
        let dashboard = dashboard();
        let mut renderer = TextRenderer::new(Vec::new());
        dashboard
            .render(&CategorySelection::only(["Cat"]), &mut renderer)
            .await
            .unwrap();

        let text = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(text.starts_with("Animal Shelter Dashboard\n"));
        assert!(text.contains("Animals by type"));
        assert!(text.contains("100.0%"));
        assert!(text.contains("2024-02"));
        assert!(text.contains("Records (1 of 3)"));
        assert!(text.contains("Selected types: Cat"));
        assert!(text.contains("A2"));
        assert!(!text.contains("A3"));
    }

    #[tokio::test]
    async fn fetch_failure_surfaces_as_error() {
        let mut config = super::test_support::config();
        config.fetcher = shelter_stats_source::source_def::FetcherConfig::CsvFile {
            path: std::env::temp_dir().join("shelter_stats_missing_rows.csv"),
            delimiter: None,
        };
        let dashboard = Dashboard::from_config(config).unwrap();
        let result = dashboard.assemble(&CategorySelection::All).await;
        assert!(matches!(result, Err(SnapshotError::Fetch { .. })));
    }
}
