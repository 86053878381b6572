//! Interactive dashboard session.
//!
//! A session pins one snapshot and its aggregate views. Changing the
//! selection only re-filters the records; refreshing re-fetches and keeps
//! the requested selection.

use std::sync::Arc;

use shelter_stats_analytics::{filter_records, resolve_selection};
use shelter_stats_analytics_models::{CategorySelection, SnapshotViews};
use shelter_stats_record_models::{AnimalRecord, Snapshot};
use shelter_stats_snapshot::SnapshotError;

use crate::{Dashboard, DashboardView, Prepared, RenderError, Renderer};

/// One user's view of the dashboard.
#[derive(Debug)]
pub struct DashboardSession {
    dashboard: Dashboard,
    prepared: Arc<Prepared>,
    requested: CategorySelection,
    selection: CategorySelection,
    filtered: Vec<AnimalRecord>,
}

impl DashboardSession {
    pub(crate) fn new(
        dashboard: Dashboard,
        prepared: Arc<Prepared>,
        selection: CategorySelection,
    ) -> Self {
        let mut session = Self {
            dashboard,
            prepared,
            requested: CategorySelection::All,
            selection: CategorySelection::All,
            filtered: Vec::new(),
        };
        session.select(selection);
        session
    }

    /// The pinned snapshot.
    #[must_use]
    pub fn snapshot(&self) -> &Arc<Snapshot> {
        &self.prepared.snapshot
    }

    /// Aggregate views of the pinned snapshot.
    #[must_use]
    pub fn views(&self) -> &SnapshotViews {
        &self.prepared.views
    }

    /// Distinct animal types of the pinned snapshot.
    #[must_use]
    pub fn category_options(&self) -> &[String] {
        &self.prepared.category_options
    }

    /// The active selection, narrowed to known animal types.
    #[must_use]
    pub const fn selection(&self) -> &CategorySelection {
        &self.selection
    }

    /// Records of the selected types.
    #[must_use]
    pub fn filtered_records(&self) -> &[AnimalRecord] {
        &self.filtered
    }

    /// Changes the selection and re-filters the records.
    pub fn select(&mut self, selection: CategorySelection) {
        self.selection = resolve_selection(&selection, &self.prepared.category_options);
        self.filtered = filter_records(&self.prepared.snapshot.records, &self.selection);
        self.requested = selection;
    }

    /// Re-fetches the snapshot and recomputes every view, keeping the
    /// requested selection.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] if the fetch fails. The session keeps its
    /// previous snapshot in that case.
    pub async fn refresh(&mut self) -> Result<(), SnapshotError> {
        let snapshot = self.dashboard.refresh().await?;
        self.prepared = self.dashboard.prepare_snapshot(&snapshot);
        let requested = std::mem::take(&mut self.requested);
        self.select(requested);
        Ok(())
    }

    /// Assembles the full view for the current selection.
    #[must_use]
    pub fn view(&self) -> DashboardView {
        self.prepared.view(self.dashboard.config(), &self.selection)
    }

    /// Passes the current view to `renderer`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if the renderer fails.
    pub fn render(&self, renderer: &mut dyn Renderer) -> Result<(), RenderError> {
        renderer.render(&self.view())
    }
}
