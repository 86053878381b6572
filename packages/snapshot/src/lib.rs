#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Snapshot cache keyed by query identity.
//!
//! The first [`SnapshotCache::get_snapshot`] call for a key fetches rows
//! from the configured [`DataSource`], normalizes them and stores the
//! resulting [`Snapshot`]. Later calls return the same `Arc` without
//! touching the source. Entries never expire on their own; they are
//! replaced only through [`SnapshotCache::invalidate`] or
//! [`SnapshotCache::clear`].
//!
//! Concurrent callers for a key share a single in-flight fetch. The fetch
//! runs as its own tokio task, so it completes even if every caller stops
//! waiting.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use futures::FutureExt as _;
use futures::future::{BoxFuture, Shared};
use shelter_stats_record_models::Snapshot;
use shelter_stats_source::normalize::FieldMapping;
use shelter_stats_source::{DataSource, SourceError};

/// Errors surfaced by the snapshot cache.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The data source could not deliver rows for the key.
    ///
    /// Every caller that waited on the same fetch receives the same error.
    #[error("Failed to fetch snapshot for '{key}': {source}")]
    Fetch {
        /// The query key being fetched.
        key: String,
        /// The underlying source failure.
        source: Arc<SourceError>,
    },
}

type FetchResult = Result<Arc<Snapshot>, Arc<SourceError>>;
type SharedFetch = Shared<BoxFuture<'static, FetchResult>>;

enum Slot {
    Ready(Arc<Snapshot>),
    Loading { generation: u64, fetch: SharedFetch },
}

enum Lookup {
    Hit(Arc<Snapshot>),
    Wait(u64, SharedFetch),
}

/// Memoizes one fetch-and-normalize cycle per query key.
pub struct SnapshotCache {
    source: Arc<dyn DataSource>,
    mapping: Arc<FieldMapping>,
    slots: Mutex<BTreeMap<String, Slot>>,
    next_generation: AtomicU64,
}

impl std::fmt::Debug for SnapshotCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotCache")
            .field("source", &self.source.name())
            .field("keys", &self.cached_keys())
            .finish_non_exhaustive()
    }
}

impl SnapshotCache {
    /// Creates an empty cache over `source`, normalizing rows with `mapping`.
    #[must_use]
    pub fn new(source: Arc<dyn DataSource>, mapping: FieldMapping) -> Self {
        Self {
            source,
            mapping: Arc::new(mapping),
            slots: Mutex::new(BTreeMap::new()),
            next_generation: AtomicU64::new(0),
        }
    }

    /// Returns the snapshot for `key`, fetching it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Fetch`] if the data source fails. Failures
    /// are not cached: the next call starts a new fetch.
    pub async fn get_snapshot(&self, key: &str) -> Result<Arc<Snapshot>, SnapshotError> {
        let (generation, fetch) = match self.lookup(key) {
            Lookup::Hit(snapshot) => return Ok(snapshot),
            Lookup::Wait(generation, fetch) => (generation, fetch),
        };

        let result = fetch.await;

        {
            let mut slots = self.lock_slots();
            let owned = matches!(
                slots.get(key),
                Some(Slot::Loading { generation: g, .. }) if *g == generation
            );
            if owned {
                match &result {
                    Ok(snapshot) => {
                        slots.insert(key.to_string(), Slot::Ready(Arc::clone(snapshot)));
                    }
                    Err(_) => {
                        slots.remove(key);
                    }
                }
            }
        }

        result.map_err(|source| {
            log::warn!("[{key}] Snapshot fetch failed: {source}");
            SnapshotError::Fetch {
                key: key.to_string(),
                source,
            }
        })
    }

    /// Returns the cached snapshot for `key` without fetching.
    #[must_use]
    pub fn peek(&self, key: &str) -> Option<Arc<Snapshot>> {
        match self.lock_slots().get(key)? {
            Slot::Ready(snapshot) => Some(Arc::clone(snapshot)),
            Slot::Loading { .. } => None,
        }
    }

    /// Drops the entry for `key`. Returns whether an entry existed.
    ///
    /// A fetch already in flight still completes and is handed to its
    /// waiters, but its result is not stored.
    pub fn invalidate(&self, key: &str) -> bool {
        let removed = self.lock_slots().remove(key).is_some();
        if removed {
            log::info!("[{key}] Snapshot invalidated");
        }
        removed
    }

    /// Drops every entry.
    pub fn clear(&self) {
        let mut slots = self.lock_slots();
        log::info!("Clearing {} cached snapshot(s)", slots.len());
        slots.clear();
    }

    /// Invalidates `key` and fetches it again.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Fetch`] if the data source fails.
    pub async fn refresh(&self, key: &str) -> Result<Arc<Snapshot>, SnapshotError> {
        self.invalidate(key);
        self.get_snapshot(key).await
    }

    /// Keys with a stored or in-flight snapshot, in sorted order.
    #[must_use]
    pub fn cached_keys(&self) -> Vec<String> {
        self.lock_slots().keys().cloned().collect()
    }

    fn lock_slots(&self) -> MutexGuard<'_, BTreeMap<String, Slot>> {
        // Slots are only ever replaced whole, so a poisoned map is still
        // consistent.
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Resolves `key` to a cached snapshot or a fetch to wait on, starting
    /// a new fetch when there is none (or the last one failed).
    fn lookup(&self, key: &str) -> Lookup {
        let mut slots = self.lock_slots();

        let existing = match slots.get(key) {
            Some(Slot::Ready(snapshot)) => {
                log::debug!("[{key}] Snapshot cache hit");
                return Lookup::Hit(Arc::clone(snapshot));
            }
            Some(Slot::Loading { generation, fetch }) => match fetch.peek() {
                None => {
                    log::debug!("[{key}] Joining in-flight snapshot fetch");
                    return Lookup::Wait(*generation, fetch.clone());
                }
                Some(Ok(snapshot)) => Some(Arc::clone(snapshot)),
                Some(Err(_)) => None,
            },
            None => None,
        };

        // A finished fetch whose waiters all went away before storing it.
        if let Some(snapshot) = existing {
            slots.insert(key.to_string(), Slot::Ready(Arc::clone(&snapshot)));
            return Lookup::Hit(snapshot);
        }

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let fetch = self.start_fetch(key);
        slots.insert(
            key.to_string(),
            Slot::Loading {
                generation,
                fetch: fetch.clone(),
            },
        );
        Lookup::Wait(generation, fetch)
    }

    fn start_fetch(&self, key: &str) -> SharedFetch {
        let source = Arc::clone(&self.source);
        let mapping = Arc::clone(&self.mapping);
        let key = key.to_string();

        let task = tokio::spawn(async move {
            log::info!("[{key}] Fetching snapshot from {}", source.name());
            let rows = source.fetch(&key).await?;
            let (records, report) = mapping.normalize_batch(&rows);
            let snapshot = Snapshot::new(&key, Utc::now(), records, report);

            let report = &snapshot.report;
            log::info!(
                "[{key}] Snapshot ready: {} records (unknown: {} types, {} intake dates, \
                 {} outcome dates, {} outcomes, {} ages, {} months)",
                report.records,
                report.unknown_animal_types,
                report.unknown_intake_dates,
                report.unknown_outcome_dates,
                report.unknown_outcome_types,
                report.unknown_ages,
                report.unknown_months,
            );

            Ok::<_, SourceError>(Arc::new(snapshot))
        });

        async move {
            match task.await {
                Ok(result) => result.map_err(Arc::new),
                Err(e) => Err(Arc::new(SourceError::Interrupted {
                    message: e.to_string(),
                })),
            }
        }
        .boxed()
        .shared()
    }
}
