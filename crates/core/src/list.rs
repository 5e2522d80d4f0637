//! Shared jam repository with filtering, sorting, and selection.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::info;

use crate::models::{GameJam, JamCategory};

/// Thread-safe jam repository shared between the fetch task and the UI.
///
/// All mutation goes through this handle, so a background fetch can replace
/// the snapshot while the UI keeps filtering and paging. Selection changes are
/// broadcast on a watch channel; subscribers persist or redraw as they see
/// fit.
#[derive(Clone)]
pub struct JamList {
    inner: Arc<RwLock<Inner>>,
}

struct Inner {
    all_jams: Vec<GameJam>,
    filtered: Vec<GameJam>,
    selected: Option<GameJam>,
    query: String,
    category: JamCategory,
    loading: bool,
    selection_tx: watch::Sender<Option<GameJam>>,
}

impl JamList {
    /// Create an empty repository.
    pub fn new() -> Self {
        let (selection_tx, _) = watch::channel(None);
        Self {
            inner: Arc::new(RwLock::new(Inner {
                all_jams: Vec::new(),
                filtered: Vec::new(),
                selected: None,
                query: String::new(),
                category: JamCategory::All,
                loading: false,
                selection_tx,
            })),
        }
    }

    /// Replace the whole repository with a freshly fetched batch.
    ///
    /// Jams are ordered by end date, their remaining-time caches are stamped
    /// with `now`, and the loading flag is cleared. An existing selection is
    /// re-bound to the matching jam by id; if the batch no longer contains it
    /// the stale copy is kept so the overlay keeps working.
    pub fn load_all(&self, mut jams: Vec<GameJam>, now: DateTime<Utc>) {
        jams.sort_by_key(|jam| jam.end_date);
        for jam in &mut jams {
            jam.refresh_cached_times(now);
        }
        let mut inner = self.inner.write();
        inner.all_jams = jams;
        inner.loading = false;
        if let Some(selected_id) = inner.selected.as_ref().map(|jam| jam.id) {
            if inner.all_jams.iter().any(|jam| jam.id == selected_id) {
                mark_selected_copies(&mut inner, selected_id, now);
                let rebound = inner
                    .all_jams
                    .iter()
                    .find(|jam| jam.id == selected_id)
                    .cloned();
                inner.selected = rebound.clone();
                inner.selection_tx.send_replace(rebound);
            }
        }
        apply_filters(&mut inner, now);
        info!(total = inner.all_jams.len(), "Jam list replaced");
    }

    /// Update the title query; refilters only when the text actually changed.
    pub fn set_query(&self, query: impl Into<String>, now: DateTime<Utc>) {
        let query = query.into();
        let mut inner = self.inner.write();
        if inner.query == query {
            return;
        }
        inner.query = query;
        apply_filters(&mut inner, now);
    }

    /// Current title query.
    pub fn query(&self) -> String {
        self.inner.read().query.clone()
    }

    /// Update the category filter; refilters only on an actual change.
    pub fn set_category(&self, category: JamCategory, now: DateTime<Utc>) {
        let mut inner = self.inner.write();
        if inner.category == category {
            return;
        }
        inner.category = category;
        apply_filters(&mut inner, now);
    }

    /// Current category filter.
    pub fn category(&self) -> JamCategory {
        self.inner.read().category
    }

    /// Re-evaluate the filters against a fresh `now`.
    ///
    /// Status-based categories drift as time passes even when no input
    /// changed, so the UI calls this from its slow tick.
    pub fn refilter(&self, now: DateTime<Utc>) {
        let mut inner = self.inner.write();
        apply_filters(&mut inner, now);
    }

    /// Snapshot of the filtered, ordered view.
    pub fn filtered(&self) -> Vec<GameJam> {
        self.inner.read().filtered.clone()
    }

    /// Select the jam with `id`, returning false when it is not in the list.
    ///
    /// The previous selection, if any, loses its flag first.
    pub fn select(&self, id: i64, now: DateTime<Utc>) -> bool {
        let mut inner = self.inner.write();
        if !inner.all_jams.iter().any(|jam| jam.id == id) {
            return false;
        }
        if let Some(previous) = inner.selected.take() {
            clear_selected_copies(&mut inner, previous.id);
        }
        mark_selected_copies(&mut inner, id, now);
        let selected = inner.all_jams.iter().find(|jam| jam.id == id).cloned();
        inner.selected = selected.clone();
        inner.selection_tx.send_replace(selected);
        true
    }

    /// Clear the current selection, if any.
    pub fn deselect(&self) {
        let mut inner = self.inner.write();
        let Some(previous) = inner.selected.take() else {
            return;
        };
        clear_selected_copies(&mut inner, previous.id);
        inner.selection_tx.send_replace(None);
    }

    /// The currently selected jam, if any.
    pub fn selected(&self) -> Option<GameJam> {
        self.inner.read().selected.clone()
    }

    /// Adopt a selection reconstructed from persisted state.
    ///
    /// The jam does not have to be in the repository yet; the next
    /// [`load_all`](Self::load_all) re-binds it by id when possible.
    pub fn restore_selection(&self, mut jam: GameJam, now: DateTime<Utc>) {
        jam.mark_selected(now);
        let mut inner = self.inner.write();
        inner.selected = Some(jam.clone());
        inner.selection_tx.send_replace(Some(jam));
    }

    /// Observe selection changes.
    ///
    /// The receiver starts with the current selection already marked as seen.
    pub fn subscribe(&self) -> watch::Receiver<Option<GameJam>> {
        self.inner.read().selection_tx.subscribe()
    }

    /// Mark a fetch as in flight.
    pub fn set_loading(&self, loading: bool) {
        self.inner.write().loading = loading;
    }

    /// Whether a fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.inner.read().loading
    }
}

impl Default for JamList {
    fn default() -> Self {
        Self::new()
    }
}

fn apply_filters(inner: &mut Inner, now: DateTime<Utc>) {
    let query = inner.query.trim().to_lowercase();
    let mut filtered: Vec<GameJam> = inner
        .all_jams
        .iter()
        .filter(|jam| query.is_empty() || jam.title.to_lowercase().contains(&query))
        .filter(|jam| inner.category.matches(jam, now))
        .cloned()
        .collect();
    filtered.sort_by_key(|jam| {
        (
            !jam.is_active_at(now),
            !jam.is_voting_at(now),
            now >= jam.start_date,
            jam.end_date,
        )
    });
    inner.filtered = filtered;
}

fn mark_selected_copies(inner: &mut Inner, id: i64, now: DateTime<Utc>) {
    for jam in inner.all_jams.iter_mut().chain(inner.filtered.iter_mut()) {
        if jam.id == id {
            jam.mark_selected(now);
        }
    }
}

fn clear_selected_copies(inner: &mut Inner, id: i64) {
    for jam in inner.all_jams.iter_mut().chain(inner.filtered.iter_mut()) {
        if jam.id == id {
            jam.clear_selected();
        }
    }
}
