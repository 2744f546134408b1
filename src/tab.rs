//! Main entry point for opentab.
//!
//! This module provides the [`OpenTab`] struct, the primary entry point
//! for embedding the tracker, and [`OpenTabBuilder`] for configuration.

use std::path::Path;

use opentab_core::{Entry, EntryDraft, EntryId, Result, Snapshot, Status};
use opentab_engine::{
    AlwaysConfirm, ConfirmPort, FileStore, MemoryStore, Query, SortOrder, StorageKeys, Store,
    Tracker,
};

use crate::export;
use crate::render::{EntryView, Renderer};

/// The opentab tracker.
///
/// Owns the live snapshot behind a single-writer [`Tracker`] and wires
/// in the confirmation port plus the export and render surfaces. Create
/// one with [`OpenTab::open`], [`OpenTab::ephemeral`] or
/// [`OpenTab::builder`].
///
/// # Example
///
/// ```
/// use opentab::prelude::*;
///
/// # fn main() -> opentab::Result<()> {
/// let mut tab = OpenTab::ephemeral();
///
/// let id = tab.create(EntryDraft::new(
///     "ABC Electronics",
///     "Laptop Charger",
///     Status::CollectedForRepairing,
/// ))?;
///
/// // The repair came back; the paired follow-up closes the entry.
/// tab.mark_done(&id)?;
///
/// let closed = tab.entries(&Query::new().phase(PhaseFilter::Closed));
/// assert_eq!(closed.len(), 1);
/// # Ok(())
/// # }
/// ```
pub struct OpenTab {
    tracker: Tracker,
    confirm: Box<dyn ConfirmPort>,
    default_order: SortOrder,
}

impl OpenTab {
    /// Open a file-backed tracker rooted at `dir`.
    ///
    /// Uses the default storage keys; legacy data found under previous
    /// keys is migrated on open.
    pub fn open(dir: impl AsRef<Path>) -> Result<OpenTab> {
        let store = FileStore::open(dir)?;
        Ok(OpenTab::builder().store(Box::new(store)).build())
    }

    /// Open a tracker with no disk IO. Data is gone when dropped.
    pub fn ephemeral() -> OpenTab {
        OpenTab::builder().store(Box::new(MemoryStore::new())).build()
    }

    /// Create a builder for tracker configuration.
    pub fn builder() -> OpenTabBuilder {
        OpenTabBuilder::new()
    }

    // =========================================================================
    // Mutations (all confirmation-gated ones use the configured port)
    // =========================================================================

    /// Create a new entry from raw submitted fields.
    pub fn create(&mut self, draft: EntryDraft) -> Result<EntryId> {
        self.tracker.create(draft)
    }

    /// Replace an entry's mutable fields, preserving its id.
    pub fn edit(&mut self, id: &EntryId, draft: EntryDraft) -> Result<()> {
        self.tracker.edit(id, draft)
    }

    /// Advance a pending entry to its follow-up status ("mark returned
    /// / collected back / done"). Returns `false` when the confirmation
    /// port declines.
    pub fn mark_done(&mut self, id: &EntryId) -> Result<bool> {
        self.tracker.advance(id, &*self.confirm)
    }

    /// Force an entry closed under the generic terminal label `Given`.
    pub fn close(&mut self, id: &EntryId) -> Result<bool> {
        self.tracker.close(id, Status::Given, &*self.confirm)
    }

    /// Force an entry closed under a specific closed-phase label.
    pub fn close_as(&mut self, id: &EntryId, target: Status) -> Result<bool> {
        self.tracker.close(id, target, &*self.confirm)
    }

    /// Delete an entry permanently. Returns `false` when declined.
    pub fn delete(&mut self, id: &EntryId) -> Result<bool> {
        self.tracker.delete(id, &*self.confirm)
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// A query preset to this tracker's configured default ordering.
    pub fn query(&self) -> Query {
        Query::new().order(self.default_order)
    }

    /// Run a query over the collection.
    pub fn entries(&self, query: &Query) -> Vec<&Entry> {
        query.run(self.tracker.entries())
    }

    /// Run a query and attach display metadata for a renderer.
    pub fn views(&self, query: &Query) -> Vec<EntryView<'_>> {
        self.entries(query).into_iter().map(EntryView::from).collect()
    }

    /// Render the query result with the given renderer.
    pub fn render(&self, renderer: &dyn Renderer, query: &Query) -> String {
        renderer.render(&self.views(query))
    }

    /// Export the query result as delimited text, one row per entry.
    pub fn export_csv(&self, query: &Query) -> Result<String> {
        export::to_csv(self.entries(query))
    }

    /// Previously seen party names, sorted, for input suggestion.
    pub fn parties(&self) -> &[String] {
        self.tracker.parties()
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Whether the last mutation failed to persist.
    pub fn needs_flush(&self) -> bool {
        self.tracker.needs_flush()
    }

    /// Retry persisting the snapshot.
    pub fn flush(&mut self) -> Result<()> {
        self.tracker.flush()
    }
}

/// Builder for tracker configuration.
///
/// # Example
///
/// ```
/// use opentab::prelude::*;
/// use opentab::{MemoryStore, SortOrder};
///
/// let tab = OpenTab::builder()
///     .store(Box::new(MemoryStore::new()))
///     .default_order(SortOrder::OldestFirst) // urgency framing
///     .seed_demo(true)
///     .build();
/// assert_eq!(tab.entries(&tab.query()).len(), 2);
/// ```
pub struct OpenTabBuilder {
    store: Option<Box<dyn Store>>,
    keys: StorageKeys,
    confirm: Box<dyn ConfirmPort>,
    default_order: SortOrder,
    seed_demo: bool,
}

impl OpenTabBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> OpenTabBuilder {
        OpenTabBuilder {
            store: None,
            keys: StorageKeys::default(),
            confirm: Box::new(AlwaysConfirm),
            default_order: SortOrder::default(),
            seed_demo: false,
        }
    }

    /// Use the given store backend. Defaults to an in-memory store.
    pub fn store(mut self, store: Box<dyn Store>) -> Self {
        self.store = Some(store);
        self
    }

    /// Override the storage key configuration (current key plus the
    /// legacy keys probed for migratable data).
    pub fn keys(mut self, keys: StorageKeys) -> Self {
        self.keys = keys;
        self
    }

    /// Install a confirmation port for destructive operations.
    ///
    /// The default confirms everything, which suits embedders that gate
    /// confirmation in their own UI layer.
    pub fn confirm(mut self, confirm: Box<dyn ConfirmPort>) -> Self {
        self.confirm = confirm;
        self
    }

    /// Default ordering for [`OpenTab::query`]. Newest first unless set.
    pub fn default_order(mut self, order: SortOrder) -> Self {
        self.default_order = order;
        self
    }

    /// Seed the demo rows on first run (empty collection only).
    pub fn seed_demo(mut self, seed: bool) -> Self {
        self.seed_demo = seed;
        self
    }

    /// Open the tracker.
    pub fn build(self) -> OpenTab {
        let store = self.store.unwrap_or_else(|| Box::new(MemoryStore::new()));
        let mut tracker = Tracker::open(store, self.keys);
        if self.seed_demo {
            tracker.seed_if_empty(Snapshot::seeded());
        }
        OpenTab {
            tracker,
            confirm: self.confirm,
            default_order: self.default_order,
        }
    }
}

impl Default for OpenTabBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentab_engine::NeverConfirm;

    #[test]
    fn test_builder_confirm_port_is_used() {
        let mut tab = OpenTab::builder()
            .confirm(Box::new(NeverConfirm))
            .build();
        let id = tab
            .create(EntryDraft::new("P", "I", Status::Collected))
            .unwrap();
        assert!(!tab.mark_done(&id).unwrap());
        assert!(!tab.delete(&id).unwrap());
    }

    #[test]
    fn test_seed_demo_only_when_empty() {
        let tab = OpenTab::builder().seed_demo(true).build();
        assert_eq!(tab.entries(&Query::new()).len(), 2);

        // An existing collection is never overwritten by seeding.
        let store = MemoryStore::new();
        let existing = opentab_core::Snapshot {
            entries: vec![
                Entry::from_draft(EntryDraft::new("P", "I", Status::Collected)).unwrap(),
            ],
            parties: opentab_core::PartyDirectory::default(),
        };
        store.preload("opentab_v3", &serde_json::to_string(&existing).unwrap());

        let tab = OpenTab::builder()
            .store(Box::new(store))
            .seed_demo(true)
            .build();
        assert_eq!(tab.entries(&Query::new()).len(), 1);
    }

    #[test]
    fn test_default_order_flows_into_query() {
        let tab = OpenTab::builder()
            .default_order(SortOrder::OldestFirst)
            .build();
        assert_eq!(tab.query().order, SortOrder::OldestFirst);
    }
}
