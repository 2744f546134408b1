//! Lifecycle engine: the single-writer state container and its transitions.
//!
//! [`Tracker`] owns the live [`Snapshot`] explicitly; there are no
//! ambient globals. Every mutation is read-modify-write-persist: the
//! in-memory snapshot changes, then the whole snapshot is flushed to the
//! store. The model is single-threaded and synchronous, so no locking
//! happens here.
//!
//! ## Transitions
//!
//! - **create** — a new entry enters at the phase implied by its status
//! - **edit** — fields replaced, id preserved, timestamp bumped
//! - **advance** — a pending status is replaced by its registry
//!   follow-up ("mark returned / collected back")
//! - **close** — a status is forced to a terminal closed-phase label
//!   without going through the paired follow-up
//! - **delete** — permanent removal, no undo
//!
//! Advance, close and delete are confirmation-gated: the engine asks its
//! [`ConfirmPort`] and abandons the mutation (no state change) on a
//! negative answer. A declined confirmation is not an error.
//!
//! ## Persistence failures
//!
//! A failed flush is a warning, not a failure of the mutation: the
//! in-memory change is retained, [`Tracker::needs_flush`] turns true and
//! [`Tracker::flush`] retries. The session continues un-persisted
//! rather than crashing.

use tracing::{info, warn};

use opentab_core::{Entry, EntryDraft, EntryId, Error, Phase, Result, Snapshot, Status};

use crate::migration::{load_or_migrate, StorageKeys};
use crate::store::Store;

/// Confirmation capability the engine requests from its caller before a
/// destructive transition. Inject an automatic responder in tests.
pub trait ConfirmPort {
    /// Ask the user to confirm `prompt`. `false` abandons the mutation.
    fn confirm(&self, prompt: &str) -> bool;
}

/// Responder that confirms everything. Default for embedding contexts
/// that gate confirmation upstream.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl ConfirmPort for AlwaysConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Responder that declines everything. Test helper.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverConfirm;

impl ConfirmPort for NeverConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        false
    }
}

/// The single-writer state container.
///
/// Owns the live snapshot and the store handle; callers thread a
/// `&mut Tracker` through every mutation instead of sharing globals.
pub struct Tracker {
    snapshot: Snapshot,
    store: Box<dyn Store>,
    keys: StorageKeys,
    needs_flush: bool,
}

impl Tracker {
    /// Open a tracker over `store`.
    ///
    /// Loads the snapshot under the current key, falling back to
    /// legacy-key probing plus migration, and finally to the empty
    /// snapshot when nothing (or nothing readable) is found. A freshly
    /// migrated snapshot is persisted under the current key right away.
    pub fn open(store: Box<dyn Store>, keys: StorageKeys) -> Tracker {
        let (snapshot, migrated) = load_or_migrate(&*store, &keys);
        let mut tracker = Tracker {
            snapshot,
            store,
            keys,
            needs_flush: false,
        };
        if migrated {
            tracker.persist();
        }
        tracker
    }

    /// The live snapshot.
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// All entries, in stored order (newest first by convention).
    pub fn entries(&self) -> &[Entry] {
        &self.snapshot.entries
    }

    /// Previously seen party names, sorted.
    pub fn parties(&self) -> &[String] {
        self.snapshot.parties.names()
    }

    /// Replace an empty collection with `snapshot` (first-run seeding).
    /// Does nothing when entries already exist.
    pub fn seed_if_empty(&mut self, snapshot: Snapshot) {
        if self.snapshot.entries.is_empty() {
            self.snapshot = snapshot;
            self.persist();
        }
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Create a new entry from raw fields. The entry enters at the
    /// phase implied by its chosen status and goes to the top of the
    /// collection. The party name is learned for future suggestions.
    pub fn create(&mut self, draft: EntryDraft) -> Result<EntryId> {
        let entry = Entry::from_draft(draft)?;
        let id = entry.id.clone();
        info!(id = %id, status = %entry.status, "entry created");
        self.snapshot.parties.learn(&entry.party);
        self.snapshot.entries.insert(0, entry);
        self.persist();
        Ok(id)
    }

    /// Replace an entry's mutable fields. The id is preserved and the
    /// timestamp bumped, resurfacing the entry in recency order.
    pub fn edit(&mut self, id: &EntryId, draft: EntryDraft) -> Result<()> {
        let index = self.index_of(id)?;
        self.snapshot.entries[index].apply_draft(draft)?;
        let party = self.snapshot.entries[index].party.clone();
        self.snapshot.parties.learn(&party);
        info!(id = %id, "entry edited");
        self.persist();
        Ok(())
    }

    /// Advance a pending entry to its registry follow-up status.
    ///
    /// Returns `Ok(false)` when the confirmation port declines (no state
    /// change). Fails with [`Error::InvalidTransition`] when the current
    /// status defines no follow-up; the UI should not offer Advance for
    /// such entries, but the engine guards it regardless.
    pub fn advance(&mut self, id: &EntryId, confirm: &dyn ConfirmPort) -> Result<bool> {
        let index = self.index_of(id)?;
        let entry = &self.snapshot.entries[index];
        let follow_up = entry.status.follow_up().ok_or_else(|| Error::InvalidTransition {
            id: id.to_string(),
            status: entry.status.label().to_string(),
        })?;
        let prompt = format!("Mark '{}' as {}?", entry.item, follow_up);
        if !confirm.confirm(&prompt) {
            return Ok(false);
        }
        info!(id = %id, from = %self.snapshot.entries[index].status, to = %follow_up, "entry advanced");
        self.snapshot.entries[index].status = follow_up;
        self.persist();
        Ok(true)
    }

    /// Force an entry's status to a terminal closed-phase label without
    /// going through the paired follow-up.
    ///
    /// `target` must classify as closed; a pending-phase target is an
    /// [`Error::InvalidTransition`]. Returns `Ok(false)` when declined.
    pub fn close(
        &mut self,
        id: &EntryId,
        target: Status,
        confirm: &dyn ConfirmPort,
    ) -> Result<bool> {
        if target.phase() != Phase::Closed {
            return Err(Error::InvalidTransition {
                id: id.to_string(),
                status: target.label().to_string(),
            });
        }
        let index = self.index_of(id)?;
        let prompt = format!(
            "Mark '{}' as {}?",
            self.snapshot.entries[index].item, target
        );
        if !confirm.confirm(&prompt) {
            return Ok(false);
        }
        info!(id = %id, to = %target, "entry closed");
        self.snapshot.entries[index].status = target;
        self.persist();
        Ok(true)
    }

    /// Remove an entry permanently. Terminal; there is no undo.
    ///
    /// Returns `Ok(false)` when declined. A second delete of the same
    /// id is [`Error::NotFound`].
    pub fn delete(&mut self, id: &EntryId, confirm: &dyn ConfirmPort) -> Result<bool> {
        let index = self.index_of(id)?;
        let prompt = format!(
            "Are you sure you want to delete '{}'?",
            self.snapshot.entries[index].item
        );
        if !confirm.confirm(&prompt) {
            return Ok(false);
        }
        let removed = self.snapshot.entries.remove(index);
        info!(id = %removed.id, "entry deleted");
        self.persist();
        Ok(true)
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Whether the last mutation failed to persist.
    pub fn needs_flush(&self) -> bool {
        self.needs_flush
    }

    /// Write the snapshot to the store under the current key.
    ///
    /// Serialization is deterministic given the same entry order, so
    /// save-load-save round-trips byte-identically.
    pub fn flush(&mut self) -> Result<()> {
        let blob = serde_json::to_string(&self.snapshot)
            .map_err(|e| Error::Store(format!("serialize snapshot: {e}")))?;
        self.store.save(&self.keys.current, &blob)?;
        self.needs_flush = false;
        Ok(())
    }

    /// Flush, downgrading failure to a warning. The mutation that
    /// triggered the flush stays applied in memory.
    fn persist(&mut self) {
        if let Err(e) = self.flush() {
            warn!(error = %e, "flush failed, session continues un-persisted");
            self.needs_flush = true;
        }
    }

    fn index_of(&self, id: &EntryId) -> Result<usize> {
        self.snapshot
            .entries
            .iter()
            .position(|e| &e.id == id)
            .ok_or_else(|| Error::NotFound { id: id.to_string() })
    }
}
