//! # opentab
//!
//! Embedded tracker for pending transactions with external parties.
//!
//! An entry records that an item was collected from or given to a party
//! and stays open until the matching reciprocal action closes it. The
//! status registry decides, for every status label, which lifecycle
//! phase an entry is in and which follow-up resolves it; snapshots
//! written by older versions of the application are migrated on open.
//!
//! ## Quick Start
//!
//! ```
//! use opentab::prelude::*;
//!
//! # fn main() -> opentab::Result<()> {
//! let mut tab = OpenTab::ephemeral();
//!
//! // Track a repair pickup.
//! let id = tab.create(EntryDraft::new(
//!     "ABC Electronics",
//!     "Laptop Charger",
//!     Status::CollectedForRepairing,
//! ))?;
//!
//! // Everything still open:
//! let pending = tab.entries(&Query::new().phase(PhaseFilter::Pending));
//! assert_eq!(pending.len(), 1);
//!
//! // The charger went back; the paired follow-up closes the entry.
//! tab.mark_done(&id)?;
//! assert!(tab.entries(&Query::new().phase(PhaseFilter::Pending)).is_empty());
//! # Ok(())
//! # }
//! ```
//!
//! ## Design
//!
//! - **Single writer** — one [`OpenTab`] owns the live snapshot; every
//!   mutation is read-modify-write-persist against the whole snapshot.
//! - **Derived phase** — `pending`/`closed` is computed from the stored
//!   status label through the registry, never stored itself.
//! - **Open-world statuses** — unrecognized labels survive verbatim and
//!   classify as pending.
//! - **Ports at the seams** — persistence ([`Store`]), confirmation
//!   ([`ConfirmPort`]) and display ([`Renderer`]) are traits the
//!   embedding application implements; in-memory, file-backed and
//!   plain-text implementations ship in the box.

#![warn(missing_docs)]

mod export;
mod render;
mod tab;

pub mod prelude;

// Main entry points
pub use tab::{OpenTab, OpenTabBuilder};

// Core model
pub use opentab_core::{
    Entry, EntryDraft, EntryId, Error, PartyDirectory, Phase, Result, Snapshot, Status, StatusInfo,
};

// Engine surfaces
pub use opentab_engine::{
    AlwaysConfirm, ConfirmPort, FileStore, MemoryStore, NeverConfirm, PhaseFilter, Query,
    SchemaVersion, SortOrder, StorageKeys, Store,
};

// Presentation
pub use export::to_csv;
pub use render::{EntryView, Renderer, TextRenderer};
