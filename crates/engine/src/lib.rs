//! Engines for opentab: storage, migration, lifecycle and queries.
//!
//! This crate hosts everything with decision logic:
//!
//! - [`store`]: the persistence port and its in-memory and file-backed
//!   implementations
//! - [`migration`]: shape detection and the ordered chain that lifts
//!   old-model snapshots to the current status model
//! - [`lifecycle`]: the [`Tracker`] single-writer state container and
//!   its confirmation-gated transitions
//! - [`query`]: the filtered, ordered view of the collection
//!
//! The public entry point most consumers want is the `opentab` facade
//! crate, which wraps a [`Tracker`] with export and rendering plumbing.

#![warn(missing_docs)]

pub mod lifecycle;
pub mod migration;
pub mod query;
pub mod store;

pub use lifecycle::{AlwaysConfirm, ConfirmPort, NeverConfirm, Tracker};
pub use migration::{
    detect_version, load_or_migrate, migrate_to_current, SchemaVersion, StorageKeys,
    CURRENT_VERSION,
};
pub use query::{PhaseFilter, Query, SortOrder};
pub use store::{FileStore, MemoryStore, Store};
