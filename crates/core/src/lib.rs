//! Core types for opentab.
//!
//! This crate holds the leaf building blocks shared by every other
//! opentab crate:
//!
//! - [`status`]: the status registry mapping labels to lifecycle phase,
//!   follow-up action and display metadata
//! - [`types`]: the [`Entry`] record, its identity and validation rules,
//!   and the persisted [`Snapshot`]
//! - [`error`]: the unified error taxonomy
//!
//! Nothing here performs IO; persistence and lifecycle logic live in
//! `opentab-engine`.

#![warn(missing_docs)]

pub mod error;
pub mod status;
pub mod types;

pub use error::{Error, Result};
pub use status::{Phase, Status, StatusInfo};
pub use types::{now_millis, Entry, EntryDraft, EntryId, PartyDirectory, Snapshot};
