//! Convenient imports for opentab.
//!
//! Re-exports the most commonly used types so you can get started with
//! a single import:
//!
//! ```
//! use opentab::prelude::*;
//!
//! let tab = OpenTab::ephemeral();
//! assert!(tab.entries(&Query::new()).is_empty());
//! ```

// Main entry point
pub use crate::tab::{OpenTab, OpenTabBuilder};

// Error handling
pub use opentab_core::{Error, Result};

// Entry model
pub use opentab_core::{Entry, EntryDraft, EntryId, Phase, Snapshot, Status};

// Queries
pub use opentab_engine::{PhaseFilter, Query, SortOrder};

// Ports
pub use opentab_engine::{ConfirmPort, Store};
pub use crate::render::{EntryView, Renderer, TextRenderer};
