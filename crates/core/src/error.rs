//! Unified error types for opentab.
//!
//! This is the canonical error type for all opentab operations. Every
//! recognized failure degrades to a no-op plus caller-visible feedback;
//! nothing in this taxonomy is fatal to the process.

use thiserror::Error;

/// All opentab errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Bad user input. The operation is aborted with no state change.
    #[error("invalid {field}: {reason}")]
    Validation {
        /// Name of the offending field
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// Operation targeted an entry id that is not in the collection.
    ///
    /// Callers are free to treat this as "already satisfied" (the entry
    /// may have been removed by an earlier operation).
    #[error("entry not found: {id}")]
    NotFound {
        /// The missing entry id
        id: String,
    },

    /// A status transition was requested that the registry does not define,
    /// e.g. advancing an entry whose status has no follow-up.
    #[error("no transition from status '{status}' for entry {id}")]
    InvalidTransition {
        /// The targeted entry id
        id: String,
        /// The entry's current status label
        status: String,
    },

    /// Persistence failed. In-memory state is retained so the caller can
    /// retry the save; the session continues un-persisted.
    #[error("store error: {0}")]
    Store(String),

    /// Persisted data could not be interpreted under any known schema.
    ///
    /// Load paths map this to the empty-snapshot fallback; it is never
    /// surfaced as a startup failure.
    #[error("corrupt snapshot: {0}")]
    Corrupt(String),
}

impl Error {
    /// Shorthand for a missing-required-field validation error.
    pub fn required(field: &'static str) -> Self {
        Error::Validation {
            field,
            reason: "required".to_string(),
        }
    }
}

/// Result type alias using the opentab [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let e = Error::required("party");
        assert_eq!(e.to_string(), "invalid party: required");

        let e = Error::NotFound {
            id: "abc123".to_string(),
        };
        assert_eq!(e.to_string(), "entry not found: abc123");

        let e = Error::InvalidTransition {
            id: "abc123".to_string(),
            status: "Given".to_string(),
        };
        assert!(e.to_string().contains("Given"));
    }
}
