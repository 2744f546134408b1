//! Query engine: the filtered, ordered view of the entry collection.
//!
//! Queries are pure: they borrow the collection, derive each entry's
//! phase through the status registry (never a stored field, so views
//! stay correct when the registry changes), and are recomputed fully on
//! every call. Collections are single-user local data, so there is no
//! incremental machinery.

use opentab_core::{Entry, Phase};

/// Phase bucket a query selects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PhaseFilter {
    /// Every entry, whatever its phase
    #[default]
    All,
    /// Entries whose derived phase is pending
    Pending,
    /// Entries whose derived phase is closed
    Closed,
}

impl PhaseFilter {
    fn matches(self, phase: Phase) -> bool {
        match self {
            PhaseFilter::All => true,
            PhaseFilter::Pending => phase == Phase::Pending,
            PhaseFilter::Closed => phase == Phase::Closed,
        }
    }
}

/// Recency ordering of query results.
///
/// Newest-first is the unified default; oldest-first exists for
/// pending views framed by urgency (the longest-open obligation on
/// top). Both are configuration, not hard-coded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Most recent timestamp first
    #[default]
    NewestFirst,
    /// Oldest timestamp first
    OldestFirst,
}

/// A filter over the entry collection.
///
/// Text search is a case-insensitive substring match against party,
/// item and notes together; the empty term matches everything.
#[derive(Debug, Clone, Default)]
pub struct Query {
    /// Phase bucket to select
    pub phase: PhaseFilter,
    /// Free-text search term
    pub search: String,
    /// Result ordering
    pub order: SortOrder,
}

impl Query {
    /// The default query: all phases, no search, newest first.
    pub fn new() -> Query {
        Query::default()
    }

    /// Select a phase bucket.
    pub fn phase(mut self, phase: PhaseFilter) -> Query {
        self.phase = phase;
        self
    }

    /// Set the search term.
    pub fn search(mut self, term: &str) -> Query {
        self.search = term.to_string();
        self
    }

    /// Set the result ordering.
    pub fn order(mut self, order: SortOrder) -> Query {
        self.order = order;
        self
    }

    /// Run the query, producing the ordered matching entries.
    ///
    /// The sort is stable, so entries with equal timestamps keep their
    /// stored (insertion) order.
    pub fn run<'a>(&self, entries: &'a [Entry]) -> Vec<&'a Entry> {
        let term = self.search.trim().to_lowercase();
        let mut matches: Vec<&Entry> = entries
            .iter()
            .filter(|e| self.phase.matches(e.phase()))
            .filter(|e| {
                if term.is_empty() {
                    return true;
                }
                let haystack =
                    format!("{} {} {}", e.party, e.item, e.notes).to_lowercase();
                haystack.contains(&term)
            })
            .collect();
        match self.order {
            SortOrder::NewestFirst => matches.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
            SortOrder::OldestFirst => matches.sort_by(|a, b| a.timestamp.cmp(&b.timestamp)),
        }
        matches
    }
}
