//! Entry model: the tracked record, its identity rules and field invariants.
//!
//! An [`Entry`] is one tracked transaction with an external party. Entries
//! are built from an [`EntryDraft`] (raw submitted fields) through the
//! normalization rules in [`Entry::from_draft`], and live inside a
//! [`Snapshot`], the unit that is persisted atomically as a whole.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::status::{Phase, Status};

const ID_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 9;

/// Current time as milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Opaque unique identifier for an [`Entry`].
///
/// Assigned at creation and immutable; never reused or reassigned on
/// edit. Generated ids are a base36 millisecond timestamp prefix plus a
/// random alphanumeric suffix: collision-resistant across a single
/// user's lifetime of entries, not cryptographic.
///
/// Ids read from older snapshots are accepted verbatim, whatever their
/// shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    /// Generate a fresh id.
    pub fn generate() -> Self {
        Self::from_parts(now_millis(), &mut rand::thread_rng())
    }

    fn from_parts(millis: i64, rng: &mut impl Rng) -> Self {
        let mut id = base36(millis.max(0) as u64);
        for _ in 0..ID_SUFFIX_LEN {
            id.push(ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char);
        }
        EntryId(id)
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for EntryId {
    fn from(s: String) -> Self {
        EntryId(s)
    }
}

impl From<&str> for EntryId {
    fn from(s: &str) -> Self {
        EntryId(s.to_string())
    }
}

fn base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(ID_ALPHABET[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    digits.into_iter().map(char::from).collect()
}

/// One tracked transaction with an external party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Unique id, immutable for the life of the entry
    pub id: EntryId,
    /// Counterparty name; trimmed, non-empty
    pub party: String,
    /// What was exchanged; trimmed, non-empty
    pub item: String,
    /// Positive count of items
    pub quantity: u32,
    /// Status label driving phase and follow-up via the registry
    pub status: Status,
    /// Optional free text (empty string when absent)
    #[serde(default)]
    pub notes: String,
    /// Milliseconds since epoch; set at creation, bumped on edit
    pub timestamp: i64,
}

/// Raw submitted fields for creating or editing an [`Entry`].
///
/// `quantity` is the raw text as typed; parsing happens during
/// validation. `status` comes from a controlled selection, so it is a
/// [`Status`] already, but it must be present.
#[derive(Debug, Clone, Default)]
pub struct EntryDraft {
    /// Counterparty name as typed
    pub party: String,
    /// Item description as typed
    pub item: String,
    /// Quantity as typed; unparsable or non-positive falls back to 1
    pub quantity: String,
    /// Chosen status label
    pub status: Option<Status>,
    /// Free-text notes as typed
    pub notes: String,
}

impl EntryDraft {
    /// Convenience constructor for the required fields.
    pub fn new(party: &str, item: &str, status: Status) -> Self {
        EntryDraft {
            party: party.to_string(),
            item: item.to_string(),
            quantity: String::new(),
            status: Some(status),
            notes: String::new(),
        }
    }

    /// Set the raw quantity text.
    pub fn quantity(mut self, raw: &str) -> Self {
        self.quantity = raw.to_string();
        self
    }

    /// Set the notes text.
    pub fn notes(mut self, notes: &str) -> Self {
        self.notes = notes.to_string();
        self
    }
}

/// Validated field set shared by create and edit.
struct Fields {
    party: String,
    item: String,
    quantity: u32,
    status: Status,
    notes: String,
}

impl Fields {
    fn validate(draft: EntryDraft) -> Result<Fields> {
        let party = draft.party.trim().to_string();
        if party.is_empty() {
            return Err(Error::required("party"));
        }
        let item = draft.item.trim().to_string();
        if item.is_empty() {
            return Err(Error::required("item"));
        }
        let status = draft.status.ok_or_else(|| Error::required("status"))?;

        // Tolerant quantity policy: unparsable or non-positive input
        // silently becomes 1.
        let quantity = match draft.quantity.trim().parse::<i64>() {
            Ok(n) if n > 0 => n.min(u32::MAX as i64) as u32,
            _ => 1,
        };

        Ok(Fields {
            party,
            item,
            quantity,
            status,
            notes: draft.notes.trim().to_string(),
        })
    }
}

impl Entry {
    /// Build a new entry from raw submitted fields.
    ///
    /// Normalization rules: `party`/`item`/`notes` are trimmed; `party`
    /// and `item` must be non-empty after the trim; `status` must be
    /// present; quantity falls back to 1 when unparsable or
    /// non-positive. A fresh id and the current timestamp are assigned.
    pub fn from_draft(draft: EntryDraft) -> Result<Entry> {
        let fields = Fields::validate(draft)?;
        Ok(Entry {
            id: EntryId::generate(),
            party: fields.party,
            item: fields.item,
            quantity: fields.quantity,
            status: fields.status,
            notes: fields.notes,
            timestamp: now_millis(),
        })
    }

    /// Replace all mutable fields from a draft, preserving the id.
    ///
    /// Validation is identical to [`Entry::from_draft`]; on failure the
    /// entry is left untouched. The timestamp is bumped so edited
    /// entries resurface at the top of recency ordering.
    pub fn apply_draft(&mut self, draft: EntryDraft) -> Result<()> {
        let fields = Fields::validate(draft)?;
        self.party = fields.party;
        self.item = fields.item;
        self.quantity = fields.quantity;
        self.status = fields.status;
        self.notes = fields.notes;
        self.timestamp = now_millis();
        Ok(())
    }

    /// Derived lifecycle phase of this entry.
    pub fn phase(&self) -> Phase {
        self.status.phase()
    }

    /// Calendar date of the entry's timestamp (UTC), for display.
    pub fn date(&self) -> chrono::NaiveDate {
        chrono::DateTime::from_timestamp_millis(self.timestamp)
            .unwrap_or_default()
            .date_naive()
    }
}

/// Set of previously seen party names, used for input suggestion.
///
/// Grows monotonically (append on first use), never shrinks
/// automatically, and is kept sorted for presentation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartyDirectory(Vec<String>);

impl PartyDirectory {
    /// Build a directory from arbitrary names, deduplicated and sorted.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names
            .into_iter()
            .map(|s| s.into().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        names.sort();
        names.dedup();
        PartyDirectory(names)
    }

    /// Record a party name if it has not been seen before.
    ///
    /// Returns `true` if the name was new.
    pub fn learn(&mut self, name: &str) -> bool {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return false;
        }
        match self.0.binary_search_by(|p| p.as_str().cmp(trimmed)) {
            Ok(_) => false,
            Err(pos) => {
                self.0.insert(pos, trimmed.to_string());
                true
            }
        }
    }

    /// All known names, sorted.
    pub fn names(&self) -> &[String] {
        &self.0
    }

    /// Whether the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of known names.
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// The persisted unit: the full entry collection plus the party
/// directory. Read and rewritten atomically as a whole on every
/// mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// All tracked entries, newest first by convention
    pub entries: Vec<Entry>,
    /// Previously seen party names
    pub parties: PartyDirectory,
}

impl Snapshot {
    /// Look up an entry by id.
    pub fn entry(&self, id: &EntryId) -> Option<&Entry> {
        self.entries.iter().find(|e| &e.id == id)
    }

    /// Example rows for a first run, mirroring the seed data the
    /// original deployments shipped with.
    pub fn seeded() -> Snapshot {
        let now = now_millis();
        let yesterday = now - 86_400_000;
        let entries = vec![
            Entry {
                id: EntryId::generate(),
                party: "ABC Electronics".to_string(),
                item: "Laptop Charger".to_string(),
                quantity: 2,
                status: Status::CollectedForRepairing,
                notes: "Awaiting repair confirmation".to_string(),
                timestamp: now,
            },
            Entry {
                id: EntryId::generate(),
                party: "XYZ Supplies".to_string(),
                item: "Printer Cartridges".to_string(),
                quantity: 5,
                status: Status::Given,
                notes: "Bulk order received".to_string(),
                timestamp: yesterday,
            },
        ];
        let parties = PartyDirectory::from_names(entries.iter().map(|e| e.party.clone()));
        Snapshot { entries, parties }
    }
}
