//! Migration engine: upgrades snapshots written under older status models.
//!
//! The application's status model evolved in generations:
//!
//! - **V1** — binary `Open`/`Closed` status plus an `action` label
//! - **V2** — job-type model: `jobType` (`repair`/`standby`/`sale`) plus
//!   an open/closed step
//! - **V3** — current: a single free-form status label classified by the
//!   registry
//!
//! Each generation persisted under its own storage key. On open, the
//! engine loads the current key; when that key is empty it probes the
//! configured legacy keys newest-first, detects the shape of whatever it
//! finds, and applies the ordered migration chain transitively until the
//! data is current. Migration never loses entries and recomputes only
//! the status; id, party, item, quantity, notes and timestamp are
//! preserved verbatim.
//!
//! Re-running migration on already-current data is a no-op: detection
//! keys off shape, not off which key the blob came from.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use opentab_core::{Entry, EntryId, Error, PartyDirectory, Result, Snapshot, Status};

use crate::store::Store;

/// Persisted schema generations, oldest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SchemaVersion {
    /// Binary Open/Closed status + action label
    V1,
    /// Job-type + open/closed step
    V2,
    /// Current status-string model
    V3,
}

/// The schema this build reads and writes.
pub const CURRENT_VERSION: SchemaVersion = SchemaVersion::V3;

/// Storage key configuration: which key is current and which previous
/// keys to probe (newest first) when the current key is empty.
#[derive(Debug, Clone)]
pub struct StorageKeys {
    /// Key the current schema persists under
    pub current: String,
    /// Older keys to probe for migratable data, newest first
    pub legacy: Vec<String>,
}

impl Default for StorageKeys {
    fn default() -> Self {
        StorageKeys {
            current: "opentab_v3".to_string(),
            legacy: vec![
                "pending_jobs_v2".to_string(),
                "simple_pending_v1".to_string(),
            ],
        }
    }
}

// =============================================================================
// Shape detection
// =============================================================================

/// Detect which schema generation a raw snapshot value was written under.
///
/// Entries carrying a `jobType` field are V2; entries carrying an
/// `action` field are V1; anything else (including an empty collection)
/// is treated as current.
pub fn detect_version(value: &Value) -> SchemaVersion {
    if let Some(entries) = value.get("entries").and_then(Value::as_array) {
        for entry in entries {
            if entry.get("jobType").is_some() {
                return SchemaVersion::V2;
            }
            if entry.get("action").is_some() {
                return SchemaVersion::V1;
            }
        }
    }
    SchemaVersion::V3
}

// =============================================================================
// Legacy models
// =============================================================================

fn default_qty() -> u32 {
    1
}

#[derive(Debug, Serialize, Deserialize)]
struct V1Entry {
    #[serde(default)]
    id: String,
    #[serde(default)]
    party: String,
    #[serde(default)]
    item: String,
    #[serde(default = "default_qty")]
    qty: u32,
    #[serde(default)]
    action: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    date: String,
    #[serde(default)]
    notes: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct V1Snapshot {
    #[serde(default)]
    entries: Vec<V1Entry>,
    #[serde(default)]
    parties: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct V2Entry {
    #[serde(default)]
    id: String,
    #[serde(default)]
    party: String,
    #[serde(default)]
    item: String,
    #[serde(default = "default_qty")]
    qty: u32,
    #[serde(rename = "jobType", default)]
    job_type: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    timestamp: i64,
    #[serde(default)]
    notes: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct V2Snapshot {
    #[serde(default)]
    entries: Vec<V2Entry>,
    #[serde(default)]
    parties: Vec<String>,
}

// =============================================================================
// Migration steps
// =============================================================================

type MigrationFn = fn(Value) -> Result<Value>;

/// Ordered migration chain: each step lifts a snapshot one generation.
/// Applied transitively until [`detect_version`] reports current.
const MIGRATIONS: &[(SchemaVersion, MigrationFn)] = &[
    (SchemaVersion::V1, migrate_v1_to_v2),
    (SchemaVersion::V2, migrate_v2_to_v3),
];

fn closed(status: &str) -> bool {
    matches!(status.trim().to_lowercase().as_str(), "closed" | "done")
}

/// V1 -> V2: binary status becomes the open/closed step; the action
/// label maps onto the job type it stood for.
fn migrate_v1_to_v2(value: Value) -> Result<Value> {
    let old: V1Snapshot =
        serde_json::from_value(value).map_err(|e| Error::Corrupt(e.to_string()))?;
    let entries = old
        .entries
        .into_iter()
        .map(|e| {
            let job_type = match e.action.as_str() {
                "Pending" | "Collected" => "repair".to_string(),
                "Given" => "standby".to_string(),
                "Delivered" => "sale".to_string(),
                other => other.to_string(),
            };
            let status = if closed(&e.status) { "closed" } else { "pending" };
            V2Entry {
                id: e.id,
                party: e.party,
                item: e.item,
                qty: e.qty,
                job_type,
                status: status.to_string(),
                timestamp: date_to_millis(&e.date),
                notes: e.notes,
            }
        })
        .collect();
    serde_json::to_value(V2Snapshot {
        entries,
        parties: old.parties,
    })
    .map_err(|e| Error::Corrupt(e.to_string()))
}

/// V2 -> V3: collapse job type + step into a registry status label.
///
/// The mapping encodes real business meaning and is reproduced exactly:
///
/// | Old signal | New status |
/// |---|---|
/// | step closed (any job type) | `Given` |
/// | pending, repair/collected job | `Collected for Repairing` |
/// | pending, standby job | `Standby Given` |
/// | pending, sale/delivery job | `Given` (anomalous pending sale, treat closed) |
/// | job type unrecognized | `Collected` |
fn migrate_v2_to_v3(value: Value) -> Result<Value> {
    let old: V2Snapshot =
        serde_json::from_value(value).map_err(|e| Error::Corrupt(e.to_string()))?;
    let entries: Vec<Entry> = old
        .entries
        .into_iter()
        .map(|e| {
            let status = map_job_status(&e.job_type, &e.status);
            Entry {
                id: if e.id.is_empty() {
                    EntryId::generate()
                } else {
                    EntryId::from(e.id)
                },
                party: e.party,
                item: e.item,
                quantity: e.qty.max(1),
                status,
                notes: e.notes,
                timestamp: e.timestamp,
            }
        })
        .collect();
    let snapshot = Snapshot {
        entries,
        parties: PartyDirectory::from_names(old.parties),
    };
    serde_json::to_value(snapshot).map_err(|e| Error::Corrupt(e.to_string()))
}

fn map_job_status(job_type: &str, step: &str) -> Status {
    if closed(step) {
        return Status::Given;
    }
    match job_type.trim().to_lowercase().as_str() {
        "repair" | "repairing" | "collected" => Status::CollectedForRepairing,
        "standby" => Status::StandbyGiven,
        // A sale still marked pending should have been closed; treat it
        // as closed rather than inventing an open obligation.
        "sale" | "delivery" | "delivered" => Status::Given,
        _ => Status::Collected,
    }
}

fn date_to_millis(date: &str) -> i64 {
    match chrono::NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d") {
        Ok(d) => d
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp_millis())
            .unwrap_or(0),
        Err(_) => {
            if !date.trim().is_empty() {
                warn!(date, "unparsable legacy date, entry sorts last");
            }
            0
        }
    }
}

// =============================================================================
// Driver
// =============================================================================

/// Apply the migration chain until `value` is a current [`Snapshot`].
///
/// Already-current values deserialize directly, so re-running migration
/// on migrated data is a no-op.
pub fn migrate_to_current(mut value: Value) -> Result<Snapshot> {
    loop {
        let version = detect_version(&value);
        if version == CURRENT_VERSION {
            return serde_json::from_value(value).map_err(|e| Error::Corrupt(e.to_string()));
        }
        let step = MIGRATIONS
            .iter()
            .find(|(from, _)| *from == version)
            .map(|(_, f)| f)
            .ok_or_else(|| Error::Corrupt(format!("no migration from {version:?}")))?;
        value = step(value)?;
        info!(from = ?version, "snapshot migrated one schema step");
    }
}

fn parse_and_migrate(blob: &str) -> Result<(Snapshot, bool)> {
    let value: Value = serde_json::from_str(blob).map_err(|e| Error::Corrupt(e.to_string()))?;
    let migrated = detect_version(&value) != CURRENT_VERSION;
    Ok((migrate_to_current(value)?, migrated))
}

/// Load the snapshot for `keys`, migrating legacy data when found.
///
/// Probe order: the current key first, then each legacy key newest
/// first. Corrupt blobs and store read failures are logged and treated
/// as "no data" (the original application behaves the same way); the
/// final fallback is the empty snapshot. The returned flag is `true`
/// when the snapshot should be re-persisted under the current key
/// (i.e. it was migrated or came from a legacy key).
pub fn load_or_migrate(store: &dyn Store, keys: &StorageKeys) -> (Snapshot, bool) {
    match store.load(&keys.current) {
        Ok(Some(blob)) => match parse_and_migrate(&blob) {
            Ok((snapshot, migrated)) => return (snapshot, migrated),
            Err(e) => {
                warn!(key = %keys.current, error = %e, "corrupt snapshot, starting empty");
                return (Snapshot::default(), false);
            }
        },
        Ok(None) => {}
        Err(e) => {
            warn!(key = %keys.current, error = %e, "store unreadable, starting empty");
            return (Snapshot::default(), false);
        }
    }

    for key in &keys.legacy {
        match store.load(key) {
            Ok(Some(blob)) => match parse_and_migrate(&blob) {
                Ok((snapshot, _)) => {
                    info!(key = %key, entries = snapshot.entries.len(), "legacy snapshot migrated");
                    return (snapshot, true);
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "legacy snapshot unreadable, probing older keys");
                }
            },
            Ok(None) => {}
            Err(e) => {
                warn!(key = %key, error = %e, "store error probing legacy key");
            }
        }
    }

    (Snapshot::default(), false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn v2_blob() -> Value {
        json!({
            "entries": [
                {"id": "a1", "party": "ABC Electronics", "item": "Laptop Charger",
                 "qty": 2, "jobType": "repair", "status": "pending",
                 "timestamp": 1_700_000_000_000i64, "notes": "rear port"},
                {"id": "a2", "party": "XYZ Supplies", "item": "Printer Cartridges",
                 "qty": 5, "jobType": "sale", "status": "closed",
                 "timestamp": 1_600_000_000_000i64, "notes": ""},
                {"id": "a3", "party": "Tech Solutions", "item": "Router",
                 "qty": 1, "jobType": "standby", "status": "pending",
                 "timestamp": 1_650_000_000_000i64, "notes": ""},
                {"id": "a4", "party": "Office Depot", "item": "Toner",
                 "qty": 1, "jobType": "sale", "status": "pending",
                 "timestamp": 1_660_000_000_000i64, "notes": ""},
                {"id": "a5", "party": "Acme", "item": "Cable",
                 "qty": 1, "jobType": "misc", "status": "pending",
                 "timestamp": 1_670_000_000_000i64, "notes": ""}
            ],
            "parties": ["XYZ Supplies", "ABC Electronics", "ABC Electronics"]
        })
    }

    #[test]
    fn test_detect_version() {
        assert_eq!(detect_version(&v2_blob()), SchemaVersion::V2);
        let v1 = json!({"entries": [{"id": "x", "action": "Pending", "status": "Open"}]});
        assert_eq!(detect_version(&v1), SchemaVersion::V1);
        let v3 = serde_json::to_value(Snapshot::seeded()).unwrap();
        assert_eq!(detect_version(&v3), SchemaVersion::V3);
        assert_eq!(detect_version(&json!({"entries": []})), SchemaVersion::V3);
    }

    #[test]
    fn test_v2_mapping_table() {
        let snapshot = migrate_to_current(v2_blob()).unwrap();
        let status_of = |id: &str| {
            snapshot
                .entry(&EntryId::from(id))
                .unwrap()
                .status
                .clone()
        };
        assert_eq!(status_of("a1"), Status::CollectedForRepairing);
        assert_eq!(status_of("a2"), Status::Given); // closed, any job type
        assert_eq!(status_of("a3"), Status::StandbyGiven);
        assert_eq!(status_of("a4"), Status::Given); // anomalous pending sale
        assert_eq!(status_of("a5"), Status::Collected); // unrecognized job
    }

    #[test]
    fn test_migration_preserves_fields_verbatim() {
        let snapshot = migrate_to_current(v2_blob()).unwrap();
        assert_eq!(snapshot.entries.len(), 5);
        let e = snapshot.entry(&EntryId::from("a1")).unwrap();
        assert_eq!(e.party, "ABC Electronics");
        assert_eq!(e.item, "Laptop Charger");
        assert_eq!(e.quantity, 2);
        assert_eq!(e.notes, "rear port");
        assert_eq!(e.timestamp, 1_700_000_000_000);
        // Parties re-deduplicated and sorted.
        assert_eq!(
            snapshot.parties.names(),
            ["ABC Electronics", "XYZ Supplies"]
        );
    }

    #[test]
    fn test_v1_chain_reaches_current() {
        let v1 = json!({
            "entries": [
                {"id": "b1", "party": "P", "item": "I", "qty": 3,
                 "action": "Pending", "status": "Open",
                 "date": "2024-03-05", "notes": "n"},
                {"id": "b2", "party": "P", "item": "J", "qty": 1,
                 "action": "Delivered", "status": "Closed",
                 "date": "bogus", "notes": ""}
            ],
            "parties": ["P"]
        });
        let snapshot = migrate_to_current(v1).unwrap();
        let b1 = snapshot.entry(&EntryId::from("b1")).unwrap();
        assert_eq!(b1.status, Status::CollectedForRepairing);
        assert_eq!(b1.quantity, 3);
        assert_eq!(
            b1.date().to_string(),
            "2024-03-05",
            "v1 date carried into the timestamp"
        );
        let b2 = snapshot.entry(&EntryId::from("b2")).unwrap();
        assert_eq!(b2.status, Status::Given);
        assert_eq!(b2.timestamp, 0, "unparsable legacy date sorts last");
    }

    #[test]
    fn test_migration_is_idempotent() {
        let once = migrate_to_current(v2_blob()).unwrap();
        let twice =
            migrate_to_current(serde_json::to_value(&once).unwrap()).unwrap();
        assert_eq!(once, twice);

        // Already-current data passes through unchanged.
        let current = Snapshot::seeded();
        let back = migrate_to_current(serde_json::to_value(&current).unwrap()).unwrap();
        assert_eq!(back, current);
    }

    #[test]
    fn test_load_probes_legacy_keys_in_order() {
        let store = MemoryStore::new();
        let keys = StorageKeys::default();
        store.preload(
            "simple_pending_v1",
            &json!({
                "entries": [{"id": "c1", "party": "P", "item": "I", "qty": 1,
                             "action": "Collected", "status": "Open",
                             "date": "2023-01-01", "notes": ""}],
                "parties": ["P"]
            })
            .to_string(),
        );

        let (snapshot, migrated) = load_or_migrate(&store, &keys);
        assert!(migrated);
        assert_eq!(snapshot.entries.len(), 1);
        assert_eq!(
            snapshot.entries[0].status,
            Status::CollectedForRepairing
        );
    }

    #[test]
    fn test_corrupt_blob_falls_back_to_empty() {
        let store = MemoryStore::new();
        let keys = StorageKeys::default();
        store.preload(&keys.current, "{not json");
        let (snapshot, migrated) = load_or_migrate(&store, &keys);
        assert_eq!(snapshot, Snapshot::default());
        assert!(!migrated);
    }

    #[test]
    fn test_current_key_wins_over_legacy() {
        let store = MemoryStore::new();
        let keys = StorageKeys::default();
        store.preload(
            &keys.current,
            &serde_json::to_string(&Snapshot::seeded()).unwrap(),
        );
        store.preload("simple_pending_v1", "{}");
        let (snapshot, migrated) = load_or_migrate(&store, &keys);
        assert_eq!(snapshot.entries.len(), 2);
        assert!(!migrated);
    }
}
