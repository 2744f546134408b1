//! End-to-end tests through the public `OpenTab` facade, backed by a
//! real file store in a temp directory.

use std::fs;

use opentab::prelude::*;
use opentab::{PhaseFilter, SortOrder};

fn draft(party: &str, item: &str, status: Status) -> EntryDraft {
    EntryDraft::new(party, item, status)
}

#[test]
fn round_trip_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();

    let mut tab = OpenTab::open(dir.path()).unwrap();
    tab.create(draft("ABC Electronics", "Laptop Charger", Status::Collected).quantity("2"))
        .unwrap();
    tab.create(draft("XYZ Supplies", "Cartridges", Status::Given))
        .unwrap();

    let blob_path = dir.path().join("opentab_v3.json");
    let first = fs::read(&blob_path).unwrap();

    // Reopen and re-save: load(save(x)) twice must persist identically.
    let mut tab = OpenTab::open(dir.path()).unwrap();
    tab.flush().unwrap();
    let second = fs::read(&blob_path).unwrap();
    assert_eq!(first, second);

    let mut tab = OpenTab::open(dir.path()).unwrap();
    tab.flush().unwrap();
    let third = fs::read(&blob_path).unwrap();
    assert_eq!(first, third);
}

#[test]
fn legacy_snapshot_is_migrated_on_open() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("simple_pending_v1.json"),
        serde_json::json!({
            "entries": [
                {"id": "old1", "party": "ABC Electronics", "item": "Laptop Charger",
                 "qty": 2, "action": "Pending", "status": "Open",
                 "date": "2024-03-05", "notes": "Awaiting repair confirmation"},
                {"id": "old2", "party": "XYZ Supplies", "item": "Printer Cartridges",
                 "qty": 5, "action": "Delivered", "status": "Closed",
                 "date": "2024-03-04", "notes": ""}
            ],
            "parties": ["ABC Electronics", "XYZ Supplies"]
        })
        .to_string(),
    )
    .unwrap();

    let tab = OpenTab::open(dir.path()).unwrap();

    let all = tab.entries(&Query::new());
    assert_eq!(all.len(), 2);

    let pending = tab.entries(&Query::new().phase(PhaseFilter::Pending));
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, EntryId::from("old1"));
    assert_eq!(pending[0].status, Status::CollectedForRepairing);
    assert_eq!(pending[0].quantity, 2);

    // The migrated snapshot lands under the current key right away.
    assert!(dir.path().join("opentab_v3.json").exists());

    // Reopening reads the current key; the view is unchanged.
    let tab = OpenTab::open(dir.path()).unwrap();
    assert_eq!(tab.entries(&Query::new()).len(), 2);
    assert_eq!(tab.parties(), ["ABC Electronics", "XYZ Supplies"]);
}

#[test]
fn corrupt_data_starts_empty_without_failing() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("opentab_v3.json"), "{definitely not json").unwrap();

    let tab = OpenTab::open(dir.path()).unwrap();
    assert!(tab.entries(&Query::new()).is_empty());
}

#[test]
fn delete_is_permanent_across_reopen() {
    let dir = tempfile::tempdir().unwrap();

    let mut tab = OpenTab::open(dir.path()).unwrap();
    let keep = tab.create(draft("A", "keep", Status::Collected)).unwrap();
    let gone = tab.create(draft("B", "gone", Status::Collected)).unwrap();

    assert!(tab.delete(&gone).unwrap());
    assert!(matches!(tab.delete(&gone), Err(Error::NotFound { .. })));

    let tab = OpenTab::open(dir.path()).unwrap();
    let all = tab.entries(&Query::new());
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, keep);
}

#[test]
fn advance_then_filter_then_export() {
    let mut tab = OpenTab::ephemeral();
    let id = tab
        .create(
            draft("ABC Electronics", "Laptop Charger", Status::CollectedForRepairing)
                .quantity("2")
                .notes("rear port"),
        )
        .unwrap();
    tab.create(draft("Tech Solutions", "Router", Status::StandbyGiven))
        .unwrap();

    assert!(tab.mark_done(&id).unwrap());

    let closed = tab.entries(&Query::new().phase(PhaseFilter::Closed));
    assert_eq!(closed.len(), 1);
    assert_eq!(closed[0].status, Status::Given);

    let csv = tab
        .export_csv(&Query::new().phase(PhaseFilter::Closed))
        .unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next().unwrap(),
        "date,party,item,quantity,status,phase,notes"
    );
    let row = lines.next().unwrap();
    assert!(row.contains("ABC Electronics"));
    assert!(row.contains("Given"));
    assert!(row.contains("closed"));
    assert_eq!(lines.next(), None);
}

#[test]
fn search_narrows_across_phases() {
    let mut tab = OpenTab::ephemeral();
    tab.create(draft("ABC Electronics", "Charger", Status::Given))
        .unwrap();
    tab.create(draft("XYZ Supplies", "Cartridges", Status::Collected))
        .unwrap();

    let hits = tab.entries(&Query::new().search("abc"));
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].party, "ABC Electronics");
}

#[test]
fn edit_resurfaces_entry_in_recency_order() {
    let mut tab = OpenTab::ephemeral();
    let first = tab.create(draft("A", "first", Status::Collected)).unwrap();
    let second = tab.create(draft("B", "second", Status::Collected)).unwrap();

    let newest = tab.entries(&Query::new());
    assert_eq!(newest[0].id, second);

    // Ensure the edit lands on a strictly later millisecond.
    std::thread::sleep(std::time::Duration::from_millis(2));
    tab.edit(&first, draft("A", "first, edited", Status::Collected))
        .unwrap();

    let newest = tab.entries(&Query::new());
    assert_eq!(newest[0].id, first, "edited entry bumps to the top");

    let oldest = tab.entries(&Query::new().order(SortOrder::OldestFirst));
    assert_eq!(oldest.last().unwrap().id, first);
}

#[test]
fn declined_confirmation_leaves_everything_untouched() {
    struct Decline;
    impl ConfirmPort for Decline {
        fn confirm(&self, _prompt: &str) -> bool {
            false
        }
    }

    let mut tab = OpenTab::builder().confirm(Box::new(Decline)).build();
    let id = tab.create(draft("A", "item", Status::Collected)).unwrap();

    assert!(!tab.mark_done(&id).unwrap());
    assert!(!tab.close(&id).unwrap());
    assert!(!tab.delete(&id).unwrap());

    let all = tab.entries(&Query::new());
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].status, Status::Collected);
}

#[test]
fn rendered_table_marks_advance_availability() {
    let mut tab = OpenTab::ephemeral();
    tab.create(draft("ABC", "Charger", Status::StandbyGiven))
        .unwrap();

    let views = tab.views(&Query::new());
    assert_eq!(views.len(), 1);
    assert!(views[0].can_advance);

    let out = tab.render(&TextRenderer, &Query::new());
    assert!(out.contains("Standby Given"));
    assert!(out.contains("pending"));
}
