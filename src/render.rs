//! Renderer port: turning an ordered entry view into display output.
//!
//! Renderers are external collaborators: they consume [`EntryView`]
//! rows (entry fields plus registry display metadata) and never mutate
//! core state. Mutation requests flow back through
//! [`OpenTab`](crate::OpenTab) operations identified by entry id.
//!
//! [`TextRenderer`] is the built-in plain-text table implementation.

use opentab_core::{Entry, EntryId, Phase};

/// One row handed to a renderer: borrowed entry fields plus the
/// registry's classification for the entry's status.
#[derive(Debug, Clone)]
pub struct EntryView<'a> {
    /// Entry id, for wiring row actions back to the engine
    pub id: &'a EntryId,
    /// Display date (UTC calendar date of the timestamp)
    pub date: chrono::NaiveDate,
    /// Counterparty name
    pub party: &'a str,
    /// Item description
    pub item: &'a str,
    /// Item count
    pub quantity: u32,
    /// Status label as stored
    pub status: &'a str,
    /// Derived lifecycle phase
    pub phase: Phase,
    /// Registry display hint for the status
    pub hint: &'static str,
    /// Free-text notes (may be empty)
    pub notes: &'a str,
    /// Whether the registry defines a follow-up, i.e. whether a UI
    /// should offer the "mark done" action for this row
    pub can_advance: bool,
}

impl<'a> From<&'a Entry> for EntryView<'a> {
    fn from(entry: &'a Entry) -> Self {
        let info = entry.status.info();
        EntryView {
            id: &entry.id,
            date: entry.date(),
            party: &entry.party,
            item: &entry.item,
            quantity: entry.quantity,
            status: entry.status.label(),
            phase: info.phase,
            hint: info.display_hint,
            notes: &entry.notes,
            can_advance: info.follow_up.is_some(),
        }
    }
}

/// Display surface for a filtered, ordered view.
pub trait Renderer {
    /// Render the rows. Must not assume any particular ordering beyond
    /// what the query already applied.
    fn render(&self, rows: &[EntryView<'_>]) -> String;
}

/// Plain-text table renderer.
pub struct TextRenderer;

impl Renderer for TextRenderer {
    fn render(&self, rows: &[EntryView<'_>]) -> String {
        if rows.is_empty() {
            return "no matching entries\n".to_string();
        }

        let party_w = column_width("party", rows.iter().map(|r| r.party));
        let item_w = column_width("item", rows.iter().map(|r| r.item));
        let status_w = column_width("status", rows.iter().map(|r| r.status));

        let mut out = String::new();
        out.push_str(&format!(
            "{:10}  {:party_w$}  {:item_w$}  {:>3}  {:status_w$}  {:7}  notes\n",
            "date", "party", "item", "qty", "status", "phase"
        ));
        for row in rows {
            out.push_str(&format!(
                "{:10}  {:party_w$}  {:item_w$}  {:>3}  {:status_w$}  {:7}  {}\n",
                row.date.to_string(),
                row.party,
                row.item,
                row.quantity,
                row.status,
                row.phase.to_string(),
                if row.notes.is_empty() { "-" } else { row.notes },
            ));
        }
        out
    }
}

fn column_width<'a>(header: &str, values: impl Iterator<Item = &'a str>) -> usize {
    values.map(str::len).chain([header.len()]).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentab_core::Status;

    fn entry(party: &str, item: &str, status: Status) -> Entry {
        Entry {
            id: EntryId::generate(),
            party: party.to_string(),
            item: item.to_string(),
            quantity: 1,
            status,
            notes: String::new(),
            timestamp: 1_709_596_800_000,
        }
    }

    #[test]
    fn test_view_carries_registry_metadata() {
        let e = entry("ABC", "Charger", Status::StandbyGiven);
        let view = EntryView::from(&e);
        assert_eq!(view.phase, Phase::Pending);
        assert!(view.can_advance);

        let e = entry("ABC", "Charger", Status::Given);
        let view = EntryView::from(&e);
        assert_eq!(view.phase, Phase::Closed);
        assert!(!view.can_advance);
    }

    #[test]
    fn test_text_renderer_aligns_columns() {
        let a = entry("ABC Electronics", "Charger", Status::Collected);
        let b = entry("Z", "Printer Cartridges", Status::Given);
        let rows = vec![EntryView::from(&a), EntryView::from(&b)];
        let out = TextRenderer.render(&rows);

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("date"));
        assert!(lines[1].contains("ABC Electronics"));
        assert!(lines[2].contains("Printer Cartridges"));
    }

    #[test]
    fn test_empty_view() {
        assert_eq!(TextRenderer.render(&[]), "no matching entries\n");
    }
}
