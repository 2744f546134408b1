//! CSV export of a filtered view.
//!
//! One row per entry: `date, party, item, quantity, status, phase,
//! notes`. Quoting of fields containing the delimiter is handled by the
//! writer. The sequence is exported as given; filter and order it with
//! a [`Query`](opentab_engine::Query) first.

use opentab_core::{Entry, Error, Result};

const HEADER: [&str; 7] = ["date", "party", "item", "quantity", "status", "phase", "notes"];

/// Serialize entries to delimited text.
pub fn to_csv<'a, I>(entries: I) -> Result<String>
where
    I: IntoIterator<Item = &'a Entry>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(HEADER)
        .map_err(|e| Error::Store(format!("csv export: {e}")))?;
    for entry in entries {
        writer
            .write_record([
                entry.date().to_string(),
                entry.party.clone(),
                entry.item.clone(),
                entry.quantity.to_string(),
                entry.status.label().to_string(),
                entry.phase().to_string(),
                entry.notes.clone(),
            ])
            .map_err(|e| Error::Store(format!("csv export: {e}")))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Store(format!("csv export: {e}")))?;
    String::from_utf8(bytes).map_err(|e| Error::Store(format!("csv export: {e}")))
}
