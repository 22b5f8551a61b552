use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row};
use tracing::{debug, info};

use crate::db::in_transaction;
use crate::error::{Result, StashError};
use crate::models::{EntryKind, LedgerEntry, NewEntry, DEFAULT_CATEGORY};

/// Read-only view of the income and expense history.
pub trait LedgerQuery {
    /// Entries of `kind` dated within `[start, end]`, ordered by date then
    /// category. A `category` restricts the result to that label.
    fn query_range(
        &self,
        kind: EntryKind,
        start: NaiveDate,
        end: NaiveDate,
        category: Option<&str>,
    ) -> Result<Vec<LedgerEntry>>;
}

/// Store handle over the income and expenses tables.
pub struct Ledger<'a> {
    conn: &'a Connection,
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<LedgerEntry> {
    Ok(LedgerEntry {
        id: row.get(0)?,
        date: row.get(1)?,
        amount: row.get(2)?,
        category: row.get(3)?,
        description: row.get(4)?,
    })
}

impl<'a> Ledger<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert every entry in one transaction and return them with their
    /// assigned identities, in input order.
    pub fn insert_entries(&self, kind: EntryKind, entries: Vec<NewEntry>) -> Result<Vec<LedgerEntry>> {
        let stored = in_transaction(self.conn, |conn| {
            let mut stmt = conn.prepare(&format!(
                "INSERT INTO {} (date, amount, category, description) VALUES (?1, ?2, ?3, ?4)",
                kind.table()
            ))?;
            let mut stored = Vec::with_capacity(entries.len());
            for entry in entries {
                let id = stmt.insert(rusqlite::params![
                    entry.date,
                    entry.amount,
                    entry.category,
                    entry.description
                ])?;
                stored.push(LedgerEntry::from_new(id, entry));
            }
            Ok(stored)
        })?;
        info!(table = kind.table(), count = stored.len(), "inserted entries");
        Ok(stored)
    }

    pub fn insert_entry(&self, kind: EntryKind, entry: NewEntry) -> Result<LedgerEntry> {
        let mut stored = self.insert_entries(kind, vec![entry])?;
        stored
            .pop()
            .ok_or_else(|| StashError::Validation("nothing was inserted".into()))
    }

    pub fn get_entry(&self, kind: EntryKind, id: i64) -> Result<Option<LedgerEntry>> {
        let entry = self
            .conn
            .query_row(
                &format!(
                    "SELECT id, date, amount, category, description FROM {} WHERE id = ?1",
                    kind.table()
                ),
                [id],
                entry_from_row,
            )
            .optional()?;
        Ok(entry)
    }

    fn require_entry(&self, kind: EntryKind, id: i64) -> Result<LedgerEntry> {
        self.get_entry(kind, id)?.ok_or(StashError::UnknownRecord {
            kind: kind.label(),
            id,
        })
    }

    /// Replace every field of entry `id`, keeping its identity.
    pub fn update_entry(&self, kind: EntryKind, id: i64, entry: NewEntry) -> Result<LedgerEntry> {
        let changed = self.conn.execute(
            &format!(
                "UPDATE {} SET date = ?1, amount = ?2, category = ?3, description = ?4 WHERE id = ?5",
                kind.table()
            ),
            rusqlite::params![entry.date, entry.amount, entry.category, entry.description, id],
        )?;
        if changed == 0 {
            return Err(StashError::UnknownRecord { kind: kind.label(), id });
        }
        info!(table = kind.table(), id, "updated entry");
        Ok(LedgerEntry::from_new(id, entry))
    }

    /// Delete entry `id`, returning what was removed.
    pub fn delete_entry(&self, kind: EntryKind, id: i64) -> Result<LedgerEntry> {
        let existing = self.require_entry(kind, id)?;
        self.conn
            .execute(&format!("DELETE FROM {} WHERE id = ?1", kind.table()), [id])?;
        info!(table = kind.table(), id, "deleted entry");
        Ok(existing)
    }

    /// Distinct categories in use, sorted by name.
    pub fn categories(&self, kind: EntryKind) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT DISTINCT category FROM {} ORDER BY category",
            kind.table()
        ))?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    fn has_category(&self, kind: EntryKind, name: &str) -> Result<bool> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT 1 FROM {} WHERE category = ?1 LIMIT 1",
            kind.table()
        ))?;
        Ok(stmt.exists([name])?)
    }

    /// Move every entry in category `from` to `to`. Returns rows changed.
    pub fn rename_category(&self, kind: EntryKind, from: &str, to: &str) -> Result<usize> {
        if !self.has_category(kind, from)? {
            return Err(StashError::UnknownCategory {
                kind,
                name: from.to_string(),
            });
        }
        let changed = self.conn.execute(
            &format!("UPDATE {} SET category = ?1 WHERE category = ?2", kind.table()),
            rusqlite::params![to, from],
        )?;
        info!(table = kind.table(), from, to, changed, "renamed category");
        Ok(changed)
    }

    /// Delete a category by moving its entries to `Misc`.
    pub fn delete_category(&self, kind: EntryKind, name: &str) -> Result<usize> {
        if name == DEFAULT_CATEGORY {
            return Err(StashError::Validation(format!(
                "'{DEFAULT_CATEGORY}' cannot be deleted"
            )));
        }
        self.rename_category(kind, name, DEFAULT_CATEGORY)
    }

    pub fn count(&self, kind: EntryKind) -> Result<i64> {
        Ok(self
            .conn
            .query_row(&format!("SELECT count(*) FROM {}", kind.table()), [], |r| r.get(0))?)
    }
}

impl LedgerQuery for Ledger<'_> {
    fn query_range(
        &self,
        kind: EntryKind,
        start: NaiveDate,
        end: NaiveDate,
        category: Option<&str>,
    ) -> Result<Vec<LedgerEntry>> {
        debug!(table = kind.table(), %start, %end, ?category, "range query");
        let base = format!(
            "SELECT id, date, amount, category, description FROM {} WHERE date BETWEEN ?1 AND ?2",
            kind.table()
        );
        let rows = match category {
            Some(cat) => {
                let mut stmt = self
                    .conn
                    .prepare(&format!("{base} AND category = ?3 ORDER BY date, category, id"))
                    .map_err(StashError::unavailable)?;
                let rows = stmt
                    .query_map(rusqlite::params![start, end, cat], entry_from_row)
                    .map_err(StashError::unavailable)?;
                rows.collect::<std::result::Result<Vec<_>, _>>()
            }
            None => {
                let mut stmt = self
                    .conn
                    .prepare(&format!("{base} ORDER BY date, category, id"))
                    .map_err(StashError::unavailable)?;
                let rows = stmt
                    .query_map(rusqlite::params![start, end], entry_from_row)
                    .map_err(StashError::unavailable)?;
                rows.collect::<std::result::Result<Vec<_>, _>>()
            }
        };
        rows.map_err(StashError::unavailable)
    }
}

/// Sum of the amounts of `entries`.
pub fn calculate_total(entries: &[LedgerEntry]) -> f64 {
    entries.iter().map(|e| e.amount).sum()
}
