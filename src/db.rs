use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;

pub const DB_FILE: &str = "stash.db";

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS income (
    id INTEGER PRIMARY KEY,
    date TEXT NOT NULL,
    amount REAL NOT NULL,
    category TEXT NOT NULL DEFAULT 'Misc',
    description TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS expenses (
    id INTEGER PRIMARY KEY,
    date TEXT NOT NULL,
    amount REAL NOT NULL,
    category TEXT NOT NULL DEFAULT 'Misc',
    description TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS budget (
    category TEXT PRIMARY KEY,
    weekly_amount REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS goals (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    start_date TEXT NOT NULL,
    target_amount REAL NOT NULL CHECK (target_amount > 0),
    description TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS imports (
    id INTEGER PRIMARY KEY,
    filename TEXT NOT NULL,
    checksum TEXT NOT NULL UNIQUE,
    record_count INTEGER NOT NULL,
    import_date TEXT DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_income_date ON income(date, category);
CREATE INDEX IF NOT EXISTS idx_expenses_date ON expenses(date, category);
";

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Run `f` inside a transaction, or inside the caller's transaction when one
/// is already open on `conn`.
pub fn in_transaction<T>(conn: &Connection, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
    if !conn.is_autocommit() {
        return f(conn);
    }
    let tx = conn.unchecked_transaction()?;
    let out = f(&tx)?;
    tx.commit()?;
    Ok(out)
}

/// Open the database at `db_path`, creating the schema if needed.
pub fn open_initialized(db_path: &Path) -> Result<Connection> {
    let conn = get_connection(db_path)?;
    init_db(&conn)?;
    Ok(conn)
}

#[cfg(test)]
pub(crate) fn test_db() -> (tempfile::TempDir, Connection) {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_initialized(&dir.path().join("test.db")).unwrap();
    (dir, conn)
}
