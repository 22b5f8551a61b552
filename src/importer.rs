use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use rusqlite::Connection;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::budget::Budgets;
use crate::db::in_transaction;
use crate::error::{Result, StashError};
use crate::goals::Goals;
use crate::ledger::Ledger;
use crate::models::{Budget, EntryKind, Goal, LedgerEntry, NewEntry, NewGoal};
use crate::validate::{check_description, normalize_category, parse_amount, parse_goal_amount};

/// Rows read from a sample-data file, grouped by target table.
#[derive(Debug, Default, PartialEq)]
pub struct ParsedFile {
    pub income: Vec<NewEntry>,
    pub expenses: Vec<NewEntry>,
    pub budgets: Vec<Budget>,
    pub goals: Vec<NewGoal>,
}

impl ParsedFile {
    pub fn len(&self) -> usize {
        self.income.len() + self.expenses.len() + self.budgets.len() + self.goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
pub struct ImportResult {
    pub income: Vec<LedgerEntry>,
    pub expenses: Vec<LedgerEntry>,
    /// Budgets actually stored; categories that already had one are skipped.
    pub budgets: Vec<Budget>,
    pub goals: Vec<Goal>,
    pub duplicate_file: bool,
}

fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

fn field<'r>(record: &'r csv::StringRecord, idx: usize, line: u64) -> Result<&'r str> {
    record.get(idx).map(str::trim).ok_or_else(|| StashError::Import {
        line,
        reason: format!("missing column {}", idx + 1),
    })
}

fn at_line<T>(line: u64, res: Result<T>) -> Result<T> {
    res.map_err(|e| StashError::Import {
        line,
        reason: e.to_string(),
    })
}

fn parse_date_field(raw: &str, line: u64) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| StashError::Import {
        line,
        reason: format!("'{raw}' is not a valid date (YYYY-MM-DD)"),
    })
}

fn expect_columns(record: &csv::StringRecord, count: usize, line: u64) -> Result<()> {
    if record.len() != count {
        return Err(StashError::Import {
            line,
            reason: format!("expected {count} columns, found {}", record.len()),
        });
    }
    Ok(())
}

fn parse_entry(record: &csv::StringRecord, line: u64) -> Result<NewEntry> {
    expect_columns(record, 5, line)?;
    Ok(NewEntry {
        date: parse_date_field(field(record, 0, line)?, line)?,
        amount: at_line(line, parse_amount(field(record, 1, line)?))?,
        category: at_line(line, normalize_category(field(record, 2, line)?))?,
        description: at_line(line, check_description(field(record, 3, line)?))?,
    })
}

/// Parse a header-less CSV whose last column names the target table:
/// `Income`, `Expenses`, `Budget` or `Goals`.
pub fn parse_records<R: Read>(reader: R) -> Result<ParsedFile> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut parsed = ParsedFile::default();
    for result in rdr.records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line());
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        let table = record.get(record.len() - 1).unwrap_or("").trim();
        match table {
            "Income" => parsed.income.push(parse_entry(&record, line)?),
            "Expenses" => parsed.expenses.push(parse_entry(&record, line)?),
            "Budget" => {
                expect_columns(&record, 3, line)?;
                parsed.budgets.push(Budget {
                    category: at_line(line, normalize_category(field(&record, 0, line)?))?,
                    weekly_amount: at_line(line, parse_amount(field(&record, 1, line)?))?,
                });
            }
            "Goals" => {
                expect_columns(&record, 4, line)?;
                parsed.goals.push(NewGoal {
                    start_date: parse_date_field(field(&record, 0, line)?, line)?,
                    target_amount: at_line(line, parse_goal_amount(field(&record, 1, line)?))?,
                    description: at_line(line, check_description(field(&record, 2, line)?))?,
                });
            }
            other => {
                return Err(StashError::Import {
                    line,
                    reason: format!("unknown table '{other}'"),
                })
            }
        }
    }
    Ok(parsed)
}

/// Store every row of `parsed` in one transaction.
pub fn store_parsed(conn: &Connection, parsed: ParsedFile) -> Result<ImportResult> {
    in_transaction(conn, |conn| {
        let ledger = Ledger::new(conn);
        Ok(ImportResult {
            income: ledger.insert_entries(EntryKind::Income, parsed.income)?,
            expenses: ledger.insert_entries(EntryKind::Expenses, parsed.expenses)?,
            budgets: Budgets::new(conn).insert_budgets(parsed.budgets)?,
            goals: Goals::new(conn).insert_goals(parsed.goals)?,
            duplicate_file: false,
        })
    })
}

/// Populate the database from a sample-data file. A file whose contents were
/// imported before is skipped.
pub fn import_file(conn: &Connection, file_path: &Path) -> Result<ImportResult> {
    let data = std::fs::read(file_path)?;
    let checksum = compute_checksum(&data);
    {
        let mut stmt = conn.prepare("SELECT 1 FROM imports WHERE checksum = ?1")?;
        if stmt.exists([&checksum])? {
            warn!(file = %file_path.display(), "file already imported, skipping");
            return Ok(ImportResult {
                duplicate_file: true,
                ..Default::default()
            });
        }
    }

    let parsed = parse_records(data.as_slice())?;
    let record_count = parsed.len() as i64;
    let result = in_transaction(conn, |conn| {
        let result = store_parsed(conn, parsed)?;
        conn.execute(
            "INSERT INTO imports (filename, checksum, record_count) VALUES (?1, ?2, ?3)",
            rusqlite::params![
                file_path.file_name().and_then(|n| n.to_str()).unwrap_or(""),
                checksum,
                record_count
            ],
        )?;
        Ok(result)
    })?;
    info!(file = %file_path.display(), record_count, "imported file");
    Ok(result)
}
