use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension};
use tracing::info;

use crate::db::in_transaction;
use crate::error::{Result, StashError};
use crate::ledger::{calculate_total, LedgerQuery};
use crate::models::{Budget, EntryKind};

/// Store handle over the weekly budget table.
pub struct Budgets<'a> {
    conn: &'a Connection,
}

impl<'a> Budgets<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Set or replace the weekly budget for `category`.
    pub fn set_budget(&self, category: &str, weekly_amount: f64) -> Result<Budget> {
        if !weekly_amount.is_finite() || weekly_amount < 0.0 {
            return Err(StashError::Validation(format!(
                "weekly budget must be a non-negative amount, got {weekly_amount}"
            )));
        }
        self.conn.execute(
            "INSERT INTO budget (category, weekly_amount) VALUES (?1, ?2) \
             ON CONFLICT(category) DO UPDATE SET weekly_amount = excluded.weekly_amount",
            rusqlite::params![category, weekly_amount],
        )?;
        info!(category, weekly_amount, "set budget");
        Ok(Budget {
            category: category.to_string(),
            weekly_amount,
        })
    }

    /// Insert budgets, keeping any budget already set for a category.
    /// Returns only the budgets that were actually stored.
    pub fn insert_budgets(&self, budgets: Vec<Budget>) -> Result<Vec<Budget>> {
        in_transaction(self.conn, |conn| {
            let mut stmt =
                conn.prepare("INSERT OR IGNORE INTO budget (category, weekly_amount) VALUES (?1, ?2)")?;
            let mut stored = Vec::new();
            for budget in budgets {
                if stmt.execute(rusqlite::params![budget.category, budget.weekly_amount])? == 1 {
                    stored.push(budget);
                }
            }
            Ok(stored)
        })
    }

    pub fn get_budget(&self, category: &str) -> Result<Option<Budget>> {
        let budget = self
            .conn
            .query_row(
                "SELECT category, weekly_amount FROM budget WHERE category = ?1",
                [category],
                |row| {
                    Ok(Budget {
                        category: row.get(0)?,
                        weekly_amount: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(budget)
    }

    pub fn list_budgets(&self) -> Result<Vec<Budget>> {
        let mut stmt = self
            .conn
            .prepare("SELECT category, weekly_amount FROM budget ORDER BY category")?;
        let rows = stmt.query_map([], |row| {
            Ok(Budget {
                category: row.get(0)?,
                weekly_amount: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }
}

/// Number of calendar days in `[start, end]`.
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/// A weekly budget scaled to the inclusive date range, rounded to cents.
pub fn budget_over_range(weekly_amount: f64, start: NaiveDate, end: NaiveDate) -> f64 {
    let scaled = weekly_amount * inclusive_days(start, end) as f64 / 7.0;
    (scaled * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Under,
    Over,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BudgetCheck {
    pub category: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub spent: f64,
    pub budget: f64,
    pub verdict: Verdict,
}

/// Compare spending in `category` against its budget over `[start, end]`.
/// Returns `None` when the category has no budget.
pub fn check_budget<L: LedgerQuery + ?Sized>(
    budgets: &Budgets<'_>,
    ledger: &L,
    category: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Option<BudgetCheck>> {
    let Some(budget) = budgets.get_budget(category)? else {
        return Ok(None);
    };
    let spent = calculate_total(&ledger.query_range(EntryKind::Expenses, start, end, Some(category))?);
    let scaled = budget_over_range(budget.weekly_amount, start, end);
    let verdict = if scaled > spent { Verdict::Under } else { Verdict::Over };
    Ok(Some(BudgetCheck {
        category: category.to_string(),
        start,
        end,
        spent,
        budget: scaled,
        verdict,
    }))
}
