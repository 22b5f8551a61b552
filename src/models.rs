use std::fmt;

use chrono::NaiveDate;

/// Category every entry falls back to when its own category is deleted.
pub const DEFAULT_CATEGORY: &str = "Misc";

/// The two ledger tables that carry dated, categorised amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Income,
    Expenses,
}

impl EntryKind {
    pub const ALL: [EntryKind; 2] = [EntryKind::Income, EntryKind::Expenses];

    pub fn table(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expenses => "expenses",
        }
    }

    /// Label used in the CSV sample files and in user-facing headings.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::Expenses => "Expenses",
        }
    }

    /// Sign of this kind's contribution to profit.
    pub fn sign(&self) -> f64 {
        match self {
            Self::Income => 1.0,
            Self::Expenses => -1.0,
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An income or expense before it has been stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub date: NaiveDate,
    pub amount: f64,
    pub category: String,
    pub description: String,
}

/// A stored income or expense paired with its assigned identity.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    pub id: i64,
    pub date: NaiveDate,
    pub amount: f64,
    pub category: String,
    pub description: String,
}

impl LedgerEntry {
    pub fn from_new(id: i64, entry: NewEntry) -> Self {
        Self {
            id,
            date: entry.date,
            amount: entry.amount,
            category: entry.category,
            description: entry.description,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Budget {
    pub category: String,
    pub weekly_amount: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewGoal {
    pub start_date: NaiveDate,
    pub target_amount: f64,
    pub description: String,
}

/// A savings goal. Start date and target never change after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Goal {
    pub id: i64,
    pub start_date: NaiveDate,
    pub target_amount: f64,
    pub description: String,
}

impl Goal {
    pub fn from_new(id: i64, goal: NewGoal) -> Self {
        Self {
            id,
            start_date: goal.start_date,
            target_amount: goal.target_amount,
            description: goal.description,
        }
    }
}
