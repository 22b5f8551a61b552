use colored::Colorize;
use comfy_table::{Cell, Table};
use rusqlite::Connection;

use crate::budget::{check_budget, Budgets};
use crate::cli::budget::print_check;
use crate::cli::{connect, date_or_today};
use crate::error::Result;
use crate::fmt::money;
use crate::ledger::{calculate_total, Ledger, LedgerQuery};
use crate::models::{EntryKind, LedgerEntry, NewEntry, DEFAULT_CATEGORY};
use crate::settings::{load_settings, Settings};
use crate::validate::{check_description, date_range, normalize_category, parse_amount};

/// Validate raw field values into an entry ready to store.
pub(crate) fn build_entry(
    amount: &str,
    category: Option<&str>,
    description: &str,
    date: Option<&str>,
) -> Result<NewEntry> {
    let category = match category {
        Some(c) if !c.trim().is_empty() => normalize_category(c)?,
        _ => DEFAULT_CATEGORY.to_string(),
    };
    Ok(NewEntry {
        date: date_or_today(date)?,
        amount: parse_amount(amount)?,
        category,
        description: check_description(description)?,
    })
}

pub(crate) fn print_entries(kind: EntryKind, entries: &[LedgerEntry], settings: &Settings) {
    let symbol = &settings.currency_symbol;
    let mut table = Table::new();
    table.set_header(vec!["I.D.", "Date", "Amount", "Category", "Description"]);
    for e in entries {
        table.add_row(vec![
            Cell::new(e.id),
            Cell::new(e.date),
            Cell::new(money(e.amount, symbol)),
            Cell::new(&e.category),
            Cell::new(&e.description),
        ]);
    }
    println!("{kind}\n{table}");
    let total = money(calculate_total(entries), symbol);
    let total = match kind {
        EntryKind::Income => total.green(),
        EntryKind::Expenses => total.red(),
    };
    println!("Total {}: {total}", kind.label().to_lowercase());
}

/// List entries of `kind` over `days` days from `from`, with their total.
/// Expenses filtered by a budgeted category also print the budget verdict.
pub(crate) fn show_range(
    conn: &Connection,
    settings: &Settings,
    kind: EntryKind,
    from: Option<&str>,
    days: u32,
    category: Option<&str>,
) -> Result<()> {
    let (start, end) = date_range(date_or_today(from)?, days)?;
    let category = category.map(normalize_category).transpose()?;
    let ledger = Ledger::new(conn);
    let entries = ledger.query_range(kind, start, end, category.as_deref())?;

    if entries.is_empty() {
        println!("No {} recorded between {start} and {end}.", kind.label().to_lowercase());
    } else {
        print_entries(kind, &entries, settings);
    }

    if let (EntryKind::Expenses, Some(cat)) = (kind, category.as_deref()) {
        match check_budget(&Budgets::new(conn), &ledger, cat, start, end)? {
            Some(check) => print_check(&check, settings),
            None => println!("No budget set for {cat}."),
        }
    }
    Ok(())
}

pub fn add(
    kind: EntryKind,
    amount: &str,
    category: Option<&str>,
    description: &str,
    date: Option<&str>,
) -> Result<()> {
    let settings = load_settings();
    let conn = connect(&settings)?;
    let entry = build_entry(amount, category, description, date)?;
    let stored = Ledger::new(&conn).insert_entry(kind, entry)?;
    println!(
        "Added {} {} to {} on {} (I.D. {})",
        kind.label().to_lowercase(),
        money(stored.amount, &settings.currency_symbol),
        stored.category,
        stored.date,
        stored.id
    );
    Ok(())
}

pub fn list(kind: EntryKind, from: Option<&str>, days: u32, category: Option<&str>) -> Result<()> {
    let settings = load_settings();
    let conn = connect(&settings)?;
    show_range(&conn, &settings, kind, from, days, category)
}

pub fn update(
    kind: EntryKind,
    id: i64,
    amount: &str,
    category: Option<&str>,
    description: &str,
    date: Option<&str>,
) -> Result<()> {
    let settings = load_settings();
    let conn = connect(&settings)?;
    let entry = build_entry(amount, category, description, date)?;
    let updated = Ledger::new(&conn).update_entry(kind, id, entry)?;
    println!(
        "Updated {} record {}: {} {} on {}",
        kind.label().to_lowercase(),
        updated.id,
        money(updated.amount, &settings.currency_symbol),
        updated.category,
        updated.date
    );
    Ok(())
}

pub fn delete(kind: EntryKind, id: i64) -> Result<()> {
    let settings = load_settings();
    let conn = connect(&settings)?;
    let removed = Ledger::new(&conn).delete_entry(kind, id)?;
    println!(
        "Deleted {} record {} ({} on {})",
        kind.label().to_lowercase(),
        removed.id,
        money(removed.amount, &settings.currency_symbol),
        removed.date
    );
    Ok(())
}

pub fn categories(kind: EntryKind) -> Result<()> {
    let settings = load_settings();
    let conn = connect(&settings)?;
    let names = Ledger::new(&conn).categories(kind)?;
    if names.is_empty() {
        println!("No {} categories yet.", kind.label().to_lowercase());
        return Ok(());
    }
    let mut table = Table::new();
    table.set_header(vec!["Category"]);
    for name in names {
        table.add_row(vec![Cell::new(name)]);
    }
    println!("{kind} categories\n{table}");
    Ok(())
}

pub fn rename_category(kind: EntryKind, from: &str, to: &str) -> Result<()> {
    let settings = load_settings();
    let conn = connect(&settings)?;
    let from = normalize_category(from)?;
    let to = normalize_category(to)?;
    let changed = Ledger::new(&conn).rename_category(kind, &from, &to)?;
    println!("Renamed {from} to {to} ({changed} records)");
    Ok(())
}

pub fn delete_category(kind: EntryKind, name: &str) -> Result<()> {
    let settings = load_settings();
    let conn = connect(&settings)?;
    let name = normalize_category(name)?;
    let moved = Ledger::new(&conn).delete_category(kind, &name)?;
    println!("Deleted {name}; {moved} records moved to {DEFAULT_CATEGORY}");
    Ok(())
}
