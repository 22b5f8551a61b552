use colored::Colorize;
use rusqlite::Connection;

use crate::budget::Budgets;
use crate::cli::budget::print_budgets;
use crate::cli::entries::{print_entries, show_range};
use crate::cli::goals::{print_goals, show_progress};
use crate::cli::import::import_path;
use crate::cli::{connect, prompts};
use crate::error::Result;
use crate::fmt::money;
use crate::goals::Goals;
use crate::ledger::Ledger;
use crate::models::{EntryKind, NewEntry, NewGoal};
use crate::settings::{load_settings, Settings};

const MENU_ITEMS: &[&str] = &[
    "Add expense",
    "View expenses",
    "View expenses by category",
    "Add income",
    "View income",
    "View income by category",
    "Set budget for a category",
    "View budgets",
    "Set financial goal",
    "View goal progress",
    "Delete a goal",
    "Populate from CSV file",
    "Quit",
];

const EDIT_ITEMS: &[&str] = &[
    "Back to menu",
    "Update a record",
    "Delete a record",
    "Rename a category",
    "Delete a category",
];

pub fn run() -> Result<()> {
    let settings = load_settings();
    let conn = connect(&settings)?;

    if settings.user_name.is_empty() {
        println!("{}", "Welcome to stash.".bold());
    } else {
        println!("{}", format!("Welcome back, {}.", settings.user_name).bold());
    }

    loop {
        println!();
        let choice = prompts::choose("What would you like to do?", MENU_ITEMS)?;
        // A failed action reports and returns to the menu.
        let outcome = match choice {
            0 => add_entry(&conn, &settings, EntryKind::Expenses),
            1 => view_entries(&conn, &settings, EntryKind::Expenses, false),
            2 => view_entries(&conn, &settings, EntryKind::Expenses, true),
            3 => add_entry(&conn, &settings, EntryKind::Income),
            4 => view_entries(&conn, &settings, EntryKind::Income, false),
            5 => view_entries(&conn, &settings, EntryKind::Income, true),
            6 => set_budget(&conn, &settings),
            7 => Budgets::new(&conn)
                .list_budgets()
                .map(|b| print_budgets(&b, &settings)),
            8 => add_goal(&conn, &settings),
            9 => show_progress(&conn, &settings, None, false),
            10 => delete_goal(&conn, &settings),
            11 => prompts::text("CSV file path").and_then(|path| import_path(&conn, path.trim())),
            _ => break,
        };
        if let Err(e) = outcome {
            println!("{}", format!("Error: {e}").red());
        }
    }

    println!("Goodbye.");
    Ok(())
}

fn add_entry(conn: &Connection, settings: &Settings, kind: EntryKind) -> Result<()> {
    let Some(category) = prompts::choose_category(&Ledger::new(conn), kind, true, false)? else {
        return Ok(());
    };
    let entry = NewEntry {
        amount: prompts::amount("Amount")?,
        category,
        description: prompts::description()?,
        date: prompts::date("Date (YYYY-MM-DD)")?,
    };
    let stored = Ledger::new(conn).insert_entry(kind, entry)?;
    println!(
        "{}",
        format!(
            "Added {} to {} (I.D. {})",
            money(stored.amount, &settings.currency_symbol),
            stored.category,
            stored.id
        )
        .green()
    );
    Ok(())
}

fn view_entries(conn: &Connection, settings: &Settings, kind: EntryKind, by_category: bool) -> Result<()> {
    let category = if by_category {
        let Some(name) = prompts::choose_category(&Ledger::new(conn), kind, false, false)? else {
            return Ok(());
        };
        Some(name)
    } else {
        None
    };
    let from = prompts::date("Start date (YYYY-MM-DD)")?.to_string();
    let days = prompts::days("Number of days (1-30)")?;
    show_range(conn, settings, kind, Some(&from), days, category.as_deref())?;

    if !by_category {
        edit_entries(conn, settings, kind)?;
    }
    Ok(())
}

fn edit_entries(conn: &Connection, settings: &Settings, kind: EntryKind) -> Result<()> {
    let ledger = Ledger::new(conn);
    match prompts::choose("Edit", EDIT_ITEMS)? {
        1 => {
            let id = prompts::id("Record I.D.")?;
            let Some(current) = ledger.get_entry(kind, id)? else {
                println!("No {} record with I.D. {id}", kind.label().to_lowercase());
                return Ok(());
            };
            print_entries(kind, std::slice::from_ref(&current), settings);
            let Some(category) = prompts::choose_category(&ledger, kind, true, false)? else {
                return Ok(());
            };
            let entry = NewEntry {
                amount: prompts::amount("New amount")?,
                category,
                description: prompts::description()?,
                date: prompts::date("New date (YYYY-MM-DD)")?,
            };
            ledger.update_entry(kind, id, entry)?;
            println!("{}", "Record updated.".green());
        }
        2 => {
            let id = prompts::id("Record I.D.")?;
            if prompts::confirm(&format!("Delete record {id}?"))? {
                ledger.delete_entry(kind, id)?;
                println!("{}", "Record deleted.".green());
            }
        }
        3 => {
            let Some(from) = prompts::choose_category(&ledger, kind, false, false)? else {
                return Ok(());
            };
            let to = prompts::new_category("New name", &ledger.categories(kind)?)?;
            let changed = ledger.rename_category(kind, &from, &to)?;
            println!("{}", format!("Renamed {from} to {to} ({changed} records)").green());
        }
        4 => {
            let Some(name) = prompts::choose_category(&ledger, kind, false, true)? else {
                return Ok(());
            };
            if prompts::confirm(&format!("Move every {name} record to Misc?"))? {
                let moved = ledger.delete_category(kind, &name)?;
                println!("{}", format!("Deleted {name} ({moved} records moved)").green());
            }
        }
        _ => {}
    }
    Ok(())
}

fn set_budget(conn: &Connection, settings: &Settings) -> Result<()> {
    // Budgets only apply to categories already used by expenses.
    let Some(category) = prompts::choose_category(&Ledger::new(conn), EntryKind::Expenses, false, false)? else {
        return Ok(());
    };
    let amount = prompts::amount("Weekly budget")?;
    let budget = Budgets::new(conn).set_budget(&category, amount)?;
    println!(
        "{}",
        format!(
            "Weekly budget for {} set to {}",
            budget.category,
            money(budget.weekly_amount, &settings.currency_symbol)
        )
        .green()
    );
    Ok(())
}

fn add_goal(conn: &Connection, settings: &Settings) -> Result<()> {
    let goal = NewGoal {
        target_amount: prompts::goal_amount("Amount to save")?,
        description: prompts::description()?,
        start_date: prompts::date("Start date (YYYY-MM-DD)")?,
    };
    let stored = Goals::new(conn).insert_goal(goal)?;
    println!(
        "{}",
        format!(
            "Goal {} set: save {} from {}",
            stored.id,
            money(stored.target_amount, &settings.currency_symbol),
            stored.start_date
        )
        .green()
    );
    Ok(())
}

fn delete_goal(conn: &Connection, settings: &Settings) -> Result<()> {
    let goals = Goals::new(conn);
    let all = goals.list_goals()?;
    print_goals(&all, settings);
    if all.is_empty() {
        return Ok(());
    }
    let id = prompts::id("Goal I.D.")?;
    if prompts::confirm(&format!("Delete goal {id}?"))? {
        let removed = goals.delete_goal(id)?;
        println!("{}", format!("Deleted goal {}", removed.id).green());
    }
    Ok(())
}
