use colored::Colorize;
use comfy_table::{Cell, Table};
use rusqlite::Connection;

use crate::allocation::{allocate, Allocation};
use crate::cli::{connect, date_or_today};
use crate::error::Result;
use crate::fmt::money;
use crate::goals::Goals;
use crate::ledger::Ledger;
use crate::models::{Goal, NewGoal};
use crate::progress::{describe, message, ProgressBand};
use crate::settings::{load_settings, Settings};
use crate::validate::{check_description, parse_goal_amount};

pub(crate) fn build_goal(amount: &str, description: &str, date: Option<&str>) -> Result<NewGoal> {
    Ok(NewGoal {
        start_date: date_or_today(date)?,
        target_amount: parse_goal_amount(amount)?,
        description: check_description(description)?,
    })
}

pub(crate) fn print_goals(goals: &[Goal], settings: &Settings) {
    if goals.is_empty() {
        println!("No goals set.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec!["I.D.", "Start Date", "Target", "Description"]);
    for g in goals {
        table.add_row(vec![
            Cell::new(g.id),
            Cell::new(g.start_date),
            Cell::new(money(g.target_amount, &settings.currency_symbol)),
            Cell::new(&g.description),
        ]);
    }
    println!("Goals\n{table}");
}

fn print_breakdown(allocation: &Allocation, settings: &Settings) {
    let symbol = &settings.currency_symbol;
    let mut table = Table::new();
    table.set_header(vec!["From", "To", "Net Profit", "Active Goals", "Unallocated"]);
    for s in &allocation.segments {
        table.add_row(vec![
            Cell::new(s.start),
            Cell::new(s.end),
            Cell::new(money(s.net_profit, symbol)),
            Cell::new(s.active_goal_count),
            Cell::new(money(s.unallocated, symbol)),
        ]);
    }
    println!("Segments\n{table}");
}

/// Print every goal's standing as of `as_of`.
pub(crate) fn show_progress(
    conn: &Connection,
    settings: &Settings,
    as_of: Option<&str>,
    breakdown: bool,
) -> Result<()> {
    let today = date_or_today(as_of)?;
    let goals = Goals::new(conn).list_goals()?;
    if goals.is_empty() {
        println!("No goals set.");
        return Ok(());
    }

    let allocation = allocate(&goals, &Ledger::new(conn), today)?;
    let symbol = &settings.currency_symbol;

    let mut table = Table::new();
    table.set_header(vec!["I.D.", "Description", "Target", "Remaining", "Status"]);
    let mut notes = Vec::new();
    for goal in &goals {
        if goal.start_date > today {
            table.add_row(vec![
                Cell::new(goal.id),
                Cell::new(&goal.description),
                Cell::new(money(goal.target_amount, symbol)),
                Cell::new(money(goal.target_amount, symbol)),
                Cell::new(format!("starts {}", goal.start_date)),
            ]);
            continue;
        }
        let remaining = allocation
            .remaining
            .get(&goal.id)
            .copied()
            .unwrap_or(goal.target_amount);
        let standing = describe(goal.target_amount, remaining);
        let status = match standing.band {
            ProgressBand::Completed => standing.band.label().green().to_string(),
            ProgressBand::Regressed => standing.band.label().red().to_string(),
            _ => format!("{} ({}%)", standing.band, standing.percent),
        };
        table.add_row(vec![
            Cell::new(goal.id),
            Cell::new(&goal.description),
            Cell::new(money(standing.target, symbol)),
            Cell::new(money(standing.remaining, symbol)),
            Cell::new(status),
        ]);
        notes.push(format!("{}: {}", goal.id, message(goal, &standing, symbol)));
    }
    println!("Goal progress as of {today}\n{table}");
    for note in notes {
        println!("{note}");
    }

    if breakdown {
        println!();
        print_breakdown(&allocation, settings);
    }
    Ok(())
}

pub fn add(amount: &str, description: &str, date: Option<&str>) -> Result<()> {
    let settings = load_settings();
    let conn = connect(&settings)?;
    let goal = Goals::new(&conn).insert_goal(build_goal(amount, description, date)?)?;
    println!(
        "Added goal {}: save {} from {}",
        goal.id,
        money(goal.target_amount, &settings.currency_symbol),
        goal.start_date
    );
    Ok(())
}

pub fn list() -> Result<()> {
    let settings = load_settings();
    let conn = connect(&settings)?;
    print_goals(&Goals::new(&conn).list_goals()?, &settings);
    Ok(())
}

pub fn delete(id: i64) -> Result<()> {
    let settings = load_settings();
    let conn = connect(&settings)?;
    let removed = Goals::new(&conn).delete_goal(id)?;
    println!("Deleted goal {} ({})", removed.id, removed.description);
    Ok(())
}

pub fn progress(as_of: Option<&str>, breakdown: bool) -> Result<()> {
    let settings = load_settings();
    let conn = connect(&settings)?;
    show_progress(&conn, &settings, as_of, breakdown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_goal() {
        let goal = build_goal("500", "Holiday", Some("2025-01-01")).unwrap();
        assert_eq!(goal.target_amount, 500.0);
        assert_eq!(goal.start_date.to_string(), "2025-01-01");
        assert!(build_goal("0", "Nothing", None).is_err());
        assert!(build_goal("-5", "Debt", None).is_err());
    }
}
