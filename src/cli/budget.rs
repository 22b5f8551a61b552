use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::budget::{check_budget, BudgetCheck, Budgets, Verdict};
use crate::cli::{connect, date_or_today};
use crate::error::Result;
use crate::fmt::money;
use crate::ledger::Ledger;
use crate::models::Budget;
use crate::settings::{load_settings, Settings};
use crate::validate::{date_range, normalize_category, parse_amount};

pub(crate) fn print_budgets(budgets: &[Budget], settings: &Settings) {
    if budgets.is_empty() {
        println!("No budgets set.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec!["Category", "Weekly Budget"]);
    for b in budgets {
        table.add_row(vec![
            Cell::new(&b.category),
            Cell::new(money(b.weekly_amount, &settings.currency_symbol)),
        ]);
    }
    println!("Budgets\n{table}");
}

pub(crate) fn print_check(check: &BudgetCheck, settings: &Settings) {
    let symbol = &settings.currency_symbol;
    let spent = money(check.spent, symbol);
    let budget = money(check.budget, symbol);
    let line = match check.verdict {
        Verdict::Under => format!(
            "Under budget: spent {spent} of {budget} on {} from {} to {}",
            check.category, check.start, check.end
        )
        .green(),
        Verdict::Over => format!(
            "Over budget: spent {spent} against {budget} on {} from {} to {}",
            check.category, check.start, check.end
        )
        .red(),
    };
    println!("{line}");
}

pub fn set(category: &str, amount: &str) -> Result<()> {
    let settings = load_settings();
    let conn = connect(&settings)?;
    let category = normalize_category(category)?;
    let budget = Budgets::new(&conn).set_budget(&category, parse_amount(amount)?)?;
    println!(
        "Weekly budget for {} set to {}",
        budget.category,
        money(budget.weekly_amount, &settings.currency_symbol)
    );
    Ok(())
}

pub fn list() -> Result<()> {
    let settings = load_settings();
    let conn = connect(&settings)?;
    print_budgets(&Budgets::new(&conn).list_budgets()?, &settings);
    Ok(())
}

pub fn check(category: &str, from: Option<&str>, days: u32) -> Result<()> {
    let settings = load_settings();
    let conn = connect(&settings)?;
    let category = normalize_category(category)?;
    let (start, end) = date_range(date_or_today(from)?, days)?;
    match check_budget(&Budgets::new(&conn), &Ledger::new(&conn), &category, start, end)? {
        Some(result) => print_check(&result, &settings),
        None => println!("No budget set for {category}."),
    }
    Ok(())
}
