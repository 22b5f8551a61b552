//! Interactive prompts that re-ask until the answer validates.

use chrono::NaiveDate;
use dialoguer::{Confirm, Input, Select};

use crate::cli::today;
use crate::error::{Result, StashError};
use crate::ledger::Ledger;
use crate::models::{EntryKind, DEFAULT_CATEGORY};
use crate::validate::{
    check_description, normalize_category, parse_amount, parse_date, parse_days, parse_goal_amount,
};

fn ask(prompt: &str, default: Option<&str>, check: impl Fn(&str) -> Result<()>) -> Result<String> {
    let mut input = Input::<String>::new()
        .with_prompt(prompt)
        .allow_empty(default.is_some())
        .validate_with(|s: &String| check(s).map_err(|e| e.to_string()));
    if let Some(d) = default {
        input = input.default(d.to_string()).show_default(!d.is_empty());
    }
    Ok(input.interact_text()?)
}

pub fn amount(prompt: &str) -> Result<f64> {
    let raw = ask(prompt, None, |s| parse_amount(s).map(|_| ()))?;
    parse_amount(&raw)
}

pub fn goal_amount(prompt: &str) -> Result<f64> {
    let raw = ask(prompt, None, |s| parse_goal_amount(s).map(|_| ()))?;
    parse_goal_amount(&raw)
}

pub fn date(prompt: &str) -> Result<NaiveDate> {
    let now = today();
    let raw = ask(prompt, Some("today"), |s| parse_date(s, now).map(|_| ()))?;
    parse_date(&raw, now)
}

pub fn days(prompt: &str) -> Result<u32> {
    let raw = ask(prompt, Some("30"), |s| parse_days(s).map(|_| ()))?;
    parse_days(&raw)
}

pub fn description() -> Result<String> {
    let raw = ask("Description", Some(""), |s| check_description(s).map(|_| ()))?;
    check_description(raw.trim())
}

pub const ADD_CATEGORY: &str = "Add a new category";

/// Menu items for picking a category: the names in use, then `Add a new
/// category` when new names are allowed. An empty table still offers `Misc`.
pub fn category_items(names: &[String], allow_new: bool, exclude_misc: bool) -> Vec<String> {
    let mut items: Vec<String> = names
        .iter()
        .filter(|n| !(exclude_misc && n.as_str() == DEFAULT_CATEGORY))
        .cloned()
        .collect();
    if allow_new {
        if items.is_empty() && !exclude_misc {
            items.push(DEFAULT_CATEGORY.to_string());
        }
        items.push(ADD_CATEGORY.to_string());
    }
    items
}

fn check_new_category(raw: &str, taken: &[String]) -> Result<String> {
    let name = normalize_category(raw)?;
    if taken.contains(&name) {
        return Err(StashError::Validation(format!("{name} already exists")));
    }
    Ok(name)
}

/// A category name not already in `taken`.
pub fn new_category(prompt: &str, taken: &[String]) -> Result<String> {
    let raw = ask(prompt, None, |s| check_new_category(s, taken).map(|_| ()))?;
    check_new_category(&raw, taken)
}

/// Pick one of `kind`'s categories, or type a new one when `allow_new`.
/// `None` when there is nothing to pick from.
pub fn choose_category(
    ledger: &Ledger<'_>,
    kind: EntryKind,
    allow_new: bool,
    exclude_misc: bool,
) -> Result<Option<String>> {
    let names = ledger.categories(kind)?;
    let items = category_items(&names, allow_new, exclude_misc);
    if items.is_empty() {
        println!("No {} categories to choose from.", kind.label().to_lowercase());
        return Ok(None);
    }
    let labels: Vec<&str> = items.iter().map(String::as_str).collect();
    let picked = &items[choose("Category", &labels)?];
    if allow_new && picked == ADD_CATEGORY {
        return new_category("New category name", &names).map(Some);
    }
    Ok(Some(picked.clone()))
}

pub fn id(prompt: &str) -> Result<i64> {
    Ok(Input::<i64>::new().with_prompt(prompt).interact_text()?)
}

pub fn text(prompt: &str) -> Result<String> {
    Ok(Input::<String>::new().with_prompt(prompt).interact_text()?)
}

pub fn confirm(prompt: &str) -> Result<bool> {
    Ok(Confirm::new().with_prompt(prompt).default(false).interact()?)
}

pub fn choose(prompt: &str, items: &[&str]) -> Result<usize> {
    Ok(Select::new()
        .with_prompt(prompt)
        .items(items)
        .default(0)
        .interact()?)
}
