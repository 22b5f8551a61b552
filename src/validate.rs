//! Parsing and validation of user-entered values.

use chrono::{Days, NaiveDate};

use crate::error::{Result, StashError};

pub const MAX_AMOUNT: f64 = 999_999.99;
pub const MAX_DESCRIPTION_LEN: usize = 35;
pub const MAX_CATEGORY_LEN: usize = 15;
pub const MAX_RANGE_DAYS: u32 = 30;

fn invalid(msg: impl Into<String>) -> StashError {
    StashError::Validation(msg.into())
}

/// A monetary amount between 0 and 999,999.99 with at most two decimals.
/// Currency symbols and thousands separators are ignored.
pub fn parse_amount(raw: &str) -> Result<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '£' | '$' | '€'))
        .collect();
    let value: f64 = cleaned
        .parse()
        .map_err(|_| invalid(format!("'{}' is not a number", raw.trim())))?;
    if !value.is_finite() || !(0.0..=MAX_AMOUNT).contains(&value) {
        return Err(invalid(format!("amount must be between 0 and {MAX_AMOUNT:.2}")));
    }
    if cleaned.split_once('.').is_some_and(|(_, frac)| frac.len() > 2) {
        return Err(invalid("amount must have at most two decimal places"));
    }
    Ok(value)
}

/// A goal target: a valid amount greater than zero.
pub fn parse_goal_amount(raw: &str) -> Result<f64> {
    let value = parse_amount(raw)?;
    if value <= 0.0 {
        return Err(invalid("goal amount must be greater than zero"));
    }
    Ok(value)
}

/// `YYYY-MM-DD`, or `today`.
pub fn parse_date(raw: &str, today: NaiveDate) -> Result<NaiveDate> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("today") {
        return Ok(today);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| invalid(format!("'{raw}' is not a valid date (YYYY-MM-DD)")))
}

/// Number of days to list, 1 to 30.
pub fn parse_days(raw: &str) -> Result<u32> {
    let days: u32 = raw
        .trim()
        .parse()
        .map_err(|_| invalid(format!("'{}' is not a whole number", raw.trim())))?;
    check_days(days)
}

pub fn check_days(days: u32) -> Result<u32> {
    if !(1..=MAX_RANGE_DAYS).contains(&days) {
        return Err(invalid(format!("number of days must be between 1 and {MAX_RANGE_DAYS}")));
    }
    Ok(days)
}

/// Inclusive range covering `days` days from `start`.
pub fn date_range(start: NaiveDate, days: u32) -> Result<(NaiveDate, NaiveDate)> {
    let days = check_days(days)?;
    let end = start
        .checked_add_days(Days::new(u64::from(days - 1)))
        .ok_or_else(|| invalid("date range is out of bounds"))?;
    Ok((start, end))
}

pub fn check_description(raw: &str) -> Result<String> {
    if raw.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(invalid(format!(
            "description is limited to {MAX_DESCRIPTION_LEN} characters"
        )));
    }
    Ok(raw.to_string())
}

/// Trim whitespace and quotes, then title-case each word.
pub fn normalize_category(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_matches(|c| c == '\'' || c == '"').trim();
    let name = trimmed
        .split_whitespace()
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ");
    if name.is_empty() {
        return Err(invalid("category name cannot be empty"));
    }
    if name.chars().count() > MAX_CATEGORY_LEN {
        return Err(invalid(format!("category is limited to {MAX_CATEGORY_LEN} characters")));
    }
    Ok(name)
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
