pub mod budget;
pub mod entries;
pub mod goals;
pub mod import;
pub mod init;
pub mod menu;
pub mod prompts;
pub mod status;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rusqlite::Connection;

use crate::db::open_initialized;
use crate::error::{Result, StashError};
use crate::settings::Settings;
use crate::validate::parse_date;

pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Parse an optional `--date`-style argument, defaulting to today.
pub(crate) fn date_or_today(raw: Option<&str>) -> Result<NaiveDate> {
    match raw {
        Some(s) => parse_date(s, today()),
        None => Ok(today()),
    }
}

/// Open the configured database, creating the data directory and schema on
/// first use.
pub(crate) fn connect(settings: &Settings) -> Result<Connection> {
    let data_dir = std::path::PathBuf::from(&settings.data_dir);
    std::fs::create_dir_all(&data_dir).map_err(|e| {
        StashError::Settings(format!("cannot create data directory {}: {e}", data_dir.display()))
    })?;
    open_initialized(&settings.db_path())
}

#[derive(Parser)]
#[command(name = "stash", about = "Track income, expenses, budgets and savings goals.")]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and initialize the database.
    Init {
        /// Path for stash data (default: ~/Documents/stash)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Currency symbol used when printing amounts
        #[arg(long)]
        currency: Option<String>,
    },
    /// Record and review income.
    Income {
        #[command(subcommand)]
        command: EntryCommands,
    },
    /// Record and review expenses.
    Expenses {
        #[command(subcommand)]
        command: EntryCommands,
    },
    /// Weekly budgets per expense category.
    Budget {
        #[command(subcommand)]
        command: BudgetCommands,
    },
    /// Savings goals and progress towards them.
    Goals {
        #[command(subcommand)]
        command: GoalsCommands,
    },
    /// Populate the tables from a CSV file (last column names the table).
    Import {
        /// Path to the CSV file
        file: String,
    },
    /// Show the current database and record counts.
    Status,
}

#[derive(Subcommand)]
pub enum EntryCommands {
    /// Add a record.
    Add {
        /// Amount, e.g. 12.50
        amount: String,
        /// Category name (default: Misc)
        #[arg(long)]
        category: Option<String>,
        /// Short description (35 characters max)
        #[arg(long, default_value = "")]
        description: String,
        /// Date: YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// List records over a range of days, with the total.
    List {
        /// First day to include: YYYY-MM-DD (default: today)
        #[arg(long = "from")]
        from_date: Option<String>,
        /// Number of days to cover, 1 to 30
        #[arg(long, default_value = "30")]
        days: u32,
        /// Only records in this category
        #[arg(long)]
        category: Option<String>,
    },
    /// Replace every field of a record.
    Update {
        /// Record I.D. (shown in `list`)
        id: i64,
        amount: String,
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        date: Option<String>,
    },
    /// Delete a record.
    Delete {
        /// Record I.D. (shown in `list`)
        id: i64,
    },
    /// List categories in use.
    Categories,
    /// Move every record in a category to a new name.
    RenameCategory { from: String, to: String },
    /// Delete a category; its records move to Misc.
    DeleteCategory { name: String },
}

#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Set the weekly budget for an expense category.
    Set { category: String, amount: String },
    /// List all budgets.
    List,
    /// Compare a category's spending with its budget over a range of days.
    Check {
        category: String,
        #[arg(long = "from")]
        from_date: Option<String>,
        #[arg(long, default_value = "7")]
        days: u32,
    },
}

#[derive(Subcommand)]
pub enum GoalsCommands {
    /// Add a savings goal.
    Add {
        /// Amount to save
        amount: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Start date: YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// List goals.
    List,
    /// Delete a goal.
    Delete { id: i64 },
    /// Show progress towards every goal.
    Progress {
        /// Compute progress as of this date (default: today)
        #[arg(long = "as-of")]
        as_of: Option<String>,
        /// Also print the per-segment profit breakdown
        #[arg(long)]
        breakdown: bool,
    },
}
