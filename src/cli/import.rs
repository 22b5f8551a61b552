use std::path::PathBuf;

use colored::Colorize;
use rusqlite::Connection;

use crate::cli::connect;
use crate::error::Result;
use crate::importer::import_file;
use crate::settings::load_settings;

pub(crate) fn import_path(conn: &Connection, file: &str) -> Result<()> {
    let file_path = PathBuf::from(file);
    let result = import_file(conn, &file_path)?;

    if result.duplicate_file {
        println!("{}", "This file has already been imported (duplicate checksum).".yellow());
        return Ok(());
    }

    println!(
        "{} income, {} expenses, {} budgets, {} goals imported",
        result.income.len(),
        result.expenses.len(),
        result.budgets.len(),
        result.goals.len()
    );
    Ok(())
}

pub fn run(file: &str) -> Result<()> {
    let settings = load_settings();
    let conn = connect(&settings)?;
    import_path(&conn, file)
}
