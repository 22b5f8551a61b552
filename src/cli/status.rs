use crate::budget::Budgets;
use crate::db::get_connection;
use crate::error::Result;
use crate::goals::Goals;
use crate::ledger::Ledger;
use crate::models::EntryKind;
use crate::settings::load_settings;

pub fn run() -> Result<()> {
    let settings = load_settings();
    let db_path = settings.db_path();

    println!("User:       {}", if settings.user_name.is_empty() { "(not set)" } else { &settings.user_name });
    println!("Data dir:   {}", settings.data_dir);
    println!("Database:   {}", db_path.display());
    println!("Currency:   {}", settings.currency_symbol);

    if db_path.exists() {
        let conn = get_connection(&db_path)?;
        let ledger = Ledger::new(&conn);

        println!();
        println!("Income:    {}", ledger.count(EntryKind::Income)?);
        println!("Expenses:  {}", ledger.count(EntryKind::Expenses)?);
        println!("Budgets:   {}", Budgets::new(&conn).list_budgets()?.len());
        println!("Goals:     {}", Goals::new(&conn).list_goals()?.len());
    } else {
        println!();
        println!("Database not found. Run `stash init` to set up.");
    }

    Ok(())
}
