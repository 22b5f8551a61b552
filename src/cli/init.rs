use std::io::IsTerminal;
use std::path::PathBuf;

use dialoguer::Input;

use crate::db::open_initialized;
use crate::error::Result;
use crate::settings::{load_settings, save_settings, shellexpand_path, Settings};

pub fn run(data_dir: Option<String>, currency: Option<String>) -> Result<()> {
    let mut settings = load_settings();
    let defaults = Settings::default();

    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    } else if settings.data_dir == defaults.data_dir && std::io::stdin().is_terminal() {
        // First run, ask where the data should live.
        let chosen: String = Input::new()
            .with_prompt("Data directory")
            .default(settings.data_dir.clone())
            .interact_text()?;
        settings.data_dir = shellexpand_path(chosen.trim());
    }
    if let Some(symbol) = currency {
        settings.currency_symbol = symbol;
    }

    save_settings(&settings)?;

    let resolved = PathBuf::from(&settings.data_dir);
    std::fs::create_dir_all(&resolved)?;
    open_initialized(&settings.db_path())?;

    println!("Initialized stash at {}", resolved.display());
    Ok(())
}
