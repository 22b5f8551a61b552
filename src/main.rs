use clap::Parser;
use tracing_subscriber::{fmt as log_fmt, prelude::*, EnvFilter};

use stash::cli::{self, BudgetCommands, Cli, Commands, EntryCommands, GoalsCommands};
use stash::error;
use stash::models::EntryKind;

fn init_logging(verbose: bool) {
    // RUST_LOG wins, then --verbose, then warnings only.
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            log_fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}

fn run_entries(kind: EntryKind, command: EntryCommands) -> error::Result<()> {
    match command {
        EntryCommands::Add {
            amount,
            category,
            description,
            date,
        } => cli::entries::add(kind, &amount, category.as_deref(), &description, date.as_deref()),
        EntryCommands::List {
            from_date,
            days,
            category,
        } => cli::entries::list(kind, from_date.as_deref(), days, category.as_deref()),
        EntryCommands::Update {
            id,
            amount,
            category,
            description,
            date,
        } => cli::entries::update(kind, id, &amount, category.as_deref(), &description, date.as_deref()),
        EntryCommands::Delete { id } => cli::entries::delete(kind, id),
        EntryCommands::Categories => cli::entries::categories(kind),
        EntryCommands::RenameCategory { from, to } => cli::entries::rename_category(kind, &from, &to),
        EntryCommands::DeleteCategory { name } => cli::entries::delete_category(kind, &name),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        None => cli::menu::run(),
        Some(Commands::Init { data_dir, currency }) => cli::init::run(data_dir, currency),
        Some(Commands::Income { command }) => run_entries(EntryKind::Income, command),
        Some(Commands::Expenses { command }) => run_entries(EntryKind::Expenses, command),
        Some(Commands::Budget { command }) => match command {
            BudgetCommands::Set { category, amount } => cli::budget::set(&category, &amount),
            BudgetCommands::List => cli::budget::list(),
            BudgetCommands::Check {
                category,
                from_date,
                days,
            } => cli::budget::check(&category, from_date.as_deref(), days),
        },
        Some(Commands::Goals { command }) => match command {
            GoalsCommands::Add {
                amount,
                description,
                date,
            } => cli::goals::add(&amount, &description, date.as_deref()),
            GoalsCommands::List => cli::goals::list(),
            GoalsCommands::Delete { id } => cli::goals::delete(id),
            GoalsCommands::Progress { as_of, breakdown } => cli::goals::progress(as_of.as_deref(), breakdown),
        },
        Some(Commands::Import { file }) => cli::import::run(&file),
        Some(Commands::Status) => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
