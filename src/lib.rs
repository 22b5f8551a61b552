pub mod allocation;
pub mod budget;
pub mod cli;
pub mod db;
pub mod error;
pub mod fmt;
pub mod goals;
pub mod importer;
pub mod ledger;
pub mod models;
pub mod profit;
pub mod progress;
pub mod settings;
pub mod validate;
