use thiserror::Error;

use crate::models::EntryKind;

#[derive(Error, Debug)]
pub enum StashError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[source] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid goal {id}: target amount must be positive, got {target}")]
    InvalidGoal { id: i64, target: f64 },

    #[error("No {kind} record with I.D. {id}")]
    UnknownRecord { kind: &'static str, id: i64 },

    #[error("Unknown category in {kind}: {name}")]
    UnknownCategory { kind: EntryKind, name: String },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Import error on line {line}: {reason}")]
    Import { line: u64, reason: String },

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),
}

impl StashError {
    pub fn unavailable(err: rusqlite::Error) -> Self {
        Self::StorageUnavailable(err)
    }
}

pub type Result<T> = std::result::Result<T, StashError>;
