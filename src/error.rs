use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CarnetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unrecognized header in {path}: {header}")]
    UnknownHeader { path: PathBuf, header: String },

    #[error("Not a legacy expense file (expected Date,Account,Category,Amount): {0}")]
    NotLegacy(PathBuf),

    #[error("Invalid record: {0}")]
    Parse(#[from] ParseError),

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

/// Why a single stored row could not be turned into an `ExpenseRecord`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("invalid date '{0}' (expected dd/mm/yyyy)")]
    Date(String),

    #[error("invalid amount '{0}'")]
    Amount(String),

    #[error("malformed row: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, CarnetError>;
