//! Error types for foodrec

use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for foodrec operations
#[derive(Debug, Error)]
pub enum FoodrecError {
    /// The database file could not be opened (fatal at startup)
    #[error("Failed to open database {}: {source}", .path.display())]
    StorageOpen {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    /// The directory that should hold the database could not be created
    #[error("Failed to create database directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Creating the items table failed (fatal at startup)
    #[error("Failed to initialize database schema: {0}")]
    Schema(#[source] rusqlite::Error),
    /// None of the accepted date formats matched
    #[error("Could not parse date: {0}")]
    DateParse(String),
    /// An insert could not be committed
    #[error("Failed to store item: {0}")]
    StorageWrite(#[source] rusqlite::Error),
    /// A query over the items table failed
    #[error("Failed to read items: {0}")]
    StorageRead(#[source] rusqlite::Error),
    /// The OCR engine is missing, failed, or timed out
    #[error("OCR failed: {0}")]
    OcrInvocation(String),
    /// The recognized text contained nothing that looks like a date
    #[error("Could not find date in OCR text")]
    NoDateFound,
    /// Item names must contain at least one non-whitespace character
    #[error("Item name must not be empty")]
    EmptyName,
    /// Writing command output failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for foodrec operations
pub type Result<T> = std::result::Result<T, FoodrecError>;
