//! foodrec - Food inventory tracker
//!
//! Records perishable items and their best-by dates in SQLite, flags items
//! that expire soon, and reads best-by dates off package photos via OCR.

pub mod commands;
pub mod database;
pub mod date_extract;
pub mod date_parser;
pub mod error;
pub mod models;
pub mod ocr;

pub use database::ItemStore;
pub use date_extract::extract_date;
pub use date_parser::{format_date, parse_date};
pub use error::{FoodrecError, Result};
pub use models::{Item, OutputFormat};
pub use ocr::{TesseractOcr, TextRecognizer};
