use chrono::{DateTime, Local};
use serde::Serialize;

/// A tracked food item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    /// Row id assigned by the store
    pub id: i64,
    pub name: String,
    /// Expiration instant, second precision
    pub best_by: DateTime<Local>,
}

/// How `list` and `check` render their items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
