//! User-facing commands
//!
//! Each command receives the open store and a writer for its output, so the
//! binary prints to stdout while tests capture into a buffer.

use crate::database::ItemStore;
use crate::date_extract::extract_date;
use crate::date_parser::{format_date, parse_date};
use crate::error::{FoodrecError, Result};
use crate::models::{Item, OutputFormat};
use crate::ocr::TextRecognizer;
use chrono::{DateTime, Duration, Local};
use std::io::Write;
use std::path::Path;

/// Lookahead used by `check`
pub const EXPIRE_WINDOW_DAYS: i64 = 3;

/// Records an item with a user-supplied best-by date.
pub fn add(store: &ItemStore, name: &str, date_text: &str, out: &mut impl Write) -> Result<i64> {
    let name = validate_name(name)?;
    let best_by = parse_date(date_text)?;
    let id = store.insert(name, &best_by)?;
    writeln!(out, "Added {} expiring on {}", name, date_text)?;
    Ok(id)
}

/// Reads the best-by date off a package photo and records the item.
///
/// OCR text → first date-like substring → parsed instant → store.
pub fn scan(
    store: &ItemStore,
    recognizer: &dyn TextRecognizer,
    image: &Path,
    name: &str,
    out: &mut impl Write,
) -> Result<i64> {
    let name = validate_name(name)?;
    let text = recognizer.extract_text(image)?;
    let date_text = extract_date(&text)?;
    log::info!("Found date {} in {}", date_text, image.display());
    add(store, name, &date_text, out)
}

/// Prints every item as `id<TAB>name<TAB>YYYY-MM-DD`, soonest first.
pub fn list(store: &ItemStore, format: OutputFormat, out: &mut impl Write) -> Result<()> {
    let items = store.list_all()?;
    match format {
        OutputFormat::Json => write_json(&items, out)?,
        OutputFormat::Text => {
            for item in &items {
                writeln!(out, "{}\t{}\t{}", item.id, item.name, format_date(&item.best_by))?;
            }
        }
    }
    Ok(())
}

/// Prints items whose best-by falls within `EXPIRE_WINDOW_DAYS` of `now`.
///
/// Already-expired items are included.
pub fn check(
    store: &ItemStore,
    now: &DateTime<Local>,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<Vec<Item>> {
    let threshold = *now + Duration::days(EXPIRE_WINDOW_DAYS);
    let items = store.list_expiring_by(&threshold)?;
    log::debug!("{} items expire by {}", items.len(), threshold);

    match format {
        OutputFormat::Json => write_json(&items, out)?,
        OutputFormat::Text => {
            writeln!(out, "Items expiring within {} days:", EXPIRE_WINDOW_DAYS)?;
            for item in &items {
                writeln!(out, "- {} (by {})", item.name, format_date(&item.best_by))?;
            }
        }
    }
    Ok(items)
}

/// Placeholder for recipe suggestions.
pub fn suggest(out: &mut impl Write) -> Result<()> {
    writeln!(out, "Recipe suggestion feature not implemented.")?;
    Ok(())
}

fn validate_name(name: &str) -> Result<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(FoodrecError::EmptyName);
    }
    Ok(trimmed)
}

fn write_json(items: &[Item], out: &mut impl Write) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, items).map_err(std::io::Error::from)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
