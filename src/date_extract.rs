//! Date extraction from free-form OCR text
//!
//! Package photos produce noisy text ("BEST BY 06/15/2024 LOT#4 ..."). The
//! extractor walks the text one character at a time and, at each offset,
//! tries the patterns below in order. The first offset that matches any
//! pattern wins, so an earlier lower-priority match beats a later
//! higher-priority one.
//!
//! Matching is textual only. `2024-13-99` is extracted unchanged and left for
//! the date parser to reject.

use crate::error::{FoodrecError, Result};
use lazy_static::lazy_static;
use regex::Regex;

/// Order in which a pattern's three capture groups appear
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldOrder {
    YearMonthDay,
    MonthDayYear,
}

struct DatePattern {
    regex: Regex,
    order: FieldOrder,
}

impl DatePattern {
    fn new(pattern: &str, order: FieldOrder) -> Self {
        // Patterns are compile-time constants covered by tests
        let regex = Regex::new(pattern).unwrap_or_else(|e| panic!("invalid date pattern {pattern}: {e}"));
        Self { regex, order }
    }

    /// Tries to match at the very start of `text`, returning `YYYY-MM-DD`
    fn match_start(&self, text: &str) -> Option<String> {
        let caps = self.regex.captures(text)?;
        let (year, month, day) = match self.order {
            FieldOrder::YearMonthDay => (&caps[1], &caps[2], &caps[3]),
            FieldOrder::MonthDayYear => (&caps[3], &caps[1], &caps[2]),
        };
        Some(format!("{year}-{month}-{day}"))
    }
}

lazy_static! {
    static ref DATE_PATTERNS: Vec<DatePattern> = vec![
        DatePattern::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})", FieldOrder::YearMonthDay),
        DatePattern::new(r"^([0-9]{2})/([0-9]{2})/([0-9]{4})", FieldOrder::MonthDayYear),
        DatePattern::new(r"^([0-9]{2})-([0-9]{2})-([0-9]{4})", FieldOrder::MonthDayYear),
    ];
}

/// Finds the first date-like substring in `text` and normalizes it to `YYYY-MM-DD`.
///
/// # Errors
/// Returns `FoodrecError::NoDateFound` if no offset matches any pattern.
pub fn extract_date(text: &str) -> Result<String> {
    for (offset, _) in text.char_indices() {
        let rest = &text[offset..];
        if let Some(date) = DATE_PATTERNS.iter().find_map(|p| p.match_start(rest)) {
            log::debug!("Extracted date {} at offset {}", date, offset);
            return Ok(date);
        }
    }

    log::warn!("No date found in {} characters of text", text.chars().count());
    Err(FoodrecError::NoDateFound)
}

#[cfg(test)]
#[path = "date_extract_tests.rs"]
mod tests;
