//! Parsing of user-supplied and OCR-extracted dates
//!
//! Three formats are accepted, tried in order:
//! - `YYYY-MM-DD`
//! - `MM/DD/YYYY`
//! - `DD/MM/YYYY`
//!
//! The two slash formats overlap. `03/04/2024` is always read month-first
//! (March 4); day-first only applies when the month-first reading is not a
//! valid calendar date, e.g. `13/04/2024`.

use crate::error::{FoodrecError, Result};
use chrono::{DateTime, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

/// Accepted input formats in priority order
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y"];

/// Output format used wherever a best-by date is printed
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d";

/// Parses a date string into local midnight of that day.
///
/// # Errors
/// Returns `FoodrecError::DateParse` if none of the accepted formats match.
pub fn parse_date(text: &str) -> Result<DateTime<Local>> {
    let trimmed = text.trim();

    let date = DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| {
            log::debug!("No date format matched '{}'", trimmed);
            FoodrecError::DateParse(text.to_string())
        })?;

    let midnight = date.and_time(NaiveTime::MIN);
    to_local(&Local, midnight).ok_or_else(|| FoodrecError::DateParse(text.to_string()))
}

/// Resolves a naive local time to an instant.
///
/// Ambiguous times (clocks turned back) take the earlier instant. Times in a
/// DST gap move forward hour by hour until they exist.
fn to_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    let mut candidate = naive;
    for _ in 0..4 {
        match tz.from_local_datetime(&candidate) {
            LocalResult::Single(instant) => return Some(instant),
            LocalResult::Ambiguous(earliest, _) => return Some(earliest),
            LocalResult::None => candidate += Duration::hours(1),
        }
    }
    None
}

/// Renders the local calendar date of an instant as `YYYY-MM-DD`
pub fn format_date(instant: &DateTime<Local>) -> String {
    instant.format(DISPLAY_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Offset, Timelike};
    use chrono_tz::America::{Havana, Sao_Paulo};

    fn midnight(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_time(NaiveTime::MIN)
    }

    fn ymd(instant: &DateTime<Local>) -> (i32, u32, u32) {
        (instant.year(), instant.month(), instant.day())
    }

    #[test]
    fn parses_iso_dates() {
        let parsed = parse_date("2024-06-01").unwrap();
        assert_eq!(ymd(&parsed), (2024, 6, 1));
        assert_eq!(parsed.second(), 0);
    }

    #[test]
    fn iso_dates_round_trip() {
        for input in ["2024-01-01", "2024-02-29", "2023-12-31", "1999-07-04", "2030-10-15"] {
            let parsed = parse_date(input).unwrap();
            assert_eq!(format_date(&parsed), input);
        }
    }

    #[test]
    fn slash_dates_prefer_month_first() {
        let parsed = parse_date("03/04/2024").unwrap();
        assert_eq!(ymd(&parsed), (2024, 3, 4));
    }

    #[test]
    fn slash_dates_fall_back_to_day_first() {
        let parsed = parse_date("13/04/2024").unwrap();
        assert_eq!(ymd(&parsed), (2024, 4, 13));
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let parsed = parse_date("  2024-06-15\n").unwrap();
        assert_eq!(ymd(&parsed), (2024, 6, 15));
    }

    #[test]
    fn midnight_in_dst_gap_moves_forward_an_hour() {
        // Sao Paulo skipped 00:00-01:00 on 2018-11-04
        let resolved = to_local(&Sao_Paulo, midnight(2018, 11, 4)).unwrap();
        assert_eq!(resolved.naive_local(), midnight(2018, 11, 4) + Duration::hours(1));
        assert_eq!(resolved.offset().fix().local_minus_utc(), -2 * 3600);
    }

    #[test]
    fn ambiguous_midnight_takes_earliest_instant() {
        // Havana repeated 00:00-01:00 on 2018-11-04
        let resolved = to_local(&Havana, midnight(2018, 11, 4)).unwrap();
        assert_eq!(resolved.naive_local(), midnight(2018, 11, 4));
        assert_eq!(resolved.offset().fix().local_minus_utc(), -4 * 3600);
    }

    #[test]
    fn unambiguous_midnight_is_kept() {
        let resolved = to_local(&Sao_Paulo, midnight(2018, 6, 1)).unwrap();
        assert_eq!(resolved.naive_local(), midnight(2018, 6, 1));
    }

    #[test]
    fn rejects_free_text() {
        let err = parse_date("next tuesday").unwrap_err();
        assert!(matches!(err, FoodrecError::DateParse(ref s) if s == "next tuesday"));
    }

    #[test]
    fn rejects_impossible_calendar_dates() {
        assert!(parse_date("2024-13-99").is_err());
        assert!(parse_date("2023-02-29").is_err());
        assert!(parse_date("13/13/2024").is_err());
    }

    #[test]
    fn rejects_trailing_garbage() {
        assert!(parse_date("2024-06-01 extra").is_err());
        assert!(parse_date("").is_err());
    }
}
