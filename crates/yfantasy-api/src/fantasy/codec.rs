//! Scalar codecs for the non-standard encodings used in fantasy responses.
//!
//! The API encodes booleans as `0`/`1` text and dates as `YYYY-MM-DD`.
//! Each codec is exposed both as a plain parser and as a serde
//! `deserialize_with` adapter so record types bind them per field.

use chrono::NaiveDate;
use serde::de::Error;
use serde::{Deserialize, Deserializer};

use crate::error::ScalarError;

/// `chrono` format string for calendar dates.
const CALENDAR_DATE_FORMAT: &str = "%Y-%m-%d";

/// Human-readable pattern reported in date errors.
const CALENDAR_DATE_PATTERN: &str = "YYYY-MM-DD";

/// Parses an integer-as-boolean flag.
///
/// The text is read as an integer first, so `"01"` and `"+1"` are `true`.
/// Surrounding whitespace is ignored.
///
/// # Errors
///
/// Returns [`ScalarError::BoolFlag`] for non-integers and for integers
/// other than 0 and 1.
pub fn parse_bool_flag(raw: &str) -> Result<bool, ScalarError> {
    match raw.trim().parse::<i64>() {
        Ok(0) => Ok(false),
        Ok(1) => Ok(true),
        _ => Err(ScalarError::BoolFlag {
            raw: String::from(raw),
        }),
    }
}

/// Parses a `YYYY-MM-DD` calendar date.
///
/// # Errors
///
/// Returns [`ScalarError::CalendarDate`] when the text is not exactly four
/// digits, dash, two digits, dash, two digits, or names an impossible date.
pub fn parse_calendar_date(raw: &str) -> Result<NaiveDate, ScalarError> {
    let text = raw.trim();
    let invalid = || ScalarError::CalendarDate {
        raw: String::from(raw),
        expected: CALENDAR_DATE_PATTERN,
    };

    let well_formed = text.len() == CALENDAR_DATE_PATTERN.len()
        && text.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return Err(invalid());
    }

    NaiveDate::parse_from_str(text, CALENDAR_DATE_FORMAT).map_err(|_| invalid())
}

/// Deserializes an integer-as-boolean element.
pub fn bool_from_int<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_bool_flag(&raw).map_err(D::Error::custom)
}

/// Deserializes a `YYYY-MM-DD` element into a [`NaiveDate`].
pub fn date_from_string<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_calendar_date(&raw).map_err(D::Error::custom)
}

/// Deserializes empty strings as `None` (for `String` fields).
pub fn deserialize_empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.filter(|s| !s.is_empty()))
}

/// Deserializes empty strings as `None` (for `u32` fields).
pub fn deserialize_empty_string_as_none_u32<'de, D>(
    deserializer: D,
) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => v
            .parse::<u32>()
            .map(Some)
            .map_err(|e| D::Error::custom(format!("failed to parse u32 from {v:?}: {e}"))),
    }
}
