//! Timezone-naive bar timestamps.
//!
//! Providers report bar times as exchange wall-clock text in one of three
//! shapes: `2024-01-02`, `2024-01-02 10:30:00` (or without seconds), and the
//! compact `202401021030`. All of them parse into a [`PrimitiveDateTime`];
//! date-only values land on midnight.

use serde::Serializer;
use time::macros::format_description;
use time::{Date, PrimitiveDateTime, Time};

use crate::ValidationError;

/// Parse a provider bar time into a naive timestamp.
pub fn parse_bar_timestamp(input: &str) -> Result<PrimitiveDateTime, ValidationError> {
    let trimmed = input.trim();
    let invalid = || ValidationError::InvalidTimestamp {
        value: input.to_owned(),
    };

    if trimmed.len() == 12 && trimmed.bytes().all(|byte| byte.is_ascii_digit()) {
        let expanded = format!(
            "{}-{}-{} {}:{}",
            &trimmed[0..4],
            &trimmed[4..6],
            &trimmed[6..8],
            &trimmed[8..10],
            &trimmed[10..12]
        );
        return PrimitiveDateTime::parse(
            &expanded,
            format_description!("[year]-[month]-[day] [hour]:[minute]"),
        )
        .map_err(|_| invalid());
    }

    if let Ok(value) = PrimitiveDateTime::parse(
        trimmed,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    ) {
        return Ok(value);
    }

    if let Ok(value) = PrimitiveDateTime::parse(
        trimmed,
        format_description!("[year]-[month]-[day] [hour]:[minute]"),
    ) {
        return Ok(value);
    }

    Date::parse(trimmed, format_description!("[year]-[month]-[day]"))
        .map(|date| PrimitiveDateTime::new(date, Time::MIDNIGHT))
        .map_err(|_| invalid())
}

/// Parse a caller-supplied end date.
///
/// Empty input means "through latest". Anything after the first space is a
/// time-of-day and is ignored, so `2024-01-02 15:00` bounds on `2024-01-02`.
pub fn parse_end_date(input: &str) -> Result<Option<Date>, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let date_part = trimmed.split(' ').next().unwrap_or(trimmed);
    Date::parse(date_part, format_description!("[year]-[month]-[day]"))
        .map(Some)
        .map_err(|_| ValidationError::InvalidEndDate {
            value: input.to_owned(),
        })
}

/// `YYYY-MM-DD`, the form provider query strings expect.
pub fn format_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// `YYYY-MM-DD HH:MM:SS`, the serialized form of every bar timestamp.
pub fn format_bar_timestamp(value: PrimitiveDateTime) -> String {
    format!(
        "{} {:02}:{:02}:{:02}",
        format_date(value.date()),
        value.hour(),
        value.minute(),
        value.second()
    )
}

pub(crate) fn serialize_bar_timestamp<S>(
    value: &PrimitiveDateTime,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_bar_timestamp(*value))
}
