//! Time & Date: Unix timestamps to calendar dates and back. All times are UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use convkit_core::{ConvertError, Descriptor, Operation, Registry, Validation};

const CATEGORY: &str = "time-date";

/// Naive layouts accepted by `date-to-timestamp`, interpreted as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];

pub(crate) fn register(registry: &mut Registry) {
    registry.register(
        Operation::text(
            Descriptor::new("timestamp-to-date", "Timestamp to Date", CATEGORY)
                .description("Convert Unix timestamp to human readable date")
                .tags(["timestamp", "date", "unix"])
                .placeholder("1700000000"),
            |input, _| timestamp_to_date(input.trim()),
        )
        .validate_with(|input, _| {
            if input
                .unwrap_or_default()
                .trim()
                .chars()
                .all(|c| c.is_ascii_digit())
            {
                Validation::Valid
            } else {
                Validation::invalid("Input must be a valid Unix timestamp")
            }
        }),
    );

    registry.register(Operation::text(
        Descriptor::new("date-to-timestamp", "Date to Timestamp", CATEGORY)
            .description("Convert date to Unix timestamp")
            .tags(["date", "timestamp", "unix"])
            .placeholder("2024-01-01T00:00:00Z"),
        |input, _| {
            let date = parse_date(input.trim())
                .ok_or_else(|| ConvertError::failed("Invalid date format"))?;
            Ok(date.timestamp().to_string())
        },
    ));
}

/// ISO 8601 with milliseconds on the first line, a readable form on the second.
fn timestamp_to_date(input: &str) -> Result<String, ConvertError> {
    let date = input
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or_else(|| ConvertError::failed("Timestamp out of range"))?;

    Ok(format!(
        "{}\n{}",
        date.to_rfc3339_opts(SecondsFormat::Millis, true),
        date.format("%A, %B %-d, %Y %H:%M:%S UTC"),
    ))
}

fn parse_date(input: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(input) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(date) = DateTime::parse_from_rfc2822(input) {
        return Some(date.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
