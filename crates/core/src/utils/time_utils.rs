use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use crate::constants::SECONDS_PER_DAY;

/// Converts UNIX seconds to a UTC instant. `None` when out of chrono's range.
pub fn instant_from_timestamp(timestamp: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(timestamp, 0)
}

/// UTC calendar day containing the given UNIX timestamp.
///
/// This is the single source of truth for bucketing timestamps into days; both
/// the snapshot index and the valuator go through it.
pub fn day_from_timestamp(timestamp: i64) -> Option<NaiveDate> {
    instant_from_timestamp(timestamp).map(|instant| instant.date_naive())
}

/// UNIX timestamp of UTC midnight starting the given day.
pub fn day_start_timestamp(day: NaiveDate) -> i64 {
    day.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

/// UNIX timestamp of the last second of the given day.
pub fn day_end_timestamp(day: NaiveDate) -> i64 {
    day_start_timestamp(day) + SECONDS_PER_DAY - 1
}

/// ISO-8601 instant for UTC midnight of `day`, e.g. `2024-03-01T00:00:00.000Z`.
pub fn iso_day_start(day: NaiveDate) -> String {
    match instant_from_timestamp(day_start_timestamp(day)) {
        Some(instant) => instant.to_rfc3339_opts(SecondsFormat::Millis, true),
        None => format!("{}T00:00:00.000Z", day.format("%Y-%m-%d")),
    }
}
