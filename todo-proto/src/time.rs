//! Timestamp helpers.
//!
//! Timestamps travel as ISO-8601 UTC strings with millisecond precision
//! (`2026-01-20T00:00:00.000Z`). Values produced by [`now`] and
//! [`parse_due_date`] are truncated to that precision so that a stored value
//! serializes and parses back to the same instant.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};

use crate::ProtoError;

/// Naive date-time layouts accepted for due dates; interpreted as UTC.
const NAIVE_DATE_TIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Returns the current instant truncated to millisecond precision.
#[must_use]
pub fn now() -> DateTime<Utc> {
    truncate_to_millis(Utc::now())
}

/// Drops sub-millisecond precision from an instant.
#[must_use]
pub fn truncate_to_millis(value: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(value.timestamp_millis()).unwrap_or(value)
}

/// Formats an instant the way it appears on the wire.
#[must_use]
pub fn format(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses a client-supplied due date.
///
/// Accepts a date only (`2026-01-21`, midnight UTC), an RFC 3339 date-time,
/// or a naive date-time without offset (treated as UTC).
///
/// # Errors
///
/// Returns [`ProtoError::InvalidDueDate`] if none of the layouts match.
pub fn parse_due_date(input: &str) -> Result<DateTime<Utc>, ProtoError> {
    let trimmed = input.trim();

    if let Ok(value) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(truncate_to_millis(value.with_timezone(&Utc)));
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }
    NAIVE_DATE_TIME_FORMATS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(trimmed, layout).ok())
        .map(|naive| truncate_to_millis(naive.and_utc()))
        .ok_or_else(|| ProtoError::InvalidDueDate(input.to_string()))
}

/// Serde adapter for a required wire timestamp.
pub mod iso8601 {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serializes as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format(value))
    }

    /// Deserializes any RFC 3339 timestamp.
    ///
    /// # Errors
    ///
    /// Fails if the string is not RFC 3339.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|value| value.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for a nullable wire timestamp.
pub mod iso8601_option {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serializes `Some` like [`super::iso8601`] and `None` as `null`.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => serializer.serialize_some(&super::format(value)),
            None => serializer.serialize_none(),
        }
    }

    /// Deserializes `null` or an RFC 3339 timestamp.
    ///
    /// # Errors
    ///
    /// Fails if a present string is not RFC 3339.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| {
                DateTime::parse_from_rfc3339(&raw)
                    .map(|value| value.with_timezone(&Utc))
                    .map_err(serde::de::Error::custom)
            })
            .transpose()
    }
}
