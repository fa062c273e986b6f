//! Canonical text form for stored timestamps.
//!
//! Timestamps are written as ISO-8601 UTC with millisecond precision, e.g.
//! `2024-05-01T12:34:56.789Z`, and read back from any RFC 3339 string.
//! Use with `#[serde(with = "timestamp")]`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

pub fn format(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse(text: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(text.trim()).map(|parsed| parsed.with_timezone(&Utc))
}

pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(value))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    parse(&text).map_err(|err| serde::de::Error::custom(format!("invalid timestamp '{text}': {err}")))
}
