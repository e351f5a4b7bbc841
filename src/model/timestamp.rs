//! RFC 3339 timestamps on the wire.
//!
//! The backend emits offset-less ISO 8601 (`2024-05-01T10:00:00.123456`);
//! those are read as UTC.

use serde::{Deserialize, Deserializer, Serializer};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub(crate) fn parse(s: &str) -> Result<OffsetDateTime, time::error::Parse> {
    let s = s.trim();
    match OffsetDateTime::parse(s, &Rfc3339) {
        Ok(t) => Ok(t),
        Err(err) => {
            // Retry as UTC only when the value carries no offset of its own.
            let has_offset = s.ends_with('Z')
                || s.ends_with('z')
                || s.rsplit_once('T')
                    .is_some_and(|(_, t)| t.contains('+') || t.contains('-'));
            if has_offset {
                return Err(err);
            }
            OffsetDateTime::parse(&format!("{}Z", s), &Rfc3339)
        }
    }
}

pub(crate) fn format(t: &OffsetDateTime) -> String {
    t.format(&Rfc3339)
        .unwrap_or_else(|_| t.unix_timestamp().to_string())
}

pub(crate) fn serialize<S: Serializer>(t: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format(t))
}

pub(crate) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<OffsetDateTime, D::Error> {
    let s = String::deserialize(deserializer)?;
    parse(&s).map_err(serde::de::Error::custom)
}

#[cfg(test)]
#[path = "../tests/model/timestamp_tests.rs"]
mod tests;
