//! RFC 3339 timestamp converter.

use super::Converter;
use crate::error::ConvertError;
use chrono::{DateTime, SecondsFormat, Utc};

/// Converter for RFC 3339 timestamps, normalised to UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampConverter;

impl Converter<DateTime<Utc>> for TimestampConverter {
    fn decode(&self, raw: &str) -> Result<DateTime<Utc>, ConvertError> {
        DateTime::parse_from_rfc3339(raw.trim())
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(|e| ConvertError::new(format!("'{}' is not a valid date/time: {}", raw, e)))
    }

    fn encode(&self, value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}
