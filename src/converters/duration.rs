//! Duration converter.

use super::Converter;
use crate::error::ConvertError;
use std::time::Duration;

/// Converter for `std::time::Duration` values.
///
/// Accepts an integer followed by an optional unit: `ms`, `s`, `m`, `h` or
/// `d`. A bare number is read as seconds.
///
/// # Examples
///
/// ```rust
/// use hotswap_props::converters::{Converter, DurationConverter};
/// use std::time::Duration;
///
/// assert_eq!(DurationConverter.decode("500ms").unwrap(), Duration::from_millis(500));
/// assert_eq!(DurationConverter.decode("30").unwrap(), Duration::from_secs(30));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DurationConverter;

impl Converter<Duration> for DurationConverter {
    fn decode(&self, raw: &str) -> Result<Duration, ConvertError> {
        let value = raw.trim();
        let split = value
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(value.len());
        let (digits, unit) = value.split_at(split);

        let amount: u64 = digits
            .parse()
            .map_err(|_| ConvertError::new(format!("cannot parse '{}' as a duration", raw)))?;

        let secs_per_unit = match unit.trim() {
            "ms" => return Ok(Duration::from_millis(amount)),
            "" | "s" => 1,
            "m" => 60,
            "h" => 60 * 60,
            "d" => 24 * 60 * 60,
            other => {
                return Err(ConvertError::new(format!(
                    "unknown duration unit '{}' in '{}'",
                    other, raw
                )));
            }
        };

        amount
            .checked_mul(secs_per_unit)
            .map(Duration::from_secs)
            .ok_or_else(|| ConvertError::new(format!("duration '{}' is too large", raw)))
    }

    fn encode(&self, value: &Duration) -> String {
        if value.subsec_nanos() == 0 {
            format!("{}s", value.as_secs())
        } else {
            format!("{}ms", value.as_millis())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units() {
        assert_eq!(DurationConverter.decode("5m").unwrap(), Duration::from_secs(300));
        assert_eq!(DurationConverter.decode("2h").unwrap(), Duration::from_secs(7200));
        assert_eq!(DurationConverter.decode("1d").unwrap(), Duration::from_secs(86_400));
        assert_eq!(DurationConverter.decode(" 10s ").unwrap(), Duration::from_secs(10));
    }

    #[test]
    fn test_invalid() {
        assert!(DurationConverter.decode("").is_err());
        assert!(DurationConverter.decode("ten").is_err());
        assert!(DurationConverter.decode("10y").is_err());
    }

    #[test]
    fn test_encode() {
        assert_eq!(DurationConverter.encode(&Duration::from_secs(30)), "30s");
        assert_eq!(DurationConverter.encode(&Duration::from_millis(1500)), "1500ms");
    }
}
