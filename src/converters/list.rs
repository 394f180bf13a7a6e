//! Delimited list converter.

use super::Converter;
use crate::error::ConvertError;

/// Converter splitting a raw value on a separator and decoding every element
/// with an inner converter.
///
/// Elements are trimmed. An element the inner converter rejects fails the
/// whole value; nothing is silently dropped.
///
/// # Examples
///
/// ```rust
/// use hotswap_props::converters::{Converter, ListConverter, ParseConverter};
///
/// let conv = ListConverter::new(ParseConverter::<u32>::new(), ",");
/// assert_eq!(conv.decode("1, 2,3").unwrap(), vec![1, 2, 3]);
/// assert!(conv.decode("1,x").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct ListConverter<C> {
    inner: C,
    separator: String,
}

impl<C> ListConverter<C> {
    /// Create a list converter.
    pub fn new(inner: C, separator: impl Into<String>) -> Self {
        Self {
            inner,
            separator: separator.into(),
        }
    }
}

impl<T, C> Converter<Vec<T>> for ListConverter<C>
where
    C: Converter<T>,
{
    fn decode(&self, raw: &str) -> Result<Vec<T>, ConvertError> {
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        raw.split(self.separator.as_str())
            .enumerate()
            .map(|(index, item)| {
                self.inner.decode(item.trim()).map_err(|e| {
                    ConvertError::new(format!("element {} of '{}': {}", index, raw, e))
                })
            })
            .collect()
    }

    fn encode(&self, value: &Vec<T>) -> String {
        value
            .iter()
            .map(|item| self.inner.encode(item))
            .collect::<Vec<_>>()
            .join(&self.separator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converters::{DurationConverter, StringConverter};
    use std::time::Duration;

    #[test]
    fn test_empty_is_empty_list() {
        let conv = ListConverter::new(StringConverter, ",");
        assert!(conv.decode("").unwrap().is_empty());
    }

    #[test]
    fn test_custom_separator() {
        let conv = ListConverter::new(DurationConverter, ";");
        assert_eq!(
            conv.decode("1s;2m").unwrap(),
            vec![Duration::from_secs(1), Duration::from_secs(120)]
        );
        assert_eq!(
            conv.encode(&vec![Duration::from_secs(1), Duration::from_secs(2)]),
            "1s;2s"
        );
    }

    #[test]
    fn test_error_names_element() {
        let conv = ListConverter::new(DurationConverter, ",");
        let err = conv.decode("1s,bogus").unwrap_err();
        assert!(err.to_string().contains("element 1"));
    }
}
