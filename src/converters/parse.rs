//! Converter for any `FromStr` type.

use super::Converter;
use crate::error::ConvertError;
use std::fmt::{self, Display};
use std::marker::PhantomData;
use std::str::FromStr;

/// Converter for numbers, booleans and anything else implementing `FromStr`.
///
/// Surrounding whitespace is trimmed before parsing.
///
/// # Examples
///
/// ```rust
/// use hotswap_props::converters::{Converter, ParseConverter};
///
/// let ints = ParseConverter::<i64>::new();
/// assert_eq!(ints.decode(" 42 ").unwrap(), 42);
/// assert!(ints.decode("forty-two").is_err());
/// ```
pub struct ParseConverter<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> ParseConverter<T> {
    /// Create a new converter.
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for ParseConverter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ParseConverter<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ParseConverter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ParseConverter<{}>", std::any::type_name::<T>())
    }
}

impl<T> Converter<T> for ParseConverter<T>
where
    T: FromStr + Display,
    T::Err: Display,
{
    fn decode(&self, raw: &str) -> Result<T, ConvertError> {
        raw.trim().parse::<T>().map_err(|e| {
            ConvertError::new(format!(
                "cannot parse '{}' as {}: {}",
                raw,
                std::any::type_name::<T>(),
                e
            ))
        })
    }

    fn encode(&self, value: &T) -> String {
        value.to_string()
    }
}
