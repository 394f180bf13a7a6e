//! JSON converter for structured property values.

use super::Converter;
use crate::error::ConvertError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;

/// Converter decoding a raw JSON document into any deserializable type.
///
/// # Examples
///
/// ```rust
/// use hotswap_props::converters::{Converter, JsonConverter};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Deserialize, Serialize, PartialEq)]
/// struct Limits {
///     rps: u32,
/// }
///
/// let conv = JsonConverter::<Limits>::new();
/// assert_eq!(conv.decode(r#"{"rps": 10}"#).unwrap(), Limits { rps: 10 });
/// ```
pub struct JsonConverter<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonConverter<T> {
    /// Create a new converter.
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonConverter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Converter<T> for JsonConverter<T>
where
    T: DeserializeOwned + Serialize,
{
    fn decode(&self, raw: &str) -> Result<T, ConvertError> {
        serde_json::from_str(raw).map_err(|e| ConvertError::new(format!("invalid JSON: {}", e)))
    }

    fn encode(&self, value: &T) -> String {
        serde_json::to_string(value).unwrap_or_default()
    }
}
