//! Converter trait.

use crate::error::ConvertError;

/// Strategy converting between a raw string and one property's typed value.
///
/// Implement this trait to support custom value types.
///
/// # Examples
///
/// ```rust
/// use hotswap_props::converters::Converter;
/// use hotswap_props::error::ConvertError;
///
/// struct Port;
///
/// impl Converter<u16> for Port {
///     fn decode(&self, raw: &str) -> Result<u16, ConvertError> {
///         let port: u16 = raw.trim().parse().map_err(|_| ConvertError::new("not a port"))?;
///         if port < 1024 {
///             return Err(ConvertError::new("privileged port"));
///         }
///         Ok(port)
///     }
///
///     fn encode(&self, value: &u16) -> String {
///         value.to_string()
///     }
/// }
///
/// assert_eq!(Port.decode("8080").unwrap(), 8080);
/// assert!(Port.decode("80").is_err());
/// ```
pub trait Converter<T>: Send + Sync {
    /// Decode a raw value read from a source.
    ///
    /// # Errors
    ///
    /// Returns a `ConvertError` if the raw value is not a valid `T`.
    fn decode(&self, raw: &str) -> Result<T, ConvertError>;

    /// Render a value back into its raw form.
    fn encode(&self, value: &T) -> String;
}

/// Identity converter for string properties.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringConverter;

impl Converter<String> for StringConverter {
    fn decode(&self, raw: &str) -> Result<String, ConvertError> {
        Ok(raw.to_string())
    }

    fn encode(&self, value: &String) -> String {
        value.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_keeps_whitespace() {
        assert_eq!(StringConverter.decode("  padded ").unwrap(), "  padded ");
        assert_eq!(StringConverter.encode(&"v".to_string()), "v");
    }
}
