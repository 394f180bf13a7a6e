//! Property validation support.

use crate::error::ValidationError;
use std::sync::Arc;

/// Validation hook run against a property value.
pub type Validator<T> = Arc<dyn Fn(&T) -> Result<(), ValidationError> + Send + Sync>;

/// Trait for self-validating property values.
///
/// Implement this trait on a value type and call
/// [`PropBuilder::validated`](crate::core::PropBuilder::validated) to reject
/// invalid values before they replace a property's current value.
///
/// # Examples
///
/// ```rust
/// use hotswap_props::core::Validate;
/// use hotswap_props::error::ValidationError;
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct PoolSize(u32);
///
/// impl Validate for PoolSize {
///     fn validate(&self) -> Result<(), ValidationError> {
///         if self.0 == 0 {
///             return Err(ValidationError::custom("pool size must be greater than 0"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Validate {
    /// Validate the value.
    ///
    /// # Errors
    ///
    /// Should return a `ValidationError` describing what validation failed.
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Build a validator rejecting values outside `min..=max`.
///
/// # Examples
///
/// ```rust
/// use hotswap_props::core::range;
///
/// let check = range("server.port", 1024u16, 65535);
/// assert!(check(&8080).is_ok());
/// assert!(check(&80).is_err());
/// ```
pub fn range<T>(key: impl Into<String>, min: T, max: T) -> Validator<T>
where
    T: PartialOrd + std::fmt::Display + Send + Sync + 'static,
{
    let key = key.into();
    Arc::new(move |value: &T| {
        if *value < min || *value > max {
            return Err(ValidationError::invalid_value(
                key.clone(),
                format!("{} is outside {}..={}", value, min, max),
            ));
        }
        Ok(())
    })
}
