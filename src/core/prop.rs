//! Typed property handles.

use crate::converters::Converter;
use crate::core::resolver::Resolved;
use crate::core::validation::Validator;
use crate::error::{ConfigError, Result, ValidationError};
use arc_swap::ArcSwapOption;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

const REDACTED: &str = "<redacted>";

/// Optional attributes of a property.
pub struct PropOptions<T> {
    /// Value returned while no source supplies one
    pub default_value: Option<T>,
    /// Human-readable description
    pub description: Option<String>,
    /// Fail reads when neither a value nor a default is available
    pub required: bool,
    /// Redact the value when rendering the property
    pub secret: bool,
    /// Write-time hook, run before a new value replaces the current one
    pub validate_on_set: Option<Validator<T>>,
    /// Read-time hook, run after the required check on every read
    pub validate_on_get: Option<Validator<T>>,
}

impl<T> Default for PropOptions<T> {
    fn default() -> Self {
        Self {
            default_value: None,
            description: None,
            required: false,
            secret: false,
            validate_on_set: None,
            validate_on_get: None,
        }
    }
}

/// A typed, live configuration property.
///
/// `Prop` is a cheap handle: clones share the same underlying value. Once
/// bound into a [`PropRegistry`](crate::core::PropRegistry), the registry is
/// the only writer; readers always observe a complete value.
///
/// # Examples
///
/// ```rust
/// use hotswap_props::converters::ParseConverter;
/// use hotswap_props::core::{Prop, PropOptions};
///
/// let prop = Prop::new(
///     "pool.size",
///     ParseConverter::<u32>::new(),
///     PropOptions {
///         default_value: Some(8),
///         ..PropOptions::default()
///     },
/// )
/// .unwrap();
///
/// assert_eq!(prop.get().unwrap().as_deref(), Some(&8));
/// ```
pub struct Prop<T> {
    pub(crate) inner: Arc<PropInner<T>>,
}

pub(crate) struct PropInner<T> {
    key: String,
    default_value: Option<Arc<T>>,
    description: Option<String>,
    required: bool,
    secret: bool,
    current: ArcSwapOption<T>,
    converter: Arc<dyn Converter<T>>,
    validate_on_set: Option<Validator<T>>,
    validate_on_get: Option<Validator<T>>,
}

impl<T> Prop<T>
where
    T: Send + Sync + 'static,
{
    /// Create an unbound property.
    ///
    /// # Errors
    ///
    /// Returns `InvalidKey` if `key` is empty.
    pub fn new<C>(key: impl Into<String>, converter: C, options: PropOptions<T>) -> Result<Self>
    where
        C: Converter<T> + 'static,
    {
        Self::with_shared_converter(key, Arc::new(converter), options)
    }

    pub(crate) fn with_shared_converter(
        key: impl Into<String>,
        converter: Arc<dyn Converter<T>>,
        options: PropOptions<T>,
    ) -> Result<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(ConfigError::InvalidKey(key));
        }

        Ok(Self {
            inner: Arc::new(PropInner {
                key,
                default_value: options.default_value.map(Arc::new),
                description: options.description,
                required: options.required,
                secret: options.secret,
                current: ArcSwapOption::empty(),
                converter,
                validate_on_set: options.validate_on_set,
                validate_on_get: options.validate_on_get,
            }),
        })
    }

    /// Get the current value, falling back to the default.
    ///
    /// This is lock-free; concurrent updates are never observed half-written.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the property is required and has neither
    /// a value nor a default, or if the read-time hook rejects the value.
    pub fn get(&self) -> Result<Option<Arc<T>>> {
        let value = self.inner.effective();
        self.inner.validate_before_get(value.as_deref())?;
        Ok(value)
    }

    /// Replace the current value after running the write-time hook.
    pub(crate) fn set(&self, value: T) -> Result<()> {
        self.inner.set(value)
    }

    /// The property's key.
    pub fn key(&self) -> &str {
        &self.inner.key
    }

    /// The property's description, if any.
    pub fn description(&self) -> Option<&str> {
        self.inner.description.as_deref()
    }

    /// Whether reads fail when no value is available.
    pub fn is_required(&self) -> bool {
        self.inner.required
    }

    /// Whether the value is redacted when rendered.
    pub fn is_secret(&self) -> bool {
        self.inner.secret
    }

    /// The default value, if any.
    pub fn default_value(&self) -> Option<Arc<T>> {
        self.inner.default_value.clone()
    }

    /// Decode a raw value with this property's converter.
    ///
    /// # Errors
    ///
    /// Returns a `ConvertError` when the converter rejects the raw value.
    pub fn decode(&self, raw: &str) -> std::result::Result<T, crate::error::ConvertError> {
        self.inner.converter.decode(raw)
    }

    /// Encode a value with this property's converter.
    pub fn encode(&self, value: &T) -> String {
        self.inner.converter.encode(value)
    }

    /// The effective value rendered by the converter; `None` for secrets.
    pub fn encoded(&self) -> Option<String> {
        self.inner.encoded()
    }

    /// Decode a resolved raw value and run the write-time hook, without
    /// storing it.
    pub(crate) fn accept(&self, resolved: &Resolved) -> Result<T> {
        let value = self.inner.decode_resolved(resolved)?;
        self.inner.validate_before_set(&value)?;
        Ok(value)
    }

    /// Whether both handles share the same underlying property.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> PropInner<T> {
    fn effective(&self) -> Option<Arc<T>> {
        self.current
            .load_full()
            .or_else(|| self.default_value.clone())
    }

    fn validate_before_get(&self, value: Option<&T>) -> std::result::Result<(), ValidationError> {
        match value {
            None if self.required => Err(ValidationError::Required {
                key: self.key.clone(),
            }),
            Some(value) => match &self.validate_on_get {
                Some(hook) => hook(value),
                None => Ok(()),
            },
            None => Ok(()),
        }
    }

    fn validate_before_set(&self, value: &T) -> std::result::Result<(), ValidationError> {
        match &self.validate_on_set {
            Some(hook) => hook(value),
            None => Ok(()),
        }
    }

    fn set(&self, value: T) -> Result<()> {
        self.validate_before_set(&value)?;
        self.current.store(Some(Arc::new(value)));
        Ok(())
    }

    fn decode_resolved(&self, resolved: &Resolved) -> Result<T> {
        self.converter
            .decode(&resolved.raw)
            .map_err(|e| ConfigError::DecodeError {
                key: self.key.clone(),
                source_id: resolved.source_id.clone(),
                reason: e.to_string(),
            })
    }

    fn encoded(&self) -> Option<String> {
        if self.secret {
            return None;
        }
        self.effective().map(|value| self.converter.encode(&value))
    }
}

/// Type-erased view of a bound property, as returned by
/// [`PropRegistry::retrieve`](crate::core::PropRegistry::retrieve).
pub trait BoundProp: fmt::Display + Send + Sync {
    /// The property's key.
    fn key(&self) -> &str;

    /// The property's description, if any.
    fn description(&self) -> Option<&str>;

    /// Whether reads fail when no value is available.
    fn is_required(&self) -> bool;

    /// Whether the value is redacted when rendered.
    fn is_secret(&self) -> bool;

    /// The effective value rendered by the converter; `None` for secrets.
    fn encoded(&self) -> Option<String>;
}

/// Registry-side operations on a bound property.
pub(crate) trait Bindable: BoundProp {
    /// Store a freshly resolved value; returns whether the value changed.
    fn apply(&self, resolved: Option<Resolved>) -> Result<bool>;

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T> BoundProp for PropInner<T>
where
    T: Send + Sync + 'static,
{
    fn key(&self) -> &str {
        &self.key
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn is_required(&self) -> bool {
        self.required
    }

    fn is_secret(&self) -> bool {
        self.secret
    }

    fn encoded(&self) -> Option<String> {
        PropInner::encoded(self)
    }
}

impl<T> Bindable for PropInner<T>
where
    T: PartialEq + Send + Sync + 'static,
{
    fn apply(&self, resolved: Option<Resolved>) -> Result<bool> {
        // nothing to update if no source holds the key
        let Some(resolved) = resolved else {
            return Ok(false);
        };

        let value = self.decode_resolved(&resolved)?;
        if self.effective().as_deref() == Some(&value) {
            return Ok(false);
        }

        self.set(value)?;
        Ok(true)
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

impl<T> fmt::Display for PropInner<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // read once so the rendered value cannot change halfway
        match self.current.load_full() {
            Some(_) if self.secret => write!(f, "Prop{{{}={}}}", self.key, REDACTED),
            Some(value) => write!(f, "Prop{{{}={}}}", self.key, self.converter.encode(&value)),
            None => write!(f, "Prop{{{}=<unset>}}", self.key),
        }
    }
}

impl<T> fmt::Display for Prop<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt(f)
    }
}

impl<T> fmt::Debug for Prop<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Prop")
            .field("key", &self.inner.key)
            .field("required", &self.inner.required)
            .field("secret", &self.inner.secret)
            .field("value", &format_args!("{}", self.inner))
            .finish()
    }
}

impl<T> Clone for Prop<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
