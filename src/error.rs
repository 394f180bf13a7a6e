//! Error types for hotswap-props.

use std::fmt;

/// Result type alias for hotswap-props operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur when binding, resolving or reading properties.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A registry was built without any source.
    #[error("Cannot initialize a registry without any sources")]
    NoSources,

    /// The key is already bound to a different property handle.
    #[error("Prop with key '{key}' was already bound to another handle")]
    DuplicateProp {
        /// The contested key
        key: String,
    },

    /// A pin or builder referenced a source id that was never registered.
    #[error("Source '{0}' is not registered with the current registry")]
    UnknownSource(String),

    /// Property keys must be non-empty.
    #[error("Invalid property key: '{0}'")]
    InvalidKey(String),

    /// A registry setting is out of range.
    #[error("Invalid registry setting: {0}")]
    InvalidSetting(String),

    /// The registry needs a tokio runtime for its background tasks.
    #[error("No tokio runtime available to drive the registry")]
    RuntimeUnavailable,

    /// A property value was rejected by validation.
    #[error("Prop validation failed: {0}")]
    ValidationError(#[from] ValidationError),

    /// A source supplied a raw value that could not be decoded.
    #[error("Failed to decode '{key}' supplied by source '{source_id}': {reason}")]
    DecodeError {
        /// The property key
        key: String,
        /// Id of the source that supplied the raw value
        source_id: String,
        /// Why the converter rejected the value
        reason: String,
    },

    /// A typed retrieve asked for the wrong value type.
    #[error("Prop '{key}' is not bound with value type {expected}")]
    TypeMismatch {
        /// The property key
        key: String,
        /// The requested value type
        expected: &'static str,
    },

    /// Failed to load values from a source.
    #[error("Failed to load properties: {0}")]
    LoadError(String),

    /// IO error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Error returned by a [`Converter`](crate::converters::Converter) that cannot
/// parse a raw value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ConvertError(String);

impl ConvertError {
    /// Create a conversion error with a message.
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Validation error raised by a property's read or write hooks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required property had neither a value nor a default.
    Required {
        /// The property key
        key: String,
    },

    /// A specific value was rejected.
    InvalidValue {
        /// The property key
        key: String,
        /// The reason why it's invalid
        reason: String,
    },

    /// Custom validation error with a message.
    Custom(String),
}

impl ValidationError {
    /// Create a custom validation error.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    /// Create an invalid value error.
    pub fn invalid_value(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required { key } => write!(
                f,
                "Prop '{}' is required, but neither a value or a default were specified",
                key
            ),
            Self::InvalidValue { key, reason } => {
                write!(f, "Prop '{}' has an invalid value: {}", key, reason)
            }
            Self::Custom(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}
