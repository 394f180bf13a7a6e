//! Fluent construction of properties bound to a registry.

use crate::converters::Converter;
use crate::core::validation::Validate;
use crate::core::{Prop, PropOptions, PropRegistry};
use crate::error::{Result, ValidationError};
use std::sync::Arc;

/// Builder for a property, created by [`PropRegistry::prop`] or
/// [`PropRegistry::prop_with`].
///
/// # Examples
///
/// ```rust,no_run
/// use hotswap_props::prelude::*;
/// use hotswap_props::converters::DurationConverter;
/// use std::time::Duration;
///
/// # async fn example(registry: PropRegistry) -> Result<()> {
/// let timeout = registry
///     .prop_with("http.timeout", DurationConverter)
///     .default_value(Duration::from_secs(5))
///     .description("Upstream request timeout")
///     .build()
///     .await?;
///
/// let password = registry
///     .prop("db.password")
///     .required(true)
///     .secret(true)
///     .source("VAULT")?
///     .build()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct PropBuilder<'a, T> {
    registry: &'a PropRegistry,
    key: String,
    converter: Arc<dyn Converter<T>>,
    options: PropOptions<T>,
    source_id: Option<String>,
}

impl<'a, T> PropBuilder<'a, T>
where
    T: PartialEq + Send + Sync + 'static,
{
    pub(crate) fn new(
        registry: &'a PropRegistry,
        key: String,
        converter: Arc<dyn Converter<T>>,
    ) -> Self {
        Self {
            registry,
            key,
            converter,
            options: PropOptions::default(),
            source_id: None,
        }
    }

    /// Read this property from one source only, bypassing priority order.
    ///
    /// # Errors
    ///
    /// Returns `UnknownSource` if `source_id` does not name a registered
    /// source.
    pub fn source(mut self, source_id: impl Into<String>) -> Result<Self> {
        let source_id = source_id.into();
        self.registry.validate_source(&source_id)?;
        self.source_id = Some(source_id);
        Ok(self)
    }

    /// Value returned while no source supplies one.
    pub fn default_value(mut self, value: T) -> Self {
        self.options.default_value = Some(value);
        self
    }

    /// Human-readable description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.options.description = Some(description.into());
        self
    }

    /// Fail reads when neither a value nor a default is available.
    pub fn required(mut self, required: bool) -> Self {
        self.options.required = required;
        self
    }

    /// Redact the value when the property is rendered.
    pub fn secret(mut self, secret: bool) -> Self {
        self.options.secret = secret;
        self
    }

    /// Check values before they replace the current one.
    pub fn validate_on_set<F>(mut self, validator: F) -> Self
    where
        F: Fn(&T) -> std::result::Result<(), ValidationError> + Send + Sync + 'static,
    {
        self.options.validate_on_set = Some(Arc::new(validator));
        self
    }

    /// Check values on every read, after the required check.
    pub fn validate_on_get<F>(mut self, validator: F) -> Self
    where
        F: Fn(&T) -> std::result::Result<(), ValidationError> + Send + Sync + 'static,
    {
        self.options.validate_on_get = Some(Arc::new(validator));
        self
    }

    /// Check values with their [`Validate`] implementation before they
    /// replace the current one.
    pub fn validated(self) -> Self
    where
        T: Validate,
    {
        self.validate_on_set(|value: &T| value.validate())
    }

    /// Create the property, bind it to the registry and return the live
    /// handle.
    ///
    /// # Errors
    ///
    /// See [`PropRegistry::bind`].
    pub async fn build(self) -> Result<Prop<T>> {
        let registry = self.registry;
        let source_id = self.source_id;
        let prop = Prop::with_shared_converter(self.key, self.converter, self.options)?;
        registry.bind(prop, source_id.as_deref()).await
    }

    /// Read the property's value once without binding it.
    ///
    /// The property does not take part in refresh cycles. The default value
    /// and the required check apply as for a bound property.
    ///
    /// # Errors
    ///
    /// Returns an error if the source id is unknown, the value cannot be
    /// decoded, or validation fails.
    pub async fn read_once(self) -> Result<Option<Arc<T>>> {
        let registry = self.registry;
        let source_id = self.source_id;
        let prop = Prop::with_shared_converter(self.key, self.converter, self.options)?;

        if let Some(value) = registry.resolve(&prop, source_id.as_deref()).await? {
            prop.set(value)?;
        }
        prop.get()
    }
}
