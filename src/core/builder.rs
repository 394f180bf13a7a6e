//! Builder for constructing PropRegistry instances.

use crate::core::PropRegistry;
use crate::core::resolver::SourceEntry;
use crate::error::{ConfigError, Result};
use crate::sources::PropSource;
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "metrics")]
use crate::metrics::RefreshMetrics;

const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);
const DEFAULT_SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(30);

/// Builder for constructing a `PropRegistry` instance.
///
/// Sources are consulted in reverse registration order: the last source added
/// has the highest priority.
///
/// # Examples
///
/// ```rust,no_run
/// use hotswap_props::prelude::*;
/// use hotswap_props::sources::{EnvSource, FileSource};
/// use std::time::Duration;
///
/// # async fn example() -> Result<()> {
/// let registry = PropRegistry::builder()
///     .with_source("DEFAULTS", FileSource::new("config/default.yaml"))
///     .with_source("LOCAL", FileSource::new("config/local.yaml").optional())
///     .with_default_source(EnvSource::with_prefix("APP").separator("__"))
///     .refresh_interval(Duration::from_secs(10))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct PropRegistryBuilder {
    sources: Vec<(String, Arc<dyn PropSource>)>,
    refresh_interval: Duration,
    shutdown_grace_period: Duration,
    #[cfg(feature = "metrics")]
    metrics: Option<RefreshMetrics>,
}

impl PropRegistryBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            shutdown_grace_period: DEFAULT_SHUTDOWN_GRACE_PERIOD,
            #[cfg(feature = "metrics")]
            metrics: None,
        }
    }

    /// Register a source under `id`.
    ///
    /// Each call adds a source with higher priority than all previous ones.
    /// Registering an id again replaces its source but keeps its priority.
    pub fn with_source<S: PropSource + 'static>(mut self, id: impl Into<String>, source: S) -> Self {
        let id = id.into();
        let source: Arc<dyn PropSource> = Arc::new(source);

        match self.sources.iter_mut().find(|(existing, _)| *existing == id) {
            Some(slot) => slot.1 = source,
            None => self.sources.push((id, source)),
        }
        self
    }

    /// Register a source under its [`PropSource::default_id`].
    pub fn with_default_source<S: PropSource + 'static>(self, source: S) -> Self {
        let id = source.default_id();
        self.with_source(id, source)
    }

    /// Set how often reloadable sources are re-read.
    ///
    /// This also bounds how long a resolution waits for the initial load.
    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Set how long `close` waits for a running refresh cycle before
    /// aborting it.
    pub fn shutdown_grace_period(mut self, grace_period: Duration) -> Self {
        self.shutdown_grace_period = grace_period;
        self
    }

    /// Record refresh metrics with the provided meter.
    #[cfg(feature = "metrics")]
    pub fn with_metrics(mut self, meter: opentelemetry::metrics::Meter) -> Self {
        self.metrics = Some(RefreshMetrics::new(meter));
        self
    }

    /// Build the registry.
    ///
    /// Starts loading every source in the background and schedules the
    /// periodic refresh on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - no source was registered
    /// - the refresh interval is zero
    /// - there is no tokio runtime to run the background tasks on
    pub fn build(self) -> Result<PropRegistry> {
        if self.sources.is_empty() {
            return Err(ConfigError::NoSources);
        }

        if self.refresh_interval.is_zero() {
            return Err(ConfigError::InvalidSetting(
                "refresh interval must be greater than zero".to_string(),
            ));
        }

        let handle =
            tokio::runtime::Handle::try_current().map_err(|_| ConfigError::RuntimeUnavailable)?;

        let sources = self
            .sources
            .into_iter()
            .map(|(id, source)| SourceEntry { id, source })
            .collect();

        Ok(PropRegistry::start(
            &handle,
            sources,
            self.refresh_interval,
            self.shutdown_grace_period,
            #[cfg(feature = "metrics")]
            self.metrics,
        ))
    }
}

impl Default for PropRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
