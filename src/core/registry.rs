//! The property registry: binding, resolution and live refresh.

use crate::converters::{Converter, StringConverter};
use crate::core::prop::{Bindable, BoundProp, Prop, PropInner};
use crate::core::resolver::{Resolver, SourceEntry};
use crate::core::scheduler::{self, GateOpener, LoadGate};
use crate::core::{PropBuilder, PropRegistryBuilder};
use crate::error::{ConfigError, Result};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::{Mutex as CycleLock, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

#[cfg(feature = "metrics")]
use crate::metrics::RefreshMetrics;

/// State shared between the registry handle and its background tasks.
pub(crate) struct Shared {
    resolver: Resolver,
    bound: DashMap<String, Arc<dyn Bindable>>,
    pins: DashMap<String, String>,
    /// Serialises reload cycles so that they never overlap
    cycle_lock: CycleLock<()>,
    #[cfg(feature = "metrics")]
    metrics: Option<RefreshMetrics>,
}

impl Shared {
    /// Re-resolve one property, honouring its pinned source.
    async fn update(&self, prop: &dyn Bindable) -> Result<bool> {
        let pinned = self.pins.get(prop.key()).map(|id| id.value().clone());
        let resolved = self.resolver.resolve(prop.key(), pinned.as_deref()).await;
        prop.apply(resolved)
    }

    async fn update_all(&self, props: &[Arc<dyn Bindable>]) -> usize {
        let mut updated = 0;
        for prop in props {
            match self.update(prop.as_ref()).await {
                Ok(true) => updated += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(key = prop.key(), error = %e, "Keeping previous value of prop");
                    #[cfg(feature = "metrics")]
                    if let Some(metrics) = &self.metrics {
                        metrics.record_update_failure();
                    }
                }
            }
        }
        updated
    }

    async fn initial_load(self: Arc<Self>, opener: GateOpener) {
        let _cycle = self.cycle_lock.lock().await;
        let outcome = scheduler::reload_sources(&self.resolver.sources(), false).await;
        opener.open();
        info!(failures = outcome.failures, "Initial load of prop sources complete");

        // props bound while the load was running may have timed out waiting
        let bound: Vec<_> = self
            .bound
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        self.update_all(&bound).await;
    }

    /// One refresh cycle: reload every reloadable source, then re-resolve the
    /// bound props whose keys changed.
    async fn run_cycle(&self) -> usize {
        let _cycle = self.cycle_lock.lock().await;
        let started = Instant::now();

        let outcome = scheduler::reload_sources(&self.resolver.sources(), true).await;

        // every source has finished reloading before any prop is updated
        let affected: Vec<_> = outcome
            .changed
            .iter()
            .filter_map(|key| self.bound.get(key).map(|entry| Arc::clone(entry.value())))
            .collect();
        let updated = self.update_all(&affected).await;

        debug!(
            changed_keys = outcome.changed.len(),
            updated,
            failures = outcome.failures,
            elapsed = ?started.elapsed(),
            "Refresh cycle complete"
        );

        #[cfg(feature = "metrics")]
        if let Some(metrics) = &self.metrics {
            metrics.record_cycle(started.elapsed(), outcome.failures, updated);
        }

        updated
    }
}

/// Registry of live, typed properties resolved from layered sources.
///
/// Sources registered later take precedence over earlier ones. When the
/// registry is built, every source is loaded once in the background; reads
/// that happen before that load finishes wait for it, up to the refresh
/// interval. Afterwards, reloadable sources are re-read every refresh
/// interval and the props whose keys changed are updated in place.
///
/// # Examples
///
/// ```rust
/// use hotswap_props::prelude::*;
/// use hotswap_props::converters::ParseConverter;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<()> {
/// let defaults = Arc::new(InMemorySource::new());
/// defaults.set("pool.size", "8");
///
/// let registry = PropRegistry::builder()
///     .with_source("DEFAULTS", Arc::clone(&defaults))
///     .build()?;
///
/// let pool_size = registry
///     .prop_with("pool.size", ParseConverter::<u32>::new())
///     .required(true)
///     .build()
///     .await?;
///
/// assert_eq!(pool_size.get()?.as_deref(), Some(&8));
///
/// registry.close().await;
/// # Ok(())
/// # }
/// ```
pub struct PropRegistry {
    shared: Arc<Shared>,
    refresh_interval: Duration,
    shutdown_grace_period: Duration,
    shutdown: watch::Sender<bool>,
    loader: parking_lot::Mutex<Option<JoinHandle<()>>>,
    scheduler: parking_lot::Mutex<Option<JoinHandle<()>>>,
}

impl PropRegistry {
    /// Create a new builder for constructing a registry.
    pub fn builder() -> PropRegistryBuilder {
        PropRegistryBuilder::new()
    }

    /// Start the initial load and the refresh scheduler.
    pub(crate) fn start(
        handle: &Handle,
        sources: Vec<SourceEntry>,
        refresh_interval: Duration,
        shutdown_grace_period: Duration,
        #[cfg(feature = "metrics")] metrics: Option<RefreshMetrics>,
    ) -> Self {
        let (opener, gate) = LoadGate::new();
        let shared = Arc::new(Shared {
            resolver: Resolver::new(sources, gate, refresh_interval),
            bound: DashMap::new(),
            pins: DashMap::new(),
            cycle_lock: CycleLock::new(()),
            #[cfg(feature = "metrics")]
            metrics,
        });

        let loader = handle.spawn(Arc::clone(&shared).initial_load(opener));

        let (shutdown, shutdown_rx) = watch::channel(false);
        let cycle_state = Arc::clone(&shared);
        let scheduler = scheduler::spawn_refresh(handle, refresh_interval, shutdown_rx, move || {
            let shared = Arc::clone(&cycle_state);
            async move {
                shared.run_cycle().await;
            }
        });

        info!(
            sources = ?shared.resolver.ids_by_priority(),
            ?refresh_interval,
            "Prop registry started"
        );

        Self {
            shared,
            refresh_interval,
            shutdown_grace_period,
            shutdown,
            loader: parking_lot::Mutex::new(Some(loader)),
            scheduler: parking_lot::Mutex::new(Some(scheduler)),
        }
    }

    /// Bind a property into the registry and resolve its initial value.
    ///
    /// If `source_id` is given, the property only ever reads from that
    /// source. Binding the same handle twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `source_id` does not name a registered source
    /// - the key is already bound to a different handle
    /// - the initial value cannot be decoded or fails validation; the
    ///   property is left unbound in that case
    pub async fn bind<T>(&self, prop: Prop<T>, source_id: Option<&str>) -> Result<Prop<T>>
    where
        T: PartialEq + Send + Sync + 'static,
    {
        if let Some(id) = source_id {
            self.validate_source(id)?;
        }

        let key = prop.key().to_string();
        let erased: Arc<dyn Bindable> = prop.inner.clone();
        let inserted = match self.shared.bound.entry(key.clone()) {
            Entry::Occupied(existing) => {
                if !std::ptr::addr_eq(Arc::as_ptr(existing.get()), Arc::as_ptr(&erased)) {
                    return Err(ConfigError::DuplicateProp { key });
                }
                if let Some(id) = source_id {
                    self.shared.pins.insert(key.clone(), id.to_string());
                }
                false
            }
            Entry::Vacant(slot) => {
                // the pin must be visible before a refresh can see the holder
                if let Some(id) = source_id {
                    self.shared.pins.insert(key.clone(), id.to_string());
                }
                slot.insert(erased);
                true
            }
        };

        let updated = self.shared.update(prop.inner.as_ref()).await;
        if updated.is_err() && inserted {
            self.shared.bound.remove(&key);
            self.shared.pins.remove(&key);
        }

        #[cfg(feature = "metrics")]
        if let Some(metrics) = &self.shared.metrics {
            metrics.record_bound(self.shared.bound.len());
        }

        updated?;
        Ok(prop)
    }

    /// Get the property bound under `key`, without resolving it.
    pub fn retrieve(&self, key: &str) -> Option<Arc<dyn BoundProp>> {
        self.shared.bound.get(key).map(|entry| {
            let prop: Arc<dyn BoundProp> = entry.value().clone();
            prop
        })
    }

    /// Get the typed handle bound under `key`, without resolving it.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` if the key is bound with a different value type.
    pub fn retrieve_as<T>(&self, key: &str) -> Result<Option<Prop<T>>>
    where
        T: Send + Sync + 'static,
    {
        let Some(bound) = self.shared.bound.get(key).map(|entry| Arc::clone(entry.value())) else {
            return Ok(None);
        };

        bound
            .into_any()
            .downcast::<PropInner<T>>()
            .map(|inner| Some(Prop { inner }))
            .map_err(|_| ConfigError::TypeMismatch {
                key: key.to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    /// Re-resolve a property's value.
    ///
    /// Returns `true` if the value changed. An absent value, or a value equal
    /// to the current one, leaves the property untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the resolved value cannot be decoded or fails the
    /// property's write-time validation.
    pub async fn update<T>(&self, prop: &Prop<T>) -> Result<bool>
    where
        T: PartialEq + Send + Sync + 'static,
    {
        self.shared.update(prop.inner.as_ref()).await
    }

    /// Resolve a property's value without storing it.
    ///
    /// Waits for the initial load (up to the refresh interval), then reads
    /// from `source_id` only, or from every source in priority order.
    ///
    /// # Errors
    ///
    /// Returns an error if `source_id` is unknown, or if the winning raw
    /// value cannot be decoded or fails validation.
    pub async fn resolve<T>(&self, prop: &Prop<T>, source_id: Option<&str>) -> Result<Option<T>>
    where
        T: Send + Sync + 'static,
    {
        if let Some(id) = source_id {
            self.validate_source(id)?;
        }

        self.shared
            .resolver
            .resolve(prop.key(), source_id)
            .await
            .map(|resolved| prop.accept(&resolved))
            .transpose()
    }

    /// Every raw value held for `key`, as `(source id, raw value)` pairs
    /// ordered lowest to highest priority. The last entry is the one a
    /// property without a pinned source resolves to.
    pub fn resolve_layers(&self, key: &str) -> Vec<(String, String)> {
        self.shared.resolver.layers(key)
    }

    /// Run one refresh cycle now.
    ///
    /// Returns the number of properties whose value changed. Waits for any
    /// cycle already in progress.
    pub async fn refresh(&self) -> usize {
        self.shared.run_cycle().await
    }

    /// Registered source ids, highest priority first.
    pub fn source_ids(&self) -> Vec<String> {
        self.shared.resolver.ids_by_priority()
    }

    /// Whether the initial load of every source has completed.
    pub fn is_loaded(&self) -> bool {
        self.shared.resolver.is_loaded()
    }

    /// Number of bound properties.
    pub fn bound_count(&self) -> usize {
        self.shared.bound.len()
    }

    /// The refresh interval.
    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    /// The shutdown grace period.
    pub fn shutdown_grace_period(&self) -> Duration {
        self.shutdown_grace_period
    }

    /// Start building a string property.
    pub fn prop(&self, key: impl Into<String>) -> PropBuilder<'_, String> {
        PropBuilder::new(self, key.into(), Arc::new(StringConverter))
    }

    /// Start building a property decoded by `converter`.
    pub fn prop_with<T, C>(&self, key: impl Into<String>, converter: C) -> PropBuilder<'_, T>
    where
        T: PartialEq + Send + Sync + 'static,
        C: Converter<T> + 'static,
    {
        PropBuilder::new(self, key.into(), Arc::new(converter))
    }

    /// Stop the refresh scheduler.
    ///
    /// Waits up to the shutdown grace period for a running cycle to finish,
    /// then aborts it. Updates of an aborted cycle are lost.
    pub async fn close(&self) {
        self.shutdown.send_replace(true);

        let loader = self.loader.lock().take();
        if let Some(loader) = loader {
            loader.abort();
        }

        let scheduler = self.scheduler.lock().take();
        let Some(mut scheduler) = scheduler else {
            return;
        };

        if time::timeout(self.shutdown_grace_period, &mut scheduler)
            .await
            .is_err()
        {
            warn!(
                grace_period = ?self.shutdown_grace_period,
                "Refresh scheduler did not stop in time; terminating"
            );
            scheduler.abort();
        }

        info!("Prop registry closed");
    }

    pub(crate) fn validate_source(&self, source_id: &str) -> Result<()> {
        if !self.shared.resolver.contains(source_id) {
            return Err(ConfigError::UnknownSource(source_id.to_string()));
        }
        Ok(())
    }
}

impl Drop for PropRegistry {
    fn drop(&mut self) {
        for task in [self.loader.get_mut().take(), self.scheduler.get_mut().take()]
            .into_iter()
            .flatten()
        {
            task.abort();
        }
    }
}
