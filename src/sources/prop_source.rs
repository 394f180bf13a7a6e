//! Property source trait.

use crate::error::Result;
use std::collections::HashSet;
use std::sync::Arc;

/// Trait for property sources.
///
/// A source answers lookups for raw string values by exact key and can
/// optionally re-scan its backing store, reporting which keys changed.
/// Implement this trait to create custom sources (e.g., databases or
/// key-value stores).
///
/// Sources are shared with the registry's background tasks, so every method
/// takes `&self`; use interior mutability for state updated by `reload`.
pub trait PropSource: Send + Sync {
    /// Get the raw value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Re-read the backing store.
    ///
    /// Returns the keys that were added, changed or removed since the
    /// previous call. The registry calls this from a blocking thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read. The registry logs the
    /// error and treats the source as unchanged for that cycle.
    fn reload(&self) -> Result<HashSet<String>>;

    /// Whether the registry should reload this source on every refresh cycle.
    ///
    /// Read-only sources return `false`; they are loaded once when the
    /// registry starts.
    fn is_reloadable(&self) -> bool {
        true
    }

    /// Identifier used when none is supplied at registration.
    fn default_id(&self) -> String;
}

impl<S: PropSource + ?Sized> PropSource for Arc<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn reload(&self) -> Result<HashSet<String>> {
        (**self).reload()
    }

    fn is_reloadable(&self) -> bool {
        (**self).is_reloadable()
    }

    fn default_id(&self) -> String {
        (**self).default_id()
    }
}
