//! In-memory property source.

use super::PropSource;
use crate::error::Result;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::mem;

/// In-memory property source, useful for tests and programmatic overrides.
///
/// Every `set` or `remove` marks the key as changed; the next `reload`
/// returns and drains those keys.
///
/// # Examples
///
/// ```rust
/// use hotswap_props::sources::{InMemorySource, PropSource};
///
/// let source = InMemorySource::new();
/// source.set("a", "1");
///
/// assert_eq!(source.reload().unwrap().len(), 1);
/// assert!(source.reload().unwrap().is_empty());
/// ```
#[derive(Default)]
pub struct InMemorySource {
    store: DashMap<String, String>,
    updated_keys: Mutex<HashSet<String>>,
}

impl InMemorySource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        self.store.insert(key.clone(), value.into());
        self.updated_keys.lock().insert(key);
    }

    /// Remove `key`, returning its previous value.
    pub fn remove(&self, key: &str) -> Option<String> {
        let removed = self.store.remove(key).map(|(_, value)| value);
        if removed.is_some() {
            self.updated_keys.lock().insert(key.to_string());
        }
        removed
    }
}

impl PropSource for InMemorySource {
    fn get(&self, key: &str) -> Option<String> {
        self.store.get(key).map(|value| value.clone())
    }

    fn reload(&self) -> Result<HashSet<String>> {
        Ok(mem::take(&mut *self.updated_keys.lock()))
    }

    fn default_id(&self) -> String {
        "MEMORY".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reload_drains_updated_keys() {
        let source = InMemorySource::new();
        source.set("a", "1");

        let keys = source.reload().unwrap();
        assert_eq!(keys, HashSet::from(["a".to_string()]));
        assert!(source.reload().unwrap().is_empty());
    }

    #[test]
    fn test_get_and_remove() {
        let source = InMemorySource::new();
        assert_eq!(source.get("a"), None);

        source.set("a", "1");
        source.set("a", "2");
        assert_eq!(source.get("a").as_deref(), Some("2"));

        source.reload().unwrap();
        assert_eq!(source.remove("a").as_deref(), Some("2"));
        assert_eq!(source.get("a"), None);
        assert_eq!(source.reload().unwrap().len(), 1);

        assert_eq!(source.remove("missing"), None);
        assert!(source.reload().unwrap().is_empty());
    }

    #[test]
    fn test_defaults() {
        let source = InMemorySource::new();
        assert!(source.is_reloadable());
        assert_eq!(source.default_id(), "MEMORY");
    }
}
