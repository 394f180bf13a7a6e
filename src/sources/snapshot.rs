//! Lock-free key/value snapshot shared by the file and environment sources.

use arc_swap::ArcSwap;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// The last values read by a source, swapped atomically on reload.
pub(crate) struct Snapshot {
    values: ArcSwap<HashMap<String, String>>,
}

impl Snapshot {
    pub(crate) fn new() -> Self {
        Self {
            values: ArcSwap::from_pointee(HashMap::new()),
        }
    }

    pub(crate) fn get(&self, key: &str) -> Option<String> {
        self.values.load().get(key).cloned()
    }

    /// Install `next` and return every key whose value differs from the
    /// previous snapshot, including removed keys.
    pub(crate) fn replace(&self, next: HashMap<String, String>) -> HashSet<String> {
        let next = Arc::new(next);
        let previous = self.values.swap(Arc::clone(&next));

        let mut changed: HashSet<String> = next
            .iter()
            .filter(|(key, value)| previous.get(*key) != Some(*value))
            .map(|(key, _)| key.clone())
            .collect();
        changed.extend(
            previous
                .keys()
                .filter(|key| !next.contains_key(*key))
                .cloned(),
        );

        changed
    }
}
