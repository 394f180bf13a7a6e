//! Priority-ordered lookup across registered sources.

use crate::core::scheduler::LoadGate;
use crate::sources::PropSource;
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

/// A registered source and the id it was registered under.
pub(crate) struct SourceEntry {
    pub(crate) id: String,
    pub(crate) source: Arc<dyn PropSource>,
}

/// A raw value and the id of the source that supplied it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Resolved {
    pub(crate) source_id: String,
    pub(crate) raw: String,
}

/// Resolves keys against the registered sources.
///
/// Registration order defines priority: the most recently registered source
/// wins. The lookup order is derived once and never changes afterwards.
pub(crate) struct Resolver {
    /// Sources in registration order (lowest priority first)
    sources: Arc<[SourceEntry]>,
    /// Indexes into `sources`, highest priority first
    prioritized: Vec<usize>,
    gate: LoadGate,
    wait_limit: Duration,
}

impl Resolver {
    pub(crate) fn new(sources: Vec<SourceEntry>, gate: LoadGate, wait_limit: Duration) -> Self {
        let prioritized = (0..sources.len()).rev().collect();
        Self {
            sources: sources.into(),
            prioritized,
            gate,
            wait_limit,
        }
    }

    pub(crate) fn sources(&self) -> Arc<[SourceEntry]> {
        Arc::clone(&self.sources)
    }

    pub(crate) fn contains(&self, source_id: &str) -> bool {
        self.sources.iter().any(|entry| entry.id == source_id)
    }

    pub(crate) fn ids_by_priority(&self) -> Vec<String> {
        self.prioritized
            .iter()
            .map(|&index| self.sources[index].id.clone())
            .collect()
    }

    pub(crate) fn is_loaded(&self) -> bool {
        self.gate.is_open()
    }

    /// Resolve `key`, waiting for the initial load first.
    ///
    /// Yields `None` when the initial load does not finish within the wait
    /// limit. A pinned source is the only one consulted.
    pub(crate) async fn resolve(&self, key: &str, pinned: Option<&str>) -> Option<Resolved> {
        if !self.gate.wait(self.wait_limit).await {
            return None;
        }
        self.lookup(key, pinned)
    }

    pub(crate) fn lookup(&self, key: &str, pinned: Option<&str>) -> Option<Resolved> {
        if let Some(source_id) = pinned {
            let entry = self.sources.iter().find(|entry| entry.id == source_id)?;
            return Self::read(entry, key);
        }

        self.prioritized.iter().find_map(|&index| {
            let resolved = Self::read(&self.sources[index], key)?;
            trace!(key, source = %resolved.source_id, "Resolved prop");
            Some(resolved)
        })
    }

    /// Every source holding `key`, lowest to highest priority.
    pub(crate) fn layers(&self, key: &str) -> Vec<(String, String)> {
        self.sources
            .iter()
            .filter_map(|entry| Self::read(entry, key))
            .map(|resolved| (resolved.source_id, resolved.raw))
            .collect()
    }

    fn read(entry: &SourceEntry, key: &str) -> Option<Resolved> {
        entry.source.get(key).map(|raw| Resolved {
            source_id: entry.id.clone(),
            raw,
        })
    }
}
