//! Initial-load gate and the periodic refresh task.

use crate::core::resolver::SourceEntry;
use crate::sources::PropSource;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle, JoinSet};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, warn};

/// One-shot gate separating "sources not yet scanned" from "safe to resolve".
#[derive(Clone)]
pub(crate) struct LoadGate {
    rx: watch::Receiver<bool>,
}

/// The single writer side of a [`LoadGate`].
pub(crate) struct GateOpener {
    tx: watch::Sender<bool>,
}

impl LoadGate {
    pub(crate) fn new() -> (GateOpener, LoadGate) {
        let (tx, rx) = watch::channel(false);
        (GateOpener { tx }, LoadGate { rx })
    }

    pub(crate) fn is_open(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait up to `limit` for the gate to open.
    ///
    /// Returns `false` on timeout, or when the opener was dropped without
    /// opening the gate (the loader task was cancelled or panicked).
    pub(crate) async fn wait(&self, limit: Duration) -> bool {
        let mut rx = self.rx.clone();
        let opened = match time::timeout(limit, rx.wait_for(|open| *open)).await {
            Ok(Ok(_)) => true,
            Ok(Err(_)) => {
                error!("Initial load was interrupted; props cannot be resolved");
                false
            }
            Err(_) => {
                warn!(?limit, "Could not resolve in time; initial load still running");
                false
            }
        };
        opened
    }
}

impl GateOpener {
    pub(crate) fn open(self) {
        self.tx.send_replace(true);
    }
}

/// Result of reloading a set of sources in parallel.
#[derive(Debug, Default)]
pub(crate) struct ReloadOutcome {
    pub(crate) changed: HashSet<String>,
    pub(crate) failures: usize,
}

/// Reload sources in parallel on the blocking pool.
///
/// A source whose reload fails or panics is logged and counted as having no
/// changed keys; it never affects the other sources.
pub(crate) async fn reload_sources(
    sources: &[SourceEntry],
    reloadable_only: bool,
) -> ReloadOutcome {
    let mut tasks = JoinSet::new();
    for entry in sources
        .iter()
        .filter(|entry| !reloadable_only || entry.source.is_reloadable())
    {
        let id = entry.id.clone();
        let source = Arc::clone(&entry.source);
        tasks.spawn_blocking(move || safe_reload(&id, source.as_ref()));
    }

    let mut outcome = ReloadOutcome::default();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Some(keys)) => outcome.changed.extend(keys),
            Ok(None) => outcome.failures += 1,
            Err(e) => {
                error!(error = %e, "Source reload task panicked");
                outcome.failures += 1;
            }
        }
    }
    outcome
}

fn safe_reload(id: &str, source: &dyn PropSource) -> Option<HashSet<String>> {
    match source.reload() {
        Ok(keys) => {
            debug!(source = id, changed = keys.len(), "Reloaded source");
            Some(keys)
        }
        Err(e) => {
            error!(source = id, error = %e, "Unexpected error reloading props");
            None
        }
    }
}

/// Spawn the periodic refresh task.
///
/// Ticks that fire while a cycle is still running are skipped, so cycles
/// never overlap. The first cycle runs one `period` after start.
pub(crate) fn spawn_refresh<F, Fut>(
    handle: &tokio::runtime::Handle,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
    cycle: F,
) -> JoinHandle<()>
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let runtime = handle.clone();
    handle.spawn(async move {
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    // a panicking cycle must not end the schedule
                    let task = runtime.spawn(cycle());
                    let _guard = AbortOnDrop(task.abort_handle());
                    if let Err(e) = task.await {
                        error!(error = %e, "Refresh cycle failed");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        debug!("Refresh scheduler stopped");
    })
}

struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}
