//! Integration tests for refresh cycles and shutdown.

use hotswap_props::converters::ParseConverter;
use hotswap_props::error::ConfigError;
use hotswap_props::prelude::*;
use hotswap_props::sources::FileSource;
use std::collections::HashSet;
use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;

fn memory(pairs: &[(&str, &str)]) -> Arc<InMemorySource> {
    let source = Arc::new(InMemorySource::new());
    for (key, value) in pairs {
        source.set(*key, *value);
    }
    source
}

#[tokio::test]
async fn test_refresh_updates_only_changed_props() {
    let source = memory(&[("a", "1"), ("b", "1")]);
    let registry = PropRegistry::builder()
        .with_source("MEM", Arc::clone(&source))
        .build()
        .unwrap();

    let a = registry
        .prop_with("a", ParseConverter::<i32>::new())
        .build()
        .await
        .unwrap();
    let b = registry
        .prop_with("b", ParseConverter::<i32>::new())
        .build()
        .await
        .unwrap();

    assert_eq!(registry.refresh().await, 0);

    source.set("a", "2");
    // rewriting an identical value is not a change
    source.set("b", "1");
    assert_eq!(registry.refresh().await, 1);

    assert_eq!(a.get().unwrap().as_deref(), Some(&2));
    assert_eq!(b.get().unwrap().as_deref(), Some(&1));
}

/// Source that leaves some of its changed keys out of the reload report.
struct UnreportedSource {
    inner: InMemorySource,
    hidden: HashSet<String>,
}

impl PropSource for UnreportedSource {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    fn reload(&self) -> Result<HashSet<String>> {
        let mut changed = self.inner.reload()?;
        changed.retain(|key| !self.hidden.contains(key));
        Ok(changed)
    }

    fn default_id(&self) -> String {
        "UNREPORTED".to_string()
    }
}

#[tokio::test]
async fn test_keys_outside_changed_set_are_untouched() {
    let source = Arc::new(UnreportedSource {
        inner: InMemorySource::new(),
        hidden: HashSet::from(["b".to_string()]),
    });
    source.inner.set("a", "1");
    source.inner.set("b", "1");

    let registry = PropRegistry::builder()
        .with_default_source(Arc::clone(&source))
        .build()
        .unwrap();

    let a = registry
        .prop_with("a", ParseConverter::<i32>::new())
        .build()
        .await
        .unwrap();
    let b = registry
        .prop_with("b", ParseConverter::<i32>::new())
        .build()
        .await
        .unwrap();
    assert_eq!(b.get().unwrap().as_deref(), Some(&1));

    source.inner.set("a", "2");
    source.inner.set("b", "2");
    assert_eq!(registry.refresh().await, 1);

    assert_eq!(a.get().unwrap().as_deref(), Some(&2));
    // the source now holds 2, but "b" was not reported as changed
    assert_eq!(b.get().unwrap().as_deref(), Some(&1));
}

#[tokio::test]
async fn test_removing_override_falls_back_to_lower_layer() {
    let base = memory(&[("level", "base")]);
    let overrides = memory(&[("level", "override")]);
    let registry = PropRegistry::builder()
        .with_source("BASE", Arc::clone(&base))
        .with_source("OVERRIDE", Arc::clone(&overrides))
        .build()
        .unwrap();

    let level = registry.prop("level").build().await.unwrap();
    assert_eq!(level.get().unwrap().as_deref().map(String::as_str), Some("override"));

    overrides.remove("level");
    assert_eq!(registry.refresh().await, 1);
    assert_eq!(level.get().unwrap().as_deref().map(String::as_str), Some("base"));

    // removed everywhere: the last value is kept
    base.remove("level");
    assert_eq!(registry.refresh().await, 0);
    assert_eq!(level.get().unwrap().as_deref().map(String::as_str), Some("base"));
}

#[tokio::test]
async fn test_pinned_prop_ignores_other_sources_on_refresh() {
    let first = memory(&[("k", "1")]);
    let second = memory(&[("k", "2")]);
    let registry = PropRegistry::builder()
        .with_source("FIRST", Arc::clone(&first))
        .with_source("SECOND", Arc::clone(&second))
        .build()
        .unwrap();

    let pinned = registry
        .prop_with("k", ParseConverter::<i32>::new())
        .source("FIRST")
        .unwrap()
        .build()
        .await
        .unwrap();
    assert_eq!(pinned.get().unwrap().as_deref(), Some(&1));

    second.set("k", "20");
    assert_eq!(registry.refresh().await, 0);
    assert_eq!(pinned.get().unwrap().as_deref(), Some(&1));

    first.set("k", "10");
    assert_eq!(registry.refresh().await, 1);
    assert_eq!(pinned.get().unwrap().as_deref(), Some(&10));
}

#[tokio::test]
async fn test_rejected_refresh_keeps_previous_value() {
    let source = memory(&[("port", "8080")]);
    let registry = PropRegistry::builder()
        .with_source("MEM", Arc::clone(&source))
        .build()
        .unwrap();

    let port = registry
        .prop_with("port", ParseConverter::<u16>::new())
        .validate_on_set(|port: &u16| {
            if *port == 0 {
                return Err(ValidationError::custom("port must not be 0"));
            }
            Ok(())
        })
        .build()
        .await
        .unwrap();

    source.set("port", "0");
    assert_eq!(registry.refresh().await, 0);
    assert_eq!(port.get().unwrap().as_deref(), Some(&8080));

    source.set("port", "not-a-port");
    assert_eq!(registry.refresh().await, 0);
    assert_eq!(port.get().unwrap().as_deref(), Some(&8080));

    let err = registry.update(&port).await.unwrap_err();
    assert!(matches!(err, ConfigError::DecodeError { .. }));
}

/// Source that fails every reload after the first.
struct FlakySource {
    reloads: AtomicUsize,
    inner: InMemorySource,
}

impl PropSource for FlakySource {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    fn reload(&self) -> Result<HashSet<String>> {
        if self.reloads.fetch_add(1, Ordering::SeqCst) > 0 {
            return Err(ConfigError::LoadError("backend unavailable".to_string()));
        }
        self.inner.reload()
    }

    fn default_id(&self) -> String {
        "FLAKY".to_string()
    }
}

#[tokio::test]
async fn test_failing_source_does_not_block_others() {
    let flaky_inner = InMemorySource::new();
    flaky_inner.set("flaky.key", "x");
    let healthy = memory(&[("healthy.key", "1")]);

    let registry = PropRegistry::builder()
        .with_source(
            "FLAKY",
            FlakySource {
                reloads: AtomicUsize::new(0),
                inner: flaky_inner,
            },
        )
        .with_source("HEALTHY", Arc::clone(&healthy))
        .build()
        .unwrap();

    let flaky = registry.prop("flaky.key").build().await.unwrap();
    let value = registry
        .prop_with("healthy.key", ParseConverter::<i32>::new())
        .build()
        .await
        .unwrap();

    healthy.set("healthy.key", "2");
    assert_eq!(registry.refresh().await, 1);
    assert_eq!(value.get().unwrap().as_deref(), Some(&2));
    assert_eq!(flaky.get().unwrap().as_deref().map(String::as_str), Some("x"));
}

#[tokio::test]
async fn test_file_changes_picked_up_by_refresh() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "[server]\nport = 8080\n").unwrap();

    let registry = PropRegistry::builder()
        .with_source("FILE", FileSource::new(&config_path))
        .build()
        .unwrap();

    let port = registry
        .prop_with("server.port", ParseConverter::<u16>::new())
        .build()
        .await
        .unwrap();
    assert_eq!(port.get().unwrap().as_deref(), Some(&8080));

    fs::write(&config_path, "[server]\nport = 9090\n").unwrap();
    assert_eq!(registry.refresh().await, 1);
    assert_eq!(port.get().unwrap().as_deref(), Some(&9090));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_scheduled_refresh_applies_changes() {
    let source = memory(&[("k", "1")]);
    let registry = PropRegistry::builder()
        .with_source("MEM", Arc::clone(&source))
        .refresh_interval(Duration::from_millis(100))
        .build()
        .unwrap();

    let prop = registry
        .prop_with("k", ParseConverter::<i32>::new())
        .build()
        .await
        .unwrap();

    source.set("k", "2");
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(prop.get().unwrap().as_deref(), Some(&2));

    registry.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_no_refresh_after_close() {
    let source = memory(&[("k", "1")]);
    let registry = PropRegistry::builder()
        .with_source("MEM", Arc::clone(&source))
        .refresh_interval(Duration::from_millis(50))
        .shutdown_grace_period(Duration::from_secs(1))
        .build()
        .unwrap();

    let prop = registry
        .prop_with("k", ParseConverter::<i32>::new())
        .build()
        .await
        .unwrap();

    registry.close().await;

    source.set("k", "2");
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(prop.get().unwrap().as_deref(), Some(&1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reads_during_refreshes() {
    let source = memory(&[("port", "8080")]);
    let registry = PropRegistry::builder()
        .with_source("MEM", Arc::clone(&source))
        .build()
        .unwrap();

    let port = registry
        .prop_with("port", ParseConverter::<u16>::new())
        .build()
        .await
        .unwrap();

    let mut handles = vec![];

    for _ in 0..10 {
        let port = port.clone();
        let handle = tokio::spawn(async move {
            for _ in 0..100 {
                let value = port.get().unwrap().unwrap();
                assert!((8080..=8090).contains(&*value));
                tokio::time::sleep(Duration::from_micros(10)).await;
            }
        });
        handles.push(handle);
    }

    for i in 0..10u16 {
        source.set("port", (8080 + i).to_string());
        registry.refresh().await;
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    for handle in handles {
        handle.await.unwrap();
    }
    assert_eq!(port.get().unwrap().as_deref(), Some(&8089));
}

#[cfg(feature = "metrics")]
#[tokio::test]
async fn test_metrics_integration() {
    use opentelemetry::global;

    let source = memory(&[("k", "1")]);
    let registry = PropRegistry::builder()
        .with_source("MEM", Arc::clone(&source))
        .with_metrics(global::meter("test"))
        .build()
        .unwrap();

    let prop = registry
        .prop_with("k", ParseConverter::<i32>::new())
        .build()
        .await
        .unwrap();

    source.set("k", "2");
    assert_eq!(registry.refresh().await, 1);
    assert_eq!(prop.get().unwrap().as_deref(), Some(&2));
}
