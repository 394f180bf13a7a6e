//! Refresh metrics tracking using OpenTelemetry.

use opentelemetry::metrics::{Counter, Gauge, Histogram, Meter};
use std::time::Duration;

/// Metrics collector for refresh cycles.
///
/// # Examples
///
/// ```rust,no_run
/// use hotswap_props::metrics::RefreshMetrics;
/// use opentelemetry::global;
/// use std::time::Duration;
///
/// let metrics = RefreshMetrics::new(global::meter("hotswap-props"));
/// metrics.record_cycle(Duration::from_millis(12), 0, 3);
/// ```
#[derive(Clone)]
pub struct RefreshMetrics {
    cycles: Counter<u64>,
    cycle_duration: Histogram<f64>,
    reload_failures: Counter<u64>,
    prop_updates: Counter<u64>,
    update_failures: Counter<u64>,
    bound_props: Gauge<i64>,
}

impl RefreshMetrics {
    /// Create a new metrics collector with the provided meter.
    pub fn new(meter: Meter) -> Self {
        let cycles = meter
            .u64_counter("hotswap_props.refresh.cycles")
            .with_description("Number of completed refresh cycles")
            .build();

        let cycle_duration = meter
            .f64_histogram("hotswap_props.refresh.duration")
            .with_description("Duration of refresh cycles in seconds")
            .with_unit("s")
            .build();

        let reload_failures = meter
            .u64_counter("hotswap_props.source.reload_failures")
            .with_description("Number of source reloads that failed")
            .build();

        let prop_updates = meter
            .u64_counter("hotswap_props.prop.updates")
            .with_description("Number of prop values replaced by a refresh")
            .build();

        let update_failures = meter
            .u64_counter("hotswap_props.prop.update_failures")
            .with_description("Number of refreshed values rejected by decoding or validation")
            .build();

        let bound_props = meter
            .i64_gauge("hotswap_props.prop.bound")
            .with_description("Number of props bound to the registry")
            .build();

        Self {
            cycles,
            cycle_duration,
            reload_failures,
            prop_updates,
            update_failures,
            bound_props,
        }
    }

    /// Record a finished refresh cycle.
    ///
    /// # Arguments
    ///
    /// * `elapsed` - How long the cycle took
    /// * `failures` - Sources whose reload failed during the cycle
    /// * `updated` - Props whose value changed
    pub fn record_cycle(&self, elapsed: Duration, failures: usize, updated: usize) {
        self.cycles.add(1, &[]);
        self.cycle_duration.record(elapsed.as_secs_f64(), &[]);
        self.reload_failures.add(failures as u64, &[]);
        self.prop_updates.add(updated as u64, &[]);
    }

    /// Record a refreshed value that was rejected.
    pub fn record_update_failure(&self) {
        self.update_failures.add(1, &[]);
    }

    /// Update the number of bound props.
    pub fn record_bound(&self, count: usize) {
        self.bound_props.record(count as i64, &[]);
    }
}
