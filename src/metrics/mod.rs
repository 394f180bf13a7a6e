//! Built-in metrics for refresh cycles.
//!
//! Provides OpenTelemetry metrics tracking:
//! - Refresh cycles and their duration
//! - Source reload failures
//! - Prop updates and rejected updates
//! - Bound props
//!
//! # Examples
//!
//! ```rust,no_run
//! use hotswap_props::prelude::*;
//! use hotswap_props::sources::FileSource;
//! use opentelemetry::global;
//!
//! # async fn example() -> Result<()> {
//! let meter = global::meter("my-app");
//!
//! let registry = PropRegistry::builder()
//!     .with_source("FILE", FileSource::new("config.yaml"))
//!     .with_metrics(meter)
//!     .build()?;
//! # Ok(())
//! # }
//! ```

mod refresh_metrics;

pub use refresh_metrics::RefreshMetrics;
