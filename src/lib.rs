//! # hotswap-props
//!
//! Typed, layered configuration properties that stay live while the
//! application runs.
//!
//! ## Overview
//!
//! `hotswap-props` keeps a registry of typed properties resolved from an
//! ordered list of sources:
//! - Later sources override earlier ones, key by key
//! - A property can be pinned to a single source
//! - Reloadable sources are re-read on a fixed interval and only the
//!   properties whose keys changed are updated
//! - Reads are lock-free using `arc-swap`; readers never see a half-written
//!   value
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hotswap_props::prelude::*;
//! use hotswap_props::converters::{DurationConverter, ParseConverter};
//! use hotswap_props::sources::{EnvSource, FileSource};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<()> {
//! // Environment variables override the file, key by key
//! let registry = PropRegistry::builder()
//!     .with_source("FILE", FileSource::new("config/default.yaml"))
//!     .with_default_source(EnvSource::with_prefix("APP").separator("__"))
//!     .refresh_interval(Duration::from_secs(10))
//!     .build()?;
//!
//! let port = registry
//!     .prop_with("server.port", ParseConverter::<u16>::new())
//!     .required(true)
//!     .build()
//!     .await?;
//!
//! let timeout = registry
//!     .prop_with("server.timeout", DurationConverter)
//!     .default_value(Duration::from_secs(30))
//!     .build()
//!     .await?;
//!
//! // Reads always observe the latest refreshed value
//! println!("port={:?} timeout={:?}", port.get()?, timeout.get()?);
//!
//! registry.close().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `chrono` (default): [`TimestampConverter`](converters::TimestampConverter)
//!   for RFC 3339 timestamps
//! - `json` (default): [`JsonConverter`](converters::JsonConverter) for
//!   structured values
//! - `metrics`: OpenTelemetry metrics for refresh cycles

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod converters;
pub mod core;
pub mod error;
pub mod sources;

#[cfg(feature = "metrics")]
pub mod metrics;

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::converters::{Converter, StringConverter};
    pub use crate::core::{
        BoundProp, Prop, PropBuilder, PropOptions, PropRegistry, PropRegistryBuilder, Validate,
    };
    pub use crate::error::{ConfigError, Result, ValidationError};
    pub use crate::sources::{InMemorySource, PropSource};
}
