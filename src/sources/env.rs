//! Environment variable property source.

use super::{PropSource, Snapshot};
use crate::error::{ConfigError, Result};
use config::{Environment, Source};
use std::collections::{HashMap, HashSet};

/// Environment variable property source.
///
/// Reads the process environment through the `config` crate. Keys are
/// lowercased; with a prefix, only matching variables are kept and the prefix
/// is stripped. With a separator, occurrences of it become `.` so that
/// `APP_SERVER__PORT` answers the key `server.port`.
///
/// The environment is read once when the registry starts; this source is not
/// reloadable.
///
/// # Examples
///
/// ```rust
/// use hotswap_props::sources::EnvSource;
///
/// // APP_SERVER__PORT=8080 -> server.port = 8080
/// let source = EnvSource::with_prefix("APP").separator("__");
/// ```
pub struct EnvSource {
    prefix: Option<String>,
    separator: Option<String>,
    overrides: Option<HashMap<String, String>>,
    values: Snapshot,
}

impl EnvSource {
    /// Create a source over the whole environment.
    pub fn new() -> Self {
        Self {
            prefix: None,
            separator: None,
            overrides: None,
            values: Snapshot::new(),
        }
    }

    /// Create a source over variables starting with `prefix_`.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            ..Self::new()
        }
    }

    /// Set the separator for nested keys (e.g., `"__"` for `APP_DB__HOST`).
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    /// Read from the given variables instead of the process environment.
    pub fn with_vars(mut self, vars: HashMap<String, String>) -> Self {
        self.overrides = Some(vars);
        self
    }

    fn environment(&self) -> Environment {
        let mut environment = match &self.prefix {
            Some(prefix) => Environment::with_prefix(prefix).prefix_separator("_"),
            None => Environment::default(),
        };
        if let Some(separator) = &self.separator {
            environment = environment.separator(separator);
        }
        environment.source(
            self.overrides
                .as_ref()
                .map(|vars| vars.clone().into_iter().collect()),
        )
    }
}

impl Default for EnvSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PropSource for EnvSource {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key)
    }

    fn reload(&self) -> Result<HashSet<String>> {
        let collected = self.environment().collect().map_err(|e| {
            ConfigError::LoadError(format!("Failed to load environment variables: {}", e))
        })?;

        let values = collected
            .into_iter()
            .map(|(key, value)| (key, value.to_string()))
            .collect();

        Ok(self.values.replace(values))
    }

    fn is_reloadable(&self) -> bool {
        false
    }

    fn default_id(&self) -> String {
        "ENV".to_string()
    }
}
