//! File-based property source.

use super::{PropSource, Snapshot};
use crate::error::{ConfigError, Result};
use config::{File, Source, Value, ValueKind};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

/// File-based property source.
///
/// Loads YAML, TOML, or JSON files with automatic format detection based on
/// file extension. Nested tables are flattened into dotted keys and arrays
/// are joined with `,`, so
///
/// ```yaml
/// server:
///   port: 8080
///   hosts: [a, b]
/// ```
///
/// answers `server.port = "8080"` and `server.hosts = "a,b"`.
///
/// Every reload re-reads the file and reports the keys that differ from the
/// previous read.
///
/// # Examples
///
/// ```rust,no_run
/// use hotswap_props::sources::FileSource;
///
/// let source = FileSource::new("config/default.yaml");
/// let overrides = FileSource::new("config/local.yaml").optional();
/// ```
pub struct FileSource {
    path: PathBuf,
    required: bool,
    values: Snapshot,
}

impl FileSource {
    /// Create a new file source with automatic format detection.
    ///
    /// The format is detected from the file extension:
    /// - `.yaml`, `.yml` -> YAML
    /// - `.toml` -> TOML
    /// - `.json` -> JSON
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            required: true,
            values: Snapshot::new(),
        }
    }

    /// Treat a missing file as empty instead of failing the reload.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Validate that the file extension is supported.
    fn validate_extension(&self) -> Result<()> {
        let extension = self
            .path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| {
                ConfigError::LoadError(format!(
                    "Unable to determine file format for: {}",
                    self.path.display()
                ))
            })?;

        match extension {
            "yaml" | "yml" | "toml" | "json" => Ok(()),
            _ => Err(ConfigError::LoadError(format!(
                "Unsupported file extension: {}. Supported: .yaml, .yml, .toml, .json",
                extension
            ))),
        }
    }
}

impl PropSource for FileSource {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key)
    }

    fn reload(&self) -> Result<HashSet<String>> {
        self.validate_extension()?;

        let collected = File::from(self.path.clone())
            .required(self.required)
            .collect()
            .map_err(|e| {
                ConfigError::LoadError(format!(
                    "Failed to load file {}: {}",
                    self.path.display(),
                    e
                ))
            })?;

        let mut values = HashMap::new();
        for (key, value) in collected {
            flatten_into(&key, value, &mut values);
        }

        Ok(self.values.replace(values))
    }

    fn default_id(&self) -> String {
        format!("FILE:{}", self.path.display())
    }
}

fn flatten_into(key: &str, value: Value, out: &mut HashMap<String, String>) {
    match value.kind {
        ValueKind::Nil => {}
        ValueKind::Table(table) => {
            for (child, value) in table {
                flatten_into(&format!("{}.{}", key, child), value, out);
            }
        }
        ValueKind::Array(items) => {
            let joined = items
                .iter()
                .map(|item| item.to_string())
                .collect::<Vec<_>>()
                .join(",");
            out.insert(key.to_string(), joined);
        }
        scalar => {
            out.insert(key.to_string(), scalar.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_validate_extension() {
        assert!(FileSource::new("config.yaml").validate_extension().is_ok());
        assert!(FileSource::new("config.yml").validate_extension().is_ok());
        assert!(FileSource::new("config.toml").validate_extension().is_ok());
        assert!(FileSource::new("config.json").validate_extension().is_ok());
        assert!(FileSource::new("config.txt").validate_extension().is_err());
    }

    #[test]
    fn test_load_yaml_file_flattens_keys() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        fs::write(
            &config_path,
            r#"
server:
  port: 8080
  host: localhost
  hosts:
    - a
    - b
debug: true
"#,
        )
        .unwrap();

        let source = FileSource::new(&config_path);
        let changed = source.reload().unwrap();

        assert_eq!(changed.len(), 4);
        assert_eq!(source.get("server.port").as_deref(), Some("8080"));
        assert_eq!(source.get("server.host").as_deref(), Some("localhost"));
        assert_eq!(source.get("server.hosts").as_deref(), Some("a,b"));
        assert_eq!(source.get("debug").as_deref(), Some("true"));
    }

    #[test]
    fn test_reload_reports_only_changed_keys() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        fs::write(&config_path, "a = 1\nb = 2\n").unwrap();
        let source = FileSource::new(&config_path);
        source.reload().unwrap();

        fs::write(&config_path, "a = 1\nb = 3\n").unwrap();
        let changed = source.reload().unwrap();
        assert_eq!(changed, HashSet::from(["b".to_string()]));
        assert_eq!(source.get("b").as_deref(), Some("3"));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let source = FileSource::new("/nonexistent/config.yaml");
        assert!(source.reload().is_err());
    }

    #[test]
    fn test_optional_missing_file_is_empty() {
        let source = FileSource::new("/nonexistent/config.yaml").optional();
        assert!(source.reload().unwrap().is_empty());
        assert_eq!(source.get("anything"), None);
    }

    #[test]
    fn test_default_id() {
        let source = FileSource::new("config.yaml");
        assert!(source.default_id().contains("config.yaml"));
    }
}
