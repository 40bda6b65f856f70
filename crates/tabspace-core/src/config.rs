//! Workspace configuration
//!
//! Loaded from TOML; every field has a default so partial files work.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Route opened when a space has no tabs
    pub default_route: String,
    /// Storage key prefix; slots are `{prefix}:{space_id}`
    pub storage_key_prefix: String,
    /// Open the default route when the last tab closes
    pub open_default_on_empty: bool,
    /// Minimum split pane width in percent
    pub min_pane_width: f64,
    /// Maximum history entries
    pub history_limit: usize,
    /// Maximum cached view resolutions
    pub view_cache_capacity: u64,
    /// Id of the immutable system space
    pub system_space_id: String,
}

impl WorkspaceConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate TOML
    ///
    /// # Errors
    /// `ConfigError::Parse` on bad TOML, `ConfigError::Invalid` on
    /// out-of-range values.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    ///
    /// # Errors
    /// `ConfigError::Io` when the file cannot be read, otherwise as
    /// [`Self::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// `ConfigError::Invalid` naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=50.0).contains(&self.min_pane_width) {
            return Err(ConfigError::invalid(
                "min_pane_width",
                format!("{} is outside 0..=50", self.min_pane_width),
            ));
        }
        if self.history_limit == 0 {
            return Err(ConfigError::invalid("history_limit", "must be at least 1"));
        }
        if self.storage_key_prefix.is_empty() {
            return Err(ConfigError::invalid("storage_key_prefix", "must not be empty"));
        }
        if self.system_space_id.is_empty() {
            return Err(ConfigError::invalid("system_space_id", "must not be empty"));
        }
        Ok(())
    }

    /// With default route
    #[inline]
    #[must_use]
    pub fn with_default_route(mut self, route: impl Into<String>) -> Self {
        self.default_route = route.into();
        self
    }

    /// With storage key prefix
    #[inline]
    #[must_use]
    pub fn with_storage_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.storage_key_prefix = prefix.into();
        self
    }

    /// With empty-pane behavior
    #[inline]
    #[must_use]
    pub fn with_open_default_on_empty(mut self, open: bool) -> Self {
        self.open_default_on_empty = open;
        self
    }

    /// With minimum pane width
    #[inline]
    #[must_use]
    pub fn with_min_pane_width(mut self, percent: f64) -> Self {
        self.min_pane_width = percent;
        self
    }

    /// With history limit
    #[inline]
    #[must_use]
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// With view cache capacity
    #[inline]
    #[must_use]
    pub fn with_view_cache_capacity(mut self, capacity: u64) -> Self {
        self.view_cache_capacity = capacity;
        self
    }

    /// With system space id
    #[inline]
    #[must_use]
    pub fn with_system_space_id(mut self, id: impl Into<String>) -> Self {
        self.system_space_id = id.into();
        self
    }

    /// Storage slot for a space
    #[must_use]
    pub fn storage_key(&self, space_id: &str) -> String {
        format!("{}:{space_id}", self.storage_key_prefix)
    }
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            default_route: "/".to_string(),
            storage_key_prefix: "tabspace:tabs".to_string(),
            open_default_on_empty: true,
            min_pane_width: 20.0,
            history_limit: 100,
            view_cache_capacity: 1_000,
            system_space_id: "space_system".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = WorkspaceConfig::from_toml_str(
            r#"
            default_route = "/wiki"
            history_limit = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.default_route, "/wiki");
        assert_eq!(config.history_limit, 10);
        assert_eq!(config.storage_key_prefix, "tabspace:tabs");
        assert!(config.open_default_on_empty);
    }

    #[test]
    fn rejects_out_of_range_width() {
        let err = WorkspaceConfig::from_toml_str("min_pane_width = 70.0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "min_pane_width",
                ..
            }
        ));
    }

    #[test]
    fn rejects_bad_toml() {
        let err = WorkspaceConfig::from_toml_str("history_limit = \"lots\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "system_space_id = \"space_home\"").unwrap();

        let config = WorkspaceConfig::load(file.path()).unwrap();
        assert_eq!(config.system_space_id, "space_home");
        assert_eq!(config.storage_key("space_home"), "tabspace:tabs:space_home");
    }

    #[test]
    fn missing_file_reports_path() {
        let err = WorkspaceConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }

    #[test]
    fn builder_setters() {
        let config = WorkspaceConfig::new()
            .with_open_default_on_empty(false)
            .with_min_pane_width(25.0)
            .with_view_cache_capacity(16);
        assert!(!config.open_default_on_empty);
        assert!((config.min_pane_width - 25.0).abs() < f64::EPSILON);
        assert_eq!(config.view_cache_capacity, 16);
        assert!(config.validate().is_ok());
    }
}
