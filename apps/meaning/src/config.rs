//! # Host Configuration
//!
//! Optional TOML file read with `--config`:
//!
//! ```toml
//! [catalogs]
//! base_path = "data/catalogs"   # default: next to the world/registry file
//! concurrent = true              # resolve catalog files in parallel
//! ```
//!
//! Command-line flags override values read from the file.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Maximum configuration file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub catalogs: CatalogSettings,
}

/// How catalog files are located and read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogSettings {
    /// Directory relative catalog paths are joined to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_path: Option<PathBuf>,

    /// Resolve catalog files concurrently.
    #[serde(default = "default_concurrent")]
    pub concurrent: bool,
}

fn default_concurrent() -> bool {
    true
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            base_path: None,
            concurrent: default_concurrent(),
        }
    }
}

impl AppConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, AppError> {
        toml::from_str(text).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Read a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let text = crate::sources::read_text(path, MAX_CONFIG_FILE_SIZE)?;
        Self::from_toml_str(&text)
    }

    /// Read `path` if given, otherwise use defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Apply command-line overrides.
    #[must_use]
    pub fn with_overrides(mut self, base_path: Option<PathBuf>, sequential: bool) -> Self {
        if base_path.is_some() {
            self.catalogs.base_path = base_path;
        }
        if sequential {
            self.catalogs.concurrent = false;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_table_missing() {
        let config = AppConfig::from_toml_str("").expect("parse");
        assert_eq!(config, AppConfig::default());
        assert!(config.catalogs.concurrent);
    }

    #[test]
    fn reads_catalog_table() {
        let config = AppConfig::from_toml_str(
            r#"
[catalogs]
base_path = "data"
concurrent = false
"#,
        )
        .expect("parse");
        assert_eq!(config.catalogs.base_path, Some(PathBuf::from("data")));
        assert!(!config.catalogs.concurrent);
    }

    #[test]
    fn unknown_keys_rejected() {
        let result = AppConfig::from_toml_str("[catalogs]\nparallelism = 4\n");
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn flags_override_file() {
        let config = AppConfig::default().with_overrides(Some(PathBuf::from("elsewhere")), true);
        assert_eq!(config.catalogs.base_path, Some(PathBuf::from("elsewhere")));
        assert!(!config.catalogs.concurrent);
    }
}
