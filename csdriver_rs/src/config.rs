//! Driver configuration file support.
//!
//! Loads optional `.csdriver/config.toml` from the base directory.

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::cli::response_files::DEFAULT_MAX_DEPTH;
use crate::fs_utils::FileSystem;

pub const CONFIG_DIR: &str = ".csdriver";
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Root configuration structure
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    pub response_files: ResponseFilesConfig,
    pub paths: PathsConfig,
    pub suppressions: SuppressionsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResponseFilesConfig {
    /// Nesting limit for `@file` expansion.
    pub max_depth: usize,
    /// Default response file, relative to the config directory. Skipped
    /// with `/noconfig`.
    pub default: Option<String>,
}

impl Default for ResponseFilesConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            default: None,
        }
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Appended to the `/lib` search paths.
    pub sdk_directory: Option<String>,
    pub lib: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SuppressionsConfig {
    pub enabled: bool,
}

impl Default for SuppressionsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl DriverConfig {
    /// Directory holding `config.toml` and `suppressions.toml`.
    pub fn directory(base_directory: &str) -> String {
        format!("{}/{}", base_directory.trim_end_matches('/'), CONFIG_DIR)
    }

    /// Load `.csdriver/config.toml` under `base_directory`.
    /// Returns the defaults if the file doesn't exist or is invalid.
    pub fn load(fs: &dyn FileSystem, base_directory: &str) -> Self {
        let path = format!("{}/{}", Self::directory(base_directory), CONFIG_FILE);
        match Self::try_load_from_path(fs, &path) {
            Ok(Some(config)) => {
                debug!(path = %path, "loaded driver config");
                config
            }
            Ok(None) => Self::default(),
            Err(err) => {
                warn!(error = %err, "using default driver config");
                Self::default()
            }
        }
    }

    /// `Ok(None)` when the file is absent.
    pub fn try_load_from_path(fs: &dyn FileSystem, path: &str) -> Result<Option<Self>, ConfigError> {
        if !fs.file_exists(path) {
            return Ok(None);
        }
        let content = fs.read_all_text(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        toml::from_str(&content)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                path: path.to_string(),
                source,
            })
    }

    /// Full path of the default response file, if one is configured.
    pub fn default_response_file(&self, base_directory: &str) -> Option<String> {
        let name = self.response_files.default.as_deref()?;
        crate::paths::resolve_relative_path(name, Some(&Self::directory(base_directory)))
    }

    /// Extra library directories, `lib` entries first, then the SDK.
    pub fn extra_lib_paths(&self) -> impl Iterator<Item = &str> {
        self.paths
            .lib
            .iter()
            .map(String::as_str)
            .chain(self.paths.sdk_directory.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs_utils::MemoryFileSystem;

    #[test]
    fn test_default_config() {
        let config = DriverConfig::default();
        assert_eq!(config.response_files.max_depth, 32);
        assert!(config.response_files.default.is_none());
        assert!(config.suppressions.enabled);
        assert_eq!(config.extra_lib_paths().count(), 0);
    }

    #[test]
    fn test_load_missing_file() {
        let config = DriverConfig::load(&MemoryFileSystem::new(), "/p");
        assert_eq!(config.response_files.max_depth, 32);
    }

    #[test]
    fn test_load_valid_config() {
        let fs = MemoryFileSystem::new().with_file(
            "/p/.csdriver/config.toml",
            r#"
[response_files]
max_depth = 4
default = "csdriver.rsp"

[paths]
sdk_directory = "/opt/sdk"
lib = ["libs"]

[suppressions]
enabled = false
"#,
        );
        let config = DriverConfig::load(&fs, "/p");
        assert_eq!(config.response_files.max_depth, 4);
        assert_eq!(
            config.default_response_file("/p").as_deref(),
            Some("/p/.csdriver/csdriver.rsp")
        );
        assert_eq!(config.extra_lib_paths().collect::<Vec<_>>(), vec!["libs", "/opt/sdk"]);
        assert!(!config.suppressions.enabled);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let fs = MemoryFileSystem::new()
            .with_file("/p/.csdriver/config.toml", "[paths]\nlib = [\"x\"]\n");
        let config = DriverConfig::load(&fs, "/p");
        assert_eq!(config.response_files.max_depth, 32);
        assert!(config.suppressions.enabled);
    }

    #[test]
    fn test_invalid_config_reports_error() {
        let fs = MemoryFileSystem::new()
            .with_file("/p/.csdriver/config.toml", "[response_files]\nmax_depth = \"deep\"\n");
        let err = DriverConfig::try_load_from_path(&fs, "/p/.csdriver/config.toml")
            .expect_err("type mismatch");
        assert!(matches!(err, ConfigError::Parse { .. }));
        let config = DriverConfig::load(&fs, "/p");
        assert_eq!(config.response_files.max_depth, 32);
    }
}
