//! Export configuration.

use std::fs;
use std::path::{Path, PathBuf};

use bock_common::BockResult;
use serde::{Deserialize, Serialize};

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV: &str = "BOCK_EXPORT_CONFIG";

/// Export configuration options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Runtime CLI to drive (`docker`, `podman`, or a path).
    pub frontend: String,
    /// Address of the embedded registry images are pulled from.
    pub local_registry: Option<String>,
    /// Comma-separated feature flags applied to every build.
    pub feature_overrides: Option<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            frontend: "docker".to_string(),
            local_registry: None,
            feature_overrides: None,
        }
    }
}

impl ExportConfig {
    /// Default config file location (`<config dir>/bock/export.toml`).
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("bock").join("export.toml"))
    }

    /// Load configuration.
    ///
    /// Uses `path` when given, else `$BOCK_EXPORT_CONFIG`, else
    /// [`Self::default_path`]. A missing file at the default location yields
    /// the defaults; an explicitly named file must exist.
    ///
    /// # Errors
    ///
    /// Returns an I/O error for an unreadable file and
    /// [`bock_common::BockError::Config`] for invalid TOML.
    pub fn load(path: Option<&Path>) -> BockResult<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::from_file(Path::new(&path));
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Read configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error or [`bock_common::BockError::Config`].
    pub fn from_file(path: &Path) -> BockResult<Self> {
        tracing::debug!(path = %path.display(), "Loading export config");
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Set the runtime CLI.
    #[must_use]
    pub fn with_frontend(mut self, frontend: impl Into<String>) -> Self {
        self.frontend = frontend.into();
        self
    }

    /// Set the embedded registry address.
    #[must_use]
    pub fn with_local_registry(mut self, addr: impl Into<String>) -> Self {
        self.local_registry = Some(addr.into());
        self
    }

    /// Set the feature overrides.
    #[must_use]
    pub fn with_feature_overrides(mut self, flags: impl Into<String>) -> Self {
        self.feature_overrides = Some(flags.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use bock_common::BockError;

    use super::*;

    #[test]
    fn default_config() {
        let config = ExportConfig::default();
        assert_eq!(config.frontend, "docker");
        assert!(config.local_registry.is_none());
        assert!(config.feature_overrides.is_none());
    }

    #[test]
    fn builder_pattern() {
        let config = ExportConfig::default()
            .with_frontend("podman")
            .with_local_registry("127.0.0.1:8371")
            .with_feature_overrides("try");

        assert_eq!(config.frontend, "podman");
        assert_eq!(config.local_registry.as_deref(), Some("127.0.0.1:8371"));
        assert_eq!(config.feature_overrides.as_deref(), Some("try"));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.toml");
        fs::write(&path, "frontend = \"podman\"\nlocal_registry = \"localhost:5000\"\n").unwrap();

        let config = ExportConfig::load(Some(&path)).unwrap();
        assert_eq!(
            config,
            ExportConfig::default()
                .with_frontend("podman")
                .with_local_registry("localhost:5000")
        );
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.toml");
        fs::write(&path, "frontend = [\n").unwrap();

        let err = ExportConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, BockError::Config { .. }));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.toml");
        fs::write(&path, "runtime = \"docker\"\n").unwrap();

        assert!(ExportConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ExportConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, BockError::Io(_)));
    }
}
