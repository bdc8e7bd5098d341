//! Configuration for addonup
//!
//! TOML settings with a discovery hierarchy: an explicit path wins, then
//! the per-user config directory, then built-in defaults. Persisting
//! changed settings is the host's concern, not ours.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::updater::rate_limit::DEFAULT_COOLDOWN_HOURS;

/// Settings controlling the update orchestration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    /// Check the front-end itself for updates on entry
    pub repository_auto_update: bool,

    /// Check addons for updates on entry
    pub addon_auto_update: bool,

    /// Cooldown between checks of the same kind, in hours
    pub check_cooldown_hours: i64,

    /// Keep registries loaded when the content screen closes
    pub preload: bool,

    /// Directory of repository manifests
    pub repositories_dir: Option<PathBuf>,

    /// Marker file whose presence means "first run"; removed once seen
    pub first_run_marker: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            repository_auto_update: true,
            addon_auto_update: true,
            check_cooldown_hours: DEFAULT_COOLDOWN_HOURS,
            preload: false,
            repositories_dir: None,
            first_run_marker: None,
        }
    }
}

impl Settings {
    /// Load settings using the discovery hierarchy.
    ///
    /// An explicit path must exist and parse; a missing discovered file
    /// just means defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            log::info!("loading configuration from {}", path.display());
            return Self::load_from_file(path);
        }

        if let Some(path) = default_config_path() {
            if path.exists() {
                log::info!("loading configuration from {}", path.display());
                return Self::load_from_file(&path);
            }
        }

        log::debug!("no configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Load settings from one TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Cooldown as a chrono duration
    pub fn cooldown(&self) -> chrono::Duration {
        chrono::Duration::hours(self.check_cooldown_hours)
    }
}

/// Per-user config location: `<config_dir>/addonup/config.toml`
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("addonup").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.repository_auto_update);
        assert!(settings.addon_auto_update);
        assert_eq!(settings.check_cooldown_hours, 2);
        assert!(!settings.preload);
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
repository-auto-update = false
check-cooldown-hours = 6
preload = true
repositories-dir = "/var/lib/addonup/repositories"
"#,
        )
        .unwrap();

        let settings = Settings::load_from_file(&path).unwrap();
        assert!(!settings.repository_auto_update);
        assert!(settings.addon_auto_update); // untouched key keeps its default
        assert_eq!(settings.check_cooldown_hours, 6);
        assert!(settings.preload);
        assert_eq!(
            settings.repositories_dir.as_deref(),
            Some(Path::new("/var/lib/addonup/repositories"))
        );
    }

    #[test]
    fn test_load_rejects_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "preload = [").unwrap();
        assert!(Settings::load_from_file(&path).is_err());
    }

    #[test]
    fn test_explicit_missing_path_is_an_error() {
        assert!(Settings::load(Some(Path::new("/nonexistent/config.toml"))).is_err());
    }
}
