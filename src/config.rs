use crate::domain::DeliveryMode;
use crate::persistence::{ensure_dir, read_file};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_NAME: &str = "tasknag";
const CONFIG_FILE: &str = "config.toml";

/// Default reminder period: five minutes
pub const DEFAULT_REMINDER_SECS: u64 = 5 * 60;

/// `~/.config/tasknag` (or the platform equivalent)
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME))
}

/// `~/.local/state/tasknag`, falling back to the local data dir where the
/// platform has no state dir
pub fn default_state_dir() -> Option<PathBuf> {
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .map(|dir| dir.join(APP_NAME))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where task documents, timer state and logs live
    pub state_dir: Option<PathBuf>,
    pub log_level: String,
    pub notifications: NotificationConfig,
    pub backend: BackendConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            state_dir: None,
            log_level: "info".to_string(),
            notifications: NotificationConfig::default(),
            backend: BackendConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub enabled: bool,
    pub interval_secs: u64,
    pub mode: DeliveryMode,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: DEFAULT_REMINDER_SECS,
            mode: DeliveryMode::default(),
        }
    }
}

impl NotificationConfig {
    /// Reminder period, never shorter than one second
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    LocalJson,
    Google,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    #[serde(rename = "type")]
    pub kind: BackendKind,
    pub localjson: LocalJsonConfig,
    pub google: GoogleConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalJsonConfig {
    /// Task document name under the state dir
    pub filename: String,
}

impl Default for LocalJsonConfig {
    fn default() -> Self {
        Self {
            filename: "tasks.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    /// Offline snapshot name under the state dir
    pub statefile: String,
    /// Preferred task list title for new tasks
    pub tasklist: Option<String>,
    /// Calendar receiving finished intervals
    pub calendar: String,
    /// JSON file holding `access_token`, kept fresh by an external helper
    pub token_file: Option<PathBuf>,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            statefile: "google_state.json".to_string(),
            tasklist: None,
            calendar: APP_NAME.to_string(),
            token_file: None,
        }
    }
}

impl AppConfig {
    /// Default config file location
    pub fn default_path() -> Result<PathBuf> {
        Ok(config_dir()
            .context("Could not determine config directory")?
            .join(CONFIG_FILE))
    }

    /// Load from `path` (or the default location). A missing file means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()?,
        };
        let content = read_file(&path)?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(toml::from_str(content)?)
    }

    /// Resolved state dir, created on demand
    pub fn state_dir(&self) -> Result<PathBuf> {
        let dir = match &self.state_dir {
            Some(dir) => dir.clone(),
            None => default_state_dir().context("Could not determine state directory")?,
        };
        ensure_dir(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.backend.kind, BackendKind::LocalJson);
        assert_eq!(config.backend.localjson.filename, "tasks.json");
        assert_eq!(config.notifications.interval(), Duration::from_secs(300));
        assert!(config.notifications.enabled);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            log_level = "debug"

            [notifications]
            interval_secs = 60
            mode = "replace"

            [backend]
            type = "google"

            [backend.google]
            tasklist = "Work"
            "#,
        )
        .unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.notifications.interval(), Duration::from_secs(60));
        assert_eq!(config.notifications.mode, DeliveryMode::Replace);
        assert!(config.notifications.enabled);
        assert_eq!(config.backend.kind, BackendKind::Google);
        assert_eq!(config.backend.google.tasklist.as_deref(), Some("Work"));
        assert_eq!(config.backend.google.calendar, "tasknag");
        assert_eq!(config.backend.google.statefile, "google_state.json");
        assert_eq!(config.backend.localjson, LocalJsonConfig::default());
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let config = AppConfig::from_toml_str("[notifications]\ninterval_secs = 0\n").unwrap();
        assert_eq!(config.notifications.interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[backend]\ntype = \"carrier-pigeon\"\n").unwrap();
        assert!(AppConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn test_state_dir_override_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.state_dir = Some(dir.path().join("state"));

        let resolved = config.state_dir().unwrap();
        assert!(resolved.is_dir());
    }
}
