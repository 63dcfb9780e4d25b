//! Storage contract shared by every task backend.
//!
//! The controller and the notification scheduler both hold an
//! `Arc<dyn Backend>`; implementations synchronize internally so every
//! method takes `&self`.

pub mod google;
pub mod local;
pub mod timer;

use crate::config::{AppConfig, BackendKind};
use crate::domain::{Task, TaskList};
use anyhow::{Context, Result};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

pub use google::GoogleBackend;
pub use local::LocalJsonBackend;
pub use timer::{unix_now, TimerState};

/// Failures surfaced by backend operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// The id does not resolve to a live task
    #[error("task not found: {0}")]
    NotFound(String),
    /// Input rejected before touching the medium
    #[error("invalid input: {0}")]
    Validation(String),
    /// I/O or upstream failure
    #[error("backend failure: {0}")]
    Backend(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

impl From<anyhow::Error> for StoreError {
    fn from(err: anyhow::Error) -> Self {
        StoreError::Backend(format!("{:#}", err))
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Task repository plus the single timer state it owns
pub trait Backend: Send + Sync {
    /// Human-readable backend name for logs
    fn name(&self) -> &'static str;

    /// Reload the authoritative task list, replacing the cache wholesale.
    /// On failure the previous cache is kept.
    fn refresh(&self) -> StoreResult<()>;

    fn list_open(&self) -> Vec<Task>;

    fn list_done(&self) -> Vec<Task>;

    /// Flip `done` on the task with this id
    fn toggle(&self, id: &str) -> StoreResult<Task>;

    /// Remove the first task with this id
    fn delete(&self, id: &str) -> StoreResult<Task>;

    /// Return the open task titled exactly `title`, creating it if absent
    fn ensure(&self, title: &str) -> StoreResult<Task>;

    /// Destination lists new tasks can be filed under
    fn list_lists(&self) -> StoreResult<Vec<TaskList>> {
        Ok(Vec::new())
    }

    /// Create a task in a specific list; flat backends have a single list
    fn create_in_list(&self, title: &str, list_id: &str) -> StoreResult<Task> {
        let _ = list_id;
        self.ensure(title)
    }

    /// Snapshot of the timer; never waits on I/O
    fn get_active_timer(&self) -> TimerState;

    fn start_timer(&self, title: &str, started: i64);

    /// Clear the timer. Recording the finished interval is best-effort.
    fn stop_timer(&self, ended: i64);

    /// Stop a timer running on a different title at `now`, then start `title` at `now`
    fn switch_timer(&self, title: &str, now: i64) {
        let current = self.get_active_timer();
        if current.active && current.title != title {
            self.stop_timer(now);
        }
        self.start_timer(title, now);
    }
}

/// Reject blank titles before they reach a backend
pub(crate) fn validate_title(title: &str) -> StoreResult<&str> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(StoreError::Validation("task title must not be empty".to_string()));
    }
    Ok(title)
}

/// Lock a mutex, recovering the data if a previous holder panicked
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Build the backend selected in the configuration
pub fn make_backend(config: &AppConfig) -> Result<Arc<dyn Backend>> {
    let state_dir = config.state_dir()?;
    match config.backend.kind {
        BackendKind::LocalJson => {
            let path = state_dir.join(&config.backend.localjson.filename);
            let backend = LocalJsonBackend::open(&path)
                .with_context(|| format!("Failed to open local store: {}", path.display()))?;
            Ok(Arc::new(backend))
        }
        BackendKind::Google => {
            let google = &config.backend.google;
            let api = google::GoogleHttpApi::new(google::token_source(google)?);
            let backend = GoogleBackend::open(
                api,
                &state_dir.join(&google.statefile),
                google.tasklist.clone(),
                google.calendar.clone(),
            )
            .context("Failed to open Google backend")?;
            Ok(Arc::new(backend))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_title() {
        assert!(validate_title("A").is_ok());
        assert!(matches!(validate_title("   "), Err(StoreError::Validation(_))));
        assert!(matches!(validate_title(""), Err(StoreError::Validation(_))));
    }

    #[test]
    fn test_anyhow_maps_to_backend_error() {
        let err: StoreError = anyhow::anyhow!("disk full").into();
        assert!(matches!(err, StoreError::Backend(msg) if msg.contains("disk full")));
    }

    #[test]
    fn test_make_backend_defaults_to_local_json() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.state_dir = Some(temp_dir.path().to_path_buf());

        let backend = make_backend(&config).unwrap();
        assert_eq!(backend.name(), "localjson");
        assert!(temp_dir.path().join("tasks.json").exists());
    }
}
