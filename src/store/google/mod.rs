//! Composite remote store: tasks live in Google task lists, finished timer
//! intervals become events in a dedicated calendar.

pub mod api;

use super::timer::{TimeInterval, TimerState, TimerStore};
use super::{lock, validate_title, Backend, StoreError, StoreResult};
use crate::domain::{Task, TaskList};
use crate::persistence::{ensure_dir, read_json, write_json};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use api::{RemoteList, TasksApi};
pub use api::{token_source, GoogleHttpApi};

/// Separator between list id and item id in composite task ids
pub const ID_DELIMITER: &str = "::";
const TIMER_FILE: &str = "timer_state.json";
const DEFAULT_LIST_TITLE: &str = "My Tasks";
const FALLBACK_LIST_NAME: &str = "Tasks";
const UNTITLED: &str = "(untitled)";

pub fn compose_id(list_id: &str, task_id: &str) -> String {
    format!("{}{}{}", list_id, ID_DELIMITER, task_id)
}

pub fn split_id(id: &str) -> Option<(&str, &str)> {
    id.split_once(ID_DELIMITER)
}

/// Where a cached task lives remotely
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct RemoteRef {
    list_id: String,
    task_id: String,
}

/// Cached tasks plus the id index, also persisted as the offline snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RemoteCache {
    #[serde(default)]
    tasks: Vec<Task>,
    #[serde(default)]
    index: HashMap<String, RemoteRef>,
}

impl RemoteCache {
    fn insert(&mut self, task: Task, remote: RemoteRef) {
        self.index.insert(task.id.clone(), remote);
        self.tasks.push(task);
    }
}

pub struct GoogleBackend<A = GoogleHttpApi> {
    api: A,
    snapshot_path: PathBuf,
    cache: Mutex<RemoteCache>,
    preferred_list: Option<String>,
    calendar_name: String,
    calendar_id: Mutex<Option<String>>,
    timer: TimerStore,
}

impl<A: TasksApi> GoogleBackend<A> {
    /// Open the backend. The last snapshot at `snapshot_path` seeds the cache
    /// so the UI has something to show when the first refresh fails.
    pub fn open(
        api: A,
        snapshot_path: &Path,
        preferred_list: Option<String>,
        calendar_name: String,
    ) -> StoreResult<Self> {
        if let Some(dir) = snapshot_path.parent() {
            ensure_dir(dir)?;
        }
        let cache = match read_json::<_, RemoteCache>(snapshot_path) {
            Ok(cache) => cache,
            Err(err) => {
                tracing::warn!(error = %format!("{:#}", err), "ignoring unreadable Google snapshot");
                RemoteCache::default()
            }
        };

        let backend = Self {
            api,
            snapshot_path: snapshot_path.to_path_buf(),
            cache: Mutex::new(cache),
            preferred_list,
            calendar_name,
            calendar_id: Mutex::new(None),
            timer: TimerStore::open(snapshot_path.with_file_name(TIMER_FILE)),
        };
        if let Err(err) = backend.refresh() {
            tracing::warn!(error = %err, "initial Google refresh failed, using cached snapshot");
        }
        Ok(backend)
    }

    #[cfg(test)]
    pub fn api(&self) -> &A {
        &self.api
    }

    fn lookup(&self, id: &str) -> StoreResult<RemoteRef> {
        let cache = lock(&self.cache);
        if let Some(found) = cache.index.get(id) {
            return Ok(found.clone());
        }
        // Snapshots without an index still encode the location in the id
        match split_id(id) {
            Some((list_id, task_id)) if cache.tasks.iter().any(|t| t.id == id) => Ok(RemoteRef {
                list_id: list_id.to_string(),
                task_id: task_id.to_string(),
            }),
            _ => Err(StoreError::NotFound(id.to_string())),
        }
    }

    fn save_snapshot(&self, cache: &RemoteCache) {
        if let Err(err) = write_json(&self.snapshot_path, cache) {
            tracing::warn!(error = %format!("{:#}", err), "failed to write Google snapshot");
        }
    }

    /// List new tasks land in: the configured one, else the first, else a fresh one
    fn default_list(&self) -> StoreResult<RemoteList> {
        let lists = self.api.task_lists()?;
        if let Some(preferred) = &self.preferred_list {
            if let Some(found) = lists.iter().find(|l| l.title.as_deref() == Some(preferred.as_str())) {
                return Ok(found.clone());
            }
        }
        match lists.into_iter().next() {
            Some(first) => Ok(first),
            None => self.api.create_task_list(DEFAULT_LIST_TITLE),
        }
    }

    fn insert_remote(&self, title: &str, list_id: &str, list_title: String) -> StoreResult<Task> {
        let created = self.api.insert_task(list_id, title)?;
        let task = Task::new(compose_id(list_id, &created.id), title).with_list_title(list_title);
        let mut cache = lock(&self.cache);
        cache.insert(
            task.clone(),
            RemoteRef {
                list_id: list_id.to_string(),
                task_id: created.id,
            },
        );
        self.save_snapshot(&cache);
        Ok(task)
    }

    fn calendar_id(&self) -> StoreResult<String> {
        let mut cached = lock(&self.calendar_id);
        if let Some(id) = cached.as_ref() {
            return Ok(id.clone());
        }
        let id = self.api.ensure_calendar(&self.calendar_name)?;
        *cached = Some(id.clone());
        Ok(id)
    }

    fn record_interval(&self, interval: TimeInterval) -> StoreResult<()> {
        let calendar_id = self.calendar_id()?;
        self.api.insert_event(&calendar_id, &interval)?;
        tracing::info!(title = %interval.title, secs = interval.duration_secs(), "interval logged to calendar");
        Ok(())
    }
}

impl<A: TasksApi> Backend for GoogleBackend<A> {
    fn name(&self) -> &'static str {
        "google"
    }

    fn refresh(&self) -> StoreResult<()> {
        // Build the new cache off to the side so a failure keeps the old one
        let mut fresh = RemoteCache::default();
        for list in self.api.task_lists()? {
            let list_title = list.title.clone().unwrap_or_default();
            for remote in self.api.tasks(&list.id)? {
                let done = remote.is_completed();
                let title = remote
                    .title
                    .clone()
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| UNTITLED.to_string());
                let mut task =
                    Task::new(compose_id(&list.id, &remote.id), title).with_list_title(list_title.clone());
                task.done = done;
                fresh.insert(
                    task,
                    RemoteRef {
                        list_id: list.id.clone(),
                        task_id: remote.id,
                    },
                );
            }
        }

        tracing::debug!(tasks = fresh.tasks.len(), "Google refresh complete");
        let mut cache = lock(&self.cache);
        *cache = fresh;
        self.save_snapshot(&cache);
        Ok(())
    }

    fn list_open(&self) -> Vec<Task> {
        lock(&self.cache).tasks.iter().filter(|t| !t.done).cloned().collect()
    }

    fn list_done(&self) -> Vec<Task> {
        lock(&self.cache).tasks.iter().filter(|t| t.done).cloned().collect()
    }

    fn toggle(&self, id: &str) -> StoreResult<Task> {
        let remote = self.lookup(id)?;
        let current = self.api.get_task(&remote.list_id, &remote.task_id)?;
        let completed_at = if current.is_completed() {
            None
        } else {
            Some(chrono::Local::now())
        };
        let updated = self
            .api
            .set_completed(&remote.list_id, &remote.task_id, completed_at)?;

        let mut cache = lock(&self.cache);
        let task = cache
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .map(|t| {
                t.done = updated.is_completed();
                t.clone()
            })
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        self.save_snapshot(&cache);
        Ok(task)
    }

    fn delete(&self, id: &str) -> StoreResult<Task> {
        let remote = self.lookup(id)?;
        self.api.delete_task(&remote.list_id, &remote.task_id)?;

        let mut cache = lock(&self.cache);
        let position = cache
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let removed = cache.tasks.remove(position);
        cache.index.remove(id);
        self.save_snapshot(&cache);
        Ok(removed)
    }

    fn ensure(&self, title: &str) -> StoreResult<Task> {
        let title = validate_title(title)?;
        if let Some(existing) = lock(&self.cache)
            .tasks
            .iter()
            .find(|t| !t.done && t.title == title)
        {
            return Ok(existing.clone());
        }
        let list = self.default_list()?;
        let list_title = list.title.clone().unwrap_or_else(|| FALLBACK_LIST_NAME.to_string());
        self.insert_remote(title, &list.id, list_title)
    }

    fn list_lists(&self) -> StoreResult<Vec<TaskList>> {
        Ok(self
            .api
            .task_lists()?
            .into_iter()
            .map(|l| TaskList {
                id: l.id,
                title: l.title.unwrap_or_default(),
            })
            .collect())
    }

    fn create_in_list(&self, title: &str, list_id: &str) -> StoreResult<Task> {
        let title = validate_title(title)?;
        let list_title = self
            .list_lists()?
            .into_iter()
            .find(|l| l.id == list_id)
            .map(|l| l.title)
            .unwrap_or_else(|| FALLBACK_LIST_NAME.to_string());
        self.insert_remote(title, list_id, list_title)
    }

    fn get_active_timer(&self) -> TimerState {
        self.timer.snapshot()
    }

    fn start_timer(&self, title: &str, started: i64) {
        // Close out a different running task in the calendar before switching
        self.timer
            .start_with(title, started, |interval| self.record_interval(interval));
    }

    fn stop_timer(&self, ended: i64) {
        self.timer
            .stop_with(ended, |interval| self.record_interval(interval));
    }
}
