//! Flat local store: one JSON document for tasks, siblings for the timer
//! and the log of finished intervals.

use super::timer::{TimeInterval, TimerState, TimerStore};
use super::{lock, validate_title, Backend, StoreError, StoreResult};
use crate::domain::Task;
use crate::persistence::{ensure_dir, read_json, write_json};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use uuid::Uuid;

const TIMER_FILE: &str = "timer_state.json";
const TIME_LOG_FILE: &str = "time_log.json";

#[derive(Debug)]
pub struct LocalJsonBackend {
    path: PathBuf,
    time_log_path: PathBuf,
    cache: Mutex<Vec<Task>>,
    timer: TimerStore,
}

impl LocalJsonBackend {
    /// Open (creating if needed) the task document at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let dir = path
            .parent()
            .ok_or_else(|| StoreError::Backend(format!("no parent directory: {}", path.display())))?;
        ensure_dir(dir)?;
        if !path.exists() {
            write_json(&path, &Vec::<Task>::new())?;
        }

        let backend = Self {
            time_log_path: path.with_file_name(TIME_LOG_FILE),
            timer: TimerStore::open(path.with_file_name(TIMER_FILE)),
            cache: Mutex::new(Vec::new()),
            path,
        };
        backend.refresh()?;
        tracing::info!(path = %backend.path.display(), "local store opened");
        Ok(backend)
    }

    #[cfg(test)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Intervals recorded so far, oldest first
    pub fn time_log(&self) -> StoreResult<Vec<TimeInterval>> {
        Ok(read_json(&self.time_log_path)?)
    }

    fn append_interval(&self, interval: TimeInterval) -> StoreResult<()> {
        let mut log = self.time_log()?;
        log.push(interval);
        write_json(&self.time_log_path, &log)?;
        Ok(())
    }

    /// Apply `change` to a copy of the cache, persist it, then commit
    fn mutate<T, F>(&self, change: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Vec<Task>) -> StoreResult<Option<T>>,
    {
        let mut cache = lock(&self.cache);
        let mut next = cache.clone();
        let Some(result) = change(&mut next)? else {
            // Nothing changed
            return Err(StoreError::NotFound(String::new()));
        };
        write_json(&self.path, &next)?;
        *cache = next;
        Ok(result)
    }
}

impl Backend for LocalJsonBackend {
    fn name(&self) -> &'static str {
        "localjson"
    }

    fn refresh(&self) -> StoreResult<()> {
        let tasks: Vec<Task> = read_json(&self.path)?;
        *lock(&self.cache) = tasks;
        Ok(())
    }

    fn list_open(&self) -> Vec<Task> {
        lock(&self.cache).iter().filter(|t| !t.done).cloned().collect()
    }

    fn list_done(&self) -> Vec<Task> {
        lock(&self.cache).iter().filter(|t| t.done).cloned().collect()
    }

    fn toggle(&self, id: &str) -> StoreResult<Task> {
        self.mutate(|tasks| {
            Ok(tasks.iter_mut().find(|t| t.id == id).map(|t| {
                t.done = !t.done;
                t.clone()
            }))
        })
        .map_err(|err| not_found_as(err, id))
    }

    fn delete(&self, id: &str) -> StoreResult<Task> {
        self.mutate(|tasks| {
            Ok(tasks
                .iter()
                .position(|t| t.id == id)
                .map(|pos| tasks.remove(pos)))
        })
        .map_err(|err| not_found_as(err, id))
    }

    fn ensure(&self, title: &str) -> StoreResult<Task> {
        let title = validate_title(title)?;
        if let Some(existing) = lock(&self.cache).iter().find(|t| !t.done && t.title == title) {
            return Ok(existing.clone());
        }
        self.mutate(|tasks| {
            // Re-check under the same lock the write happens under
            if let Some(existing) = tasks.iter().find(|t| !t.done && t.title == title) {
                return Ok(Some(existing.clone()));
            }
            let task = Task::new(Uuid::new_v4().to_string(), title);
            tasks.push(task.clone());
            Ok(Some(task))
        })
    }

    fn get_active_timer(&self) -> TimerState {
        self.timer.snapshot()
    }

    fn start_timer(&self, title: &str, started: i64) {
        self.timer
            .start_with(title, started, |interval| self.append_interval(interval));
    }

    fn stop_timer(&self, ended: i64) {
        self.timer.stop_with(ended, |interval| self.append_interval(interval));
    }
}

fn not_found_as(err: StoreError, id: &str) -> StoreError {
    match err {
        StoreError::NotFound(_) => StoreError::NotFound(id.to_string()),
        other => other,
    }
}
