//! Timer state owned by a backend.
//!
//! Readers (the scheduler thread, the render loop) only ever take the state
//! lock long enough to clone three fields. Writers serialize on a separate
//! writer lock that is held across persistence and remote recording, so a
//! slow disk or network never stalls a reader and no reader ever observes a
//! half-applied transition.

use super::{lock, StoreError, StoreResult};
use crate::persistence::{read_json, write_json};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// The single active work session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub title: String,
    /// Seconds since the Unix epoch; 0 when inactive
    #[serde(default)]
    pub started: i64,
}

impl TimerState {
    pub fn running(title: impl Into<String>, started: i64) -> Self {
        Self {
            active: true,
            title: title.into(),
            started,
        }
    }

    /// Inactive states always carry an empty title and zero start
    fn normalized(self) -> Self {
        if self.active {
            self
        } else {
            Self::default()
        }
    }

    /// Whether `title` currently holds the active timer
    pub fn is_running(&self, title: &str) -> bool {
        self.active && self.title == title
    }

    /// Seconds elapsed at `now` (0 when inactive)
    pub fn elapsed(&self, now: i64) -> i64 {
        if self.active {
            (now - self.started).max(0)
        } else {
            0
        }
    }
}

/// A closed work interval ready to be recorded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInterval {
    pub title: String,
    pub started: i64,
    pub ended: i64,
}

impl TimeInterval {
    /// Build an interval; `ended` must be strictly after `started`
    pub fn new(title: impl Into<String>, started: i64, ended: i64) -> StoreResult<Self> {
        if ended <= started {
            return Err(StoreError::Validation(format!(
                "interval end {} is not after start {}",
                ended, started
            )));
        }
        Ok(Self {
            title: title.into(),
            started,
            ended,
        })
    }

    pub fn duration_secs(&self) -> i64 {
        self.ended - self.started
    }
}

/// Current unix time in seconds
pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Mutex-guarded timer state persisted to its own JSON document
#[derive(Debug)]
pub struct TimerStore {
    path: PathBuf,
    state: Mutex<TimerState>,
    writer: Mutex<()>,
}

impl TimerStore {
    /// Load the persisted state. A missing or unreadable file starts inactive.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let state = match read_json::<_, TimerState>(&path) {
            Ok(state) => state.normalized(),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %format!("{:#}", err), "timer state unreadable, starting inactive");
                TimerState::default()
            }
        };
        Self {
            path,
            state: Mutex::new(state),
            writer: Mutex::new(()),
        }
    }

    pub fn snapshot(&self) -> TimerState {
        lock(&self.state).clone()
    }

    /// Start `title` at `started`. When a different title was running,
    /// `close_previous` receives its interval ending at `started` first;
    /// the callback's failure is logged and does not block the start.
    pub fn start_with<F>(&self, title: &str, started: i64, close_previous: F)
    where
        F: FnOnce(TimeInterval) -> StoreResult<()>,
    {
        let _writer = lock(&self.writer);
        let previous = self.snapshot();
        if previous.active && previous.title != title {
            record(
                TimeInterval::new(previous.title.clone(), previous.started, started),
                close_previous,
            );
            // Previous session is over even if the new state fails to persist
            self.set(TimerState::default());
        }
        self.set(TimerState::running(title, started));
    }

    /// Stop the timer at `ended`. `record_interval` sees the finished
    /// interval when one was active; clearing happens regardless.
    pub fn stop_with<F>(&self, ended: i64, record_interval: F)
    where
        F: FnOnce(TimeInterval) -> StoreResult<()>,
    {
        let _writer = lock(&self.writer);
        let previous = self.snapshot();
        if !previous.active {
            return;
        }
        if previous.started > 0 {
            record(
                TimeInterval::new(previous.title.clone(), previous.started, ended),
                record_interval,
            );
        }
        self.set(TimerState::default());
    }

    /// Swap the in-memory state, then persist best-effort
    fn set(&self, next: TimerState) {
        *lock(&self.state) = next.clone();
        if let Err(err) = write_json(&self.path, &next) {
            tracing::warn!(path = %self.path.display(), error = %format!("{:#}", err), "failed to persist timer state");
        }
    }
}

fn record<F>(interval: StoreResult<TimeInterval>, sink: F)
where
    F: FnOnce(TimeInterval) -> StoreResult<()>,
{
    let result = interval.and_then(|iv| {
        tracing::debug!(title = %iv.title, secs = iv.duration_secs(), "recording interval");
        sink(iv)
    });
    if let Err(err) = result {
        tracing::warn!(error = %err, "time interval not recorded");
    }
}
