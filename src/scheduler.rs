//! Periodic "what are you working on?" reminders.
//!
//! A background thread wakes on a fixed period, reads the backend's timer
//! state and hands one reminder to the notifier. It never mutates the store.

use crate::domain::DeliveryMode;
use crate::notifications::{Notifier, Reminder};
use crate::store::{Backend, TimerState};
use anyhow::{Context, Result};
use crossbeam_channel::{bounded, select, tick, Receiver, RecvTimeoutError, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Upper bound on how long `stop` waits for the worker
pub const STOP_TIMEOUT: Duration = Duration::from_secs(2);

/// What to say for the current timer state
pub fn reminder_for(state: &TimerState) -> Reminder {
    if state.active {
        Reminder::new(format!("Are you still working on {}?", state.title))
    } else {
        Reminder::new("What are you working on?")
    }
}

struct Worker {
    stop_tx: Sender<()>,
    done_rx: Receiver<()>,
    cancelled: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

pub struct Scheduler {
    backend: Arc<dyn Backend>,
    notifier: Arc<dyn Notifier>,
    interval: Duration,
    mode: DeliveryMode,
    worker: Option<Worker>,
}

impl Scheduler {
    pub fn new(
        backend: Arc<dyn Backend>,
        notifier: Arc<dyn Notifier>,
        interval: Duration,
        mode: DeliveryMode,
    ) -> Self {
        Self {
            backend,
            notifier,
            interval,
            mode,
            worker: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.handle.is_finished())
    }

    /// Spawn the worker; a no-op while one is already running
    pub fn start(&mut self) -> Result<()> {
        if self.is_running() {
            return Ok(());
        }
        // Reap a worker that exited on its own
        self.stop();

        let (stop_tx, stop_rx) = bounded::<()>(0);
        let (done_tx, done_rx) = bounded::<()>(0);
        let cancelled = Arc::new(AtomicBool::new(false));

        let backend = Arc::clone(&self.backend);
        let notifier = Arc::clone(&self.notifier);
        let flag = Arc::clone(&cancelled);
        let interval = self.interval;
        let mode = self.mode;

        let handle = thread::Builder::new()
            .name("tasknag-scheduler".to_string())
            .spawn(move || {
                // Dropped on exit, which is what `stop` waits for
                let _done = done_tx;
                run_loop(&*backend, &*notifier, interval, mode, &stop_rx, &flag);
            })
            .context("Failed to spawn scheduler thread")?;

        self.worker = Some(Worker {
            stop_tx,
            done_rx,
            cancelled,
            handle,
        });
        tracing::info!(interval_secs = interval.as_secs_f64(), ?mode, "scheduler started");
        Ok(())
    }

    /// Signal the worker and wait at most [`STOP_TIMEOUT`] for it to exit.
    /// No reminder is dispatched once this returns.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        worker.cancelled.store(true, Ordering::SeqCst);
        drop(worker.stop_tx);

        match worker.done_rx.recv_timeout(STOP_TIMEOUT) {
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!("scheduler did not exit within {:?}; detaching", STOP_TIMEOUT);
            }
            _ => {
                if worker.handle.join().is_err() {
                    tracing::error!("scheduler thread panicked");
                }
                tracing::info!("scheduler stopped");
            }
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_loop(
    backend: &dyn Backend,
    notifier: &dyn Notifier,
    interval: Duration,
    mode: DeliveryMode,
    stop_rx: &Receiver<()>,
    cancelled: &AtomicBool,
) {
    let ticker = tick(interval);
    loop {
        select! {
            recv(stop_rx) -> _ => break,
            recv(ticker) -> _ => {
                if cancelled.load(Ordering::SeqCst) {
                    break;
                }
                remind(backend, notifier, mode);
            }
        }
    }
}

fn remind(backend: &dyn Backend, notifier: &dyn Notifier, mode: DeliveryMode) {
    let state = backend.get_active_timer();
    tracing::debug!(active = state.active, title = %state.title, "scheduler tick");
    let reminder = reminder_for(&state);
    if let Err(err) = notifier.notify(&reminder, mode) {
        tracing::warn!("notification failed: {}", err);
    }
}
