//! Desktop notification delivery.
//!
//! Notifications go through the platform's own command-line notifier:
//! `terminal-notifier` (or `osascript`) on macOS and `notify-send` on Linux.

use crate::domain::DeliveryMode;
use std::process::Command;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

pub const APP_TITLE: &str = "tasknag";
const GROUP: &str = "tasknag.workcheck";

/// Bundle id banners are attributed to on macOS (e.g. your terminal's)
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
pub const SENDER_ENV: &str = "TASKNAG_NOTIFY_SENDER";

/// A single reminder banner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub title: String,
    pub message: String,
}

impl Reminder {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            title: APP_TITLE.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("no desktop notifier available on this platform")]
    Unsupported,
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}")]
    Failed { program: String, status: String },
}

/// Something that can put a reminder in front of the user
pub trait Notifier: Send + Sync {
    fn notify(&self, reminder: &Reminder, mode: DeliveryMode) -> Result<(), NotifyError>;
}

/// Shells out to the platform notifier
#[derive(Debug, Default)]
pub struct OsNotifier {
    seq: AtomicU64,
}

impl OsNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group id for this banner; rotate mode makes every banner unique
    fn group(&self, mode: DeliveryMode) -> String {
        match mode {
            DeliveryMode::Replace => GROUP.to_string(),
            DeliveryMode::Rotate => {
                let seq = self.seq.fetch_add(1, Ordering::Relaxed) + 1;
                format!("{}.{}.{}", GROUP, chrono::Utc::now().timestamp_millis(), seq)
            }
        }
    }
}

impl Notifier for OsNotifier {
    #[cfg(target_os = "macos")]
    fn notify(&self, reminder: &Reminder, mode: DeliveryMode) -> Result<(), NotifyError> {
        if let Ok(program) = which::which("terminal-notifier") {
            let program = program.to_string_lossy();
            let args = terminal_notifier_args(reminder, &self.group(mode));
            return send_with_sender(&args, notify_sender().as_deref(), |args| {
                run(&program, args)
            });
        }
        run("osascript", &["-e".to_string(), osascript_script(reminder)])
    }

    #[cfg(target_os = "linux")]
    fn notify(&self, reminder: &Reminder, mode: DeliveryMode) -> Result<(), NotifyError> {
        let program = which::which("notify-send").map_err(|_| NotifyError::Unsupported)?;
        let args = notify_send_args(reminder, mode, &self.group(mode));
        run(&program.to_string_lossy(), &args)
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    fn notify(&self, reminder: &Reminder, mode: DeliveryMode) -> Result<(), NotifyError> {
        let _ = (reminder, mode);
        Err(NotifyError::Unsupported)
    }
}

fn run(program: &str, args: &[String]) -> Result<(), NotifyError> {
    tracing::debug!(program, ?args, "sending notification");
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|source| NotifyError::Launch {
            program: program.to_string(),
            source,
        })?;
    if output.status.success() {
        Ok(())
    } else {
        Err(NotifyError::Failed {
            program: program.to_string(),
            status: output.status.to_string(),
        })
    }
}

/// Configured sender, falling back to the bundle of the hosting terminal
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
fn notify_sender() -> Option<String> {
    [SENDER_ENV, "__CFBundleIdentifier"]
        .iter()
        .filter_map(|key| std::env::var(key).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

/// Try once as `sender`; if terminal-notifier refuses, send unattributed
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
fn send_with_sender<F>(args: &[String], sender: Option<&str>, mut send: F) -> Result<(), NotifyError>
where
    F: FnMut(&[String]) -> Result<(), NotifyError>,
{
    if let Some(sender) = sender {
        let mut attributed = args.to_vec();
        attributed.extend(["-sender", sender, "-activate", sender].map(String::from));
        match send(&attributed) {
            Ok(()) => return Ok(()),
            Err(err) => {
                tracing::debug!(sender, "sender rejected, retrying without: {}", err);
            }
        }
    }
    send(args)
}

#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
fn terminal_notifier_args(reminder: &Reminder, group: &str) -> Vec<String> {
    let args: [&str; 8] = [
        "-title",
        &reminder.title,
        "-message",
        &reminder.message,
        "-group",
        group,
        "-sound",
        "default",
    ];
    args.iter().map(|s| s.to_string()).collect()
}

#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
fn osascript_script(reminder: &Reminder) -> String {
    format!(
        r#"display notification "{}" with title "{}""#,
        reminder.message.replace('"', "\\\""),
        reminder.title.replace('"', "\\\"")
    )
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn notify_send_args(reminder: &Reminder, mode: DeliveryMode, group: &str) -> Vec<String> {
    let mut args = vec![
        reminder.title.clone(),
        reminder.message.clone(),
        "--app-name".to_string(),
        APP_TITLE.to_string(),
    ];
    if mode == DeliveryMode::Replace {
        // Coalesces banners on desktops that honour the hint
        args.push("--hint".to_string());
        args.push(format!("string:x-canonical-private-synchronous:{}", group));
    }
    args
}
