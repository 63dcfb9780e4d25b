use std::time::Duration;

/// Repaint interval in milliseconds; the timer bar shows whole seconds
pub const REPAINT_MS: u64 = 1000;

/// How long the event loop waits for input before redrawing
pub fn repaint_interval() -> Duration {
    Duration::from_millis(REPAINT_MS)
}
