use serde::{Deserialize, Serialize};

/// Which of the two task panes has keyboard focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pane {
    #[default]
    Open,
    Done,
}

impl Pane {
    pub fn toggled(self) -> Self {
        match self {
            Pane::Open => Pane::Done,
            Pane::Done => Pane::Open,
        }
    }

    /// Short name for the status bar
    pub fn tag(&self) -> &'static str {
        match self {
            Pane::Open => "OPEN",
            Pane::Done => "DONE",
        }
    }
}

/// Field being edited in the new-task form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Title,
    List,
}

/// Dedupe hint passed to the notification dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    /// Always show a fresh banner
    #[default]
    Rotate,
    /// Overwrite the previous banner of the same group
    Replace,
}
