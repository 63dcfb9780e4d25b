use serde::{Deserialize, Serialize};

/// A task as seen by every backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Backend-assigned identity, immutable once created
    pub id: String,
    /// Display title (never empty)
    pub title: String,
    /// Completion flag
    pub done: bool,
    /// Originating list/category, absent for flat backends
    #[serde(default)]
    pub list_title: Option<String>,
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            done: false,
            list_title: None,
        }
    }

    pub fn with_list_title(mut self, list_title: impl Into<String>) -> Self {
        self.list_title = Some(list_title.into());
        self
    }

    /// Label shown in the open pane: "List / Title" when grouped
    pub fn label(&self) -> String {
        match &self.list_title {
            Some(list) if !list.is_empty() => format!("{} / {}", list.replace(' ', ""), self.title),
            _ => self.title.clone(),
        }
    }
}

/// A destination list a backend can create tasks in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskList {
    pub id: String,
    pub title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_without_list() {
        let task = Task::new("1", "Buy milk");
        assert_eq!(task.label(), "Buy milk");
    }

    #[test]
    fn test_label_with_list_strips_spaces() {
        let task = Task::new("1", "Buy milk").with_list_title("My Tasks");
        assert_eq!(task.label(), "MyTasks / Buy milk");
    }

    #[test]
    fn test_missing_list_title_deserializes_as_none() {
        let task: Task = serde_json::from_str(r#"{"id":"a","title":"T","done":true}"#).unwrap();
        assert!(task.done);
        assert_eq!(task.list_title, None);
    }
}
