use super::enums::FormField;
use super::task::TaskList;

/// Search popup contents
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchBox {
    pub input: String,
}

/// New-task popup: a title plus an optional destination list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTaskForm {
    pub title: String,
    /// Empty when the backend has no list concept
    pub lists: Vec<TaskList>,
    pub list_index: usize,
    pub field: FormField,
    pub error: Option<String>,
}

impl NewTaskForm {
    pub fn new(lists: Vec<TaskList>) -> Self {
        Self {
            lists,
            ..Self::default()
        }
    }

    pub fn has_lists(&self) -> bool {
        !self.lists.is_empty()
    }

    pub fn selected_list(&self) -> Option<&TaskList> {
        self.lists.get(self.list_index)
    }

    /// Tab between title and list selector (title only without lists)
    pub fn next_field(&mut self) {
        self.field = match self.field {
            FormField::Title if self.has_lists() => FormField::List,
            _ => FormField::Title,
        };
    }

    pub fn select_prev_list(&mut self) {
        self.list_index = self.list_index.saturating_sub(1);
    }

    pub fn select_next_list(&mut self) {
        if self.list_index + 1 < self.lists.len() {
            self.list_index += 1;
        }
    }
}

/// Which popup (if any) owns the keyboard
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UiMode {
    #[default]
    Normal,
    Search(SearchBox),
    NewTask(NewTaskForm),
}

impl UiMode {
    pub fn is_modal(&self) -> bool {
        !matches!(self, UiMode::Normal)
    }
}
