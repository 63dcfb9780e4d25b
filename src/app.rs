use crate::domain::{
    clamp_index, filter_done, filter_open, FormField, NewTaskForm, Pane, SearchBox, Task, UiMode,
};
use crate::store::{Backend, StoreResult, TimerState};
use std::sync::Arc;

/// Main application state
pub struct AppState {
    store: Arc<dyn Backend>,
    pub focus: Pane,
    pub selection_open: usize,
    pub selection_done: usize,
    /// Applied to both panes; the trimmed search input
    pub filter_text: String,
    pub mode: UiMode,
    /// Last command failure, shown on the status bar
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(store: Arc<dyn Backend>) -> Self {
        Self {
            store,
            focus: Pane::Open,
            selection_open: 0,
            selection_done: 0,
            filter_text: String::new(),
            mode: UiMode::Normal,
            status_message: None,
        }
    }

    pub fn filtered_open(&self) -> Vec<Task> {
        filter_open(self.store.list_open(), &self.filter_text)
    }

    pub fn filtered_done(&self) -> Vec<Task> {
        filter_done(self.store.list_done(), &self.filter_text)
    }

    pub fn active_timer(&self) -> TimerState {
        self.store.get_active_timer()
    }

    /// Pull both selections back inside their (possibly shrunk) views
    pub fn clamp_selections(&mut self) {
        self.selection_open = clamp_index(self.selection_open, self.filtered_open().len());
        self.selection_done = clamp_index(self.selection_done, self.filtered_done().len());
    }

    /// Task under the cursor in the focused pane
    pub fn selected_task(&self) -> Option<Task> {
        match self.focus {
            Pane::Open => self.filtered_open().into_iter().nth(self.selection_open),
            Pane::Done => self.filtered_done().into_iter().nth(self.selection_done),
        }
    }

    fn focused_view_len(&self) -> usize {
        match self.focus {
            Pane::Open => self.filtered_open().len(),
            Pane::Done => self.filtered_done().len(),
        }
    }

    fn focused_selection_mut(&mut self) -> &mut usize {
        match self.focus {
            Pane::Open => &mut self.selection_open,
            Pane::Done => &mut self.selection_done,
        }
    }

    pub fn move_selection_up(&mut self) {
        let len = self.focused_view_len();
        if len == 0 {
            return;
        }
        let selection = self.focused_selection_mut();
        *selection = clamp_index(selection.saturating_sub(1), len);
    }

    pub fn move_selection_down(&mut self) {
        let len = self.focused_view_len();
        if len == 0 {
            return;
        }
        let selection = self.focused_selection_mut();
        *selection = clamp_index(*selection + 1, len);
    }

    pub fn toggle_focus(&mut self) {
        self.focus = self.focus.toggled();
    }

    /// Flip completion of the selected task; the cursor stays where it is
    pub fn toggle_selected(&mut self) {
        let Some(task) = self.selected_task() else {
            return;
        };
        let result = self.store.toggle(&task.id);
        if let Some(toggled) = self.check("toggle", result) {
            tracing::info!(id = %toggled.id, done = toggled.done, "task toggled");
        }
    }

    pub fn delete_selected(&mut self) {
        let Some(task) = self.selected_task() else {
            return;
        };
        let result = self.store.delete(&task.id);
        if let Some(removed) = self.check("delete", result) {
            tracing::info!(id = %removed.id, title = %removed.title, "task deleted");
            let selection = self.focused_selection_mut();
            *selection = selection.saturating_sub(1);
        }
    }

    /// Reload from the backend; selections are only clamped, not reset
    pub fn refresh(&mut self) {
        let result = self.store.refresh();
        if self.check("refresh", result).is_some() {
            self.clamp_selections();
        }
    }

    pub fn open_search(&mut self) {
        if self.mode.is_modal() {
            return;
        }
        self.mode = UiMode::Search(SearchBox {
            input: self.filter_text.clone(),
        });
    }

    fn edit_search<F: FnOnce(&mut String)>(&mut self, edit: F) {
        let UiMode::Search(search) = &mut self.mode else {
            return;
        };
        edit(&mut search.input);
        self.filter_text = search.input.trim().to_string();
        self.selection_open = 0;
        self.selection_done = 0;
    }

    pub fn search_add_char(&mut self, c: char) {
        self.edit_search(|input| input.push(c));
    }

    pub fn search_backspace(&mut self) {
        self.edit_search(|input| {
            input.pop();
        });
    }

    pub fn search_clear(&mut self) {
        self.edit_search(String::clear);
    }

    /// Hide the popup; the filter stays applied
    pub fn close_search(&mut self) {
        if matches!(self.mode, UiMode::Search(_)) {
            self.mode = UiMode::Normal;
            self.focus = Pane::Open;
        }
    }

    pub fn open_new_task(&mut self) {
        if self.mode.is_modal() {
            return;
        }
        let lists = match self.store.list_lists() {
            Ok(lists) => lists,
            Err(err) => {
                tracing::warn!("could not load task lists: {}", err);
                Vec::new()
            }
        };
        self.mode = UiMode::NewTask(NewTaskForm::new(lists));
    }

    fn new_task_form(&mut self) -> Option<&mut NewTaskForm> {
        match &mut self.mode {
            UiMode::NewTask(form) => Some(form),
            _ => None,
        }
    }

    pub fn new_task_add_char(&mut self, c: char) {
        if let Some(form) = self.new_task_form() {
            form.title.push(c);
            form.error = None;
        }
    }

    pub fn new_task_backspace(&mut self) {
        if let Some(form) = self.new_task_form() {
            form.title.pop();
        }
    }

    pub fn new_task_next_field(&mut self) {
        if let Some(form) = self.new_task_form() {
            form.next_field();
        }
    }

    pub fn new_task_prev_list(&mut self) {
        if let Some(form) = self.new_task_form() {
            form.select_prev_list();
        }
    }

    pub fn new_task_next_list(&mut self) {
        if let Some(form) = self.new_task_form() {
            form.select_next_list();
        }
    }

    /// Create the task, select it and start timing it at `now`.
    /// Any failure leaves the popup open with the error shown.
    pub fn confirm_new_task(&mut self, now: i64) {
        let UiMode::NewTask(form) = &self.mode else {
            return;
        };
        let title = form.title.trim().to_string();
        let list_id = form.selected_list().map(|list| list.id.clone());
        if title.is_empty() {
            if let Some(form) = self.new_task_form() {
                form.field = FormField::Title;
                form.error = Some("Title must not be empty".to_string());
            }
            return;
        }

        let result = self.create_and_start(&title, list_id.as_deref(), now);
        match self.check("create task", result) {
            Some(task) => {
                tracing::info!(id = %task.id, title = %task.title, "task created");
                self.mode = UiMode::Normal;
            }
            None => {
                let message = self.status_message.clone();
                if let Some(form) = self.new_task_form() {
                    form.error = message;
                }
            }
        }
    }

    fn create_and_start(&mut self, title: &str, list_id: Option<&str>, now: i64) -> StoreResult<Task> {
        let task = match list_id {
            Some(list_id) => self.store.create_in_list(title, list_id)?,
            None => self.store.ensure(title)?,
        };
        self.store.refresh()?;
        self.selection_open = 0;
        self.store.switch_timer(&task.title, now);
        Ok(task)
    }

    pub fn cancel_new_task(&mut self) {
        if matches!(self.mode, UiMode::NewTask(_)) {
            self.mode = UiMode::Normal;
        }
    }

    /// Start timing the selected task, stopping a different running one first
    pub fn start_timer_on_selection(&mut self, now: i64) {
        let Some(task) = self.selected_task() else {
            return;
        };
        if self.store.get_active_timer().is_running(&task.title) {
            return;
        }
        self.store.switch_timer(&task.title, now);
        tracing::info!(title = %task.title, "timer started");
    }

    pub fn stop_timer(&mut self, now: i64) {
        if self.store.get_active_timer().active {
            self.store.stop_timer(now);
            tracing::info!("timer stopped");
        }
    }

    /// Command boundary: log failures and surface them on the status bar
    fn check<T>(&mut self, action: &str, result: StoreResult<T>) -> Option<T> {
        match result {
            Ok(value) => {
                self.status_message = None;
                Some(value)
            }
            Err(err) => {
                tracing::error!("{} failed: {}", action, err);
                self.status_message = Some(format!("{} failed: {}", action, err));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskList;
    use crate::store::{LocalJsonBackend, StoreError};
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    fn local_app(dir: &tempfile::TempDir, titles: &[&str]) -> (AppState, Arc<LocalJsonBackend>) {
        let store = Arc::new(LocalJsonBackend::open(dir.path().join("tasks.json")).unwrap());
        for title in titles {
            store.ensure(title).unwrap();
        }
        (AppState::new(store.clone()), store)
    }

    fn titles(tasks: &[Task]) -> Vec<String> {
        tasks.iter().map(|t| t.title.clone()).collect()
    }

    /// Backend with lists whose writes can be made to fail
    #[derive(Default)]
    struct ListedBackend {
        tasks: Mutex<Vec<Task>>,
        timer: Mutex<TimerState>,
        fail_create: bool,
        fail_lists: bool,
        created_in: Mutex<Vec<String>>,
    }

    impl Backend for ListedBackend {
        fn name(&self) -> &'static str {
            "listed"
        }
        fn refresh(&self) -> StoreResult<()> {
            Ok(())
        }
        fn list_open(&self) -> Vec<Task> {
            self.tasks.lock().unwrap().iter().filter(|t| !t.done).cloned().collect()
        }
        fn list_done(&self) -> Vec<Task> {
            self.tasks.lock().unwrap().iter().filter(|t| t.done).cloned().collect()
        }
        fn toggle(&self, id: &str) -> StoreResult<Task> {
            Err(StoreError::NotFound(id.to_string()))
        }
        fn delete(&self, id: &str) -> StoreResult<Task> {
            Err(StoreError::Backend(format!("offline, cannot delete {}", id)))
        }
        fn ensure(&self, title: &str) -> StoreResult<Task> {
            self.create_in_list(title, "default")
        }
        fn list_lists(&self) -> StoreResult<Vec<TaskList>> {
            if self.fail_lists {
                return Err(StoreError::Backend("offline".to_string()));
            }
            Ok(vec![
                TaskList {
                    id: "w".to_string(),
                    title: "Work".to_string(),
                },
                TaskList {
                    id: "h".to_string(),
                    title: "Home".to_string(),
                },
            ])
        }
        fn create_in_list(&self, title: &str, list_id: &str) -> StoreResult<Task> {
            if self.fail_create {
                return Err(StoreError::Backend("offline".to_string()));
            }
            self.created_in.lock().unwrap().push(list_id.to_string());
            let task = Task::new(format!("{}::{}", list_id, title), title);
            self.tasks.lock().unwrap().push(task.clone());
            Ok(task)
        }
        fn get_active_timer(&self) -> TimerState {
            self.timer.lock().unwrap().clone()
        }
        fn start_timer(&self, title: &str, started: i64) {
            *self.timer.lock().unwrap() = TimerState::running(title, started);
        }
        fn stop_timer(&self, _ended: i64) {
            *self.timer.lock().unwrap() = TimerState::default();
        }
    }

    #[test]
    fn test_initial_state() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = local_app(&dir, &[]);
        assert_eq!(app.focus, Pane::Open);
        assert_eq!((app.selection_open, app.selection_done), (0, 0));
        assert!(app.filter_text.is_empty());
        assert_eq!(app.mode, UiMode::Normal);
    }

    #[test]
    fn test_move_selection_clamps() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _) = local_app(&dir, &["A", "B", "C"]);

        app.move_selection_up();
        assert_eq!(app.selection_open, 0);
        for _ in 0..5 {
            app.move_selection_down();
        }
        assert_eq!(app.selection_open, 2);
        app.move_selection_up();
        assert_eq!(app.selection_open, 1);
    }

    #[test]
    fn test_move_selection_on_empty_pane_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _) = local_app(&dir, &["A"]);
        app.toggle_focus();
        app.move_selection_down();
        assert_eq!(app.selection_done, 0);
        assert_eq!(app.selection_open, 0);
    }

    #[test]
    fn test_toggle_focus_only_swaps_focus() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _) = local_app(&dir, &["A", "B"]);
        app.move_selection_down();

        app.toggle_focus();
        assert_eq!(app.focus, Pane::Done);
        assert_eq!(app.selection_open, 1);
        app.toggle_focus();
        assert_eq!(app.focus, Pane::Open);
    }

    #[test]
    fn test_toggle_selected_moves_task_between_panes() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _) = local_app(&dir, &["A", "B"]);
        app.move_selection_down();

        app.toggle_selected();
        assert_eq!(titles(&app.filtered_open()), vec!["A"]);
        assert_eq!(titles(&app.filtered_done()), vec!["B"]);
        // Cursor is left alone, then pulled back in on the next clamp
        assert_eq!(app.selection_open, 1);
        app.clamp_selections();
        assert_eq!(app.selection_open, 0);
        assert!(app.status_message.is_none());
    }

    #[test]
    fn test_delete_only_item_leaves_selection_zero() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, store) = local_app(&dir, &["Solo"]);

        app.delete_selected();
        assert!(store.list_open().is_empty());
        assert_eq!(app.selection_open, 0);
    }

    #[test]
    fn test_delete_steps_selection_back() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _) = local_app(&dir, &["A", "B", "C"]);
        app.move_selection_down();
        app.move_selection_down();

        app.delete_selected();
        assert_eq!(app.selection_open, 1);
        assert_eq!(titles(&app.filtered_open()), vec!["A", "B"]);
    }

    #[test]
    fn test_delete_in_done_pane() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, store) = local_app(&dir, &["A"]);
        app.toggle_selected();
        app.toggle_focus();

        app.delete_selected();
        assert!(store.list_done().is_empty());
        assert_eq!(app.selection_done, 0);
    }

    #[test]
    fn test_search_filters_both_panes() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, store) = local_app(&dir, &["Buy milk", "Write report"]);
        let done = store.ensure("Write report").unwrap();
        store.toggle(&done.id).unwrap();
        store.ensure("Write report").unwrap();

        app.move_selection_down();
        app.open_search();
        for c in "write ".chars() {
            app.search_add_char(c);
        }

        assert_eq!(app.filter_text, "write");
        assert_eq!((app.selection_open, app.selection_done), (0, 0));
        assert_eq!(titles(&app.filtered_open()), vec!["Write report"]);
        assert_eq!(titles(&app.filtered_done()), vec!["Write report"]);

        app.search_backspace();
        app.search_backspace();
        assert_eq!(app.filter_text, "writ");

        app.search_clear();
        assert!(app.filter_text.is_empty());
        assert_eq!(app.filtered_open().len(), 2);
    }

    #[test]
    fn test_close_search_keeps_filter_and_focuses_open() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _) = local_app(&dir, &["Alpha", "Beta"]);
        app.toggle_focus();

        app.open_search();
        app.search_add_char('b');
        app.close_search();

        assert_eq!(app.mode, UiMode::Normal);
        assert_eq!(app.focus, Pane::Open);
        assert_eq!(app.filter_text, "b");

        // Reopening pre-fills the previous filter
        app.open_search();
        assert_eq!(app.mode, UiMode::Search(SearchBox { input: "b".to_string() }));
    }

    #[test]
    fn test_modals_are_exclusive() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _) = local_app(&dir, &[]);

        app.open_search();
        app.open_new_task();
        assert!(matches!(app.mode, UiMode::Search(_)));
        app.close_search();

        app.open_new_task();
        app.open_search();
        assert!(matches!(app.mode, UiMode::NewTask(_)));
    }

    #[test]
    fn test_blank_title_keeps_modal_and_count() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, store) = local_app(&dir, &["A"]);

        app.open_new_task();
        for c in "   ".chars() {
            app.new_task_add_char(c);
        }
        app.confirm_new_task(100);

        let UiMode::NewTask(form) = &app.mode else {
            panic!("modal should stay open");
        };
        assert_eq!(form.field, FormField::Title);
        assert!(form.error.is_some());
        assert_eq!(store.list_open().len(), 1);
        assert!(!store.get_active_timer().active);
    }

    #[test]
    fn test_confirm_new_task_creates_and_starts_timer() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, store) = local_app(&dir, &["Old"]);
        store.start_timer("Old", 50);
        app.move_selection_down();

        app.open_new_task();
        for c in "  Fresh ".chars() {
            app.new_task_add_char(c);
        }
        app.confirm_new_task(100);

        assert_eq!(app.mode, UiMode::Normal);
        assert_eq!(app.selection_open, 0);
        assert_eq!(titles(&store.list_open()), vec!["Old", "Fresh"]);
        assert_eq!(store.get_active_timer(), TimerState::running("Fresh", 100));

        let log = store.time_log().unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].title, "Old");
        assert_eq!(log[0].duration_secs(), 50);
    }

    #[test]
    fn test_confirm_existing_title_restarts_same_timer() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, store) = local_app(&dir, &["A"]);
        store.start_timer("A", 10);

        app.open_new_task();
        app.new_task_add_char('A');
        app.confirm_new_task(20);

        assert_eq!(store.list_open().len(), 1);
        assert_eq!(store.get_active_timer(), TimerState::running("A", 20));
        assert!(store.time_log().unwrap().is_empty());
    }

    #[test]
    fn test_cancel_new_task_discards_input() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, store) = local_app(&dir, &[]);

        app.open_new_task();
        app.new_task_add_char('X');
        app.cancel_new_task();

        assert_eq!(app.mode, UiMode::Normal);
        assert!(store.list_open().is_empty());
        app.open_new_task();
        assert_eq!(app.mode, UiMode::NewTask(NewTaskForm::default()));
    }

    #[test]
    fn test_new_task_in_chosen_list() {
        let store = Arc::new(ListedBackend::default());
        let mut app = AppState::new(store.clone());

        app.open_new_task();
        app.new_task_add_char('T');
        app.new_task_next_field();
        app.new_task_next_list();
        app.new_task_next_list();
        app.confirm_new_task(5);

        assert_eq!(app.mode, UiMode::Normal);
        assert_eq!(*store.created_in.lock().unwrap(), vec!["h".to_string()]);
        assert_eq!(store.get_active_timer(), TimerState::running("T", 5));
    }

    #[test]
    fn test_list_failure_degrades_to_plain_form() {
        let store = Arc::new(ListedBackend {
            fail_lists: true,
            ..ListedBackend::default()
        });
        let mut app = AppState::new(store.clone());

        app.open_new_task();
        let UiMode::NewTask(form) = &app.mode else {
            panic!("form should open");
        };
        assert!(!form.has_lists());

        app.new_task_add_char('T');
        app.confirm_new_task(5);
        assert_eq!(*store.created_in.lock().unwrap(), vec!["default".to_string()]);
    }

    #[test]
    fn test_create_failure_keeps_modal_and_timer() {
        let store = Arc::new(ListedBackend {
            fail_create: true,
            ..ListedBackend::default()
        });
        store.start_timer("Busy", 1);
        let mut app = AppState::new(store.clone());

        app.open_new_task();
        app.new_task_add_char('T');
        app.confirm_new_task(5);

        let UiMode::NewTask(form) = &app.mode else {
            panic!("modal should stay open");
        };
        assert!(form.error.as_deref().is_some_and(|e| e.contains("offline")));
        assert_eq!(store.get_active_timer(), TimerState::running("Busy", 1));
    }

    #[test]
    fn test_command_errors_reach_status_line() {
        let store = Arc::new(ListedBackend::default());
        store.create_in_list("A", "w").unwrap();
        let mut app = AppState::new(store);

        app.delete_selected();
        assert!(app
            .status_message
            .as_deref()
            .is_some_and(|m| m.starts_with("delete failed")));
        assert_eq!(app.filtered_open().len(), 1);

        app.refresh();
        assert!(app.status_message.is_none());
    }

    #[test]
    fn test_start_timer_on_selection() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, store) = local_app(&dir, &["A", "B"]);

        app.start_timer_on_selection(100);
        assert_eq!(store.get_active_timer(), TimerState::running("A", 100));

        // Same title: nothing restarts
        app.start_timer_on_selection(150);
        assert_eq!(store.get_active_timer(), TimerState::running("A", 100));

        app.move_selection_down();
        app.start_timer_on_selection(200);
        assert_eq!(store.get_active_timer(), TimerState::running("B", 200));
        let log = store.time_log().unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].duration_secs(), 100);
    }

    #[test]
    fn test_start_timer_from_done_pane() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, store) = local_app(&dir, &["A"]);
        app.toggle_selected();
        app.toggle_focus();

        app.start_timer_on_selection(10);
        assert_eq!(store.get_active_timer(), TimerState::running("A", 10));
    }

    #[test]
    fn test_start_timer_on_empty_view_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, store) = local_app(&dir, &[]);
        app.start_timer_on_selection(10);
        assert!(!store.get_active_timer().active);
    }

    #[test]
    fn test_stop_timer() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, store) = local_app(&dir, &["A"]);
        app.stop_timer(5);
        assert!(store.time_log().unwrap().is_empty());

        app.start_timer_on_selection(100);
        app.stop_timer(160);
        assert_eq!(app.active_timer(), TimerState::default());
        assert_eq!(store.time_log().unwrap()[0].duration_secs(), 60);
    }

    #[test]
    fn test_refresh_keeps_selection_when_possible() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _) = local_app(&dir, &["A", "B", "C"]);
        app.move_selection_down();
        app.refresh();
        assert_eq!(app.selection_open, 1);
    }
}
