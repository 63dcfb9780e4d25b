use crate::app::AppState;
use crate::domain::{FormField, UiMode};
use crate::store::unix_now;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Handle keyboard input events. Returns `true` when the app should quit.
pub fn handle_key(app: &mut AppState, key: KeyEvent) -> bool {
    handle_key_at(app, key, unix_now())
}

/// Same as [`handle_key`], with timer commands stamped at `now`
pub fn handle_key_at(app: &mut AppState, key: KeyEvent, now: i64) -> bool {
    match &app.mode {
        UiMode::Normal => handle_normal_mode(app, key, now),
        UiMode::Search(_) => {
            handle_search_mode(app, key);
            false
        }
        UiMode::NewTask(form) => {
            let field = form.field;
            handle_new_task_mode(app, key, field, now);
            false
        }
    }
}

fn is_ctrl(key: &KeyEvent, c: char) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char(c)
}

/// Handle keys in normal mode
fn handle_normal_mode(app: &mut AppState, key: KeyEvent, now: i64) -> bool {
    if is_ctrl(&key, 'c') {
        return true;
    }
    match key.code {
        KeyCode::Char('q') => return true,

        KeyCode::Up => app.move_selection_up(),
        KeyCode::Down => app.move_selection_down(),
        KeyCode::Tab => app.toggle_focus(),

        // Complete / reopen
        KeyCode::Char(' ') => app.toggle_selected(),
        KeyCode::Char('d') => app.delete_selected(),
        KeyCode::Char('r') => app.refresh(),

        KeyCode::Char('/') => app.open_search(),
        KeyCode::Char('n') => app.open_new_task(),

        KeyCode::Char('s') => app.start_timer_on_selection(now),
        KeyCode::Char('x') => app.stop_timer(now),

        _ => {}
    }
    false
}

/// Handle keys while the search popup is open
fn handle_search_mode(app: &mut AppState, key: KeyEvent) {
    if is_ctrl(&key, 'u') {
        app.search_clear();
        return;
    }
    match key.code {
        KeyCode::Enter | KeyCode::Esc => app.close_search(),
        KeyCode::Backspace => app.search_backspace(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.search_add_char(c)
        }
        _ => {}
    }
}

/// Handle keys in the new-task form
fn handle_new_task_mode(app: &mut AppState, key: KeyEvent, field: FormField, now: i64) {
    match (key.code, field) {
        (KeyCode::Enter, _) => app.confirm_new_task(now),
        (KeyCode::Esc, _) => app.cancel_new_task(),
        (KeyCode::Tab, _) => app.new_task_next_field(),

        (KeyCode::Up, FormField::List) => app.new_task_prev_list(),
        (KeyCode::Down, FormField::List) => app.new_task_next_list(),

        (KeyCode::Backspace, FormField::Title) => app.new_task_backspace(),
        (KeyCode::Char(c), FormField::Title) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.new_task_add_char(c)
        }
        _ => {}
    }
}
