pub mod done_pane;
pub mod input_form;
pub mod keybindings;
pub mod layout;
pub mod list_pane;
pub mod modal;
pub mod status_bar;
pub mod styles;
pub mod timer_bar;

use crate::app::AppState;
use crate::domain::UiMode;
use crate::store::unix_now;
use done_pane::render_done_pane;
use input_form::render_input_form;
use keybindings::render_keybindings;
use layout::create_layout;
use list_pane::render_list_pane;
use modal::render_search_modal;
use ratatui::Frame;
use status_bar::render_status_bar;
use timer_bar::render_timer_bar;

/// Main render function - draws the entire UI
pub fn render(f: &mut Frame, app: &mut AppState) {
    // Views may have shrunk since the last command
    app.clamp_selections();

    let size = f.size();
    let layout = create_layout(size);

    render_keybindings(f, layout.header_area);
    render_timer_bar(f, &app.active_timer(), unix_now(), layout.timer_area);
    render_list_pane(f, app, layout.open_area);
    render_done_pane(f, app, layout.done_area);
    render_status_bar(f, app, layout.status_area);

    match &app.mode {
        UiMode::Normal => {}
        UiMode::Search(search) => render_search_modal(f, app, search, size),
        UiMode::NewTask(form) => render_input_form(f, form, size),
    }
}
