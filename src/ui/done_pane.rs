use crate::app::AppState;
use crate::domain::Pane;
use crate::ui::styles::{
    border_style, done_style, focused_border_style, selected_style, title_style,
    unfocused_selected_style,
};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

/// Render the done tasks pane
pub fn render_done_pane(f: &mut Frame, app: &AppState, area: Rect) {
    let tasks = app.filtered_done();
    let focused = app.focus == Pane::Done;

    let items: Vec<ListItem> = tasks
        .iter()
        .map(|task| {
            ListItem::new(Line::from(vec![
                Span::styled("✓ ", done_style()),
                Span::styled(task.title.clone(), done_style()),
            ]))
        })
        .collect();

    let title = format!(" Done ({}) ", tasks.len());
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(if focused {
                    focused_border_style()
                } else {
                    border_style()
                })
                .title(Span::styled(title, title_style())),
        )
        .highlight_style(if focused {
            selected_style()
        } else {
            unfocused_selected_style()
        });

    let mut state = ListState::default();
    if !tasks.is_empty() {
        state.select(Some(app.selection_done));
    }
    f.render_stateful_widget(list, area, &mut state);
}
