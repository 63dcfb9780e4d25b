use crate::app::AppState;
use crate::domain::{Pane, Task};
use crate::ui::styles::{
    border_style, default_style, focused_border_style, running_style,
    selected_style, title_style, unfocused_selected_style,
};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

/// One open task: "List / Title", with a marker on the timed task
fn create_task_line(task: &Task, timed: bool) -> Line<'static> {
    let mut spans = Vec::new();

    spans.push(Span::styled(
        if timed { "▶ " } else { "  " },
        running_style(),
    ));
    spans.push(Span::styled(task.label(), default_style()));

    Line::from(spans)
}

/// Render the open tasks pane
pub fn render_list_pane(f: &mut Frame, app: &AppState, area: Rect) {
    let tasks = app.filtered_open();
    let timer = app.active_timer();
    let focused = app.focus == Pane::Open;

    let items: Vec<ListItem> = tasks
        .iter()
        .map(|task| ListItem::new(create_task_line(task, timer.is_running(&task.title))))
        .collect();

    let title = format!(" Open ({}) ", tasks.len());
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
        state.select(Some(app.selection_open));
    }
    f.render_stateful_widget(list, area, &mut state);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_grouped_label() {
        let task = Task::new("1", "Write report").with_list_title("My Work");
        assert_eq!(text(&create_task_line(&task, false)), "  MyWork / Write report");
    }

    #[test]
    fn test_timed_marker() {
        let task = Task::new("1", "A");
        assert_eq!(text(&create_task_line(&task, true)), "▶ A");
    }
}
