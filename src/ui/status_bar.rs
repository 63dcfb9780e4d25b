use crate::app::AppState;
use crate::ui::styles::{border_style, error_style, hint_style};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// "Open: o • Done: d | filter | pane: OPEN | 14:05:09"
pub fn status_text(app: &AppState, clock: &str) -> String {
    let filter = if app.filter_text.is_empty() {
        "no filter".to_string()
    } else {
        format!("filter: \"{}\"", app.filter_text)
    };
    format!(
        "Open: {} • Done: {} | {} | pane: {} | {}",
        app.filtered_open().len(),
        app.filtered_done().len(),
        filter,
        app.focus.tag(),
        clock
    )
}

/// Render the framed status bar, with the last error if any
pub fn render_status_bar(f: &mut Frame, app: &AppState, area: Rect) {
    let clock = chrono::Local::now().format("%H:%M:%S").to_string();
    let mut spans = vec![Span::styled(format!(" {}", status_text(app, &clock)), hint_style())];
    if let Some(message) = &app.status_message {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(message.clone(), error_style()));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style()),
    );
    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Backend, LocalJsonBackend};
    use std::sync::Arc;

    #[test]
    fn test_status_text() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(LocalJsonBackend::open(dir.path().join("tasks.json")).unwrap());
        store.ensure("Buy milk").unwrap();
        let done = store.ensure("Write report").unwrap();
        store.toggle(&done.id).unwrap();

        let mut app = AppState::new(store);
        assert_eq!(
            status_text(&app, "12:00:00"),
            "Open: 1 • Done: 1 | no filter | pane: OPEN | 12:00:00"
        );

        app.filter_text = "milk".to_string();
        app.toggle_focus();
        assert_eq!(
            status_text(&app, "12:00:00"),
            "Open: 1 • Done: 0 | filter: \"milk\" | pane: DONE | 12:00:00"
        );
    }
}
