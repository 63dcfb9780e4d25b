use crate::app::AppState;
use crate::domain::SearchBox;
use crate::ui::{
    layout::create_modal_area,
    styles::{hint_style, modal_bg_style, modal_title_style},
};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// "3 open • 1 done"
pub fn results_line(app: &AppState) -> String {
    format!(
        "{} open • {} done",
        app.filtered_open().len(),
        app.filtered_done().len()
    )
}

/// Render the search popup with a live result count
pub fn render_search_modal(f: &mut Frame, app: &AppState, search: &SearchBox, area: Rect) {
    let modal_area = create_modal_area(area, 7);

    // Clear the area behind the modal
    f.render_widget(Clear, modal_area);

    let lines = vec![
        Line::from(vec![
            Span::raw("> "),
            Span::styled(search.input.clone(), modal_title_style()),
            Span::styled("█", modal_title_style()),
        ]),
        Line::raw(""),
        Line::raw(results_line(app)),
        Line::styled("Enter/Esc close  ·  Ctrl-U clear", hint_style()),
    ];

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(" Search ", modal_title_style()))
                .style(modal_bg_style()),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, modal_area);
}
