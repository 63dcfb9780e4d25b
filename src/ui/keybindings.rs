use crate::ui::styles::{border_style, hint_style, key_style, title_style};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const HINTS: [(&str, &str); 11] = [
    ("↑/↓", "move"),
    ("Space", "done"),
    ("d", "delete"),
    ("Tab", "focus"),
    ("/", "search"),
    ("r", "refresh"),
    ("n", "new"),
    ("s", "start"),
    ("x", "stop"),
    ("Esc", "close"),
    ("q", "quit"),
];

/// Render the framed keybindings header
pub fn render_keybindings(f: &mut Frame, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for (key, action) in HINTS {
        spans.push(Span::styled(key, key_style()));
        spans.push(Span::styled(format!(" {}  ", action), hint_style()));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style())
            .title(Span::styled(" tasknag ", title_style())),
    );
    f.render_widget(paragraph, area);
}
