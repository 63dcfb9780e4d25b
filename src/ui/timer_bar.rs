use crate::domain::format_elapsed;
use crate::store::TimerState;
use crate::ui::styles::{border_style, idle_style, running_style, title_style};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Text of the timer bar at `now`
pub fn timer_text(state: &TimerState, now: i64) -> String {
    if state.active {
        format!("⏱ {}  {}", state.title, format_elapsed(state.elapsed(now)))
    } else {
        "No active timer. Select a task and press s".to_string()
    }
}

/// Render the framed timer bar
pub fn render_timer_bar(f: &mut Frame, state: &TimerState, now: i64, area: Rect) {
    let style = if state.active {
        running_style()
    } else {
        idle_style()
    };
    let line = Line::from(vec![Span::raw(" "), Span::styled(timer_text(state, now), style)]);

    let paragraph = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style())
            .title(Span::styled(" Timer ", title_style())),
    );
    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_text_running() {
        let state = TimerState::running("Write report", 100);
        assert_eq!(timer_text(&state, 3825), "⏱ Write report  01:02:05");
    }

    #[test]
    fn test_timer_text_idle() {
        assert!(timer_text(&TimerState::default(), 100).starts_with("No active timer"));
    }
}
