use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Main layout structure
pub struct MainLayout {
    pub header_area: Rect,
    pub timer_area: Rect,
    pub open_area: Rect,
    pub done_area: Rect,
    pub status_area: Rect,
}

/// Create the main layout
/// - Framed header with key hints (3 rows)
/// - Framed timer bar (3 rows)
/// - Open | Done panes side by side
/// - Framed status bar (3 rows)
pub fn create_layout(area: Rect) -> MainLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Timer bar
            Constraint::Min(0),    // Panes
            Constraint::Length(3), // Status bar
        ])
        .split(area);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[2]);

    MainLayout {
        header_area: rows[0],
        timer_area: rows[1],
        open_area: panes[0],
        done_area: panes[1],
        status_area: rows[3],
    }
}

/// Centered popup `height` rows tall, 60% of the width
pub fn create_modal_area(area: Rect, height: u16) -> Rect {
    let vertical_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height.min(area.height)),
            Constraint::Min(0),
        ])
        .split(area);

    let horizontal_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(20),
            Constraint::Percentage(60),
            Constraint::Percentage(20),
        ])
        .split(vertical_chunks[1]);

    horizontal_chunks[1]
}
