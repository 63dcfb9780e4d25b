use crate::domain::{FormField, NewTaskForm};
use crate::ui::{
    layout::create_modal_area,
    styles::{error_style, hint_style, modal_bg_style, modal_title_style, selected_style},
};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Lines of the new-task popup
fn form_lines(form: &NewTaskForm) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    if form.has_lists() {
        let label = if form.field == FormField::List {
            "List: (editing)"
        } else {
            "List:"
        };
        lines.push(Line::raw(label));
        for (idx, list) in form.lists.iter().enumerate() {
            let chosen = idx == form.list_index;
            let marker = if chosen { "(•) " } else { "( ) " };
            let style = if chosen && form.field == FormField::List {
                selected_style()
            } else {
                modal_bg_style()
            };
            lines.push(Line::styled(format!("  {}{}", marker, list.title), style));
        }
        lines.push(Line::raw(""));
    }

    let title_label = if form.field == FormField::Title {
        "Title: (editing)"
    } else {
        "Title:"
    };
    lines.push(Line::raw(title_label));
    lines.push(Line::from(vec![
        Span::raw("> "),
        Span::styled(form.title.clone(), modal_title_style()),
        if form.field == FormField::Title {
            Span::styled("█", modal_title_style()) // Cursor
        } else {
            Span::raw("")
        },
    ]));

    if let Some(error) = &form.error {
        lines.push(Line::styled(error.clone(), error_style()));
    }

    lines.push(Line::raw(""));
    let hint = if form.has_lists() {
        "Tab switch field  ·  ↑/↓ choose list  ·  Enter create & start  ·  Esc cancel"
    } else {
        "Enter create & start  ·  Esc cancel"
    };
    lines.push(Line::styled(hint, hint_style()));
    lines
}

/// Render the new-task popup
pub fn render_input_form(f: &mut Frame, form: &NewTaskForm, area: Rect) {
    let lines = form_lines(form);
    let modal_area = create_modal_area(area, lines.len() as u16 + 2);

    // Clear the area behind the form
    f.render_widget(Clear, modal_area);

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(" New Task ", modal_title_style()))
                .style(modal_bg_style()),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, modal_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskList;

    fn flat(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_plain_form_has_no_selector() {
        let lines = flat(&form_lines(&NewTaskForm::default()));
        assert!(!lines.iter().any(|l| l.starts_with("List")));
        assert!(lines.iter().any(|l| l == "> █"));
    }

    #[test]
    fn test_selector_marks_chosen_list() {
        let mut form = NewTaskForm::new(vec![
            TaskList {
                id: "a".to_string(),
                title: "Work".to_string(),
            },
            TaskList {
                id: "b".to_string(),
                title: "Home".to_string(),
            },
        ]);
        form.select_next_list();
        form.error = Some("Title must not be empty".to_string());

        let lines = flat(&form_lines(&form));
        assert!(lines.contains(&"  ( ) Work".to_string()));
        assert!(lines.contains(&"  (•) Home".to_string()));
        assert!(lines.contains(&"Title must not be empty".to_string()));
    }
}
