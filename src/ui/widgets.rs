//! Shared widgets and styling helpers

use ratatui::{prelude::*, widgets::*};

use crate::app::state::{Form, LoadState, MessageKind};

/// Renders tabs
pub fn render_tabs<'a>(titles: &[&'a str], selected: Option<usize>) -> Tabs<'a> {
    let titles: Vec<Line> = titles.iter().map(|t| Line::from(*t)).collect();

    Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().fg(Color::Yellow).bold())
        .divider("|")
}

/// Status message color
pub fn message_color(kind: MessageKind) -> Color {
    match kind {
        MessageKind::Info => Color::Green,
        MessageKind::Error => Color::Red,
    }
}

/// Border style for a panel that may have focus
pub fn focus_style(is_focused: bool) -> Style {
    if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

/// Draw a form as a column of labelled inputs, with its error underneath.
///
/// Places the terminal cursor in the focused field.
pub fn draw_form(f: &mut Frame, form: &Form, title: &str, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} ", title));
    let inner = block.inner(area);
    f.render_widget(block, area);

    // Fall back to one line per field when boxed inputs do not fit
    let compact = inner.height < form.fields.len() as u16 * 3 + 2;
    let field_height = if compact { 1 } else { 3 };
    let label_width = form.fields.iter().map(|f| f.label.len()).max().unwrap_or(0) + 2;

    let mut constraints: Vec<Constraint> = form
        .fields
        .iter()
        .map(|_| Constraint::Length(field_height))
        .collect();
    constraints.push(Constraint::Length(2));
    constraints.push(Constraint::Min(0));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (i, field) in form.fields.iter().enumerate() {
        let is_focused = i == form.focused;
        let border_style = if is_focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let row = rows[i];

        if compact {
            let line = Line::from(vec![
                Span::styled(format!("{:<width$}", field.label, width = label_width), border_style),
                Span::raw(field.input.display()),
            ]);
            f.render_widget(Paragraph::new(line), row);
            if is_focused {
                let max_x = row.x + row.width.saturating_sub(1);
                let cursor_x =
                    (row.x + (label_width + field.input.cursor_column()) as u16).min(max_x);
                f.set_cursor_position(Position::new(cursor_x, row.y));
            }
            continue;
        }

        let input = Paragraph::new(field.input.display()).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(format!(" {} ", field.label)),
        );
        f.render_widget(input, row);

        if is_focused {
            let max_x = row.x + row.width.saturating_sub(2);
            let cursor_x = (row.x + field.input.cursor_column() as u16 + 1).min(max_x);
            f.set_cursor_position(Position::new(cursor_x, row.y + 1));
        }
    }

    if let Some(error) = &form.error {
        let error = Paragraph::new(error.as_str())
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true });
        f.render_widget(error, rows[form.fields.len()]);
    }
}

/// Placeholder for data that is loading, failed, or absent.
///
/// Returns `None` once the data is loaded and should be drawn.
pub fn load_state_placeholder(state: &LoadState, empty_text: &str) -> Option<Paragraph<'static>> {
    let (text, color) = match state {
        LoadState::Idle => (empty_text.to_string(), Color::DarkGray),
        LoadState::Loading => ("Loading...".to_string(), Color::Yellow),
        LoadState::Failed(message) => (format!("Error: {}", message), Color::Red),
        LoadState::Loaded => return None,
    };
    Some(
        Paragraph::new(text)
            .style(Style::default().fg(color))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
    )
}

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
