//! Record list, detail and form screens

use ratatui::{prelude::*, widgets::*};

use crate::app::state::{record_field, LoadState};
use crate::messages::{InputMode, RenderState};
use crate::models::HealthRecord;
use crate::ui::widgets::{draw_form, focus_style, load_state_placeholder};
use crate::validation::MOOD_CHOICES;

pub fn draw_records(f: &mut Frame, state: &RenderState, area: Rect) {
    let filtering = state.input_mode == InputMode::Editing;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(if filtering {
            [Constraint::Length(10), Constraint::Min(3)]
        } else {
            [Constraint::Length(0), Constraint::Min(3)]
        })
        .split(area);

    if filtering {
        if let Some(form) = &state.form {
            draw_form(f, form, "Filter by date (empty = all)", chunks[0]);
        }
    }

    let filter_label = state
        .records_filter
        .map(|r| format!(" [{}]", r.label()))
        .unwrap_or_default();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focus_style(!filtering))
        .title(format!(" Records{} ", filter_label))
        .title_bottom(
            Line::from(format!(
                " page {}/{} | {} total ",
                state.page + 1,
                state.page_count,
                state.records_total
            ))
            .right_aligned(),
        );

    if let Some(placeholder) = load_state_placeholder(&state.records_state, "") {
        f.render_widget(placeholder.block(block), chunks[1]);
        return;
    }
    if state.records.is_empty() {
        let empty = Paragraph::new("No records yet. Press 'a' to add one.")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(empty, chunks[1]);
        return;
    }

    let header = Row::new(["Date", "Time", "Weight", "Blood pressure", "Heart rate", "Notes"])
        .style(Style::default().fg(Color::Yellow).bold());
    let rows: Vec<Row> = state.records.iter().map(record_row).collect();
    let table = Table::new(
        rows,
        [
            Constraint::Length(11),
            Constraint::Length(6),
            Constraint::Length(8),
            Constraint::Length(15),
            Constraint::Length(11),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(block)
    .row_highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan));

    let mut table_state = TableState::default();
    table_state.select(Some(state.selected_on_page));
    f.render_stateful_widget(table, chunks[1], &mut table_state);
}

fn record_row(record: &HealthRecord) -> Row<'static> {
    Row::new([
        record.date_string(),
        record.time_string(),
        record.weight_display(),
        record.blood_pressure_display(),
        record.heart_rate_display(),
        record.notes.clone().unwrap_or_default(),
    ])
}

pub fn draw_detail(f: &mut Frame, state: &RenderState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focus_style(true))
        .title(" Record ");

    let record = match (&state.detail, &state.detail_state) {
        (Some(record), LoadState::Loaded) => record,
        (_, load_state) => {
            let placeholder = load_state_placeholder(load_state, "Record not found")
                .unwrap_or_else(|| Paragraph::new("Record not found"));
            f.render_widget(placeholder.block(block), area);
            return;
        }
    };

    let label = Style::default().fg(Color::DarkGray);
    let row = |name: &'static str, value: String| {
        Line::from(vec![Span::styled(format!("{:<16}", name), label), Span::raw(value)])
    };
    let lines = vec![
        row("Date", record.date_string()),
        row("Time", record.time_string()),
        row("Weight", format!("{} kg", record.weight_display())),
        row("Height", format!("{} cm", record.height_display())),
        row("Blood pressure", format!("{} mmHg", record.blood_pressure_display())),
        row("Heart rate", format!("{} bpm", record.heart_rate_display())),
        row("Blood glucose", format!("{} mmol/L", record.blood_glucose_display())),
        row("Mood", record.mood_display()),
        row("Notes", record.notes.clone().unwrap_or_else(|| "-".to_string())),
        Line::from(""),
        Line::from(Span::styled("e:edit | d:delete | Esc:back", label)),
    ];

    f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
}

pub fn draw_record_form(f: &mut Frame, state: &RenderState, area: Rect) {
    let Some(form) = &state.form else {
        return;
    };
    let title = match state.editing_record {
        Some(id) => format!("Edit record #{}", id),
        None => "New record".to_string(),
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);
    draw_form(f, form, &title, chunks[0]);

    if form.focused == record_field::MOOD {
        let hint = Paragraph::new(format!("Mood: {}", MOOD_CHOICES))
            .style(Style::default().fg(Color::DarkGray));
        f.render_widget(hint, chunks[1]);
    }
}
