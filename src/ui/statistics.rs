//! Statistics screen: averages plus one trend chart at a time

use ratatui::{prelude::*, widgets::*};

use crate::app::state::ChartKind;
use crate::messages::{InputMode, RenderState};
use crate::models::{ChartRow, HealthStatistics, DATE_FORMAT};
use crate::ui::widgets::{draw_form, load_state_placeholder, render_tabs};

pub const NO_DATA_TEXT: &str = "No data for this period";

pub fn draw_statistics(f: &mut Frame, state: &RenderState, area: Rect) {
    let filtering = state.input_mode == InputMode::Editing;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(if filtering { 10 } else { 0 }),
            Constraint::Length(4),  // Averages
            Constraint::Length(1),  // Chart selector
            Constraint::Min(5),     // Chart
        ])
        .split(area);

    if filtering {
        if let Some(form) = &state.form {
            draw_form(f, form, "Statistics window (empty = all time)", chunks[0]);
        }
    }

    let window = state
        .statistics_range
        .map(|r| r.label())
        .unwrap_or_else(|| "all time".to_string());
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Statistics [{}] ", window));

    let statistics = match &state.statistics {
        Some(statistics)
            if !statistics.is_empty()
                && load_state_placeholder(&state.statistics_state, "").is_none() =>
        {
            statistics
        }
        _ => {
            let placeholder = load_state_placeholder(&state.statistics_state, NO_DATA_TEXT)
                .unwrap_or_else(|| Paragraph::new(NO_DATA_TEXT));
            let rest = Rect {
                height: area.height.saturating_sub(chunks[0].height),
                ..chunks[1]
            };
            f.render_widget(placeholder.block(block), rest);
            return;
        }
    };

    draw_averages(f, statistics, block, chunks[1]);

    let selected = match state.chart {
        ChartKind::Weight => 0,
        ChartKind::BloodPressure => 1,
        ChartKind::HeartRate => 2,
    };
    let tabs = render_tabs(&["Weight", "Blood pressure", "Heart rate"], Some(selected));
    f.render_widget(tabs, chunks[2]);

    draw_chart(f, statistics, state.chart, chunks[3]);
}

fn draw_averages(f: &mut Frame, statistics: &HealthStatistics, block: Block, area: Rect) {
    let label = Style::default().fg(Color::DarkGray);
    let value = Style::default().fg(Color::Cyan).bold();
    let lines = vec![
        Line::from(vec![
            Span::styled("Avg weight ", label),
            Span::styled(format!("{:.1} kg", statistics.weight_avg), value),
            Span::styled("   Avg heart rate ", label),
            Span::styled(format!("{:.0} bpm", statistics.heart_rate_avg), value),
        ]),
        Line::from(vec![
            Span::styled("Avg blood pressure ", label),
            Span::styled(
                format!(
                    "{:.0}/{:.0} mmHg",
                    statistics.systolic_pressure_avg, statistics.diastolic_pressure_avg
                ),
                value,
            ),
        ]),
    ];
    f.render_widget(Paragraph::new(lines).block(block), area);
}

/// One series per line of the selected chart, x = row index
fn series(rows: &[ChartRow], kind: ChartKind) -> Vec<(&'static str, Color, Vec<(f64, f64)>)> {
    let collect = |pick: fn(&ChartRow) -> Option<f64>| -> Vec<(f64, f64)> {
        rows.iter()
            .enumerate()
            .filter_map(|(i, row)| pick(row).map(|v| (i as f64, v)))
            .collect()
    };
    match kind {
        ChartKind::Weight => vec![("weight", Color::Cyan, collect(|r| r.weight))],
        ChartKind::BloodPressure => vec![
            ("systolic", Color::Red, collect(|r| r.systolic)),
            ("diastolic", Color::Blue, collect(|r| r.diastolic)),
        ],
        ChartKind::HeartRate => vec![("heart rate", Color::Magenta, collect(|r| r.heart_rate))],
    }
}

fn draw_chart(f: &mut Frame, statistics: &HealthStatistics, kind: ChartKind, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} (c:next chart) ", kind.title()));

    let rows = statistics.chart_rows();
    let series = series(&rows, kind);
    let values: Vec<f64> = series.iter().flat_map(|(_, _, points)| points.iter().map(|p| p.1)).collect();
    if values.is_empty() {
        let empty = Paragraph::new(NO_DATA_TEXT)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let pad = ((max - min) * 0.1).max(1.0);
    let (y_min, y_max) = (min - pad, max + pad);
    let x_max = (rows.len().saturating_sub(1)).max(1) as f64;

    let datasets: Vec<Dataset> = series
        .iter()
        .map(|(name, color, points)| {
            Dataset::default()
                .name(*name)
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(*color))
                .data(points)
        })
        .collect();

    let first = rows.first().map(|r| r.date.format(DATE_FORMAT).to_string()).unwrap_or_default();
    let last = rows.last().map(|r| r.date.format(DATE_FORMAT).to_string()).unwrap_or_default();

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::DarkGray))
                .bounds([0.0, x_max])
                .labels([first, last]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::DarkGray))
                .bounds([y_min, y_max])
                .labels([format!("{:.0}", y_min), format!("{:.0}", y_max)]),
        );
    f.render_widget(chart, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::LoadState;
    use crate::models::{PressurePoint, TrendPoint};
    use chrono::NaiveDate;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn screen_text(state: &RenderState) -> String {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| draw_statistics(frame, state, frame.area()))
            .unwrap();

        let buffer = terminal.backend().buffer();
        (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_empty_statistics_render_no_data() {
        let state = RenderState {
            statistics: Some(HealthStatistics::default()),
            statistics_state: LoadState::Loaded,
            ..RenderState::default()
        };
        let text = screen_text(&state);
        assert!(text.contains(NO_DATA_TEXT));
    }

    #[test]
    fn test_failed_statistics_show_error() {
        let state = RenderState {
            statistics_state: LoadState::Failed("Server error".into()),
            ..RenderState::default()
        };
        assert!(screen_text(&state).contains("Error: Server error"));
    }

    #[test]
    fn test_averages_rendered() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let statistics = HealthStatistics {
            weight_avg: 71.25,
            systolic_pressure_avg: 121.0,
            diastolic_pressure_avg: 79.0,
            heart_rate_avg: 63.0,
            weight_trend: vec![TrendPoint { date, value: 71.0 }],
            blood_pressure_trend: vec![PressurePoint {
                date,
                systolic: 121.0,
                diastolic: 79.0,
            }],
            heart_rate_trend: vec![TrendPoint { date, value: 63.0 }],
        };
        let state = RenderState {
            statistics: Some(statistics),
            statistics_state: LoadState::Loaded,
            ..RenderState::default()
        };
        let text = screen_text(&state);
        assert!(text.contains("71.2 kg") || text.contains("71.3 kg"));
        assert!(text.contains("121/79 mmHg"));
        assert!(!text.contains(NO_DATA_TEXT));
    }

    #[test]
    fn test_series_follow_chart_kind() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let statistics = HealthStatistics {
            blood_pressure_trend: vec![PressurePoint {
                date,
                systolic: 120.0,
                diastolic: 80.0,
            }],
            ..HealthStatistics::default()
        };
        let rows = statistics.chart_rows();
        assert_eq!(series(&rows, ChartKind::BloodPressure).len(), 2);
        assert!(series(&rows, ChartKind::Weight)[0].2.is_empty());
    }
}
