//! Login, registration, password reset and profile screens

use ratatui::{prelude::*, widgets::*};

use crate::messages::{RenderState, Screen};
use crate::models::DATE_FORMAT;
use crate::ui::widgets::{centered_rect, draw_form};

pub fn draw_auth_form(f: &mut Frame, state: &RenderState, area: Rect) {
    let popup = centered_rect(60, 80, area);
    let Some(form) = &state.form else {
        return;
    };

    let (title, hint) = match state.screen {
        Screen::Register => ("Create account", "Enter:register | Esc:back to login"),
        Screen::ResetPassword => ("Reset password", "Enter:send reset link | Esc:back"),
        _ => ("Login", "Enter:login | Ctrl+N:register | Ctrl+R:reset password"),
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(popup);

    if state.restoring {
        let restoring = Paragraph::new("Restoring session...")
            .style(Style::default().fg(Color::Yellow))
            .alignment(Alignment::Center);
        f.render_widget(restoring, chunks[0]);
    } else {
        draw_form(f, form, title, chunks[0]);
    }

    let hint = Paragraph::new(hint)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(hint, chunks[1]);
}

pub fn draw_profile(f: &mut Frame, state: &RenderState, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Profile ");

    let Some(user) = &state.user else {
        f.render_widget(Paragraph::new("Not logged in").block(block), area);
        return;
    };

    let label = Style::default().fg(Color::DarkGray);
    let or_dash = |v: Option<String>| v.unwrap_or_else(|| "-".to_string());
    let expires = user
        .expires_at()
        .map(|t| t.format(&format!("{} %H:%M:%S UTC", DATE_FORMAT)).to_string());

    let lines = vec![
        Line::from(vec![
            Span::styled("Username   ", label),
            Span::styled(user.display_name(), Style::default().bold()),
        ]),
        Line::from(vec![
            Span::styled("Email      ", label),
            Span::raw(or_dash(user.email.clone())),
        ]),
        Line::from(vec![
            Span::styled("User id    ", label),
            Span::raw(or_dash(user.user_id.map(|id| id.to_string()))),
        ]),
        Line::from(vec![
            Span::styled("Session    ", label),
            Span::raw(format!("expires {}", or_dash(expires))),
        ]),
        Line::from(""),
        Line::from(Span::styled("Press 'l' to log out", label)),
    ];

    f.render_widget(Paragraph::new(lines).block(block), area);
}
