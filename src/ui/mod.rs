//! UI rendering - pure functions of `RenderState`

mod auth;
mod records;
mod statistics;
mod widgets;

pub use statistics::NO_DATA_TEXT;
pub use widgets::{centered_rect, render_tabs};

use ratatui::{prelude::*, widgets::*};

use crate::constants::{APP_NAME, APP_VERSION};
use crate::messages::{InputMode, RenderState, Screen};
use widgets::message_color;

/// Draw one frame
pub fn draw_ui(f: &mut Frame, state: &RenderState) {
    let area = f.area();

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),  // Tab bar
            Constraint::Min(0),     // Content
            Constraint::Length(1),  // Status bar
        ])
        .split(area);

    draw_tab_bar(f, state, main_chunks[0]);

    match state.screen {
        Screen::Login | Screen::Register | Screen::ResetPassword => {
            auth::draw_auth_form(f, state, main_chunks[1])
        }
        Screen::Records => records::draw_records(f, state, main_chunks[1]),
        Screen::RecordDetail => records::draw_detail(f, state, main_chunks[1]),
        Screen::RecordForm => records::draw_record_form(f, state, main_chunks[1]),
        Screen::Statistics => statistics::draw_statistics(f, state, main_chunks[1]),
        Screen::Profile => auth::draw_profile(f, state, main_chunks[1]),
    }

    draw_status_bar(f, state, main_chunks[2]);

    if let Some(record_id) = state.confirm_delete {
        draw_confirm_popup(f, record_id, area);
    }

    if state.show_help {
        draw_help_popup(f, area);
    }
}

fn draw_tab_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(10), Constraint::Min(0), Constraint::Length(24)])
        .split(area);

    let title = Paragraph::new(format!(" {} ", APP_NAME))
        .style(Style::default().fg(Color::Black).bg(Color::Cyan).bold());
    f.render_widget(title, chunks[0]);

    if state.user.is_some() {
        let selected = match state.screen {
            Screen::Records | Screen::RecordDetail | Screen::RecordForm => Some(0),
            Screen::Statistics => Some(1),
            Screen::Profile => Some(2),
            _ => None,
        };
        let tabs = render_tabs(&[" 1:Records ", " 2:Statistics ", " 3:Profile "], selected);
        f.render_widget(tabs, chunks[1]);

        let user = state.user.as_ref().map(|u| u.display_name()).unwrap_or_default();
        let user = Paragraph::new(format!("{} ", user))
            .style(Style::default().fg(Color::Green))
            .alignment(Alignment::Right);
        f.render_widget(user, chunks[2]);
    } else {
        let title = Paragraph::new(format!(" {}", state.screen.title()))
            .style(Style::default().fg(Color::Gray));
        f.render_widget(title, chunks[1]);
    }
}

fn draw_status_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    if state.is_loading {
        let bar = Paragraph::new(" Loading... ").style(Style::default().fg(Color::Yellow));
        f.render_widget(bar, area);
        return;
    }

    if let Some(message) = &state.message {
        let bar = Paragraph::new(format!(" {} ", message.text))
            .style(Style::default().fg(message_color(message.kind)));
        f.render_widget(bar, area);
        return;
    }

    let hint = match state.screen {
        _ if state.input_mode == InputMode::Editing => " Enter:apply | Tab:next field | Esc:cancel ",
        Screen::Records => " ↑/↓:select | ←/→:page | Enter:open | a:add | e:edit | d:delete | f:filter | ?:help ",
        Screen::RecordDetail => " e:edit | d:delete | Esc:back | ?:help ",
        Screen::RecordForm => " Enter:save | Tab:next field | Esc:cancel ",
        Screen::Statistics => " c:next chart | f:window | r:reload | ?:help ",
        Screen::Profile => " l:logout | 1-3:switch | ?:help | q:quit ",
        _ => " Tab:next field | Enter:submit | Ctrl+C:quit ",
    };
    let bar = Paragraph::new(hint).style(Style::default().fg(Color::DarkGray));
    f.render_widget(bar, area);
}

fn draw_confirm_popup(f: &mut Frame, record_id: i64, area: Rect) {
    let popup_area = centered_rect(50, 20, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Delete record ")
        .style(Style::default().bg(Color::Black));

    let text = format!("Delete record #{}? This cannot be undone.\n\ny:delete  n:cancel", record_id);
    let confirm = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(confirm, popup_area);
}

fn draw_help_popup(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);

    let help_text = format!(
        r#"
 {} {} - Keyboard Shortcuts

 SCREENS
   1 / 2 / 3          Records / Statistics / Profile
   l                  Log out

 RECORDS
   ↑ / ↓              Select record
   ← / →              Previous / next page
   Enter              Open record
   a / e / d          Add / edit / delete
   f                  Filter by date range
   r                  Reload

 STATISTICS
   c / Tab            Next chart
   f                  Change window

 FORMS
   Tab / Shift+Tab    Next / previous field
   Enter              Submit
   Esc                Cancel

 GENERAL
   ?                  Toggle this help
   q / Ctrl+C         Quit

 Press any key to close...
"#,
        APP_NAME, APP_VERSION
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .style(Style::default().bg(Color::Black));

    let help = Paragraph::new(help_text)
        .block(block)
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(help, popup_area);
}
