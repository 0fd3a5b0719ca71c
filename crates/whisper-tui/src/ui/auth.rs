//! Auth screen
//!
//! Sign-in / sign-up form rendered centered on an otherwise empty screen.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use whisper_app::App;
use whisper_core::env::SystemEnv;

use crate::ViewState;
use crate::view::AuthField;

/// Render the auth screen.
pub(crate) fn render(frame: &mut Frame, app: &App<SystemEnv>, view: &ViewState, area: Rect) {
    let form = &view.auth;
    let popup = super::centered(area, 46, 13);
    frame.render_widget(Clear, popup);

    let block = Block::default().borders(Borders::ALL).title(" Whisper Rooms ");
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);
    let [email_area, password_area, mode_area, hint_area, notice_area] = rows.as_ref() else {
        return;
    };

    super::field(
        frame,
        "Email",
        &form.email,
        form.focus() == AuthField::Email,
        false,
        *email_area,
    );
    super::field(
        frame,
        "Password",
        &form.password,
        form.focus() == AuthField::Password,
        true,
        *password_area,
    );

    let mode_style = if form.focus() == AuthField::Mode {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let mode_line = Line::from(vec![
        Span::raw(" Mode: "),
        Span::styled(format!("< {} >", form.mode().label()), mode_style),
    ]);
    frame.render_widget(Paragraph::new(mode_line), *mode_area);

    let hint = Line::from(Span::styled(
        " Tab: next field | Enter: submit | Esc: quit",
        Style::default().fg(Color::DarkGray),
    ));
    frame.render_widget(Paragraph::new(hint), *hint_area);

    if let Some(message) = app.status_message() {
        let notice =
            Line::from(Span::styled(format!(" {message}"), Style::default().fg(Color::Yellow)));
        frame.render_widget(Paragraph::new(notice), *notice_area);
    }
}
