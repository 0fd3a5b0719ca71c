//! Status bar
//!
//! Displays the signed-in actor, active room information, and the latest
//! transient notice.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use whisper_app::App;
use whisper_core::env::SystemEnv;

/// Render the status bar.
pub(crate) fn render(frame: &mut Frame, app: &App<SystemEnv>, area: Rect) {
    let identity = match app.session() {
        Some(session) => Span::styled(
            session.email.clone(),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        None => Span::styled("Signed out", Style::default().fg(Color::Red)),
    };

    let room_info = app.chat().map_or_else(String::new, |chat| {
        let name = chat.room().map_or("...", |room| room.name.as_str());
        format!(
            " | Room: {name} | Online: {} | Messages: {}",
            chat.participants().len(),
            chat.messages().len()
        )
    });

    let notice = app
        .status_message()
        .map_or_else(String::new, |message| format!(" | {message}"));

    let status_line = Line::from(vec![
        Span::raw(" "),
        identity,
        Span::styled(room_info, Style::default().fg(Color::DarkGray)),
        Span::styled(notice, Style::default().fg(Color::Yellow)),
    ]);

    let paragraph =
        Paragraph::new(status_line).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(paragraph, area);
}
