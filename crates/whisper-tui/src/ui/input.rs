//! Input line
//!
//! Displays the composer buffer with cursor, plus the upload-in-flight
//! marker.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders, Paragraph};
use whisper_app::App;
use whisper_core::env::SystemEnv;

use crate::ViewState;

const PROMPT_WIDTH: u16 = 3; // "> "
const INPUT_LINE_OFFSET_Y: u16 = 1; // inside top border
const RIGHT_PADDING: u16 = 1; // inside right border

/// Render the composer line.
pub(crate) fn render(frame: &mut Frame, app: &App<SystemEnv>, view: &ViewState, area: Rect) {
    let uploading = app.chat().is_some_and(|chat| chat.is_uploading());
    let title = if uploading { " Message (uploading...) " } else { " Message " };
    let block = Block::default().borders(Borders::ALL).title(title);

    let input = &view.chat_input;
    let input_text = format!("> {}", input.buffer());
    let paragraph =
        Paragraph::new(input_text).style(Style::default().fg(Color::White)).block(block);

    frame.render_widget(paragraph, area);

    let available_width = area.width.saturating_sub(PROMPT_WIDTH + RIGHT_PADDING);
    let cursor_offset = (input.cursor() as u16).min(available_width);

    let cursor_x = area.x.saturating_add(PROMPT_WIDTH).saturating_add(cursor_offset);
    let cursor_y = area.y.saturating_add(INPUT_LINE_OFFSET_Y);
    let max_x = area.x.saturating_add(area.width).saturating_sub(RIGHT_PADDING);
    let cursor_x = cursor_x.min(max_x);

    frame.set_cursor_position((cursor_x, cursor_y));
}
