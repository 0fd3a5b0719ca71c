//! UI rendering
//!
//! Rendering functions that convert App state into terminal output using
//! ratatui widgets. All functions are pure (no I/O), taking state and
//! returning widget trees.

mod auth;
mod chat;
mod input;
mod lobby;
mod status;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders, Paragraph};
use whisper_app::{App, Screen};
use whisper_core::avatar::{self, AvatarColor};
use whisper_core::env::SystemEnv;

use crate::{InputState, ViewState};

/// Render the entire UI.
pub(crate) fn render(frame: &mut Frame, app: &App<SystemEnv>, view: &ViewState) {
    const MAIN_AREA_MIN_HEIGHT: u16 = 3;
    const INPUT_HEIGHT: u16 = 3;
    const STATUS_HEIGHT: u16 = 1;

    match app.screen() {
        Screen::Auth => auth::render(frame, app, view, frame.area()),
        Screen::Lobby => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Min(MAIN_AREA_MIN_HEIGHT),
                    Constraint::Length(STATUS_HEIGHT),
                ])
                .split(frame.area());

            let [main_area, status_area] = chunks.as_ref() else {
                return;
            };

            lobby::render(frame, app, view, *main_area);
            status::render(frame, app, *status_area);
        },
        Screen::Chat => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Min(MAIN_AREA_MIN_HEIGHT),
                    Constraint::Length(INPUT_HEIGHT),
                    Constraint::Length(STATUS_HEIGHT),
                ])
                .split(frame.area());

            let [chat_area, input_area, status_area] = chunks.as_ref() else {
                return;
            };

            chat::render(frame, app, *chat_area);
            input::render(frame, app, view, *input_area);
            status::render(frame, app, *status_area);
        },
    }
}

/// Terminal color for an identifier's avatar.
pub(crate) fn avatar_rgb(identifier: &str) -> Color {
    let color = avatar::avatar_color(identifier);
    let (r, g, b) = hsl_to_rgb(
        f32::from(color.hue),
        f32::from(AvatarColor::SATURATION) / 100.0,
        f32::from(AvatarColor::LIGHTNESS) / 100.0,
    );
    Color::Rgb(r, g, b)
}

/// Convert HSL (hue in degrees) to RGB bytes.
fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> (u8, u8, u8) {
    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let hue_prime = hue / 60.0;
    let x = chroma * (1.0 - (hue_prime % 2.0 - 1.0).abs());
    let (r1, g1, b1) = match hue_prime as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = lightness - chroma / 2.0;
    (
        ((r1 + m) * 255.0).round() as u8,
        ((g1 + m) * 255.0).round() as u8,
        ((b1 + m) * 255.0).round() as u8,
    )
}

/// A rect of the given size centered in `area`, clamped to fit.
pub(crate) fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Render a bordered single-line text field, with the cursor when focused.
pub(crate) fn field(
    frame: &mut Frame,
    title: &str,
    input: &InputState,
    focused: bool,
    masked: bool,
    area: Rect,
) {
    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let block = Block::default().borders(Borders::ALL).title(format!(" {title} ")).style(style);

    let text = if masked {
        "*".repeat(input.buffer().chars().count())
    } else {
        input.buffer().to_owned()
    };
    frame.render_widget(Paragraph::new(text).block(block), area);

    if focused {
        let max_offset = area.width.saturating_sub(2);
        let cursor_x = area.x + 1 + (input.cursor() as u16).min(max_offset.saturating_sub(1));
        frame.set_cursor_position((cursor_x, area.y + 1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hsl_conversion_hits_the_primaries() {
        assert_eq!(hsl_to_rgb(0.0, 1.0, 0.5), (255, 0, 0));
        assert_eq!(hsl_to_rgb(120.0, 1.0, 0.5), (0, 255, 0));
        assert_eq!(hsl_to_rgb(240.0, 1.0, 0.5), (0, 0, 255));
    }

    #[test]
    fn centered_rect_fits_inside() {
        let outer = Rect { x: 0, y: 0, width: 80, height: 24 };
        let inner = centered(outer, 40, 10);
        assert!(inner.width <= outer.width && inner.height <= outer.height);
        assert_eq!(inner.x, 20);
        assert_eq!(inner.y, 7);
    }
}
