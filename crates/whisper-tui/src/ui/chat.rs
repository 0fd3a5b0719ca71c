//! Chat area
//!
//! Displays the message feed for the active room, followed by the typing
//! indicator lines.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem};
use whisper_app::App;
use whisper_core::env::SystemEnv;
use whisper_core::{Message, MessageBody, avatar};

const BORDER_SIZE: u16 = 2;

/// Render the chat area.
pub(crate) fn render(frame: &mut Frame, app: &App<SystemEnv>, area: Rect) {
    let Some(chat) = app.chat() else {
        return;
    };

    let title = chat
        .room()
        .map_or_else(|| " Loading... ".to_owned(), |room| format!(" {} ", room.name));
    let block = Block::default().borders(Borders::ALL).title(title);

    let own_email = chat.actor().email.as_str();
    let mut items: Vec<ListItem> = if chat.messages().is_empty() {
        vec![ListItem::new(Line::from(Span::styled(
            "No messages yet. Say something!",
            Style::default().fg(Color::DarkGray),
        )))]
    } else {
        chat.messages().iter().map(|message| message_item(message, own_email)).collect()
    };

    for email in chat.typing_others() {
        items.push(ListItem::new(Line::from(vec![
            Span::styled(
                avatar::initials(email),
                Style::default().fg(super::avatar_rgb(email)).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!(" {email} is typing..."), Style::default().fg(Color::DarkGray)),
        ])));
    }

    // Keep the tail of the conversation in view
    let visible_height = area.height.saturating_sub(BORDER_SIZE) as usize;
    let skip = items.len().saturating_sub(visible_height);
    let visible_items: Vec<_> = items.into_iter().skip(skip).collect();

    frame.render_widget(List::new(visible_items).block(block), area);
}

fn message_item<'a>(message: &'a Message, own_email: &str) -> ListItem<'a> {
    let own = message.sender_email == own_email;
    let sender_style = Style::default()
        .fg(super::avatar_rgb(&message.sender_email))
        .add_modifier(Modifier::BOLD);
    let time = message.created_at.format("%H:%M").to_string();

    let mut spans = vec![
        Span::styled(format!("{time} "), Style::default().fg(Color::DarkGray)),
        Span::styled(format!("<{}>", avatar::initials(&message.sender_email)), sender_style),
        Span::styled(
            format!(" {}", message.sender_email),
            if own {
                Style::default().fg(Color::Blue)
            } else {
                Style::default().fg(Color::Gray)
            },
        ),
        Span::raw(": "),
    ];

    match &message.body {
        MessageBody::Text { content } => spans.push(Span::raw(content.clone())),
        MessageBody::Media { kind, url, file_name } => {
            spans.push(Span::styled(
                format!("[{}] ", kind.label()),
                Style::default().fg(Color::Cyan),
            ));
            spans.push(Span::raw(file_name.clone()));
            spans.push(Span::styled(format!("  {url}"), Style::default().fg(Color::DarkGray)));
        },
    }

    ListItem::new(Line::from(spans))
}
