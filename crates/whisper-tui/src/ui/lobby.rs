//! Room lobby
//!
//! Room list with capacity badges plus the create/join dialogs.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph};
use whisper_app::App;
use whisper_core::Room;
use whisper_core::env::SystemEnv;

use crate::ViewState;
use crate::view::{CreateField, LobbyModal};

const ACTIVE_PREFIX: &str = "> ";
const INACTIVE_PREFIX: &str = "  ";

/// Render the lobby.
pub(crate) fn render(frame: &mut Frame, app: &App<SystemEnv>, view: &ViewState, area: Rect) {
    const HINT_HEIGHT: u16 = 1;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(HINT_HEIGHT)])
        .split(area);
    let [list_area, hint_area] = chunks.as_ref() else {
        return;
    };

    render_room_list(frame, app, view, *list_area);

    let hint = Line::from(Span::styled(
        " Enter: join | c: create | d: delete | r: refresh | o: sign out | q: quit",
        Style::default().fg(Color::DarkGray),
    ));
    frame.render_widget(Paragraph::new(hint), *hint_area);

    match &view.lobby.modal {
        Some(LobbyModal::Create(form)) => render_create_dialog(frame, form, area),
        Some(LobbyModal::Join(form)) => render_join_dialog(frame, app, form, area),
        None => {},
    }
}

fn render_room_list(frame: &mut Frame, app: &App<SystemEnv>, view: &ViewState, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Rooms ");

    let items: Vec<ListItem> = if app.is_loading_rooms() {
        vec![ListItem::new(Line::from(Span::styled(
            "Loading rooms...",
            Style::default().fg(Color::DarkGray),
        )))]
    } else if app.rooms().is_empty() {
        vec![ListItem::new(Line::from(Span::styled(
            "No rooms available. Press c to create one!",
            Style::default().fg(Color::DarkGray),
        )))]
    } else {
        app.rooms()
            .iter()
            .enumerate()
            .map(|(index, room)| room_item(app, room, index == view.lobby.selected))
            .collect()
    };

    frame.render_widget(List::new(items).block(block), area);
}

fn room_item<'a>(app: &App<SystemEnv>, room: &'a Room, selected: bool) -> ListItem<'a> {
    let prefix = if selected { ACTIVE_PREFIX } else { INACTIVE_PREFIX };
    let name_style = if selected {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(super::avatar_rgb(&room.name))
    };

    let mut spans = vec![
        Span::raw(prefix),
        Span::styled(room.name.clone(), name_style),
        Span::styled(
            format!("  {}/{}", room.member_count, Room::MAX_MEMBERS),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    if room.is_full() {
        spans.push(Span::styled(" [Full]", Style::default().fg(Color::Red)));
    }
    if app.session().is_some_and(|s| room.is_owner(s)) {
        spans.push(Span::styled(" (yours)", Style::default().fg(Color::DarkGray)));
    }

    ListItem::new(Line::from(spans))
}

fn render_create_dialog(frame: &mut Frame, form: &crate::view::CreateForm, area: Rect) {
    let popup = super::centered(area, 42, 10);
    frame.render_widget(Clear, popup);

    let block = Block::default().borders(Borders::ALL).title(" Create Room ");
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(3), Constraint::Length(1)])
        .split(inner);
    let [name_area, password_area, hint_area] = rows.as_ref() else {
        return;
    };

    super::field(frame, "Room Name", &form.name, form.focus == CreateField::Name, false, *name_area);
    super::field(
        frame,
        "Room Password",
        &form.password,
        form.focus == CreateField::Password,
        true,
        *password_area,
    );

    let hint = Line::from(Span::styled(
        " Tab: next | Enter: create | Esc: cancel",
        Style::default().fg(Color::DarkGray),
    ));
    frame.render_widget(Paragraph::new(hint), *hint_area);
}

fn render_join_dialog(
    frame: &mut Frame,
    app: &App<SystemEnv>,
    form: &crate::view::JoinForm,
    area: Rect,
) {
    let popup = super::centered(area, 42, 7);
    frame.render_widget(Clear, popup);

    let room_name = app
        .rooms()
        .iter()
        .find(|r| r.id == form.room_id)
        .map_or_else(|| "room".to_owned(), |r| r.name.clone());
    let block = Block::default().borders(Borders::ALL).title(format!(" Join {room_name} "));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(1)])
        .split(inner);
    let [password_area, hint_area] = rows.as_ref() else {
        return;
    };

    super::field(frame, "Password", &form.password, true, true, *password_area);

    let hint = Line::from(Span::styled(
        " Enter: join | Esc: cancel",
        Style::default().fg(Color::DarkGray),
    ));
    frame.render_widget(Paragraph::new(hint), *hint_area);
}
