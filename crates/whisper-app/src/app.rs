//! Application state machine.
//!
//! This module defines the [`App`] state machine, which manages the
//! interactive state of the application completely decoupled from I/O.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] instructions for the runtime to execute.
//!
//! # Responsibilities
//!
//! - Tracks the actor session, the room list, and the active room session.
//! - Validates user intents locally before any request goes out.
//! - Stores terminal dimensions to handle resize events.

use whisper_client::{RoomSession, SessionAction};
use whisper_core::env::Environment;
use whisper_core::{NewRoom, Room, RoomId, Session};

use crate::{AppAction, AppEvent, Screen};

/// Application state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies - fully testable in simulation.
#[derive(Debug)]
pub struct App<E: Environment> {
    env: E,
    /// The authenticated actor. `None` renders the auth screen.
    session: Option<Session>,
    /// Room list, newest first.
    rooms: Vec<Room>,
    /// Room list fetch in flight.
    loading_rooms: bool,
    /// The active room session. `Some` renders the chat view.
    chat: Option<RoomSession<E>>,
    /// Transient status message. `None` if no message.
    status_message: Option<String>,
    /// Terminal dimensions (columns, rows).
    terminal_size: (u16, u16),
}

impl<E: Environment> App<E> {
    /// Create a signed-out App.
    pub fn new(env: E) -> Self {
        Self {
            env,
            session: None,
            rooms: Vec::new(),
            loading_rooms: false,
            chat: None,
            status_message: None,
            terminal_size: (80, 24),
        }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent<E::Instant>) -> Vec<AppAction> {
        match event {
            AppEvent::Tick { now } => self.forward_session(whisper_client::SessionEvent::Tick {
                now,
            }),
            AppEvent::Resize(cols, rows) => {
                self.terminal_size = (cols, rows);
                vec![AppAction::Render]
            },
            AppEvent::SignedIn(session) => {
                self.session = Some(session);
                self.loading_rooms = true;
                vec![AppAction::FetchRooms, AppAction::Render]
            },
            AppEvent::SignedOut => {
                self.session = None;
                self.rooms.clear();
                self.status_message = Some("Signed out successfully".into());
                let mut actions = self.teardown_chat();
                actions.push(AppAction::Render);
                actions
            },
            AppEvent::RoomsLoaded(rooms) => {
                self.rooms = rooms;
                self.loading_rooms = false;
                vec![AppAction::Render]
            },
            AppEvent::RoomCreated(room) => {
                self.status_message = Some(format!("Room \"{}\" created", room.name));
                self.loading_rooms = true;
                vec![AppAction::FetchRooms, AppAction::Render]
            },
            AppEvent::RoomDeleted(_) => {
                self.status_message = Some("Room deleted successfully".into());
                self.loading_rooms = true;
                vec![AppAction::FetchRooms, AppAction::Render]
            },
            AppEvent::JoinVerified(room_id) => self.open_room(room_id),
            AppEvent::Session(event) => self.forward_session(event),
            AppEvent::Error { message } => {
                self.status_message = Some(message);
                // Whatever was in flight is over; never leave a spinner up
                self.loading_rooms = false;
                vec![AppAction::Render]
            },
            AppEvent::Info { message } => {
                self.status_message = Some(message);
                vec![AppAction::Render]
            },
        }
    }

    /// Sign in with the given credentials.
    pub fn sign_in(&mut self, email: &str, password: &str) -> Vec<AppAction> {
        self.auth_request(email, password, false)
    }

    /// Register a new account and sign it in.
    pub fn sign_up(&mut self, email: &str, password: &str) -> Vec<AppAction> {
        self.auth_request(email, password, true)
    }

    fn auth_request(&mut self, email: &str, password: &str, register: bool) -> Vec<AppAction> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            self.status_message = Some("Please fill in all fields".into());
            return vec![AppAction::Render];
        }

        let action = if register {
            AppAction::SignUp { email: email.to_owned(), password: password.to_owned() }
        } else {
            AppAction::SignIn { email: email.to_owned(), password: password.to_owned() }
        };
        self.status_message = Some(if register { "Signing up..." } else { "Signing in..." }.into());
        vec![action, AppAction::Render]
    }

    /// Tear down the session.
    pub fn sign_out(&self) -> Vec<AppAction> {
        vec![AppAction::SignOut, AppAction::Render]
    }

    /// Re-fetch the room list.
    pub fn refresh_rooms(&mut self) -> Vec<AppAction> {
        self.loading_rooms = true;
        vec![AppAction::FetchRooms, AppAction::Render]
    }

    /// Create a room. Requires an authenticated actor and both fields.
    pub fn create_room(&mut self, name: &str, password: &str) -> Vec<AppAction> {
        let name = name.trim();
        if name.is_empty() || password.is_empty() {
            self.status_message = Some("Please fill in all fields".into());
            return vec![AppAction::Render];
        }
        if self.session.is_none() {
            self.status_message = Some("You must be logged in to create a room".into());
            return vec![AppAction::Render];
        }

        self.status_message = Some(format!("Creating room \"{name}\"..."));
        vec![
            AppAction::CreateRoom(NewRoom { name: name.to_owned(), password: password.to_owned() }),
            AppAction::Render,
        ]
    }

    /// Delete a room. Only offered to the owner.
    pub fn delete_room(&mut self, room_id: RoomId) -> Vec<AppAction> {
        let owned = self
            .session
            .as_ref()
            .zip(self.rooms.iter().find(|r| r.id == room_id))
            .is_some_and(|(session, room)| room.is_owner(session));
        if !owned {
            self.status_message = Some("Only the owner can delete a room".into());
            return vec![AppAction::Render];
        }

        vec![AppAction::DeleteRoom(room_id), AppAction::Render]
    }

    /// Ask the backend to verify a join password.
    ///
    /// A full room never offers the join control, regardless of the
    /// password.
    pub fn join_room(&mut self, room_id: RoomId, password: &str) -> Vec<AppAction> {
        let Some(room) = self.rooms.iter().find(|r| r.id == room_id) else {
            self.status_message = Some("Room not found".into());
            return vec![AppAction::Render];
        };
        if room.is_full() {
            self.status_message = Some("Room is full".into());
            return vec![AppAction::Render];
        }
        if password.is_empty() {
            self.status_message = Some("Please enter the room password".into());
            return vec![AppAction::Render];
        }

        vec![
            AppAction::VerifyJoin { room_id, password: password.to_owned() },
            AppAction::Render,
        ]
    }

    /// Leave the active room, closing its channel.
    pub fn leave_room(&mut self) -> Vec<AppAction> {
        let mut actions = self.teardown_chat();
        actions.push(AppAction::Render);
        actions
    }

    /// Quit the application.
    pub fn quit(&self) -> Vec<AppAction> {
        vec![AppAction::Quit]
    }

    /// Set a status message to display to the user.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    fn open_room(&mut self, room_id: RoomId) -> Vec<AppAction> {
        let Some(session) = self.session.clone() else {
            self.status_message = Some("You must be logged in to join a room".into());
            return vec![AppAction::Render];
        };

        let chat = RoomSession::new(self.env.clone(), session, room_id);
        let mut actions = Self::map_session(chat.start());
        self.chat = Some(chat);
        actions.push(AppAction::Render);
        actions
    }

    fn teardown_chat(&mut self) -> Vec<AppAction> {
        match self.chat.take() {
            Some(mut chat) => Self::map_session(chat.close()),
            None => vec![],
        }
    }

    fn forward_session(
        &mut self,
        event: whisper_client::SessionEvent<E::Instant>,
    ) -> Vec<AppAction> {
        match self.chat.as_mut() {
            Some(chat) => Self::map_session(chat.handle(event)),
            None => vec![],
        }
    }

    fn map_session(actions: Vec<SessionAction>) -> Vec<AppAction> {
        actions
            .into_iter()
            .map(|action| match action {
                SessionAction::Render => AppAction::Render,
                other => AppAction::Session(other),
            })
            .collect()
    }

    /// Which screen to render.
    pub fn screen(&self) -> Screen {
        if self.session.is_none() {
            Screen::Auth
        } else if self.chat.is_some() {
            Screen::Chat
        } else {
            Screen::Lobby
        }
    }

    /// The authenticated actor. `None` on the auth screen.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Room list, newest first.
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Whether a room list fetch is in flight.
    pub fn is_loading_rooms(&self) -> bool {
        self.loading_rooms
    }

    /// The active room session. `None` outside the chat view.
    pub fn chat(&self) -> Option<&RoomSession<E>> {
        self.chat.as_ref()
    }

    /// Transient status message. `None` if no message.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    /// Terminal dimensions (columns, rows).
    pub fn terminal_size(&self) -> (u16, u16) {
        self.terminal_size
    }
}
