//! Async runtime
//!
//! Event loop that drives terminal I/O and coordinates between the App
//! state machine, the Bridge, and the in-process backend. Uses
//! `tokio::select!` to handle terminal events, realtime channel events, and
//! the debounce tick concurrently.

use std::io::{self, Stdout, stdout};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::ExecutableCommand;
use crossterm::event::{Event, EventStream, KeyEventKind};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use thiserror::Error;
use tokio::time::Interval;
use whisper_app::{App, AppAction, AppEvent, Bridge, KeyInput, Screen};
use whisper_backend::LocalBackend;
use whisper_client::{FileUpload, SessionEvent};
use whisper_core::backend::ChannelEvent;
use whisper_core::env::SystemEnv;
use whisper_core::Room;

use crate::input::{self, Edit};
use crate::view::{AuthField, CreateForm, JoinForm, LobbyModal};
use crate::{ViewState, ui};

/// Composer command that uploads a file instead of sending text.
const UPLOAD_COMMAND: &str = "/upload";

/// Tick period driving the typing-idle clock.
const TICK_PERIOD: Duration = Duration::from_millis(100);

/// Runtime errors.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// One iteration's wake-up reason.
enum Step {
    /// A terminal event arrived.
    Terminal(Event),
    /// A realtime channel event arrived (`None` = channel closed).
    Channel(Option<ChannelEvent>),
    /// The tick interval fired.
    Tick,
    /// The terminal event stream ended.
    Quit,
}

/// Async runtime for the TUI.
///
/// Manages terminal setup/teardown and the main event loop. Runs against an
/// in-process backend, so a single binary is a complete, self-contained
/// installation.
pub struct Runtime {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    app: App<SystemEnv>,
    bridge: Bridge<SystemEnv>,
    view: ViewState,
    events: EventStream,
}

impl Runtime {
    /// Create a runtime over a fresh in-process backend.
    pub fn new() -> Result<Self, RuntimeError> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;

        let env = SystemEnv::new();
        let store = LocalBackend::new();
        let app = App::new(env.clone());
        let bridge = Bridge::new(Arc::new(store), env);

        Ok(Self { terminal, app, bridge, view: ViewState::new(), events: EventStream::new() })
    }

    /// Run the main event loop.
    pub async fn run(mut self) -> Result<(), RuntimeError> {
        self.render()?;
        let mut ticker = tokio::time::interval(TICK_PERIOD);

        loop {
            let quit = match self.next_step(&mut ticker).await {
                Step::Terminal(event) => self.handle_terminal_event(event).await?,
                Step::Channel(Some(event)) => {
                    let app_event = Bridge::<SystemEnv>::channel_event(event);
                    let actions = self.app.handle(app_event);
                    self.process_actions(actions).await?
                },
                Step::Channel(None) => {
                    tracing::warn!("realtime channel closed");
                    self.bridge.drop_channel();
                    false
                },
                Step::Tick => {
                    let actions = self.app.handle(AppEvent::Tick { now: Instant::now() });
                    self.process_actions(actions).await?
                },
                Step::Quit => true,
            };

            if quit {
                break;
            }
        }

        Ok(())
    }

    /// Wait for the next wake-up.
    ///
    /// The channel arm pends forever while no room is active, so it can sit
    /// in the select unconditionally.
    async fn next_step(&mut self, ticker: &mut Interval) -> Step {
        tokio::select! {
            maybe_event = self.events.next() => match maybe_event {
                Some(Ok(event)) => Step::Terminal(event),
                Some(Err(error)) => {
                    tracing::error!(%error, "terminal event stream failed");
                    Step::Quit
                },
                None => Step::Quit,
            },
            event = self.bridge.next_channel_event() => Step::Channel(event),
            _ = ticker.tick() => Step::Tick,
        }
    }

    /// Handle a terminal event and return whether to quit.
    async fn handle_terminal_event(&mut self, event: Event) -> Result<bool, RuntimeError> {
        let actions = match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                match input::convert_key(key.code) {
                    Some(key_input) => self.route_key(key_input).await,
                    None => vec![],
                }
            },
            Event::Resize(cols, rows) => self.app.handle(AppEvent::Resize(cols, rows)),
            _ => vec![],
        };

        self.process_actions(actions).await
    }

    /// Route a key to the focused screen.
    async fn route_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        match self.app.screen() {
            Screen::Auth => self.auth_key(key),
            Screen::Lobby => self.lobby_key(key),
            Screen::Chat => self.chat_key(key).await,
        }
    }

    fn auth_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        let form = &mut self.view.auth;
        match key {
            KeyInput::Esc => self.app.quit(),
            KeyInput::Tab | KeyInput::Down => {
                form.focus = Some(form.focus().next());
                vec![AppAction::Render]
            },
            KeyInput::Enter => match form.focus() {
                AuthField::Mode => {
                    form.mode = Some(form.mode().toggle());
                    vec![AppAction::Render]
                },
                AuthField::Email | AuthField::Password => {
                    let email = form.email.buffer().to_owned();
                    let password = form.password.buffer().to_owned();
                    match form.mode() {
                        crate::view::AuthMode::SignIn => self.app.sign_in(&email, &password),
                        crate::view::AuthMode::SignUp => self.app.sign_up(&email, &password),
                    }
                },
            },
            KeyInput::Left | KeyInput::Right if form.focus() == AuthField::Mode => {
                form.mode = Some(form.mode().toggle());
                vec![AppAction::Render]
            },
            other => match form.focused_field() {
                Some(field) => match field.apply(other) {
                    Edit::Ignored => vec![],
                    Edit::Changed | Edit::CursorMoved => vec![AppAction::Render],
                },
                None => vec![],
            },
        }
    }

    fn lobby_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        if self.view.lobby.modal.is_some() {
            return self.lobby_modal_key(key);
        }

        let room_count = self.app.rooms().len();
        match key {
            KeyInput::Esc | KeyInput::Char('q') => self.app.quit(),
            KeyInput::Up => {
                self.view.lobby.selected = self.view.lobby.selected.saturating_sub(1);
                vec![AppAction::Render]
            },
            KeyInput::Down => {
                if self.view.lobby.selected + 1 < room_count {
                    self.view.lobby.selected += 1;
                }
                vec![AppAction::Render]
            },
            KeyInput::Enter => match self.selected_room() {
                Some(room) if room.is_full() => {
                    // The join control is withheld on a full room
                    self.app.set_status("Room is full");
                    vec![AppAction::Render]
                },
                Some(room) => {
                    self.view.lobby.modal = Some(LobbyModal::Join(JoinForm {
                        room_id: room.id,
                        password: crate::InputState::new(),
                    }));
                    vec![AppAction::Render]
                },
                None => vec![],
            },
            KeyInput::Char('c') => {
                self.view.lobby.modal = Some(LobbyModal::Create(CreateForm::new()));
                vec![AppAction::Render]
            },
            KeyInput::Char('d') => match self.selected_room() {
                Some(room) => self.app.delete_room(room.id),
                None => vec![],
            },
            KeyInput::Char('r') => self.app.refresh_rooms(),
            KeyInput::Char('o') => self.app.sign_out(),
            _ => vec![],
        }
    }

    fn lobby_modal_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        let Some(modal) = self.view.lobby.modal.as_mut() else {
            return vec![];
        };

        match key {
            KeyInput::Esc => {
                self.view.lobby.modal = None;
                vec![AppAction::Render]
            },
            KeyInput::Tab => {
                if let LobbyModal::Create(form) = modal {
                    form.focus = form.focus.next();
                }
                vec![AppAction::Render]
            },
            KeyInput::Enter => match modal {
                LobbyModal::Create(form) => {
                    let name = form.name.buffer().to_owned();
                    let password = form.password.buffer().to_owned();
                    self.app.create_room(&name, &password)
                },
                LobbyModal::Join(form) => {
                    let room_id = form.room_id;
                    let password = form.password.buffer().to_owned();
                    self.app.join_room(room_id, &password)
                },
            },
            other => {
                let field = match modal {
                    LobbyModal::Create(form) => form.focused_field(),
                    LobbyModal::Join(form) => &mut form.password,
                };
                match field.apply(other) {
                    Edit::Ignored => vec![],
                    Edit::Changed | Edit::CursorMoved => vec![AppAction::Render],
                }
            },
        }
    }

    async fn chat_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        match key {
            KeyInput::Esc => {
                self.view.chat_input.clear();
                self.app.leave_room()
            },
            KeyInput::Enter => {
                let buffer = self.view.chat_input.buffer().to_owned();
                if let Some(rest) = buffer.strip_prefix(UPLOAD_COMMAND)
                    && (rest.is_empty() || rest.starts_with(' '))
                {
                    let path = rest.trim().to_owned();
                    self.view.chat_input.clear();
                    return self.upload_from_path(&path).await;
                }

                let actions = self.app.handle(AppEvent::Session(SessionEvent::Submit));
                // The session clears its draft on the attempt; mirror it
                if self.app.chat().is_some_and(|c| c.draft().is_empty()) {
                    self.view.chat_input.clear();
                }
                actions
            },
            other => match self.view.chat_input.apply(other) {
                Edit::Changed => self.app.handle(AppEvent::Session(SessionEvent::DraftChanged(
                    self.view.chat_input.buffer().to_owned(),
                ))),
                Edit::CursorMoved => vec![AppAction::Render],
                Edit::Ignored => vec![],
            },
        }
    }

    /// Read a local file and hand it to the session as a picked upload.
    async fn upload_from_path(&mut self, path: &str) -> Vec<AppAction> {
        let mut actions =
            self.app.handle(AppEvent::Session(SessionEvent::DraftChanged(String::new())));

        if path.is_empty() {
            self.app.set_status("Usage: /upload <file>");
            actions.push(AppAction::Render);
            return actions;
        }

        match tokio::fs::read(path).await {
            Ok(data) => {
                let name = Path::new(path)
                    .file_name()
                    .map_or_else(|| path.to_owned(), |n| n.to_string_lossy().into_owned());
                let media_type = media_type_for(&name);
                actions.extend(self.app.handle(AppEvent::Session(SessionEvent::FileSelected(
                    FileUpload { name, media_type, data },
                ))));
            },
            Err(error) => {
                self.app.set_status(format!("Failed to read {path}: {error}"));
                actions.push(AppAction::Render);
            },
        }
        actions
    }

    fn selected_room(&self) -> Option<Room> {
        self.app.rooms().get(self.view.lobby.selected).cloned()
    }

    /// Process actions returned by the app. Returns true if should quit.
    ///
    /// Uses iterative processing to avoid async recursion between actions
    /// and events.
    async fn process_actions(&mut self, initial_actions: Vec<AppAction>) -> Result<bool, RuntimeError> {
        let mut pending_actions = initial_actions;

        while !pending_actions.is_empty() {
            let actions = std::mem::take(&mut pending_actions);

            for action in actions {
                match action {
                    AppAction::Render => self.render()?,
                    AppAction::Quit => return Ok(true),
                    other => {
                        let events = self.bridge.execute(other).await;
                        for event in events {
                            self.observe(&event);
                            pending_actions.extend(self.app.handle(event));
                        }
                    },
                }
            }
        }
        Ok(false)
    }

    /// Update view-local state from backend completions before the app
    /// consumes them (close dialogs on success, keep the selection valid).
    fn observe(&mut self, event: &AppEvent) {
        match event {
            AppEvent::RoomCreated(_) => {
                if matches!(self.view.lobby.modal, Some(LobbyModal::Create(_))) {
                    self.view.lobby.modal = None;
                }
            },
            AppEvent::JoinVerified(_) => {
                self.view.lobby.modal = None;
                self.view.chat_input.clear();
            },
            AppEvent::RoomsLoaded(rooms) => {
                self.view.lobby.clamp_selection(rooms.len());
            },
            AppEvent::SignedIn(_) => {
                self.view.auth.reset();
            },
            AppEvent::SignedOut => {
                self.view.reset();
            },
            _ => {},
        }
    }

    /// Render the UI.
    fn render(&mut self) -> Result<(), RuntimeError> {
        self.terminal.draw(|frame| {
            ui::render(frame, &self.app, &self.view);
        })?;
        Ok(())
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}

/// Declared media type for a picked file, from its extension.
///
/// The original picker only accepted images and videos; anything
/// unrecognized uploads as a generic blob and renders as video.
fn media_type_for(file_name: &str) -> String {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        _ => "application/octet-stream",
    }
    .to_owned()
}
