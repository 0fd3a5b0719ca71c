//! View-local state: form buffers, focus, and dialog visibility.
//!
//! Everything here is presentation state the [`whisper_app::App`] state
//! machine does not care about - which field has focus, what is typed into
//! a dialog that was never submitted, which lobby row is highlighted.

use whisper_core::RoomId;

use crate::InputState;

/// Auth form mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AuthMode {
    /// Sign in to an existing account.
    SignIn,
    /// Register a new account.
    SignUp,
}

impl AuthMode {
    pub(crate) fn toggle(self) -> Self {
        match self {
            Self::SignIn => Self::SignUp,
            Self::SignUp => Self::SignIn,
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::SignIn => "Sign in",
            Self::SignUp => "Sign up",
        }
    }
}

/// Focusable stops on the auth form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AuthField {
    Email,
    Password,
    Mode,
}

impl AuthField {
    pub(crate) fn next(self) -> Self {
        match self {
            Self::Email => Self::Password,
            Self::Password => Self::Mode,
            Self::Mode => Self::Email,
        }
    }
}

/// Sign-in / sign-up form.
#[derive(Debug, Default)]
pub(crate) struct AuthForm {
    pub(crate) email: InputState,
    pub(crate) password: InputState,
    pub(crate) focus: Option<AuthField>,
    pub(crate) mode: Option<AuthMode>,
}

impl AuthForm {
    pub(crate) fn focused_field(&mut self) -> Option<&mut InputState> {
        match self.focus() {
            AuthField::Email => Some(&mut self.email),
            AuthField::Password => Some(&mut self.password),
            AuthField::Mode => None,
        }
    }

    pub(crate) fn focus(&self) -> AuthField {
        self.focus.unwrap_or(AuthField::Email)
    }

    pub(crate) fn mode(&self) -> AuthMode {
        self.mode.unwrap_or(AuthMode::SignIn)
    }

    pub(crate) fn reset(&mut self) {
        self.email.clear();
        self.password.clear();
        self.focus = None;
        self.mode = None;
    }
}

/// Fields of the create-room dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CreateField {
    Name,
    Password,
}

impl CreateField {
    pub(crate) fn next(self) -> Self {
        match self {
            Self::Name => Self::Password,
            Self::Password => Self::Name,
        }
    }
}

/// Create-room dialog state.
#[derive(Debug)]
pub(crate) struct CreateForm {
    pub(crate) name: InputState,
    pub(crate) password: InputState,
    pub(crate) focus: CreateField,
}

impl CreateForm {
    pub(crate) fn new() -> Self {
        Self { name: InputState::new(), password: InputState::new(), focus: CreateField::Name }
    }

    pub(crate) fn focused_field(&mut self) -> &mut InputState {
        match self.focus {
            CreateField::Name => &mut self.name,
            CreateField::Password => &mut self.password,
        }
    }
}

/// Join-password dialog state.
#[derive(Debug)]
pub(crate) struct JoinForm {
    pub(crate) room_id: RoomId,
    pub(crate) password: InputState,
}

/// Which lobby dialog is open, if any.
#[derive(Debug)]
pub(crate) enum LobbyModal {
    Create(CreateForm),
    Join(JoinForm),
}

/// Lobby list selection plus dialog state.
#[derive(Debug, Default)]
pub(crate) struct LobbyView {
    pub(crate) selected: usize,
    pub(crate) modal: Option<LobbyModal>,
}

impl LobbyView {
    /// Keep the highlighted row inside the list.
    pub(crate) fn clamp_selection(&mut self, room_count: usize) {
        if room_count == 0 {
            self.selected = 0;
        } else if self.selected >= room_count {
            self.selected = room_count - 1;
        }
    }
}

/// All view-local state, one value per screen.
#[derive(Debug, Default)]
pub(crate) struct ViewState {
    pub(crate) auth: AuthForm,
    pub(crate) lobby: LobbyView,
    pub(crate) chat_input: InputState,
}

impl ViewState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Reset everything; used on sign-out.
    pub(crate) fn reset(&mut self) {
        self.auth.reset();
        self.lobby = LobbyView::default();
        self.chat_input.clear();
    }
}
