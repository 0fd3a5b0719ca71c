//! Observable application state types.

/// Which screen the application is showing.
///
/// Derived from the session and chat state rather than stored: signed-out
/// actors see the auth screen, a live room session shows the chat view, and
/// everything else is the lobby.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Sign-in / sign-up form.
    Auth,
    /// Room list with create/join/delete controls.
    Lobby,
    /// Active room view.
    Chat,
}
