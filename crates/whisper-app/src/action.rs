//! Application side-effects and intents.
//!
//! This module defines the [`AppAction`] enum, which represents instructions
//! produced by the [`crate::App`] state machine for the runtime to execute.

use whisper_client::SessionAction;
use whisper_core::{NewRoom, RoomId};

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Quit the application.
    Quit,

    /// Sign in an existing account.
    SignIn {
        /// Account email.
        email: String,
        /// Account password.
        password: String,
    },

    /// Register a new account and sign it in.
    SignUp {
        /// Account email.
        email: String,
        /// Account password.
        password: String,
    },

    /// Tear down the session.
    SignOut,

    /// Fetch the room list.
    FetchRooms,

    /// Create a room owned by the current actor.
    CreateRoom(NewRoom),

    /// Delete a room owned by the current actor.
    DeleteRoom(RoomId),

    /// Check a supplied password against a room's join gate.
    VerifyJoin {
        /// Target room.
        room_id: RoomId,
        /// Supplied secret.
        password: String,
    },

    /// Action for the active room session.
    Session(SessionAction),
}
