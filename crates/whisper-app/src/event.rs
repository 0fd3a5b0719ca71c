//! Application input events.
//!
//! This module defines [`AppEvent`], the set of inputs that drive the
//! [`crate::App`] state machine.
//!
//! Events originate from three sources: the terminal (resize, ticks),
//! backend request completions translated by the [`crate::Bridge`], and
//! realtime channel events forwarded into the active room session.

use whisper_client::SessionEvent;
use whisper_core::{Room, RoomId, Session};

/// Events processed by the App state machine.
///
/// Generic over `I` (Instant type) to support both production
/// (`std::time::Instant`) and simulated clocks.
#[derive(Debug, Clone)]
pub enum AppEvent<I = std::time::Instant> {
    /// Periodic tick; drives the typing-idle clock.
    Tick {
        /// Current time from the environment.
        now: I,
    },

    /// Terminal resize (columns, rows).
    Resize(u16, u16),

    /// Authentication completed.
    SignedIn(Session),

    /// The session was torn down.
    SignedOut,

    /// Room list fetch completed, newest first.
    RoomsLoaded(Vec<Room>),

    /// Room creation committed.
    RoomCreated(Room),

    /// Room deletion committed.
    RoomDeleted(RoomId),

    /// The supplied join password matched; the room may be entered.
    JoinVerified(RoomId),

    /// Event for the active room session.
    Session(SessionEvent<I>),

    /// A request failed; surfaced as a transient notice.
    Error {
        /// User-visible description.
        message: String,
    },

    /// A request succeeded in a way worth announcing.
    Info {
        /// User-visible description.
        message: String,
    },
}
