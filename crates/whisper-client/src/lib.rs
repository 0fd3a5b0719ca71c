//! Room session core for Whisper Rooms.
//!
//! Pure state machines for the active chat view: the message feed, the
//! presence-derived typing tracker, the composer, and the
//! [`RoomSession`] controller that orchestrates them. No I/O happens here -
//! the session consumes [`SessionEvent`] inputs and produces
//! [`SessionAction`] instructions for a runtime to execute, which keeps the
//! whole room lifecycle deterministic under test.

mod composer;
mod event;
mod feed;
mod presence;
mod session;

pub use composer::{Composer, TYPING_IDLE, TypingSignal};
pub use event::{FileUpload, MediaUpload, SessionAction, SessionEvent};
pub use feed::MessageFeed;
pub use presence::PresenceTracker;
pub use session::RoomSession;
