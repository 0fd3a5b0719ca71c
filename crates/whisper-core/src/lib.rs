//! Core domain model for Whisper Rooms.
//!
//! This crate defines the data that flows through the system (rooms, messages,
//! presence, the authenticated session) and the contracts for the external
//! collaborators that own persistence, authentication, object storage, and
//! realtime fan-out. Nothing in here performs I/O; the traits in [`backend`]
//! are implemented elsewhere.

pub mod avatar;
pub mod backend;
pub mod env;
mod error;
mod identity;
mod message;
mod presence;
mod room;

pub use error::BackendError;
pub use identity::{Session, UserId};
pub use message::{MediaKind, Message, MessageBody, MessageId, NewMessage};
pub use presence::PresenceState;
pub use room::{NewRoom, Room, RoomId};
