//! Contracts for the external collaborators.
//!
//! Authentication, row storage, object storage, and realtime fan-out are all
//! owned by an external platform; this module pins down exactly what the
//! client asks of each. No wire format is specified or owned here - these
//! traits are the whole boundary.

use async_trait::async_trait;

use crate::error::BackendError;
use crate::identity::Session;
use crate::message::{Message, NewMessage};
use crate::presence::PresenceState;
use crate::room::{NewRoom, Room, RoomId};

/// Events delivered on a room's realtime channel.
#[derive(Debug, Clone)]
pub enum ChannelEvent {
    /// The subscription is live. The subscriber publishes its initial
    /// presence record on receipt.
    Attached,
    /// A message row was committed to this room. Rows arrive in commit
    /// order.
    MessageInserted(Message),
    /// Full replace of all currently known participant states. Snapshot
    /// semantics: the receiver discards whatever it knew before.
    PresenceSync(Vec<PresenceState>),
}

/// Authentication service: supplies actor identity and session lifecycle.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Register a new account and sign it in.
    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, BackendError>;

    /// Sign in an existing account.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, BackendError>;

    /// Tear down the session.
    async fn sign_out(&self, session: &Session) -> Result<(), BackendError>;
}

/// Relational store: the `rooms` and `messages` collections.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Fetch one room by id.
    async fn room(&self, id: RoomId) -> Result<Room, BackendError>;

    /// All rooms, newest first.
    async fn rooms(&self) -> Result<Vec<Room>, BackendError>;

    /// Create a room. The actor becomes the owner and its only member.
    async fn create_room(&self, room: NewRoom, actor: &Session) -> Result<Room, BackendError>;

    /// Delete a room. Owner only.
    async fn delete_room(&self, id: RoomId, actor: &Session) -> Result<(), BackendError>;

    /// Full message history for a room, ascending by creation time. A
    /// single snapshot: rows committed after this query arrive only via the
    /// realtime channel.
    async fn messages(&self, room_id: RoomId) -> Result<Vec<Message>, BackendError>;

    /// Insert a message. The store assigns id and timestamp, commits, and
    /// echoes the committed row to the room's channel - the caller sees its
    /// own message only through that echo.
    async fn insert_message(&self, message: NewMessage) -> Result<Message, BackendError>;
}

/// Object storage: a single bucket namespaced by room id.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store bytes at the given path.
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BackendError>;

    /// Resolve the public retrieval URL for a path. Pure address
    /// construction; does not verify the object exists.
    fn public_url(&self, path: &str) -> String;
}

/// A live subscription to one room's events.
///
/// Must be explicitly closed when leaving the room; a leaked channel keeps a
/// phantom presence entry visible to everyone else.
#[async_trait]
pub trait RoomChannel: Send {
    /// Next event, or `None` once the channel is closed.
    async fn recv(&mut self) -> Option<ChannelEvent>;

    /// Publish this connection's presence state. Replaces any previous
    /// state for the same connection and triggers a fresh snapshot to every
    /// subscriber.
    async fn track(&self, state: PresenceState) -> Result<(), BackendError>;

    /// Close the subscription and untrack this connection's presence.
    fn close(&mut self);
}

/// Realtime service: opens one channel per room.
#[async_trait]
pub trait Realtime: Send + Sync {
    /// Open a channel scoped to the given room.
    async fn attach(&self, room_id: RoomId) -> Result<Box<dyn RoomChannel>, BackendError>;
}

/// Everything a frontend needs, as one object-safe bundle.
pub trait Backend: Authenticator + Directory + MediaStore + Realtime {}

impl<T: Authenticator + Directory + MediaStore + Realtime> Backend for T {}
