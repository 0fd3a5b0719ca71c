//! In-memory tables and the collaborator trait implementations.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use tokio::sync::broadcast;
use uuid::Uuid;
use whisper_core::backend::{
    Authenticator, ChannelEvent, Directory, MediaStore, Realtime, RoomChannel,
};
use whisper_core::{
    BackendError, Message, MessageId, NewMessage, NewRoom, PresenceState, Room, RoomId, Session,
    UserId,
};

use crate::LocalChannel;

/// Broadcast buffer per room bus. A slow consumer past this lags and drops
/// the oldest events rather than blocking the writer.
const BUS_CAPACITY: usize = 64;

/// Minimum account password length accepted on sign-up.
const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone)]
struct Account {
    user_id: UserId,
    password: String,
}

#[derive(Debug, Clone)]
struct StoredObject {
    content_type: String,
    bytes: Vec<u8>,
}

#[derive(Default)]
struct State {
    /// Accounts keyed by email.
    accounts: HashMap<String, Account>,
    rooms: Vec<Room>,
    messages: Vec<Message>,
    objects: HashMap<String, StoredObject>,
    /// Per-room presence registry keyed by connection id.
    presence: HashMap<RoomId, BTreeMap<u64, PresenceState>>,
}

pub(crate) struct Inner {
    state: RwLock<State>,
    /// Per-room realtime buses, created lazily on first use.
    buses: RwLock<HashMap<RoomId, broadcast::Sender<ChannelEvent>>>,
    next_conn: AtomicU64,
    base_url: String,
}

impl Inner {
    fn bus(&self, room_id: RoomId) -> broadcast::Sender<ChannelEvent> {
        let mut buses = self.buses.write();
        buses.entry(room_id).or_insert_with(|| broadcast::channel(BUS_CAPACITY).0).clone()
    }

    pub(crate) fn broadcast(&self, room_id: RoomId, event: ChannelEvent) {
        // A send error just means nobody is subscribed right now
        let _ = self.bus(room_id).send(event);
    }

    fn presence_snapshot(&self, room_id: RoomId) -> Vec<PresenceState> {
        let state = self.state.read();
        state
            .presence
            .get(&room_id)
            .map(|entries| entries.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Record a connection's presence state and push a fresh snapshot to
    /// every subscriber.
    pub(crate) fn track(&self, room_id: RoomId, conn_id: u64, presence: PresenceState) {
        {
            let mut state = self.state.write();
            state.presence.entry(room_id).or_default().insert(conn_id, presence);
        }
        let snapshot = self.presence_snapshot(room_id);
        self.broadcast(room_id, ChannelEvent::PresenceSync(snapshot));
    }

    /// Drop a connection's presence entry and push a fresh snapshot.
    pub(crate) fn untrack(&self, room_id: RoomId, conn_id: u64) {
        let removed = {
            let mut state = self.state.write();
            state
                .presence
                .get_mut(&room_id)
                .and_then(|entries| entries.remove(&conn_id))
                .is_some()
        };
        if removed {
            let snapshot = self.presence_snapshot(room_id);
            self.broadcast(room_id, ChannelEvent::PresenceSync(snapshot));
        }
    }
}

/// In-process backend: every collaborator contract, no network.
///
/// Cloning is cheap and shares the same tables, so the frontend and any
/// number of test actors can point at one instance.
#[derive(Clone)]
pub struct LocalBackend {
    inner: Arc<Inner>,
}

impl Default for LocalBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                state: RwLock::new(State::default()),
                buses: RwLock::new(HashMap::new()),
                next_conn: AtomicU64::new(1),
                base_url: "local://chat_media".to_owned(),
            }),
        }
    }

    /// Whether an object is stored at the given path. Test inspection.
    pub fn has_object(&self, path: &str) -> bool {
        self.inner.state.read().objects.contains_key(path)
    }

    /// Stored content type for an object path, if present. Test inspection.
    pub fn object_content_type(&self, path: &str) -> Option<String> {
        self.inner.state.read().objects.get(path).map(|o| o.content_type.clone())
    }
}

#[async_trait]
impl Authenticator for LocalBackend {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, BackendError> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(BackendError::validation("enter a valid email address"));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(BackendError::validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let mut state = self.inner.state.write();
        if state.accounts.contains_key(&email) {
            return Err(BackendError::validation("an account with this email already exists"));
        }

        let user_id = UserId(Uuid::new_v4());
        state
            .accounts
            .insert(email.clone(), Account { user_id, password: password.to_owned() });
        tracing::info!(%email, "account created");
        Ok(Session::new(user_id, email))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, BackendError> {
        let email = email.trim().to_lowercase();
        let state = self.inner.state.read();
        match state.accounts.get(&email) {
            Some(account) if account.password == password => {
                Ok(Session::new(account.user_id, email))
            },
            _ => Err(BackendError::Forbidden("invalid login credentials".into())),
        }
    }

    async fn sign_out(&self, session: &Session) -> Result<(), BackendError> {
        tracing::info!(email = %session.email, "signed out");
        Ok(())
    }
}

#[async_trait]
impl Directory for LocalBackend {
    async fn room(&self, id: RoomId) -> Result<Room, BackendError> {
        self.inner
            .state
            .read()
            .rooms
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(BackendError::NotFound("room"))
    }

    async fn rooms(&self) -> Result<Vec<Room>, BackendError> {
        let mut rooms = self.inner.state.read().rooms.clone();
        rooms.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rooms)
    }

    async fn create_room(&self, room: NewRoom, actor: &Session) -> Result<Room, BackendError> {
        let created = Room {
            id: RoomId(Uuid::new_v4()),
            name: room.name,
            password: room.password,
            owner: actor.user_id,
            member_count: 1,
            created_at: Utc::now(),
        };
        self.inner.state.write().rooms.push(created.clone());
        tracing::info!(room = %created.id, name = %created.name, "room created");
        Ok(created)
    }

    async fn delete_room(&self, id: RoomId, actor: &Session) -> Result<(), BackendError> {
        {
            let mut state = self.inner.state.write();
            let room = state
                .rooms
                .iter()
                .find(|r| r.id == id)
                .ok_or(BackendError::NotFound("room"))?;
            if room.owner != actor.user_id {
                return Err(BackendError::Forbidden("only the owner can delete a room".into()));
            }

            state.rooms.retain(|r| r.id != id);
            state.messages.retain(|m| m.room_id != id);
            state.presence.remove(&id);
        }

        // Dropping the bus closes every live subscription to this room
        self.inner.buses.write().remove(&id);
        tracing::info!(room = %id, "room deleted");
        Ok(())
    }

    async fn messages(&self, room_id: RoomId) -> Result<Vec<Message>, BackendError> {
        let mut rows: Vec<Message> = self
            .inner
            .state
            .read()
            .messages
            .iter()
            .filter(|m| m.room_id == room_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(rows)
    }

    async fn insert_message(&self, message: NewMessage) -> Result<Message, BackendError> {
        let committed = {
            let mut state = self.inner.state.write();
            if !state.rooms.iter().any(|r| r.id == message.room_id) {
                return Err(BackendError::NotFound("room"));
            }

            let committed = Message {
                id: MessageId(Uuid::new_v4()),
                room_id: message.room_id,
                sender_id: message.sender_id,
                sender_email: message.sender_email,
                created_at: Utc::now(),
                body: message.body,
            };
            state.messages.push(committed.clone());
            committed
        };

        // Echo the committed row in commit order; the writer sees its own
        // message only through this echo
        self.inner.broadcast(committed.room_id, ChannelEvent::MessageInserted(committed.clone()));
        Ok(committed)
    }
}

#[async_trait]
impl MediaStore for LocalBackend {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BackendError> {
        if path.is_empty() {
            return Err(BackendError::validation("empty object path"));
        }
        let object = StoredObject { content_type: content_type.to_owned(), bytes };
        self.inner.state.write().objects.insert(path.to_owned(), object);
        tracing::debug!(path, "object stored");
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{path}", self.inner.base_url)
    }
}

#[async_trait]
impl Realtime for LocalBackend {
    async fn attach(&self, room_id: RoomId) -> Result<Box<dyn RoomChannel>, BackendError> {
        if !self.inner.state.read().rooms.iter().any(|r| r.id == room_id) {
            return Err(BackendError::NotFound("room"));
        }

        let receiver = self.inner.bus(room_id).subscribe();
        let conn_id = self.inner.next_conn.fetch_add(1, Ordering::Relaxed);
        let snapshot = self.inner.presence_snapshot(room_id);
        Ok(Box::new(LocalChannel::new(
            Arc::clone(&self.inner),
            room_id,
            conn_id,
            receiver,
            snapshot,
        )))
    }
}
