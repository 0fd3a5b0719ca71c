//! Rooms: named, password-gated chat channels with a capacity limit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identity::{Session, UserId};

/// Stable identifier for a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomId(pub Uuid);

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A chat room row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Room id, assigned by the store.
    pub id: RoomId,
    /// Display name.
    pub name: String,
    /// Shared secret gating entry. Stored and compared in plain form.
    pub password: String,
    /// The actor that created the room.
    pub owner: UserId,
    /// Advisory participant count. Not transactionally enforced against
    /// concurrent joins.
    pub member_count: u32,
    /// Creation time, assigned by the store.
    pub created_at: DateTime<Utc>,
}

impl Room {
    /// Capacity limit past which the join control is withheld.
    pub const MAX_MEMBERS: u32 = 10;

    /// Whether the room is at capacity.
    pub fn is_full(&self) -> bool {
        self.member_count >= Self::MAX_MEMBERS
    }

    /// Compare a supplied secret against the room's join gate.
    pub fn verify_password(&self, supplied: &str) -> bool {
        self.password == supplied
    }

    /// Whether the given actor created this room.
    pub fn is_owner(&self, session: &Session) -> bool {
        self.owner == session.user_id
    }
}

/// Fields the caller supplies when creating a room; the store assigns the
/// rest and makes the actor the owner with a member count of 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRoom {
    /// Display name.
    pub name: String,
    /// Join gate.
    pub password: String,
}
