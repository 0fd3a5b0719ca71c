//! Messages: immutable rows ordered by creation time within a room.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identity::UserId;
use crate::room::RoomId;

/// Stable identifier for a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub Uuid);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Media category, derived from the file's declared media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Still image.
    Image,
    /// Video clip.
    Video,
}

impl MediaKind {
    /// Derive the kind from a declared media type. The picker only offers
    /// images and videos, so anything without an `image/` prefix is video.
    pub fn from_media_type(media_type: &str) -> Self {
        if media_type.starts_with("image/") { Self::Image } else { Self::Video }
    }

    /// Lowercase label used in notices ("image uploaded").
    pub fn label(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}

/// Message payload variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageBody {
    /// Plain text.
    Text {
        /// The text content.
        content: String,
    },
    /// Reference to an externally stored image or video.
    Media {
        /// Image or video.
        kind: MediaKind,
        /// Public retrieval URL resolved from object storage.
        url: String,
        /// Original file name, shown as the message content.
        file_name: String,
    },
}

/// A persisted message. Immutable once stored; there is no deletion path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message id, assigned by the store.
    pub id: MessageId,
    /// Parent room.
    pub room_id: RoomId,
    /// Sender's stable id.
    pub sender_id: UserId,
    /// Sender's display label.
    pub sender_email: String,
    /// Creation time, assigned by the store. Feed order is ascending on
    /// this field.
    pub created_at: DateTime<Utc>,
    /// Payload.
    pub body: MessageBody,
}

/// Fields the caller supplies on insert; the store assigns id and timestamp
/// and echoes the committed row back on the room's realtime channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    /// Parent room.
    pub room_id: RoomId,
    /// Sender's stable id.
    pub sender_id: UserId,
    /// Sender's display label.
    pub sender_email: String,
    /// Payload.
    pub body: MessageBody,
}
