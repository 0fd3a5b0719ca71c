//! Presence: transient per-connection state published on a room channel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The state blob a connected participant publishes on a room's presence
/// channel. Lifetime is bound to the channel connection; entries appear on
/// track and vanish on disconnect or untrack, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceState {
    /// Participant display label.
    pub email: String,
    /// Whether the participant is currently composing a message.
    pub typing: bool,
    /// When the participant came online.
    pub online_at: DateTime<Utc>,
}

impl PresenceState {
    /// Initial record published on channel attachment: online, not typing.
    pub fn online(email: impl Into<String>, online_at: DateTime<Utc>) -> Self {
        Self { email: email.into(), typing: false, online_at }
    }

    /// The same record with the typing flag replaced.
    pub fn with_typing(mut self, typing: bool) -> Self {
        self.typing = typing;
        self
    }
}
