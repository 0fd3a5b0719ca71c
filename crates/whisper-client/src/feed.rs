//! Message feed store.
//!
//! The ordered sequence of messages for one room. Two mutation sources:
//! a bulk replace when the history query lands, and single-item appends as
//! realtime inserts arrive.

use whisper_core::Message;

/// In-memory ordered message list for the active room.
///
/// Inserts arrive in commit order from a single upstream feed, so a tail
/// append preserves ascending creation-time order. There is no dedup or
/// reorder safeguard against transport redelivery, and no removal.
#[derive(Debug, Clone, Default)]
pub struct MessageFeed {
    messages: Vec<Message>,
}

impl MessageFeed {
    /// Create an empty feed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole feed with a pre-sorted history snapshot.
    pub fn replace(&mut self, history: Vec<Message>) {
        self.messages = history;
    }

    /// Append one realtime insert at the tail.
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// The current ordered sequence.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages in the feed.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the feed is empty.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
