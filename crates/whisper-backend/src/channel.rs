//! Per-connection realtime channel.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;
use whisper_core::backend::{ChannelEvent, RoomChannel};
use whisper_core::{BackendError, PresenceState, RoomId};

use crate::store::Inner;

/// One subscription to a room's bus.
///
/// Delivery starts with an `Attached` marker and the current presence
/// snapshot, then streams whatever the bus commits. Closing (or dropping)
/// untracks this connection's presence entry, which re-snapshots everyone
/// else - a leaked channel would leave a phantom entry behind, so the
/// frontend closes explicitly on room exit.
pub(crate) struct LocalChannel {
    inner: Arc<Inner>,
    room_id: RoomId,
    conn_id: u64,
    receiver: broadcast::Receiver<ChannelEvent>,
    /// Events delivered before anything from the bus.
    pending: VecDeque<ChannelEvent>,
    closed: bool,
}

impl LocalChannel {
    pub(crate) fn new(
        inner: Arc<Inner>,
        room_id: RoomId,
        conn_id: u64,
        receiver: broadcast::Receiver<ChannelEvent>,
        presence_snapshot: Vec<PresenceState>,
    ) -> Self {
        let pending =
            VecDeque::from([ChannelEvent::Attached, ChannelEvent::PresenceSync(presence_snapshot)]);
        Self { inner, room_id, conn_id, receiver, pending, closed: false }
    }
}

#[async_trait]
impl RoomChannel for LocalChannel {
    async fn recv(&mut self) -> Option<ChannelEvent> {
        if let Some(event) = self.pending.pop_front() {
            return Some(event);
        }
        if self.closed {
            return None;
        }

        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(room = %self.room_id, skipped, "channel lagged, events dropped");
                },
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    async fn track(&self, state: PresenceState) -> Result<(), BackendError> {
        if self.closed {
            return Err(BackendError::request("channel closed"));
        }
        self.inner.track(self.room_id, self.conn_id, state);
        Ok(())
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.inner.untrack(self.room_id, self.conn_id);
        }
    }
}

impl Drop for LocalChannel {
    fn drop(&mut self) {
        // Best-effort cleanup if the frontend forgot to close
        self.close();
    }
}
