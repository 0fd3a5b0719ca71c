//! Presence-derived typing tracker.
//!
//! Maps online participants to a transient typing flag. The map is rebuilt
//! wholesale on every presence-sync event (snapshot semantics, not
//! incremental), and a participant's typing flag is force-cleared whenever a
//! message from them lands - the message itself is stronger evidence than
//! any typing broadcast, whichever order the two arrive in.

use whisper_core::PresenceState;

/// Typing state for the active room's participants.
#[derive(Debug, Clone, Default)]
pub struct PresenceTracker {
    participants: Vec<PresenceState>,
}

impl PresenceTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all known participant state with the latest snapshot.
    pub fn sync(&mut self, snapshot: Vec<PresenceState>) {
        self.participants = snapshot;
    }

    /// Clear the typing flag for a sender whose message just arrived.
    pub fn clear_typing(&mut self, email: &str) {
        for entry in self.participants.iter_mut().filter(|p| p.email == email) {
            entry.typing = false;
        }
    }

    /// All currently known participants.
    pub fn participants(&self) -> &[PresenceState] {
        &self.participants
    }

    /// Labels of participants other than `own_email` that are typing.
    pub fn typing_others(&self, own_email: &str) -> Vec<&str> {
        self.participants
            .iter()
            .filter(|p| p.typing && p.email != own_email)
            .map(|p| p.email.as_str())
            .collect()
    }

    /// Number of connected participants.
    pub fn online_count(&self) -> usize {
        self.participants.len()
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use super::*;

    fn entry(email: &str, typing: bool) -> PresenceState {
        PresenceState { email: email.into(), typing, online_at: DateTime::UNIX_EPOCH }
    }

    #[test]
    fn sync_replaces_wholesale() {
        let mut tracker = PresenceTracker::new();
        tracker.sync(vec![entry("alice@x.com", true), entry("bob@x.com", false)]);
        tracker.sync(vec![entry("bob@x.com", true)]);

        assert_eq!(tracker.online_count(), 1);
        assert_eq!(tracker.typing_others("alice@x.com"), ["bob@x.com"]);
    }

    #[test]
    fn message_arrival_clears_typing() {
        let mut tracker = PresenceTracker::new();
        tracker.sync(vec![entry("alice@x.com", true), entry("bob@x.com", true)]);

        tracker.clear_typing("bob@x.com");

        assert_eq!(tracker.typing_others("carol@x.com"), ["alice@x.com"]);
    }

    #[test]
    fn clear_typing_for_unknown_sender_is_a_no_op() {
        let mut tracker = PresenceTracker::new();
        tracker.sync(vec![entry("alice@x.com", true)]);

        tracker.clear_typing("nobody@x.com");

        assert_eq!(tracker.typing_others(""), ["alice@x.com"]);
    }

    #[test]
    fn typing_others_excludes_self() {
        let mut tracker = PresenceTracker::new();
        tracker.sync(vec![entry("alice@x.com", true), entry("bob@x.com", true)]);

        assert_eq!(tracker.typing_others("alice@x.com"), ["bob@x.com"]);
    }
}
