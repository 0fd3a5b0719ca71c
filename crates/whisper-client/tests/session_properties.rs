//! Property-based tests for the room session state machine.
//!
//! Tests verify the feed, tracker, and composer invariants under arbitrary
//! event sequences.

use chrono::{DateTime, Utc};
use proptest::prelude::*;
use uuid::Uuid;
use whisper_client::{
    Composer, MessageFeed, PresenceTracker, RoomSession, SessionAction, SessionEvent, TypingSignal,
};
use whisper_core::env::SimEnv;
use whisper_core::{Message, MessageBody, MessageId, PresenceState, RoomId, Session, UserId};

fn message(room_id: RoomId, secs: i64, sender: &str) -> Message {
    Message {
        id: MessageId(Uuid::new_v4()),
        room_id,
        sender_id: UserId(Uuid::new_v4()),
        sender_email: sender.into(),
        created_at: DateTime::<Utc>::from_timestamp(secs, 0).unwrap(),
        body: MessageBody::Text { content: format!("m{secs}") },
    }
}

fn entry(email: &str, typing: bool) -> PresenceState {
    PresenceState { email: email.into(), typing, online_at: DateTime::UNIX_EPOCH }
}

/// Generate small participant snapshots.
fn snapshot_strategy() -> impl Strategy<Value = Vec<PresenceState>> {
    prop::collection::vec(("[a-d]", any::<bool>()), 0..5)
        .prop_map(|entries| entries.into_iter().map(|(e, t)| entry(&e, t)).collect())
}

proptest! {
    #[test]
    fn prop_feed_is_history_then_arrivals(
        history_len in 0usize..20,
        arrivals in 0usize..20,
    ) {
        let room_id = RoomId(Uuid::new_v4());
        let mut feed = MessageFeed::new();

        let history: Vec<_> =
            (0..history_len).map(|i| message(room_id, i as i64, "a@x.com")).collect();
        feed.replace(history.clone());

        let late: Vec<_> = (0..arrivals)
            .map(|i| message(room_id, (history_len + i) as i64, "b@x.com"))
            .collect();
        for m in &late {
            feed.append(m.clone());
        }

        // Rendered feed equals H followed by E1..En in arrival order
        prop_assert_eq!(feed.len(), history_len + arrivals);
        prop_assert_eq!(&feed.messages()[..history_len], &history[..]);
        prop_assert_eq!(&feed.messages()[history_len..], &late[..]);
    }

    #[test]
    fn prop_tracker_state_is_a_function_of_the_latest_snapshot(
        earlier in prop::collection::vec(snapshot_strategy(), 0..4),
        latest in snapshot_strategy(),
    ) {
        let mut with_history = PresenceTracker::new();
        for snapshot in earlier {
            with_history.sync(snapshot);
        }
        with_history.sync(latest.clone());

        let mut fresh = PresenceTracker::new();
        fresh.sync(latest);

        prop_assert_eq!(with_history.participants(), fresh.participants());
    }

    #[test]
    fn prop_insert_clears_sender_typing_regardless_of_prior_state(
        snapshot in snapshot_strategy(),
        sender in "[a-d]",
    ) {
        let env = SimEnv::with_seed(7);
        let actor = Session::new(UserId(Uuid::new_v4()), "self@x.com");
        let room_id = RoomId(Uuid::new_v4());
        let mut session = RoomSession::new(env, actor, room_id);

        session.handle(SessionEvent::PresenceSynced(snapshot));
        session.handle(SessionEvent::MessageInserted(message(room_id, 1, &sender)));

        prop_assert!(
            session.participants().iter().all(|p| !(p.email == sender && p.typing)),
            "sender still marked typing after its own message landed"
        );
    }

    #[test]
    fn prop_started_fires_at_most_once_per_transition(drafts in prop::collection::vec("[a-c]{0,4}", 1..30)) {
        let mut composer = Composer::new();
        let mut clock = 0u64;
        let mut was_empty = true;
        for draft in drafts {
            clock += 100;
            let signal = composer.set_draft(draft.clone(), Ms(clock));
            let is_empty = draft.is_empty();

            match signal {
                Some(TypingSignal::Started) => prop_assert!(was_empty && !is_empty),
                Some(TypingSignal::Stopped) => prop_assert!(is_empty),
                None => {},
            }
            was_empty = is_empty;
        }
    }

    #[test]
    fn prop_submit_produces_exactly_one_insert(content in "\\PC{1,40}") {
        prop_assume!(!content.trim().is_empty());

        let env = SimEnv::with_seed(3);
        let actor = Session::new(UserId(Uuid::new_v4()), "self@x.com");
        let mut session = RoomSession::new(env, actor, RoomId(Uuid::new_v4()));

        session.handle(SessionEvent::DraftChanged(content.clone()));
        let actions = session.handle(SessionEvent::Submit);

        let inserts: Vec<_> = actions
            .iter()
            .filter_map(|a| match a {
                SessionAction::InsertMessage(m) => Some(m),
                _ => None,
            })
            .collect();
        prop_assert_eq!(inserts.len(), 1);
        prop_assert_eq!(
            &inserts[0].body,
            &MessageBody::Text { content: content.trim().to_owned() }
        );
        prop_assert_eq!(session.draft(), "");
    }
}

/// Millisecond instants for driving the composer by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Ms(u64);

impl std::ops::Sub for Ms {
    type Output = std::time::Duration;
    fn sub(self, rhs: Self) -> std::time::Duration {
        std::time::Duration::from_millis(self.0 - rhs.0)
    }
}
