//! Property-based tests for the App state machine.
//!
//! Tests verify that invariants hold under arbitrary event sequences.

use chrono::{DateTime, Utc};
use proptest::prelude::*;
use uuid::Uuid;
use whisper_app::{App, AppEvent, Screen};
use whisper_core::env::{SimEnv, SimInstant};
use whisper_core::{Room, RoomId, Session, UserId};

fn room_strategy() -> impl Strategy<Value = Room> {
    (any::<u128>(), any::<u128>(), "[a-z]{1,8}", 0u32..12, 0i64..1_000_000).prop_map(
        |(id, owner, name, member_count, secs)| Room {
            id: RoomId(Uuid::from_u128(id)),
            name,
            password: "p".into(),
            owner: UserId(Uuid::from_u128(owner)),
            member_count,
            created_at: DateTime::<Utc>::from_timestamp(secs, 0).unwrap_or(DateTime::UNIX_EPOCH),
        },
    )
}

/// Generate random app events (everything except ticks, which need a real
/// clock).
fn event_strategy() -> impl Strategy<Value = AppEvent<SimInstant>> {
    prop_oneof![
        1 => (1u16..200, 1u16..100).prop_map(|(c, r)| AppEvent::Resize(c, r)),
        2 => any::<u128>().prop_map(|id| {
            AppEvent::SignedIn(Session::new(UserId(Uuid::from_u128(id)), "actor@x.com"))
        }),
        1 => Just(AppEvent::SignedOut),
        2 => prop::collection::vec(room_strategy(), 0..5).prop_map(AppEvent::RoomsLoaded),
        1 => any::<u128>().prop_map(|id| AppEvent::RoomDeleted(RoomId(Uuid::from_u128(id)))),
        2 => any::<u128>().prop_map(|id| AppEvent::JoinVerified(RoomId(Uuid::from_u128(id)))),
        1 => "[a-z ]{0,20}".prop_map(|message| AppEvent::Error { message }),
        1 => "[a-z ]{0,20}".prop_map(|message| AppEvent::Info { message }),
    ]
}

proptest! {
    #[test]
    fn prop_app_invariants_hold(events in prop::collection::vec(event_strategy(), 0..50)) {
        let mut app = App::new(SimEnv::with_seed(42));

        for event in events {
            let _ = app.handle(event);

            // The chat view always has an actor behind it
            if app.screen() == Screen::Chat {
                prop_assert!(app.session().is_some());
                prop_assert!(app.chat().is_some());
            }
            // A signed-out app is always back on the auth screen
            if app.session().is_none() {
                prop_assert_eq!(app.screen(), Screen::Auth);
                prop_assert!(app.chat().is_none());
            }
        }
    }

    #[test]
    fn prop_error_notices_never_break_interactivity(
        messages in prop::collection::vec("[a-z ]{1,20}", 1..20),
    ) {
        let mut app: App<SimEnv> = App::new(SimEnv::with_seed(7));
        let _ = app.handle(AppEvent::SignedIn(Session::new(
            UserId(Uuid::from_u128(1)),
            "actor@x.com",
        )));

        for message in messages {
            let _ = app.handle(AppEvent::Error { message: message.clone() });
            prop_assert_eq!(app.status_message(), Some(message.as_str()));
            // Still in a usable state: a refresh produces work
            prop_assert!(!app.refresh_rooms().is_empty());
        }
    }
}
