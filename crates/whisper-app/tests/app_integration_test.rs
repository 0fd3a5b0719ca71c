//! End-to-end tests: App + Bridge driving the in-process backend.
//!
//! Each "actor" is an App/Bridge pair sharing one backend, which exercises
//! the full round trip: intent, request, realtime echo, rendered state.

use std::sync::Arc;
use std::time::Duration;

use whisper_app::{App, AppAction, AppEvent, Bridge, Screen};
use whisper_backend::LocalBackend;
use whisper_client::{FileUpload, SessionEvent};
use whisper_core::env::SimEnv;
use whisper_core::{MediaKind, MessageBody, Room};

struct Actor {
    app: App<SimEnv>,
    bridge: Bridge<SimEnv>,
}

impl Actor {
    fn new(backend: &LocalBackend, seed: u64) -> Self {
        let env = SimEnv::with_seed(seed);
        Self {
            app: App::new(env.clone()),
            bridge: Bridge::new(Arc::new(backend.clone()), env),
        }
    }

    async fn sign_up(&mut self, email: &str) {
        let actions = self.app.sign_up(email, "secret123");
        self.drive(actions).await;
        assert_eq!(self.app.screen(), Screen::Lobby, "sign-up should land in the lobby");
    }

    /// Execute actions through the bridge, feeding completions back into the
    /// app until it goes quiet.
    async fn drive(&mut self, actions: Vec<AppAction>) {
        let mut pending = actions;
        while !pending.is_empty() {
            for action in std::mem::take(&mut pending) {
                if matches!(action, AppAction::Render | AppAction::Quit) {
                    continue;
                }
                for event in self.bridge.execute(action).await {
                    pending.extend(self.app.handle(event));
                }
            }
        }
    }

    /// Drain whatever the realtime channel currently has buffered.
    async fn pump(&mut self) {
        while self.bridge.has_channel() {
            match tokio::time::timeout(
                Duration::from_millis(50),
                self.bridge.next_channel_event(),
            )
            .await
            {
                Ok(Some(event)) => {
                    let actions = self.app.handle(Bridge::<SimEnv>::channel_event(event));
                    self.drive(actions).await;
                },
                Ok(None) => {
                    self.bridge.drop_channel();
                },
                Err(_) => break,
            }
        }
    }

    async fn create_room(&mut self, name: &str, password: &str) -> Room {
        let actions = self.app.create_room(name, password);
        self.drive(actions).await;
        self.app
            .rooms()
            .iter()
            .find(|r| r.name == name)
            .cloned()
            .unwrap_or_else(|| panic!("room {name} missing after create"))
    }

    async fn enter_room(&mut self, room: &Room, password: &str) {
        let actions = self.app.join_room(room.id, password);
        self.drive(actions).await;
        self.pump().await;
    }
}

#[tokio::test]
async fn create_then_join_with_correct_password() {
    let backend = LocalBackend::new();
    let mut alice = Actor::new(&backend, 1);
    let mut bob = Actor::new(&backend, 2);

    alice.sign_up("alice@x.com").await;
    let room = alice.create_room("Study", "p1").await;

    bob.sign_up("bob@x.com").await;
    let refresh = bob.app.refresh_rooms();
    bob.drive(refresh).await;

    bob.enter_room(&room, "p1").await;

    assert_eq!(bob.app.screen(), Screen::Chat);
    let chat = bob.app.chat().expect("chat session");
    assert!(chat.is_attached());
    assert_eq!(chat.room().map(|r| r.name.as_str()), Some("Study"));
}

#[tokio::test]
async fn wrong_password_is_rejected_without_navigation() {
    let backend = LocalBackend::new();
    let mut alice = Actor::new(&backend, 1);
    let mut bob = Actor::new(&backend, 2);

    alice.sign_up("alice@x.com").await;
    let room = alice.create_room("Study", "p1").await;

    bob.sign_up("bob@x.com").await;
    let refresh = bob.app.refresh_rooms();
    bob.drive(refresh).await;

    let actions = bob.app.join_room(room.id, "p2");
    bob.drive(actions).await;

    assert_eq!(bob.app.screen(), Screen::Lobby, "rejected join must not navigate");
    assert_eq!(bob.app.status_message(), Some("Incorrect password"));
}

#[tokio::test]
async fn sent_message_appears_only_via_the_echo() {
    let backend = LocalBackend::new();
    let mut alice = Actor::new(&backend, 1);

    alice.sign_up("alice@x.com").await;
    let room = alice.create_room("Study", "p1").await;
    alice.enter_room(&room, "p1").await;

    let actions = alice.app.handle(AppEvent::Session(SessionEvent::DraftChanged("hi all".into())));
    alice.drive(actions).await;
    let actions = alice.app.handle(AppEvent::Session(SessionEvent::Submit));
    alice.drive(actions).await;

    // No optimistic insert: the draft is gone but the feed is still empty
    let chat = alice.app.chat().expect("chat session");
    assert_eq!(chat.draft(), "");
    assert!(chat.messages().is_empty());

    alice.pump().await;

    let chat = alice.app.chat().expect("chat session");
    assert_eq!(chat.messages().len(), 1);
    assert_eq!(chat.messages()[0].body, MessageBody::Text { content: "hi all".into() });
}

#[tokio::test]
async fn history_loads_before_realtime_arrivals() {
    let backend = LocalBackend::new();
    let mut alice = Actor::new(&backend, 1);
    let mut bob = Actor::new(&backend, 2);

    alice.sign_up("alice@x.com").await;
    let room = alice.create_room("Study", "p1").await;
    alice.enter_room(&room, "p1").await;

    for text in ["one", "two"] {
        let actions =
            alice.app.handle(AppEvent::Session(SessionEvent::DraftChanged(text.into())));
        alice.drive(actions).await;
        let actions = alice.app.handle(AppEvent::Session(SessionEvent::Submit));
        alice.drive(actions).await;
    }
    alice.pump().await;

    // Bob cold-starts after the first two messages exist
    bob.sign_up("bob@x.com").await;
    let refresh = bob.app.refresh_rooms();
    bob.drive(refresh).await;
    bob.enter_room(&room, "p1").await;

    let texts = |app: &App<SimEnv>| -> Vec<String> {
        app.chat()
            .map(|c| {
                c.messages()
                    .iter()
                    .map(|m| match &m.body {
                        MessageBody::Text { content } => content.clone(),
                        MessageBody::Media { file_name, .. } => file_name.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    };
    assert_eq!(texts(&bob.app), ["one", "two"]);

    // A third message arrives live and lands after the history
    let actions = alice.app.handle(AppEvent::Session(SessionEvent::DraftChanged("three".into())));
    alice.drive(actions).await;
    let actions = alice.app.handle(AppEvent::Session(SessionEvent::Submit));
    alice.drive(actions).await;
    bob.pump().await;

    assert_eq!(texts(&bob.app), ["one", "two", "three"]);
}

#[tokio::test]
async fn typing_indicator_tracks_edges_and_clears_on_message() {
    let backend = LocalBackend::new();
    let mut alice = Actor::new(&backend, 1);
    let mut bob = Actor::new(&backend, 2);

    alice.sign_up("alice@x.com").await;
    let room = alice.create_room("Study", "p1").await;
    alice.enter_room(&room, "p1").await;

    bob.sign_up("bob@x.com").await;
    let refresh = bob.app.refresh_rooms();
    bob.drive(refresh).await;
    bob.enter_room(&room, "p1").await;
    alice.pump().await;

    // Bob starts typing; alice sees it
    let actions = bob.app.handle(AppEvent::Session(SessionEvent::DraftChanged("h".into())));
    bob.drive(actions).await;
    alice.pump().await;
    let chat = alice.app.chat().expect("chat session");
    assert_eq!(chat.typing_others(), ["bob@x.com"]);

    // Bob sends; the message arrival clears the flag on alice's side
    let actions = bob.app.handle(AppEvent::Session(SessionEvent::Submit));
    bob.drive(actions).await;
    alice.pump().await;
    let chat = alice.app.chat().expect("chat session");
    assert!(chat.typing_others().is_empty());
    assert_eq!(chat.messages().len(), 1);
}

#[tokio::test]
async fn upload_produces_room_scoped_object_and_image_message() {
    let backend = LocalBackend::new();
    let mut alice = Actor::new(&backend, 1);

    alice.sign_up("alice@x.com").await;
    let room = alice.create_room("r1", "p1").await;
    alice.enter_room(&room, "p1").await;

    let file = FileUpload {
        name: "cat.png".into(),
        media_type: "image/png".into(),
        data: vec![0xCA; 32],
    };
    let actions = alice.app.handle(AppEvent::Session(SessionEvent::FileSelected(file)));
    alice.drive(actions).await;
    alice.pump().await;

    let chat = alice.app.chat().expect("chat session");
    assert_eq!(chat.messages().len(), 1);
    let MessageBody::Media { kind, url, file_name } = &chat.messages()[0].body else {
        panic!("expected a media message");
    };
    assert_eq!(*kind, MediaKind::Image);
    assert_eq!(file_name, "cat.png");
    assert!(url.starts_with(&format!("local://chat_media/{}/", room.id)));
    assert!(url.ends_with(".png"));

    // The stored object sits under the room prefix with the new name
    let path = url.trim_start_matches("local://chat_media/");
    assert!(backend.has_object(path));
    assert!(!chat.is_uploading(), "upload flag should clear once settled");
}

#[tokio::test]
async fn leaving_the_room_removes_the_presence_entry() {
    let backend = LocalBackend::new();
    let mut alice = Actor::new(&backend, 1);
    let mut bob = Actor::new(&backend, 2);

    alice.sign_up("alice@x.com").await;
    let room = alice.create_room("Study", "p1").await;
    alice.enter_room(&room, "p1").await;

    bob.sign_up("bob@x.com").await;
    let refresh = bob.app.refresh_rooms();
    bob.drive(refresh).await;
    bob.enter_room(&room, "p1").await;
    alice.pump().await;

    let chat = alice.app.chat().expect("chat session");
    assert_eq!(chat.participants().len(), 2);

    let actions = bob.app.leave_room();
    bob.drive(actions).await;
    alice.pump().await;

    assert_eq!(bob.app.screen(), Screen::Lobby);
    let chat = alice.app.chat().expect("chat session");
    assert_eq!(chat.participants().len(), 1, "bob's entry must vanish on close");
}
