//! Room session controller.
//!
//! Orchestrates one room visit: fetch metadata and history, open the one
//! realtime channel, stream inserts and presence snapshots into the feed and
//! tracker, and turn composer input into outbound writes. Pure state
//! machine; every side effect is returned as a [`SessionAction`].

use whisper_core::env::Environment;
use whisper_core::{
    MediaKind, Message, MessageBody, NewMessage, PresenceState, Room, RoomId, Session,
};

use crate::composer::{Composer, TypingSignal};
use crate::event::{FileUpload, MediaUpload, SessionAction, SessionEvent};
use crate::feed::MessageFeed;
use crate::presence::PresenceTracker;

/// State machine for the active room view.
///
/// Writes are fire-and-forget: a sent message shows up only when the store
/// echoes it back on the realtime channel. History is a single snapshot
/// taken before the channel attaches; rows committed in between can be
/// missed.
#[derive(Debug)]
pub struct RoomSession<E: Environment> {
    env: E,
    actor: Session,
    room_id: RoomId,
    room: Option<Room>,
    feed: MessageFeed,
    presence: PresenceTracker,
    composer: Composer<E::Instant>,
    attached: bool,
    uploading: bool,
}

impl<E: Environment> RoomSession<E> {
    /// Create a session for the given room on behalf of the actor.
    pub fn new(env: E, actor: Session, room_id: RoomId) -> Self {
        Self {
            env,
            actor,
            room_id,
            room: None,
            feed: MessageFeed::new(),
            presence: PresenceTracker::new(),
            composer: Composer::new(),
            attached: false,
            uploading: false,
        }
    }

    /// Actions to run on activation: fetch metadata and history once, then
    /// open exactly one channel scoped to this room.
    pub fn start(&self) -> Vec<SessionAction> {
        vec![
            SessionAction::FetchRoom(self.room_id),
            SessionAction::FetchHistory(self.room_id),
            SessionAction::AttachChannel(self.room_id),
        ]
    }

    /// Actions to run on deactivation. Closing the channel is mandatory:
    /// a leaked subscription keeps a phantom presence entry alive.
    pub fn close(&mut self) -> Vec<SessionAction> {
        self.composer.cancel();
        self.attached = false;
        vec![SessionAction::CloseChannel]
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: SessionEvent<E::Instant>) -> Vec<SessionAction> {
        match event {
            SessionEvent::RoomLoaded(room) => {
                self.room = Some(room);
                vec![SessionAction::Render]
            },
            SessionEvent::HistoryLoaded(history) => {
                self.feed.replace(history);
                vec![SessionAction::Render]
            },
            SessionEvent::Attached => {
                self.attached = true;
                // Publish the initial presence record: online, not typing.
                vec![SessionAction::Track { typing: false }, SessionAction::Render]
            },
            SessionEvent::MessageInserted(message) => self.on_insert(message),
            SessionEvent::PresenceSynced(snapshot) => {
                self.presence.sync(snapshot);
                vec![SessionAction::Render]
            },
            SessionEvent::DraftChanged(text) => {
                let signal = self.composer.set_draft(text, self.env.now());
                let mut actions = Self::track_actions(signal);
                actions.push(SessionAction::Render);
                actions
            },
            SessionEvent::Submit => self.on_submit(),
            SessionEvent::FileSelected(file) => self.on_file(file),
            SessionEvent::UploadFinished => {
                self.uploading = false;
                vec![SessionAction::Render]
            },
            SessionEvent::Tick { now } => Self::track_actions(self.composer.tick(now)),
        }
    }

    fn on_insert(&mut self, message: Message) -> Vec<SessionAction> {
        if message.room_id != self.room_id {
            tracing::debug!(room = %message.room_id, "ignoring insert for another room");
            return vec![];
        }

        // The message is the strongest possible "stopped typing" evidence,
        // regardless of whether the sender's own broadcast arrived first.
        self.presence.clear_typing(&message.sender_email);
        self.feed.append(message);
        vec![SessionAction::Render]
    }

    fn on_submit(&mut self) -> Vec<SessionAction> {
        if self.composer.draft().trim().is_empty() {
            return vec![];
        }

        let (draft, signal) = self.composer.submit();
        let mut actions = Self::track_actions(signal);
        actions.push(SessionAction::InsertMessage(NewMessage {
            room_id: self.room_id,
            sender_id: self.actor.user_id,
            sender_email: self.actor.email.clone(),
            body: MessageBody::Text { content: draft.trim().to_owned() },
        }));
        actions.push(SessionAction::Render);
        actions
    }

    fn on_file(&mut self, file: FileUpload) -> Vec<SessionAction> {
        if self.uploading {
            // The picker is disabled while an upload is in flight.
            return vec![];
        }

        self.uploading = true;
        let kind = MediaKind::from_media_type(&file.media_type);
        let path = self.object_path(&file.name);
        vec![
            SessionAction::UploadMedia(MediaUpload {
                room_id: self.room_id,
                path,
                data: file.data,
                content_type: file.media_type,
                kind,
                file_name: file.name,
            }),
            SessionAction::Render,
        ]
    }

    /// Collision-resistant object path scoped under the room id, preserving
    /// the original extension.
    fn object_path(&self, file_name: &str) -> String {
        let token = format!("{:032x}", self.env.random_u128());
        match file_name.rsplit_once('.') {
            Some((_, ext)) if !ext.is_empty() => format!("{}/{token}.{ext}", self.room_id),
            _ => format!("{}/{token}", self.room_id),
        }
    }

    fn track_actions(signal: Option<TypingSignal>) -> Vec<SessionAction> {
        match signal {
            Some(TypingSignal::Started) => vec![SessionAction::Track { typing: true }],
            Some(TypingSignal::Stopped) => vec![SessionAction::Track { typing: false }],
            None => vec![],
        }
    }

    /// The room this session is scoped to.
    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    /// Room display metadata, once loaded.
    pub fn room(&self) -> Option<&Room> {
        self.room.as_ref()
    }

    /// The actor this session writes as.
    pub fn actor(&self) -> &Session {
        &self.actor
    }

    /// The ordered message feed.
    pub fn messages(&self) -> &[Message] {
        self.feed.messages()
    }

    /// Labels of other participants currently typing.
    pub fn typing_others(&self) -> Vec<&str> {
        self.presence.typing_others(&self.actor.email)
    }

    /// All connected participants.
    pub fn participants(&self) -> &[PresenceState] {
        self.presence.participants()
    }

    /// Current composer draft.
    pub fn draft(&self) -> &str {
        self.composer.draft()
    }

    /// Whether the realtime channel is live.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Whether an upload is in flight (the picker is disabled meanwhile).
    pub fn is_uploading(&self) -> bool {
        self.uploading
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use uuid::Uuid;
    use whisper_core::env::SimEnv;
    use whisper_core::{MessageId, UserId};

    use super::*;

    fn actor() -> Session {
        Session::new(UserId(Uuid::new_v4()), "alice@x.com")
    }

    fn session() -> RoomSession<SimEnv> {
        RoomSession::new(SimEnv::with_seed(42), actor(), RoomId(Uuid::new_v4()))
    }

    fn insert(room_id: RoomId, sender_email: &str, content: &str) -> Message {
        Message {
            id: MessageId(Uuid::new_v4()),
            room_id,
            sender_id: UserId(Uuid::new_v4()),
            sender_email: sender_email.into(),
            created_at: DateTime::<Utc>::from_timestamp(1, 0).unwrap(),
            body: MessageBody::Text { content: content.into() },
        }
    }

    #[test]
    fn start_fetches_then_attaches() {
        let session = session();
        let room_id = session.room_id();

        assert_eq!(session.start(), [
            SessionAction::FetchRoom(room_id),
            SessionAction::FetchHistory(room_id),
            SessionAction::AttachChannel(room_id),
        ]);
    }

    #[test]
    fn attach_publishes_initial_presence() {
        let mut session = session();
        let actions = session.handle(SessionEvent::Attached);

        assert_eq!(actions[0], SessionAction::Track { typing: false });
        assert!(session.is_attached());
    }

    #[test]
    fn submit_sends_trimmed_draft_and_clears_it() {
        let mut session = session();
        session.handle(SessionEvent::DraftChanged("  hello there  ".into()));

        let actions = session.handle(SessionEvent::Submit);

        let inserted = actions.iter().find_map(|a| match a {
            SessionAction::InsertMessage(m) => Some(m.clone()),
            _ => None,
        });
        let message = inserted.expect("submit should produce exactly one insert");
        assert_eq!(message.body, MessageBody::Text { content: "hello there".into() });
        assert_eq!(message.sender_email, "alice@x.com");
        assert_eq!(session.draft(), "");

        // Typing stops before the insert goes out
        assert_eq!(actions[0], SessionAction::Track { typing: false });
    }

    #[test]
    fn whitespace_only_submit_is_rejected_locally() {
        let mut session = session();
        session.handle(SessionEvent::DraftChanged("   ".into()));

        assert!(session.handle(SessionEvent::Submit).is_empty());
        // Draft stays put for the user to fix up
        assert_eq!(session.draft(), "   ");
    }

    #[test]
    fn insert_lands_in_feed_and_clears_sender_typing() {
        let mut session = session();
        let room_id = session.room_id();
        session.handle(SessionEvent::PresenceSynced(vec![PresenceState {
            email: "bob@x.com".into(),
            typing: true,
            online_at: DateTime::UNIX_EPOCH,
        }]));
        assert_eq!(session.typing_others(), ["bob@x.com"]);

        session.handle(SessionEvent::MessageInserted(insert(room_id, "bob@x.com", "hi")));

        assert_eq!(session.messages().len(), 1);
        assert!(session.typing_others().is_empty());
    }

    #[test]
    fn insert_for_another_room_is_ignored() {
        let mut session = session();

        let actions =
            session.handle(SessionEvent::MessageInserted(insert(RoomId(Uuid::new_v4()), "b", "x")));

        assert!(actions.is_empty());
        assert!(session.messages().is_empty());
    }

    #[test]
    fn file_selection_scopes_object_under_room_and_keeps_extension() {
        let mut session = session();
        let room_id = session.room_id();

        let actions = session.handle(SessionEvent::FileSelected(FileUpload {
            name: "cat.png".into(),
            media_type: "image/png".into(),
            data: vec![1, 2, 3],
        }));

        let upload = match &actions[0] {
            SessionAction::UploadMedia(u) => u.clone(),
            other => panic!("expected upload action, got {other:?}"),
        };
        assert!(upload.path.starts_with(&format!("{room_id}/")));
        assert!(upload.path.ends_with(".png"));
        assert_eq!(upload.kind, MediaKind::Image);
        assert_eq!(upload.file_name, "cat.png");
        assert!(session.is_uploading());
    }

    #[test]
    fn second_file_is_ignored_while_uploading() {
        let mut session = session();
        let file = FileUpload {
            name: "clip.mp4".into(),
            media_type: "video/mp4".into(),
            data: vec![],
        };

        assert!(!session.handle(SessionEvent::FileSelected(file.clone())).is_empty());
        assert!(session.handle(SessionEvent::FileSelected(file.clone())).is_empty());

        session.handle(SessionEvent::UploadFinished);
        assert!(!session.handle(SessionEvent::FileSelected(file)).is_empty());
    }

    #[test]
    fn object_names_differ_between_uploads() {
        let mut session = session();
        let file = FileUpload {
            name: "cat.png".into(),
            media_type: "image/png".into(),
            data: vec![],
        };

        let first = session.handle(SessionEvent::FileSelected(file.clone()));
        session.handle(SessionEvent::UploadFinished);
        let second = session.handle(SessionEvent::FileSelected(file));

        let path = |actions: &[SessionAction]| match &actions[0] {
            SessionAction::UploadMedia(u) => u.path.clone(),
            other => panic!("expected upload action, got {other:?}"),
        };
        assert_ne!(path(&first), path(&second));
    }

    #[test]
    fn idle_tick_stops_typing() {
        let env = SimEnv::with_seed(1);
        let mut session = RoomSession::new(env.clone(), actor(), RoomId(Uuid::new_v4()));

        let actions = session.handle(SessionEvent::DraftChanged("h".into()));
        assert!(actions.contains(&SessionAction::Track { typing: true }));

        env.advance(std::time::Duration::from_secs(2));
        let actions = session.handle(SessionEvent::Tick { now: env.now() });
        assert_eq!(actions, [SessionAction::Track { typing: false }]);

        // Only one stop per idle window
        env.advance(std::time::Duration::from_secs(2));
        assert!(session.handle(SessionEvent::Tick { now: env.now() }).is_empty());
    }

    #[test]
    fn close_emits_channel_teardown_and_cancels_debounce() {
        let env = SimEnv::with_seed(1);
        let mut session = RoomSession::new(env.clone(), actor(), RoomId(Uuid::new_v4()));
        session.handle(SessionEvent::DraftChanged("h".into()));

        assert_eq!(session.close(), [SessionAction::CloseChannel]);

        env.advance(std::time::Duration::from_secs(5));
        assert!(session.handle(SessionEvent::Tick { now: env.now() }).is_empty());
    }
}
