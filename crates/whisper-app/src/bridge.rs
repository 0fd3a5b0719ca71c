//! Backend-to-application translation layer.
//!
//! The [`Bridge`] owns the collaborator handles and the live room channel.
//! It executes [`crate::AppAction`]s as requests against the backend and
//! translates completions and failures back into [`crate::AppEvent`]s.
//! Every write is fire-and-forget: a failure surfaces as a transient notice
//! and the attempt is over - nothing is retried.

use std::sync::Arc;

use chrono::DateTime;
use whisper_client::{MediaUpload, SessionAction, SessionEvent};
use whisper_core::backend::{Backend, ChannelEvent, RoomChannel};
use whisper_core::env::Environment;
use whisper_core::{MessageBody, NewMessage, NewRoom, PresenceState, RoomId, Session};

use crate::{AppAction, AppEvent};

/// Bridge between the App state machine and the backend collaborators.
///
/// Generic over [`Environment`] so presence timestamps and the channel
/// lifecycle behave identically in production and in simulation.
pub struct Bridge<E: Environment> {
    backend: Arc<dyn Backend>,
    env: E,
    /// The actor the bridge writes as. Mirrors the App's session.
    session: Option<Session>,
    /// The one live channel for the active room.
    channel: Option<Box<dyn RoomChannel>>,
}

impl<E: Environment> Bridge<E> {
    /// Create a bridge over the given backend.
    pub fn new(backend: Arc<dyn Backend>, env: E) -> Self {
        Self { backend, env, session: None, channel: None }
    }

    /// Whether a room channel is currently live.
    pub fn has_channel(&self) -> bool {
        self.channel.is_some()
    }

    /// Next event from the live channel.
    ///
    /// Pends forever while no channel is attached, so this can sit in a
    /// `select!` arm unconditionally. Returns `None` when the channel
    /// closes; call [`Bridge::drop_channel`] then.
    pub async fn next_channel_event(&mut self) -> Option<ChannelEvent> {
        match self.channel.as_mut() {
            Some(channel) => channel.recv().await,
            None => std::future::pending().await,
        }
    }

    /// Forget a channel that reported closure.
    pub fn drop_channel(&mut self) {
        self.channel = None;
    }

    /// Translate a channel event into an application event.
    pub fn channel_event(event: ChannelEvent) -> AppEvent<E::Instant> {
        match event {
            ChannelEvent::Attached => AppEvent::Session(SessionEvent::Attached),
            ChannelEvent::MessageInserted(message) => {
                AppEvent::Session(SessionEvent::MessageInserted(message))
            },
            ChannelEvent::PresenceSync(snapshot) => {
                AppEvent::Session(SessionEvent::PresenceSynced(snapshot))
            },
        }
    }

    /// Execute an action and return resulting events.
    pub async fn execute(&mut self, action: AppAction) -> Vec<AppEvent<E::Instant>> {
        match action {
            AppAction::Render | AppAction::Quit => vec![],
            AppAction::SignIn { email, password } => self.sign_in(&email, &password, false).await,
            AppAction::SignUp { email, password } => self.sign_in(&email, &password, true).await,
            AppAction::SignOut => self.sign_out().await,
            AppAction::FetchRooms => match self.backend.rooms().await {
                Ok(rooms) => vec![AppEvent::RoomsLoaded(rooms)],
                Err(error) => {
                    tracing::warn!(%error, "room list fetch failed");
                    vec![AppEvent::Error { message: "Failed to load rooms".into() }]
                },
            },
            AppAction::CreateRoom(room) => self.create_room(room).await,
            AppAction::DeleteRoom(room_id) => self.delete_room(room_id).await,
            AppAction::VerifyJoin { room_id, password } => {
                self.verify_join(room_id, &password).await
            },
            AppAction::Session(action) => self.execute_session(action).await,
        }
    }

    async fn sign_in(
        &mut self,
        email: &str,
        password: &str,
        register: bool,
    ) -> Vec<AppEvent<E::Instant>> {
        let result = if register {
            self.backend.sign_up(email, password).await
        } else {
            self.backend.sign_in(email, password).await
        };

        match result {
            Ok(session) => {
                tracing::info!(email = %session.email, "signed in");
                self.session = Some(session.clone());
                vec![AppEvent::SignedIn(session)]
            },
            Err(error) => vec![AppEvent::Error { message: error.to_string() }],
        }
    }

    async fn sign_out(&mut self) -> Vec<AppEvent<E::Instant>> {
        self.close_channel();
        if let Some(session) = self.session.take()
            && let Err(error) = self.backend.sign_out(&session).await
        {
            tracing::warn!(%error, "sign-out request failed");
        }
        vec![AppEvent::SignedOut]
    }

    async fn create_room(&mut self, room: NewRoom) -> Vec<AppEvent<E::Instant>> {
        let Some(session) = self.session.clone() else {
            return vec![AppEvent::Error { message: "not signed in".into() }];
        };

        match self.backend.create_room(room, &session).await {
            Ok(created) => vec![AppEvent::RoomCreated(created)],
            Err(error) => vec![AppEvent::Error { message: error.to_string() }],
        }
    }

    async fn delete_room(&mut self, room_id: RoomId) -> Vec<AppEvent<E::Instant>> {
        let Some(session) = self.session.clone() else {
            return vec![AppEvent::Error { message: "not signed in".into() }];
        };

        match self.backend.delete_room(room_id, &session).await {
            Ok(()) => vec![AppEvent::RoomDeleted(room_id)],
            Err(error) => vec![AppEvent::Error { message: error.to_string() }],
        }
    }

    async fn verify_join(&mut self, room_id: RoomId, password: &str) -> Vec<AppEvent<E::Instant>> {
        match self.backend.room(room_id).await {
            Ok(room) if room.verify_password(password) => vec![AppEvent::JoinVerified(room_id)],
            Ok(_) => vec![AppEvent::Error { message: "Incorrect password".into() }],
            Err(error) => {
                tracing::warn!(%error, %room_id, "join verification failed");
                vec![AppEvent::Error { message: "Failed to verify password".into() }]
            },
        }
    }

    async fn execute_session(&mut self, action: SessionAction) -> Vec<AppEvent<E::Instant>> {
        match action {
            SessionAction::Render => vec![],
            SessionAction::FetchRoom(room_id) => match self.backend.room(room_id).await {
                Ok(room) => vec![AppEvent::Session(SessionEvent::RoomLoaded(room))],
                Err(error) => {
                    tracing::warn!(%error, %room_id, "room fetch failed");
                    vec![AppEvent::Error { message: "Failed to load room".into() }]
                },
            },
            SessionAction::FetchHistory(room_id) => match self.backend.messages(room_id).await {
                Ok(history) => vec![AppEvent::Session(SessionEvent::HistoryLoaded(history))],
                Err(error) => {
                    tracing::warn!(%error, %room_id, "history fetch failed");
                    vec![AppEvent::Error { message: "Failed to load messages".into() }]
                },
            },
            SessionAction::AttachChannel(room_id) => match self.backend.attach(room_id).await {
                Ok(channel) => {
                    self.channel = Some(channel);
                    vec![]
                },
                Err(error) => {
                    tracing::warn!(%error, %room_id, "channel attach failed");
                    vec![AppEvent::Error { message: "Failed to connect to room".into() }]
                },
            },
            SessionAction::Track { typing } => {
                self.track(typing).await;
                vec![]
            },
            SessionAction::InsertMessage(message) => {
                match self.backend.insert_message(message).await {
                    // The committed row comes back on the channel
                    Ok(_) => vec![],
                    Err(error) => {
                        tracing::warn!(%error, "message insert failed");
                        vec![AppEvent::Error { message: "Failed to send message".into() }]
                    },
                }
            },
            SessionAction::UploadMedia(upload) => self.upload_media(upload).await,
            SessionAction::CloseChannel => {
                self.close_channel();
                vec![]
            },
        }
    }

    /// Publish the actor's presence state. Best-effort: failures are logged,
    /// never surfaced - typing state is inherently stale anyway.
    async fn track(&mut self, typing: bool) {
        let (Some(channel), Some(session)) = (self.channel.as_ref(), self.session.as_ref()) else {
            return;
        };

        let online_at =
            DateTime::from_timestamp(self.env.wall_clock_secs() as i64, 0).unwrap_or_default();
        let state = PresenceState::online(session.email.clone(), online_at).with_typing(typing);
        if let Err(error) = channel.track(state).await {
            tracing::warn!(%error, "presence track failed");
        }
    }

    /// Upload bytes, resolve the public URL, insert the referencing message.
    ///
    /// Two sequential requests with no atomicity: an upload that succeeds
    /// before a failed insert strands the stored object, which is logged and
    /// otherwise left alone.
    async fn upload_media(&mut self, upload: MediaUpload) -> Vec<AppEvent<E::Instant>> {
        let Some(session) = self.session.clone() else {
            return vec![
                AppEvent::Session(SessionEvent::UploadFinished),
                AppEvent::Error { message: "not signed in".into() },
            ];
        };

        let MediaUpload { room_id, path, data, content_type, kind, file_name } = upload;
        if let Err(error) = self.backend.upload(&path, data, &content_type).await {
            tracing::warn!(%error, %path, "object upload failed");
            return vec![
                AppEvent::Session(SessionEvent::UploadFinished),
                AppEvent::Error { message: "Failed to upload file".into() },
            ];
        }

        let url = self.backend.public_url(&path);
        let message = NewMessage {
            room_id,
            sender_id: session.user_id,
            sender_email: session.email,
            body: MessageBody::Media { kind, url, file_name },
        };
        match self.backend.insert_message(message).await {
            Ok(_) => vec![
                AppEvent::Session(SessionEvent::UploadFinished),
                AppEvent::Info { message: format!("{} uploaded successfully", kind.label()) },
            ],
            Err(error) => {
                tracing::warn!(%error, %path, "message insert failed, stored object stranded");
                vec![
                    AppEvent::Session(SessionEvent::UploadFinished),
                    AppEvent::Error { message: "Failed to upload file".into() },
                ]
            },
        }
    }

    fn close_channel(&mut self) {
        if let Some(mut channel) = self.channel.take() {
            channel.close();
        }
    }
}
