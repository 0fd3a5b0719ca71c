//! Session events and actions.

use whisper_core::{MediaKind, Message, NewMessage, PresenceState, Room, RoomId};

/// Events the caller feeds into the session.
///
/// The caller is responsible for:
/// - Delivering realtime channel events and request completions
/// - Driving time forward via ticks
/// - Forwarding composer input (draft changes, submit, file selection)
///
/// Generic over `I` (Instant type) to support both production
/// (`std::time::Instant`) and simulated clocks.
#[derive(Debug, Clone)]
pub enum SessionEvent<I = std::time::Instant> {
    /// Room metadata fetch completed.
    RoomLoaded(Room),

    /// Message history fetch completed. Rows are ascending by creation
    /// time; this replaces the feed wholesale.
    HistoryLoaded(Vec<Message>),

    /// The realtime channel subscription is live.
    Attached,

    /// A message row was committed. Rows for other rooms are ignored.
    MessageInserted(Message),

    /// Full presence snapshot from the channel.
    PresenceSynced(Vec<PresenceState>),

    /// The composer's draft text changed (local echo plus typing edges).
    DraftChanged(String),

    /// The composer was submitted.
    Submit,

    /// A file was picked for upload.
    FileSelected(FileUpload),

    /// The upload request settled, successfully or not.
    UploadFinished,

    /// Time tick for the typing-idle window.
    Tick {
        /// Current time from the environment.
        now: I,
    },
}

/// A file picked by the user, as handed over by the frontend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    /// Original file name, kept as the message content.
    pub name: String,
    /// Declared media type, e.g. `image/png`.
    pub media_type: String,
    /// File contents.
    pub data: Vec<u8>,
}

/// A prepared object-storage upload plus the message to insert once the
/// object's public URL resolves. Upload and insert are two sequential
/// requests with no atomicity between them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUpload {
    /// Target room (also the object path prefix).
    pub room_id: RoomId,
    /// Object path: `<room_id>/<random>.<ext>`.
    pub path: String,
    /// File contents.
    pub data: Vec<u8>,
    /// Declared media type, passed through to storage.
    pub content_type: String,
    /// Kind derived from the media type prefix.
    pub kind: MediaKind,
    /// Original file name, kept as the message content.
    pub file_name: String,
}

/// Actions the session produces for the caller to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Render the UI.
    Render,

    /// Fetch room display metadata once.
    FetchRoom(RoomId),

    /// Fetch the full message history once, ascending.
    FetchHistory(RoomId),

    /// Open the single realtime channel scoped to this room.
    AttachChannel(RoomId),

    /// Publish the actor's presence record with the given typing flag.
    Track {
        /// Whether the actor is currently composing.
        typing: bool,
    },

    /// Insert a message row. Fire-and-forget: the message appears in the
    /// feed only once the store echoes it back on the channel.
    InsertMessage(NewMessage),

    /// Upload bytes to object storage, then insert the referencing message.
    UploadMedia(MediaUpload),

    /// Close the channel subscription. Mandatory on room exit - a leaked
    /// subscription is a phantom presence entry.
    CloseChannel,
}
