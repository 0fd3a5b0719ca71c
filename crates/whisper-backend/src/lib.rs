//! In-process backend for Whisper Rooms.
//!
//! [`LocalBackend`] implements every collaborator contract in memory:
//! accounts, the `rooms` and `messages` collections, an object bucket, and
//! per-room realtime channels built on `tokio::sync::broadcast`. Frames flow
//! through channels with no network, which makes the frontend runnable
//! stand-alone and the integration tests deterministic.
//!
//! Fidelity notes: message rows fan out in commit order, presence snapshots
//! are re-broadcast wholesale on every track/untrack, and both account and
//! room passwords are compared in plain form (demo scope).

mod channel;
mod store;

pub use store::LocalBackend;

pub(crate) use channel::LocalChannel;
