//! Terminal UI for Whisper Rooms.
//!
//! Screens (auth, lobby, chat) render from the [`whisper_app::App`] state
//! machine; this crate owns terminal I/O, text-field editing, and the
//! `tokio::select!` event loop that stitches keyboard input, realtime
//! channel events, and the debounce tick together.

pub mod runtime;

mod input;
mod ui;
mod view;

pub(crate) use input::InputState;
pub(crate) use view::ViewState;
