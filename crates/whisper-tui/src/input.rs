//! Text-field editing state and key conversion.
//!
//! This module owns the character-level editing for every text field in the
//! UI (auth form, lobby dialogs, composer). Cursor positions are counted in
//! characters, not bytes, so multibyte input edits cleanly.

use crossterm::event::KeyCode;
use whisper_app::KeyInput;

/// Convert a crossterm `KeyCode` to the terminal-agnostic `KeyInput`.
pub(crate) fn convert_key(code: KeyCode) -> Option<KeyInput> {
    match code {
        KeyCode::Char(c) => Some(KeyInput::Char(c)),
        KeyCode::Enter => Some(KeyInput::Enter),
        KeyCode::Backspace => Some(KeyInput::Backspace),
        KeyCode::Delete => Some(KeyInput::Delete),
        KeyCode::Tab => Some(KeyInput::Tab),
        KeyCode::Esc => Some(KeyInput::Esc),
        KeyCode::Left => Some(KeyInput::Left),
        KeyCode::Right => Some(KeyInput::Right),
        KeyCode::Up => Some(KeyInput::Up),
        KeyCode::Down => Some(KeyInput::Down),
        KeyCode::Home => Some(KeyInput::Home),
        KeyCode::End => Some(KeyInput::End),
        _ => None,
    }
}

/// What an editing key did to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Edit {
    /// The buffer contents changed.
    Changed,
    /// Only the cursor moved.
    CursorMoved,
    /// The key is not an editing key.
    Ignored,
}

/// A single-line text field: buffer plus cursor position (in characters).
#[derive(Debug, Default)]
pub(crate) struct InputState {
    buffer: String,
    cursor: usize,
}

impl InputState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Current text in the field.
    pub(crate) fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Cursor position in characters.
    pub(crate) fn cursor(&self) -> usize {
        self.cursor
    }

    /// Empty the field.
    pub(crate) fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    /// Take the text out, leaving the field empty.
    pub(crate) fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.buffer)
    }

    /// Byte offset of the character cursor.
    fn byte_cursor(&self) -> usize {
        self.buffer
            .char_indices()
            .nth(self.cursor)
            .map_or(self.buffer.len(), |(idx, _)| idx)
    }

    fn char_len(&self) -> usize {
        self.buffer.chars().count()
    }

    /// Apply an editing key.
    pub(crate) fn apply(&mut self, key: KeyInput) -> Edit {
        match key {
            KeyInput::Char(c) => {
                let at = self.byte_cursor();
                self.buffer.insert(at, c);
                self.cursor = self.cursor.saturating_add(1);
                Edit::Changed
            },
            KeyInput::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_cursor();
                    self.buffer.remove(at);
                    Edit::Changed
                } else {
                    Edit::CursorMoved
                }
            },
            KeyInput::Delete => {
                if self.cursor < self.char_len() {
                    let at = self.byte_cursor();
                    self.buffer.remove(at);
                    Edit::Changed
                } else {
                    Edit::CursorMoved
                }
            },
            KeyInput::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                Edit::CursorMoved
            },
            KeyInput::Right => {
                if self.cursor < self.char_len() {
                    self.cursor += 1;
                }
                Edit::CursorMoved
            },
            KeyInput::Home => {
                self.cursor = 0;
                Edit::CursorMoved
            },
            KeyInput::End => {
                self.cursor = self.char_len();
                Edit::CursorMoved
            },
            KeyInput::Enter
            | KeyInput::Tab
            | KeyInput::Esc
            | KeyInput::Up
            | KeyInput::Down => Edit::Ignored,
        }
    }
}
