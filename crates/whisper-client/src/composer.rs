//! Message composer: draft state and typing-signal debounce.
//!
//! Typing signals are edge-triggered, never per-keystroke: the empty to
//! non-empty transition raises "started", the reverse transition raises
//! "stopped" immediately, and a trailing-edge inactivity window raises
//! "stopped" after [`TYPING_IDLE`] with no further keystroke. The idle
//! deadline re-arms on every keystroke and is cancelled outright on submit
//! and teardown so a stale "stopped" never fires after the composer is gone.

use std::time::Duration;

/// Inactivity window after which a typing participant counts as stopped.
pub const TYPING_IDLE: Duration = Duration::from_secs(2);

/// Edge transition of the actor's typing state, to be published on the
/// presence channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingSignal {
    /// The actor began composing.
    Started,
    /// The actor stopped composing.
    Stopped,
}

/// Draft text plus the typing-debounce clock.
///
/// Generic over the instant type so the idle window runs on virtual time in
/// tests.
#[derive(Debug, Clone)]
pub struct Composer<I> {
    draft: String,
    /// Time of the last keystroke while the draft was non-empty.
    last_keystroke: Option<I>,
    /// Whether "started" has been broadcast without a matching "stopped".
    typing: bool,
}

impl<I> Default for Composer<I> {
    fn default() -> Self {
        Self { draft: String::new(), last_keystroke: None, typing: false }
    }
}

impl<I: Copy + Ord + std::ops::Sub<Output = Duration>> Composer<I> {
    /// Create an empty composer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current draft text.
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Replace the draft with the input field's current value.
    ///
    /// Returns the typing edge to publish, if this change crossed one.
    pub fn set_draft(&mut self, text: String, now: I) -> Option<TypingSignal> {
        let emptied = text.is_empty();
        self.draft = text;

        if emptied {
            self.last_keystroke = None;
            return self.stop_edge();
        }

        self.last_keystroke = Some(now);
        if self.typing {
            None
        } else {
            self.typing = true;
            Some(TypingSignal::Started)
        }
    }

    /// Advance the idle clock.
    ///
    /// Returns `Stopped` once exactly one idle window has elapsed since the
    /// last keystroke.
    pub fn tick(&mut self, now: I) -> Option<TypingSignal> {
        let last = self.last_keystroke?;
        if now - last >= TYPING_IDLE {
            self.last_keystroke = None;
            return self.stop_edge();
        }
        None
    }

    /// Take the draft for sending and cancel the idle clock.
    ///
    /// The draft clears on the attempt, not on the outcome. Returns the
    /// taken text and the typing edge to publish, if any.
    pub fn submit(&mut self) -> (String, Option<TypingSignal>) {
        let draft = std::mem::take(&mut self.draft);
        self.last_keystroke = None;
        (draft, self.stop_edge())
    }

    /// Tear the composer down without emitting anything.
    pub fn cancel(&mut self) {
        self.draft.clear();
        self.last_keystroke = None;
        self.typing = false;
    }

    fn stop_edge(&mut self) -> Option<TypingSignal> {
        if self.typing {
            self.typing = false;
            Some(TypingSignal::Stopped)
        } else {
            None
        }
    }
}
