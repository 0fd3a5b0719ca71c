//! Actor identity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The authenticated actor.
///
/// Created on successful sign-in, torn down on sign-out, and threaded
/// explicitly into every component that performs a write. There is no
/// ambient global identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// The actor's stable id.
    pub user_id: UserId,
    /// The actor's email, used as the display label throughout the UI.
    pub email: String,
}

impl Session {
    /// Create a session for the given identity.
    pub fn new(user_id: UserId, email: impl Into<String>) -> Self {
        Self { user_id, email: email.into() }
    }
}
