//! Anonymous shopper sessions.
//!
//! A session is a random token the client stores and sends back; it keys the
//! swipe history and the cart. Tokens are not validated server-side.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Session key threaded explicitly through swipe, cart and storage calls
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionContext {
    pub session_id: String,
}

impl SessionContext {
    /// Start a new session with a random UUID v4 token
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
        }
    }

    /// Resume a session from a stored token, or start a new one if the
    /// stored token is blank
    pub fn from_existing(session_id: &str) -> Self {
        let trimmed = session_id.trim();
        if trimmed.is_empty() {
            Self::new()
        } else {
            Self {
                session_id: trimmed.to_string(),
            }
        }
    }

    pub fn id(&self) -> &str {
        &self.session_id
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.session_id)
    }
}
