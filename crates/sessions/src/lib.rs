//! In-memory session store with per-session locking.
//!
//! Sessions are keyed by a client-supplied id, created lazily on first
//! access, and append-only for the process lifetime (no expiry). Each
//! session sits behind its own async mutex: a turn locks its session for
//! the whole read-modify-append cycle, so two concurrent turns on the
//! same id can never interleave their appends. Turns on different
//! sessions share nothing and need no coordination.

use helpbot_core::message::{Session, SessionId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// A shared handle to one session. Lock it for the duration of a turn.
pub type SessionHandle = Arc<tokio::sync::Mutex<Session>>;

/// Keyed map of sessions. The outer std mutex only guards the map itself
/// and is held for map lookup/insert, never across an await.
pub struct SessionStore {
    sessions: Mutex<HashMap<String, SessionHandle>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Get the handle for a session, creating an empty session if the id
    /// is unseen. Idempotent, never fails.
    pub fn handle(&self, session_id: &str) -> SessionHandle {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                debug!(session_id, "Creating new session");
                Arc::new(tokio::sync::Mutex::new(Session::new(SessionId::from(
                    session_id,
                ))))
            })
            .clone()
    }

    /// Number of sessions currently held.
    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
