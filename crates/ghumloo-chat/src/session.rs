//! Conversation sessions.
//!
//! Each session key owns an isolated hotel memory and conversation history.
//! The async mutex around a session is held for a whole turn, so turns within
//! one session never interleave while different sessions run concurrently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Local;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info};

use ghumloo_core::types::Turn;

use crate::error::ChatError;
use crate::index::HotelMemory;

/// Shared handle to one session.
pub type SessionHandle = Arc<AsyncMutex<ChatSession>>;

// =============================================================================
// ChatSession
// =============================================================================

/// State of a single conversation.
#[derive(Debug)]
pub struct ChatSession {
    pub key: String,
    /// Shared with the tool executor during a turn.
    pub memory: Arc<Mutex<HotelMemory>>,
    pub history: Vec<Turn>,
    pub started_at: i64,
    pub last_message_at: i64,
}

impl ChatSession {
    pub fn new(key: impl Into<String>) -> Self {
        let now = Local::now().timestamp();
        Self {
            key: key.into(),
            memory: Arc::new(Mutex::new(HotelMemory::new())),
            history: Vec::new(),
            started_at: now,
            last_message_at: now,
        }
    }

    /// Append a turn and refresh the activity timestamp.
    pub fn record(&mut self, turn: Turn) {
        self.last_message_at = turn.created_at;
        self.history.push(turn);
    }

    /// Expired when idle for longer than `timeout_minutes`; 0 never expires.
    pub fn is_expired(&self, timeout_minutes: u32) -> bool {
        if timeout_minutes == 0 {
            return false;
        }
        let now = Local::now().timestamp();
        now - self.last_message_at > i64::from(timeout_minutes) * 60
    }
}

// =============================================================================
// SessionStore
// =============================================================================

/// Registry of sessions keyed by caller-supplied id.
pub struct SessionStore {
    sessions: Mutex<HashMap<String, SessionHandle>>,
    timeout_minutes: u32,
}

impl SessionStore {
    pub fn new(timeout_minutes: u32) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            timeout_minutes,
        }
    }

    /// Fetch the session for `key`, creating it if needed.
    ///
    /// Every idle session past its timeout is dropped first, so `key` may get
    /// a fresh session. A session that is mid-turn is never considered idle.
    pub fn get_or_create(&self, key: &str) -> Result<SessionHandle, ChatError> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|e| ChatError::StorageError(format!("session lock poisoned: {}", e)))?;

        if self.timeout_minutes > 0 {
            let before = sessions.len();
            sessions.retain(|_, handle| {
                handle
                    .try_lock()
                    .map(|s| !s.is_expired(self.timeout_minutes))
                    .unwrap_or(true)
            });
            let evicted = before - sessions.len();
            if evicted > 0 {
                info!(evicted, remaining = sessions.len(), "Expired sessions dropped");
            }
        }

        if let Some(handle) = sessions.get(key) {
            return Ok(Arc::clone(handle));
        }

        debug!(session = key, "Creating session");
        let handle = Arc::new(AsyncMutex::new(ChatSession::new(key)));
        sessions.insert(key.to_string(), Arc::clone(&handle));
        Ok(handle)
    }

    /// Drop a session and everything it remembers.
    pub fn reset(&self, key: &str) -> Result<(), ChatError> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|e| ChatError::StorageError(format!("session lock poisoned: {}", e)))?;
        match sessions.remove(key) {
            Some(_) => {
                info!(session = key, "Session reset");
                Ok(())
            }
            None => Err(ChatError::SessionNotFound(key.to_string())),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.sessions
            .lock()
            .map(|s| s.contains_key(key))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
