//! In-memory session store
//!
//! Sessions are ephemeral by contract, so a `RwLock<HashMap>` is enough.
//! Per-farmer turn ordering is the engine's job; the store only has to
//! keep individual operations atomic.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use crate::farmer::Language;
use crate::session::types::Session;

/// Session store keyed by phone number
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get the session for a phone number, creating one at the main menu
    /// with the profile's language on first contact.
    pub async fn get_or_create(&self, phone: &str, default_language: Language) -> Session {
        {
            let sessions = self.sessions.read().await;
            if let Some(session) = sessions.get(phone) {
                return session.clone();
            }
        }

        let mut sessions = self.sessions.write().await;
        sessions
            .entry(phone.to_string())
            .or_insert_with(|| Session::new(default_language))
            .clone()
    }

    /// Apply an atomic mutation to a session, stamping last activity.
    pub async fn update<F>(&self, phone: &str, mutator: F)
    where
        F: FnOnce(&mut Session),
    {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .entry(phone.to_string())
            .or_insert_with(|| Session::new(Language::En));
        mutator(session);
        session.last_activity = Utc::now();
    }

    /// Stamp last activity without other changes.
    pub async fn touch(&self, phone: &str) {
        self.update(phone, |_| {}).await;
    }

    /// Drop sessions idle for longer than `ttl_hours`. Returns the
    /// number evicted.
    pub async fn evict_idle(&self, ttl_hours: u64) -> usize {
        let cutoff = Utc::now() - Duration::hours(ttl_hours as i64);
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.last_activity > cutoff);
        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!("Evicted {} idle sessions", evicted);
        }
        evicted
    }

    /// Number of live sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl Clone for SessionStore {
    fn clone(&self) -> Self {
        Self {
            sessions: Arc::clone(&self.sessions),
        }
    }
}
