//! In-memory session registry
//!
//! Maps opaque session tokens to the actor that logged in. Sessions expire
//! after a fixed lifetime and are evicted lazily when resolved.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::RwLock;

use crate::actor::Actor;

/// A live session
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub actor: Actor,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Process-wide session store
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, SessionRecord>>,
    ttl: TimeDelta,
}

/// Shared handle to the session registry
pub type SessionHandle = Arc<SessionRegistry>;

impl SessionRegistry {
    pub fn new(ttl: TimeDelta) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    /// Start a session for the actor and return its token
    pub async fn issue(&self, actor: Actor) -> String {
        self.issue_at(actor, Utc::now()).await
    }

    pub async fn issue_at(&self, actor: Actor, now: DateTime<Utc>) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        tracing::debug!("Issued session for '{}' until {}", actor.email, expires_at);
        self.sessions.write().await.insert(
            token.clone(),
            SessionRecord {
                actor,
                issued_at: now,
                expires_at,
            },
        );
        token
    }

    /// Look up the actor behind a token
    pub async fn resolve(&self, token: &str) -> Option<Actor> {
        self.resolve_at(token, Utc::now()).await
    }

    pub async fn resolve_at(&self, token: &str, now: DateTime<Utc>) -> Option<Actor> {
        {
            let sessions = self.sessions.read().await;
            match sessions.get(token) {
                None => return None,
                Some(record) if !record.is_expired(now) => return Some(record.actor.clone()),
                Some(_) => {}
            }
        }

        let mut sessions = self.sessions.write().await;
        if let Some(record) = sessions.remove(token) {
            tracing::debug!("Session for '{}' expired", record.actor.email);
        }
        None
    }

    /// End a session. Returns true if the token was live.
    pub async fn revoke(&self, token: &str) -> bool {
        let removed = self.sessions.write().await.remove(token);
        if let Some(record) = &removed {
            tracing::info!("Session for '{}' revoked", record.actor.email);
        }
        removed.is_some()
    }

    /// Drop every expired session, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        self.purge_expired_at(Utc::now()).await
    }

    pub async fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, record| !record.is_expired(now));
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
