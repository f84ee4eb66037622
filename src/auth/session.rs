//! Token session store for Depot.
//!
//! Sessions are held in memory and keyed by an opaque UUIDv4 token.
//! Every session expires a fixed duration after issuance; there is no
//! sliding renewal. Expired entries are dropped lazily on lookup and
//! swept by a periodic cleanup task.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::auth::password::verify_password;
use crate::db::User;
use crate::{DepotError, Result};

/// Default session lifetime: 24 hours from issuance.
pub const SESSION_TTL_SECS: i64 = 24 * 60 * 60;

/// An issued session.
#[derive(Debug, Clone)]
pub struct Session {
    /// Opaque bearer token.
    pub token: String,
    /// Owning user ID.
    pub user_id: i64,
    /// Absolute expiry instant.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Whether the session has passed its expiry instant.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// In-memory session store.
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Session>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Create a store with the default 24 hour TTL.
    pub fn new() -> Self {
        Self::with_ttl(SESSION_TTL_SECS)
    }

    /// Create a store with an explicit TTL in seconds.
    pub fn with_ttl(ttl_secs: i64) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl: Duration::seconds(ttl_secs),
        }
    }

    /// Verify credentials and issue a new session token.
    ///
    /// Takes the looked-up user (or `None` when the email is unknown) so
    /// that an unknown account and a wrong password produce the same
    /// error. A user may hold any number of concurrent sessions.
    pub async fn issue(&self, user: Option<&User>, password: &str) -> Result<Session> {
        let user = user.ok_or_else(|| DepotError::Auth("invalid credentials".to_string()))?;

        verify_password(password, &user.password)
            .map_err(|_| DepotError::Auth("invalid credentials".to_string()))?;

        let session = Session {
            token: Uuid::new_v4().to_string(),
            user_id: user.id,
            expires_at: Utc::now() + self.ttl,
        };

        debug!(user_id = user.id, "Issued session token");

        let mut sessions = self.sessions.lock().await;
        sessions.insert(session.token.clone(), session.clone());

        Ok(session)
    }

    /// Resolve a token to a user ID.
    ///
    /// Returns `None` for unknown or expired tokens; expired entries are
    /// removed on the spot.
    pub async fn resolve(&self, token: &str) -> Option<i64> {
        let mut sessions = self.sessions.lock().await;

        match sessions.get(token) {
            Some(session) if session.is_expired() => {
                sessions.remove(token);
                None
            }
            Some(session) => Some(session.user_id),
            None => None,
        }
    }

    /// Revoke a token. Revoking an unknown token is a no-op.
    pub async fn revoke(&self, token: &str) {
        let mut sessions = self.sessions.lock().await;
        sessions.remove(token);
    }

    /// Remove all expired sessions, returning how many were dropped.
    pub async fn cleanup(&self) -> usize {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired());
        before - sessions.len()
    }

    /// Number of live entries, expired or not.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Whether the store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").field("ttl", &self.ttl).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;

    fn make_user(id: i64, password: &str) -> User {
        User {
            id,
            email: format!("user{id}@example.com"),
            password: hash_password(password).unwrap(),
            created_at: "2026-01-01 00:00:00".to_string(),
        }
    }

    #[tokio::test]
    async fn test_issue_and_resolve() {
        let store = SessionStore::new();
        let user = make_user(1, "toto1234!");

        let session = store.issue(Some(&user), "toto1234!").await.unwrap();

        assert!(!session.token.is_empty());
        assert_eq!(store.resolve(&session.token).await, Some(1));
    }

    #[tokio::test]
    async fn test_issue_unknown_user() {
        let store = SessionStore::new();

        let result = store.issue(None, "whatever").await;
        assert!(matches!(result, Err(DepotError::Auth(_))));
    }

    #[tokio::test]
    async fn test_issue_wrong_password() {
        let store = SessionStore::new();
        let user = make_user(1, "toto1234!");

        let result = store.issue(Some(&user), "wrong").await;
        assert!(matches!(result, Err(DepotError::Auth(_))));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_concurrent_sessions_per_user() {
        let store = SessionStore::new();
        let user = make_user(1, "toto1234!");

        let s1 = store.issue(Some(&user), "toto1234!").await.unwrap();
        let s2 = store.issue(Some(&user), "toto1234!").await.unwrap();

        assert_ne!(s1.token, s2.token);
        assert_eq!(store.resolve(&s1.token).await, Some(1));
        assert_eq!(store.resolve(&s2.token).await, Some(1));
    }

    #[tokio::test]
    async fn test_resolve_unknown_token() {
        let store = SessionStore::new();
        assert_eq!(store.resolve("no-such-token").await, None);
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let store = SessionStore::with_ttl(0);
        let user = make_user(1, "toto1234!");

        let session = store.issue(Some(&user), "toto1234!").await.unwrap();

        assert_eq!(store.resolve(&session.token).await, None);
        // Lazy removal dropped the entry
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_revoke() {
        let store = SessionStore::new();
        let user = make_user(1, "toto1234!");

        let session = store.issue(Some(&user), "toto1234!").await.unwrap();
        store.revoke(&session.token).await;

        assert_eq!(store.resolve(&session.token).await, None);

        // Idempotent
        store.revoke(&session.token).await;
    }

    #[tokio::test]
    async fn test_cleanup() {
        let expired = SessionStore::with_ttl(0);
        let user = make_user(1, "toto1234!");

        expired.issue(Some(&user), "toto1234!").await.unwrap();
        expired.issue(Some(&user), "toto1234!").await.unwrap();

        assert_eq!(expired.len().await, 2);
        assert_eq!(expired.cleanup().await, 2);
        assert!(expired.is_empty().await);

        let live = SessionStore::new();
        live.issue(Some(&user), "toto1234!").await.unwrap();
        assert_eq!(live.cleanup().await, 0);
        assert_eq!(live.len().await, 1);
    }
}
