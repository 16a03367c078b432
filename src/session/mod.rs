//! Short-lived state carried between step 1 and step 2 of the public form.
//!
//! Entries are keyed by an opaque token handed to the payer after step 1 and expire
//! after a window of inactivity. Reading an entry restarts its window.

#[cfg(feature = "cache")]
pub mod redis_store;

#[cfg(feature = "cache")]
pub use redis_store::{RedisSessionConfig, RedisSessionStore};

use async_trait::async_trait;
use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;
use uuid::Uuid;

use crate::error::AppResult;

/// Session lifetime used by the hosted form
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(600);

/// Identity verified in step 1
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingIdentity {
    pub client_id: i64,
    pub client_name: String,
    pub account_number: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

/// Fresh opaque session token
pub fn new_session_token() -> String {
    Uuid::new_v4().simple().to_string()
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch a live entry and restart its expiry window. Expired entries read as `None`.
    async fn get(&self, token: &str) -> AppResult<Option<PendingIdentity>>;

    /// Store or replace the entry for `token`
    async fn put(&self, token: &str, identity: &PendingIdentity) -> AppResult<()>;

    async fn remove(&self, token: &str) -> AppResult<()>;
}

struct Entry {
    identity: PendingIdentity,
    expires_at: Instant,
}

/// Process-local session store
pub struct InMemorySessionStore {
    entries: DashMap<String, Entry>,
    ttl: Duration,
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL)
    }
}

impl InMemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        let purged = before.saturating_sub(self.entries.len());
        if purged > 0 {
            debug!("Purged {} expired sessions", purged);
        }
        purged
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, token: &str) -> AppResult<Option<PendingIdentity>> {
        let now = Instant::now();

        if let Some(mut entry) = self.entries.get_mut(token) {
            if entry.expires_at > now {
                entry.expires_at = now + self.ttl;
                return Ok(Some(entry.identity.clone()));
            }
        } else {
            return Ok(None);
        }

        debug!("Session {} expired", token);
        self.entries.remove(token);
        Ok(None)
    }

    async fn put(&self, token: &str, identity: &PendingIdentity) -> AppResult<()> {
        // Abandoned forms are only ever cleaned up here.
        self.purge_expired();
        self.entries.insert(
            token.to_string(),
            Entry {
                identity: identity.clone(),
                expires_at: Instant::now() + self.ttl,
            },
        );
        Ok(())
    }

    async fn remove(&self, token: &str) -> AppResult<()> {
        self.entries.remove(token);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> PendingIdentity {
        PendingIdentity {
            client_id: 42,
            client_name: "Juan Dela Cruz".to_string(),
            account_number: "ACC100".to_string(),
            amount: Decimal::new(25000, 2),
        }
    }

    #[tokio::test]
    async fn test_put_get_remove() {
        let store = InMemorySessionStore::default();
        let token = new_session_token();

        assert!(store.get(&token).await.unwrap().is_none());

        store.put(&token, &identity()).await.unwrap();
        assert_eq!(store.get(&token).await.unwrap(), Some(identity()));

        store.remove(&token).await.unwrap();
        assert!(store.get(&token).await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let store = InMemorySessionStore::new(Duration::from_millis(20));
        store.put("token", &identity()).await.unwrap();

        tokio::time::sleep(Duration::from_millis(60)).await;

        assert!(store.get("token").await.unwrap().is_none());
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let store = InMemorySessionStore::new(Duration::from_millis(20));
        store.put("a", &identity()).await.unwrap();
        store.put("b", &identity()).await.unwrap();

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(store.purge_expired(), 2);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_put_clears_abandoned_sessions() {
        let store = InMemorySessionStore::new(Duration::from_millis(20));
        store.put("abandoned", &identity()).await.unwrap();

        tokio::time::sleep(Duration::from_millis(60)).await;
        store.put("fresh", &identity()).await.unwrap();

        assert_eq!(store.len(), 1);
        assert!(store.get("fresh").await.unwrap().is_some());
    }

    #[test]
    fn test_tokens_are_unique() {
        assert_ne!(new_session_token(), new_session_token());
        assert_eq!(new_session_token().len(), 32);
    }
}
