//! Redis-backed session store for deployments running more than one process.

use super::{PendingIdentity, SessionStore, DEFAULT_SESSION_TTL};
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use bb8::{Pool, PooledConnection};
use bb8_redis::RedisConnectionManager;
use redis::AsyncCommands;
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub type RedisPool = Pool<RedisConnectionManager>;

type RedisConnection<'a> = PooledConnection<'a, RedisConnectionManager>;

const KEY_PREFIX: &str = "gcash:session:";

#[derive(Debug, Clone)]
pub struct RedisSessionConfig {
    pub redis_url: String,
    pub max_connections: u32,
    pub connection_timeout: Duration,
    pub ttl: Duration,
}

impl Default for RedisSessionConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".to_string(),
            max_connections: 10,
            connection_timeout: Duration::from_secs(5),
            ttl: DEFAULT_SESSION_TTL,
        }
    }
}

pub struct RedisSessionStore {
    pool: RedisPool,
    ttl: Duration,
}

impl RedisSessionStore {
    pub fn new(pool: RedisPool, ttl: Duration) -> Self {
        Self { pool, ttl }
    }

    /// Build the pool and check the server answers PING
    pub async fn connect(config: RedisSessionConfig) -> AppResult<Self> {
        info!(
            "Initializing Redis session pool: max_connections={}, redis_url={}",
            config.max_connections, config.redis_url
        );

        let manager = RedisConnectionManager::new(config.redis_url.clone()).map_err(|e| {
            error!("Failed to create Redis connection manager: {}", e);
            AppError::configuration(format!("invalid Redis URL: {}", e))
        })?;

        let pool = Pool::builder()
            .max_size(config.max_connections)
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .await
            .map_err(|e| {
                error!("Failed to build Redis connection pool: {}", e);
                AppError::storage(format!("Redis pool: {}", e))
            })?;

        let store = Self::new(pool, config.ttl);
        store.ping().await?;

        info!("Redis session pool initialized successfully");
        Ok(store)
    }

    pub async fn ping(&self) -> AppResult<()> {
        let mut conn = self.connection().await?;
        let _: String = redis::cmd("PING")
            .query_async(&mut *conn)
            .await
            .map_err(|e| {
                error!("Redis PING failed: {}", e);
                AppError::storage(format!("Redis PING: {}", e))
            })?;
        Ok(())
    }

    async fn connection(&self) -> AppResult<RedisConnection<'_>> {
        self.pool.get().await.map_err(|e| {
            warn!("Failed to get Redis connection: {}", e);
            AppError::storage(format!("Redis connection: {}", e))
        })
    }

    fn key(token: &str) -> String {
        format!("{}{}", KEY_PREFIX, token)
    }

    fn ttl_secs(&self) -> u64 {
        self.ttl.as_secs().max(1)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn get(&self, token: &str) -> AppResult<Option<PendingIdentity>> {
        let key = Self::key(token);
        let mut conn = self.connection().await?;

        let raw: Option<String> = conn.get(&key).await.map_err(|e| {
            warn!("Redis GET failed for key '{}': {}", key, e);
            AppError::storage(format!("Redis GET: {}", e))
        })?;

        let Some(raw) = raw else {
            debug!("Session miss for key: {}", key);
            return Ok(None);
        };

        let _: bool = conn
            .expire(&key, self.ttl_secs() as i64)
            .await
            .map_err(|e| {
                warn!("Redis EXPIRE failed for key '{}': {}", key, e);
                AppError::storage(format!("Redis EXPIRE: {}", e))
            })?;

        match serde_json::from_str(&raw) {
            Ok(identity) => Ok(Some(identity)),
            Err(e) => {
                // Unreadable entries behave like expired ones
                warn!("Failed to deserialize session '{}': {}", key, e);
                Ok(None)
            }
        }
    }

    async fn put(&self, token: &str, identity: &PendingIdentity) -> AppResult<()> {
        let key = Self::key(token);
        let json_str = serde_json::to_string(identity)?;
        let mut conn = self.connection().await?;

        let _: () = conn
            .set_ex(&key, json_str, self.ttl_secs())
            .await
            .map_err(|e| {
                warn!("Redis SET_EX failed for key '{}': {}", key, e);
                AppError::storage(format!("Redis SET_EX: {}", e))
            })?;

        debug!("Session stored for key: {} (ttl: {:?})", key, self.ttl);
        Ok(())
    }

    async fn remove(&self, token: &str) -> AppResult<()> {
        let key = Self::key(token);
        let mut conn = self.connection().await?;

        let _: i32 = conn.del(&key).await.map_err(|e| {
            warn!("Redis DEL failed for key '{}': {}", key, e);
            AppError::storage(format!("Redis DEL: {}", e))
        })?;

        Ok(())
    }
}
