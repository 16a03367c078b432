//! Redis session store tests.
//!
//! These need a running Redis instance.
//! Run with: REDIS_URL=redis://localhost:6379 cargo test --features cache --test session_redis_test -- --ignored

#![cfg(feature = "cache")]

use gcash_payments::session::{
    new_session_token, PendingIdentity, RedisSessionConfig, RedisSessionStore, SessionStore,
};
use rust_decimal::Decimal;
use std::time::Duration;

async fn setup_store(ttl: Duration) -> RedisSessionStore {
    let config = RedisSessionConfig {
        redis_url: std::env::var("REDIS_URL")
            .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
        ttl,
        ..Default::default()
    };

    RedisSessionStore::connect(config)
        .await
        .expect("Failed to connect to Redis")
}

fn identity() -> PendingIdentity {
    PendingIdentity {
        client_id: 42,
        client_name: "Juan Dela Cruz".to_string(),
        account_number: "ACC100".to_string(),
        amount: Decimal::new(25000, 2),
    }
}

#[tokio::test]
#[ignore]
async fn test_put_get_remove() {
    let store = setup_store(Duration::from_secs(60)).await;
    let token = new_session_token();

    store.put(&token, &identity()).await.unwrap();
    assert_eq!(store.get(&token).await.unwrap(), Some(identity()));

    store.remove(&token).await.unwrap();
    assert!(store.get(&token).await.unwrap().is_none());
}

#[tokio::test]
#[ignore]
async fn test_entries_expire() {
    let store = setup_store(Duration::from_secs(1)).await;
    let token = new_session_token();

    store.put(&token, &identity()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(2100)).await;

    assert!(store.get(&token).await.unwrap().is_none());
}

#[tokio::test]
#[ignore]
async fn test_unknown_token_is_none() {
    let store = setup_store(Duration::from_secs(60)).await;
    assert!(store.get("never-issued").await.unwrap().is_none());
}
