//! Integration tests for the ledger database
//!
//! These tests exercise migrations, on-disk persistence across pool
//! restarts and concurrent access against SQLite.
//!
//! Run with: cargo test --package passgate-storage --test integration_ledger

use passgate_core::{AccessDecision, Code};
use passgate_storage::{
    AccessLedger, Database, DatabaseConfig, KeyValueStore, SqliteKeyValueStore,
};
use std::sync::Arc;
use tokio::sync::Barrier;

#[tokio::test]
async fn test_in_memory_database() {
    let db = Database::in_memory().await.unwrap();
    db.health_check().await.unwrap();
    db.close().await;
}

#[tokio::test]
async fn test_migration_idempotency() {
    let db = Database::in_memory().await.unwrap();

    db.migrate().await.unwrap();
    db.migrate().await.unwrap();

    let result: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='kv_store'")
            .fetch_one(db.pool())
            .await
            .unwrap();

    assert_eq!(result.0, 1);

    db.close().await;
}

#[tokio::test]
async fn test_counts_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gate").join("passgate.db");
    let path = path.to_str().unwrap().to_string();
    let code = Code::from("ABC123");

    {
        let db = Database::new(DatabaseConfig::new(path.clone())).await.unwrap();
        let ledger = AccessLedger::new(SqliteKeyValueStore::new(db.pool().clone()));
        for _ in 0..4 {
            ledger.record_presentation(&code).await.unwrap();
        }
        db.close().await;
    }

    let db = Database::new(DatabaseConfig::new(path)).await.unwrap();
    let ledger = AccessLedger::new(SqliteKeyValueStore::new(db.pool().clone()));

    let presentation = ledger.record_presentation(&code).await.unwrap();
    assert_eq!(presentation.count.get(), 5);
    assert_eq!(presentation.decision, AccessDecision::Deny);

    db.close().await;
}

#[tokio::test]
async fn test_values_are_decimal_strings() {
    let db = Database::in_memory().await.unwrap();
    let ledger = AccessLedger::new(SqliteKeyValueStore::new(db.pool().clone()));
    let code = Code::from("XYZ");

    for _ in 0..12 {
        ledger.record_presentation(&code).await.unwrap();
    }

    let (value,): (String,) = sqlx::query_as("SELECT value FROM kv_store WHERE key = ?")
        .bind("XYZ")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(value, "12");

    db.close().await;
}

#[tokio::test]
async fn test_concurrent_reads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("concurrent.db");
    let db = Database::new(DatabaseConfig::new(path.to_str().unwrap()))
        .await
        .unwrap();
    let store = SqliteKeyValueStore::new(db.pool().clone());

    const NUM_CONCURRENT_TASKS: usize = 8;
    for i in 0..NUM_CONCURRENT_TASKS {
        store.set(&format!("code-{i}"), &i.to_string()).await.unwrap();
    }

    let barrier = Arc::new(Barrier::new(NUM_CONCURRENT_TASKS));
    let mut handles = vec![];

    for i in 0..NUM_CONCURRENT_TASKS {
        let store = store.clone();
        let barrier = barrier.clone();

        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            store.get(&format!("code-{i}")).await.unwrap()
        }));
    }

    let results: Vec<_> = futures::future::join_all(handles).await;

    for (i, result) in results.into_iter().enumerate() {
        assert_eq!(result.unwrap(), Some(i.to_string()));
    }

    db.close().await;
}
