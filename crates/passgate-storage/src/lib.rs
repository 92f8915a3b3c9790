//! Storage layer for the passgate access gate.
//!
//! This crate provides SQLite-backed persistence for per-code presentation
//! counters and the access ledger that turns counts into decisions.
//!
//! # Architecture
//!
//! - [`Database`] - Connection pool manager with automatic migrations
//! - [`KeyValueStore`] - Flat string-to-string durable mapping
//! - [`AccessLedger`] - Presentation counters with the threshold policy
//!
//! # Persisted Layout
//!
//! One table, `kv_store(key, value)`: the key is the decoded code and the
//! value the decimal string of its presentation count. There is no schema
//! versioning beyond the embedded migrations, and a reset deletes every key.
//!
//! # Examples
//!
//! ```no_run
//! use passgate_core::Code;
//! use passgate_storage::{AccessLedger, Database, DatabaseConfig, SqliteKeyValueStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new(DatabaseConfig::new("passgate.db")).await?;
//! let ledger = AccessLedger::new(SqliteKeyValueStore::new(db.pool().clone()));
//!
//! let presentation = ledger.record_presentation(&Code::from("XYZ")).await?;
//! println!("{} presented {} time(s): {}", presentation.code, presentation.count, presentation.decision);
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod error;
pub mod ledger;
pub mod repositories;

pub use connection::{Database, DatabaseConfig};
pub use error::{StorageError, StorageResult};
pub use ledger::{AccessLedger, Presentation};
pub use repositories::{KeyValueStore, SqliteKeyValueStore};
