pub mod kv;

pub use kv::{KeyValueStore, SqliteKeyValueStore};
