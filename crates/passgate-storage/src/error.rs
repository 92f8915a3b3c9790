use thiserror::Error;

/// Storage-specific error types for the passgate ledger.
///
/// None of these leave the store partially mutated: a failed presentation
/// records nothing and a failed reset clears nothing.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database connection or query execution failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration execution failed
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored counter is not a decimal count
    #[error("Corrupt value for key '{key}': {value:?}")]
    CorruptValue { key: String, value: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Specialized result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
