//! SQLite pool for the presentation ledger.
//!
//! File databases run in WAL mode so a reader (a diagnostic `sqlite3`
//! session, say) never blocks the gate's writes. Migrations are embedded at
//! compile time from the workspace `migrations/` directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use sqlx::ConnectOptions;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};

/// How to open the ledger database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Database file; parent directories are created on open
    pub path: PathBuf,

    /// Upper bound of pooled connections
    pub pool_size: u32,

    /// Connections kept open while idle
    pub min_idle: u32,

    /// Connections older than this are recycled
    pub connection_lifetime: Duration,

    /// How long a caller waits for a free connection
    pub acquire_timeout: Duration,

    /// How long SQLite retries a locked database before failing
    pub busy_timeout: Duration,

    /// Create the file when it does not exist
    pub create_if_missing: bool,

    /// Apply pending migrations on open
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("passgate.db"),
            pool_size: 4,
            min_idle: 1,
            connection_lifetime: Duration::from_secs(30 * 60),
            acquire_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_secs(10),
            create_if_missing: true,
            run_migrations: true,
        }
    }
}

impl DatabaseConfig {
    /// Default settings for the database at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn pool_size(mut self, size: u32) -> Self {
        self.pool_size = size;
        self
    }

    pub fn min_idle(mut self, connections: u32) -> Self {
        self.min_idle = connections;
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    fn connect_options(&self) -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            .filename(&self.path)
            .create_if_missing(self.create_if_missing)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(self.busy_timeout)
            .disable_statement_logging()
    }
}

/// Shared handle to the ledger database.
///
/// Cloning is cheap; every clone uses the same pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (and by default migrate) the database described by `config`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use passgate_storage::connection::{Database, DatabaseConfig};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let db = Database::new(DatabaseConfig::new("/var/lib/passgate/ledger.db")).await?;
    /// db.health_check().await?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Configuration` if the parent directory cannot
    /// be created, or the sqlx error if the file cannot be opened.
    pub async fn new(config: DatabaseConfig) -> StorageResult<Self> {
        ensure_parent_dir(&config.path)?;

        let pool = SqlitePoolOptions::new()
            .max_connections(config.pool_size)
            .min_connections(config.min_idle)
            .max_lifetime(Some(config.connection_lifetime))
            .acquire_timeout(config.acquire_timeout)
            .connect_with(config.connect_options())
            .await?;

        info!(path = %config.path.display(), "Opened ledger database");

        let db = Self { pool };
        if config.run_migrations {
            db.migrate().await?;
        }
        Ok(db)
    }

    /// Open a private, migrated in-memory database.
    ///
    /// The pool pins a single connection for its whole life, since an
    /// in-memory SQLite database disappears with its last connection.
    pub async fn in_memory() -> StorageResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(SqliteConnectOptions::new().in_memory(true))
            .await?;

        debug!("Opened in-memory ledger database");

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Apply the embedded migrations. Already applied ones are skipped.
    pub async fn migrate(&self) -> StorageResult<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        debug!("Ledger schema up to date");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close every connection once in-flight queries finish.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Round-trip a trivial query.
    pub async fn health_check(&self) -> StorageResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn ensure_parent_dir(path: &Path) -> StorageResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::Configuration(format!(
                    "cannot create {}: {e}",
                    parent.display()
                ))
            })
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = DatabaseConfig::default();

        assert_eq!(config.path, PathBuf::from("passgate.db"));
        assert_eq!(config.pool_size, 4);
        assert_eq!(config.min_idle, 1);
        assert_eq!(config.connection_lifetime, Duration::from_secs(1800));
        assert_eq!(config.busy_timeout, Duration::from_secs(10));
        assert!(config.create_if_missing);
        assert!(config.run_migrations);
    }

    #[test]
    fn test_config_builder() {
        let config = DatabaseConfig::new("gate/ledger.db")
            .pool_size(2)
            .min_idle(0)
            .acquire_timeout(Duration::from_secs(3))
            .busy_timeout(Duration::from_secs(1))
            .create_if_missing(false)
            .run_migrations(false);

        assert_eq!(config.path, PathBuf::from("gate/ledger.db"));
        assert_eq!(config.pool_size, 2);
        assert_eq!(config.min_idle, 0);
        assert_eq!(config.acquire_timeout, Duration::from_secs(3));
        assert_eq!(config.busy_timeout, Duration::from_secs(1));
        assert!(!config.create_if_missing);
        assert!(!config.run_migrations);
    }

    #[tokio::test]
    async fn test_missing_file_without_create_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig::new(dir.path().join("absent.db")).create_if_missing(false);

        assert!(matches!(
            Database::new(config).await,
            Err(StorageError::Database(_))
        ));
    }

    #[test]
    fn test_parent_dir_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b").join("ledger.db");

        ensure_parent_dir(&nested).unwrap();
        assert!(nested.parent().unwrap().is_dir());
        ensure_parent_dir(Path::new("ledger.db")).unwrap();
    }
}
