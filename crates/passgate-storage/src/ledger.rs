//! Persistent per-code presentation counters.
//!
//! The ledger is the only component that mutates presentation counts. Every
//! successful decode reported by the scan loop is one presentation: the
//! stored count is read (absent means zero), incremented by exactly one,
//! written back, and turned into an access decision.
//!
//! # Examples
//!
//! ```no_run
//! use passgate_core::{AccessDecision, Code};
//! use passgate_storage::{AccessLedger, Database, SqliteKeyValueStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::in_memory().await?;
//! let ledger = AccessLedger::new(SqliteKeyValueStore::new(db.pool().clone()));
//!
//! let code = Code::from("ABC123");
//! for _ in 0..4 {
//!     assert_eq!(ledger.record_presentation(&code).await?.decision, AccessDecision::Admit);
//! }
//! assert_eq!(ledger.record_presentation(&code).await?.decision, AccessDecision::Deny);
//!
//! ledger.reset().await?;
//! assert_eq!(ledger.record_presentation(&code).await?.count.get(), 1);
//! # Ok(())
//! # }
//! ```

use crate::error::{StorageError, StorageResult};
use crate::repositories::KeyValueStore;
use passgate_core::constants::ADMISSION_THRESHOLD;
use passgate_core::{AccessDecision, Code, PresentationCount};
use tracing::{debug, info, warn};

/// Result of recording one presentation of a code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presentation {
    /// The code that was presented.
    pub code: Code,

    /// Count after this presentation.
    pub count: PresentationCount,

    /// Decision derived from `count`.
    pub decision: AccessDecision,
}

/// Persistent presentation counters with a threshold access policy.
#[derive(Debug, Clone)]
pub struct AccessLedger<S> {
    store: S,
    threshold: u32,
}

impl<S: KeyValueStore> AccessLedger<S> {
    /// Create a ledger with the standard admission threshold.
    pub fn new(store: S) -> Self {
        Self::with_threshold(store, ADMISSION_THRESHOLD)
    }

    /// Create a ledger admitting while the count is at most `threshold`.
    pub fn with_threshold(store: S, threshold: u32) -> Self {
        Self { store, threshold }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Get a reference to the backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Record one presentation of `code` and decide on it.
    ///
    /// The counter advances on every call, including denied attempts.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails, or `StorageError::CorruptValue`
    /// if the stored value is not a decimal count. In both cases nothing is
    /// written.
    pub async fn record_presentation(&self, code: &Code) -> StorageResult<Presentation> {
        let previous = self.count(code).await?;
        let count = previous.next();

        self.store.set(code.as_str(), &count.to_string()).await?;

        let decision = AccessDecision::from_count(count, self.threshold);
        debug!(%code, %count, %decision, "Presentation recorded");

        Ok(Presentation {
            code: code.clone(),
            count,
            decision,
        })
    }

    /// Current count for `code` without recording a presentation.
    pub async fn count(&self, code: &Code) -> StorageResult<PresentationCount> {
        match self.store.get(code.as_str()).await? {
            None => Ok(PresentationCount::ZERO),
            Some(value) => PresentationCount::parse(&value).map_err(|_| {
                warn!(%code, %value, "Stored presentation count is corrupt");
                StorageError::CorruptValue {
                    key: code.to_string(),
                    value,
                }
            }),
        }
    }

    /// Clear every counter.
    pub async fn reset(&self) -> StorageResult<()> {
        let removed = self.store.clear().await?;
        info!(removed, "Access ledger reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Database;
    use crate::repositories::SqliteKeyValueStore;
    use rstest::rstest;

    async fn ledger() -> AccessLedger<SqliteKeyValueStore> {
        let db = Database::in_memory().await.unwrap();
        AccessLedger::new(SqliteKeyValueStore::new(db.pool().clone()))
    }

    #[tokio::test]
    async fn test_first_presentation_starts_at_one() {
        let ledger = ledger().await;
        let presentation = ledger
            .record_presentation(&Code::from("ABC123"))
            .await
            .unwrap();

        assert_eq!(presentation.count.get(), 1);
        assert_eq!(presentation.decision, AccessDecision::Admit);
        assert_eq!(
            ledger.store().get("ABC123").await.unwrap().as_deref(),
            Some("1")
        );
    }

    #[tokio::test]
    async fn test_threshold_sequence() {
        let ledger = ledger().await;
        let code = Code::from("ABC123");

        let mut decisions = Vec::new();
        for _ in 0..6 {
            decisions.push(ledger.record_presentation(&code).await.unwrap().decision);
        }

        assert_eq!(
            decisions,
            vec![
                AccessDecision::Admit,
                AccessDecision::Admit,
                AccessDecision::Admit,
                AccessDecision::Admit,
                AccessDecision::Deny,
                AccessDecision::Deny,
            ]
        );
        assert_eq!(ledger.count(&code).await.unwrap().get(), 6);
    }

    #[tokio::test]
    async fn test_codes_counted_independently() {
        let ledger = ledger().await;
        let a = Code::from("A");
        let b = Code::from("B");

        ledger.record_presentation(&a).await.unwrap();
        ledger.record_presentation(&a).await.unwrap();
        ledger.record_presentation(&b).await.unwrap();

        assert_eq!(ledger.count(&a).await.unwrap().get(), 2);
        assert_eq!(ledger.count(&b).await.unwrap().get(), 1);
    }

    #[tokio::test]
    async fn test_reset_is_total_and_idempotent() {
        let ledger = ledger().await;
        let code = Code::from("ABC123");
        for _ in 0..5 {
            ledger.record_presentation(&code).await.unwrap();
        }

        ledger.reset().await.unwrap();
        ledger.reset().await.unwrap();

        assert_eq!(ledger.count(&code).await.unwrap(), PresentationCount::ZERO);
        let presentation = ledger.record_presentation(&code).await.unwrap();
        assert_eq!(presentation.count.get(), 1);
        assert!(presentation.decision.is_admit());
    }

    #[rstest]
    #[case("NaN")]
    #[case("")]
    #[case("-3")]
    #[tokio::test]
    async fn test_corrupt_value_is_not_overwritten(#[case] stored: &str) {
        let ledger = ledger().await;
        ledger.store().set("BAD", stored).await.unwrap();

        let result = ledger.record_presentation(&Code::from("BAD")).await;
        assert!(matches!(result, Err(StorageError::CorruptValue { .. })));
        assert_eq!(
            ledger.store().get("BAD").await.unwrap().as_deref(),
            Some(stored)
        );
    }

    #[tokio::test]
    async fn test_custom_threshold() {
        let db = Database::in_memory().await.unwrap();
        let ledger = AccessLedger::with_threshold(SqliteKeyValueStore::new(db.pool().clone()), 1);
        let code = Code::from("ONCE");

        assert!(ledger.record_presentation(&code).await.unwrap().decision.is_admit());
        assert!(ledger.record_presentation(&code).await.unwrap().decision.is_deny());
        assert_eq!(ledger.threshold(), 1);
    }
}
