//! # Ledger Repository
//!
//! The pricing ledger, stored as one JSON array under `pricingAppEntries`.
//!
//! Every mutation rewrites the whole array. Restoring never fails on bad
//! data: a missing or unreadable array restores as an empty ledger.

use kero_core::{Ledger, ENTRIES_KEY};
use tracing::{debug, info};

use crate::error::StoreResult;
use crate::repository::kv::KeyValueRepository;

#[derive(Debug, Clone)]
pub struct LedgerRepository {
    kv: KeyValueRepository,
}

impl LedgerRepository {
    pub fn new(kv: KeyValueRepository) -> Self {
        LedgerRepository { kv }
    }

    /// Loads the stored ledger, empty on absence or parse failure.
    pub async fn restore(&self) -> StoreResult<Ledger> {
        let ledger: Ledger = self.kv.get_json(ENTRIES_KEY).await?.unwrap_or_default();
        debug!(entries = ledger.len(), "Ledger restored");
        Ok(ledger)
    }

    /// Writes the full ledger.
    pub async fn persist(&self, ledger: &Ledger) -> StoreResult<()> {
        self.kv.set_json(ENTRIES_KEY, ledger).await?;
        debug!(entries = ledger.len(), "Ledger persisted");
        Ok(())
    }

    /// Removes the stored ledger key.
    pub async fn clear(&self) -> StoreResult<()> {
        self.kv.remove(ENTRIES_KEY).await?;
        info!("Ledger cleared");
        Ok(())
    }

    /// True if a ledger is stored.
    pub async fn exists(&self) -> StoreResult<bool> {
        self.kv.contains(ENTRIES_KEY).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::{Store, StoreConfig};
    use kero_core::pricing::CalculatorMemory;
    use kero_core::validation::{validate_entry, EntryForm};
    use kero_core::{Ledger, ENTRIES_KEY};

    fn ledger_of(codes: &[&str]) -> Ledger {
        let mut ledger = Ledger::new();
        for code in codes {
            let form = EntryForm {
                code: code.to_string(),
                unit_price: "10".to_string(),
                ..Default::default()
            };
            ledger.append(validate_entry(&form, &CalculatorMemory::default()).unwrap());
        }
        ledger
    }

    #[tokio::test]
    async fn test_round_trip_preserves_order() {
        let store = Store::open(StoreConfig::in_memory()).await.unwrap();
        let repo = store.entries();

        let ledger = ledger_of(&["A", "B", "C"]);
        repo.persist(&ledger).await.unwrap();

        let restored = repo.restore().await.unwrap();
        let codes: Vec<&str> = restored.entries().iter().map(|e| e.code.as_str()).collect();
        assert_eq!(codes, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_remove_then_persist() {
        let store = Store::open(StoreConfig::in_memory()).await.unwrap();
        let repo = store.entries();

        let mut ledger = ledger_of(&["A", "B", "C"]);
        ledger.remove(2).unwrap();
        repo.persist(&ledger).await.unwrap();

        let restored = repo.restore().await.unwrap();
        assert_eq!(restored.len(), 2);
        assert_eq!(restored.get(2).unwrap().code, "C");
    }

    #[tokio::test]
    async fn test_clear_removes_key() {
        let store = Store::open(StoreConfig::in_memory()).await.unwrap();
        let repo = store.entries();

        repo.persist(&ledger_of(&["A"])).await.unwrap();
        assert!(repo.exists().await.unwrap());

        repo.clear().await.unwrap();
        assert!(!repo.exists().await.unwrap());
        assert!(repo.restore().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_value_restores_empty() {
        let store = Store::open(StoreConfig::in_memory()).await.unwrap();
        store.kv().set(ENTRIES_KEY, "{oops").await.unwrap();
        assert!(store.entries().restore().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reads_browser_shaped_array() {
        let store = Store::open(StoreConfig::in_memory()).await.unwrap();
        let raw = r#"[{"code":"A1","name":"Widget","supplier":"X","units":2,"discount":10,
            "vat":14,"piece":"51.300","case":"102.600","type":"مرتجع","current":"60"}]"#;
        store.kv().set(ENTRIES_KEY, raw).await.unwrap();

        let ledger = store.entries().restore().await.unwrap();
        let entry = ledger.get(1).unwrap();
        assert_eq!(entry.case_price.to_string(), "102.600");
        assert_eq!(entry.current_price.unwrap().to_string(), "60.000");
    }
}
