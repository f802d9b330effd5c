//! Working state that outlives one command: the loaded catalog, calculator
//! memory, the picked alternate supplier, the label session and the returns
//! branch. Everything sits in `local_storage` next to the ledger, as JSON.

use kero_core::label::{ActiveCategory, LabelItem, LabelSelection, PrintQueue};
use kero_core::pricing::CalculatorMemory;
use kero_core::returns::ReturnBranch;
use kero_core::CatalogItem;
use kero_store::{KeyValueRepository, StoreResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub const CATALOG_KEY: &str = "kero.catalog";
pub const CALCULATOR_KEY: &str = "kero.calculator";
pub const PENDING_UNIT_PRICE_KEY: &str = "kero.pendingUnitPrice";
pub const ALTERNATE_SUPPLIER_KEY: &str = "kero.alternateSupplier";
pub const LABEL_ITEMS_KEY: &str = "kero.labels.items";
pub const LABEL_SELECTION_KEY: &str = "kero.labels.selection";
pub const PRINT_QUEUE_KEY: &str = "kero.labels.queue";
pub const LABEL_CATEGORY_KEY: &str = "kero.labels.category";
pub const RETURNS_BRANCH_KEY: &str = "kero.returns.branch";

/// Typed access to the working-state keys.
#[derive(Debug, Clone)]
pub struct Workspace {
    kv: KeyValueRepository,
}

impl Workspace {
    pub fn new(kv: KeyValueRepository) -> Self {
        Workspace { kv }
    }

    async fn load<T: DeserializeOwned + Default>(&self, key: &str) -> StoreResult<T> {
        Ok(self.kv.get_json(key).await?.unwrap_or_default())
    }

    async fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StoreResult<()> {
        self.kv.set_json(key, value).await
    }

    // =========================================================================
    // Pricing
    // =========================================================================

    /// The item database; empty until `catalog load`.
    pub async fn catalog(&self) -> StoreResult<Vec<CatalogItem>> {
        self.load(CATALOG_KEY).await
    }

    pub async fn save_catalog(&self, items: &[CatalogItem]) -> StoreResult<()> {
        self.save(CATALOG_KEY, items).await
    }

    pub async fn clear_catalog(&self) -> StoreResult<bool> {
        self.kv.remove(CATALOG_KEY).await
    }

    pub async fn calculator_memory(&self) -> StoreResult<CalculatorMemory> {
        self.load(CALCULATOR_KEY).await
    }

    pub async fn save_calculator_memory(&self, memory: &CalculatorMemory) -> StoreResult<()> {
        self.save(CALCULATOR_KEY, memory).await
    }

    /// Unit price placed in the entry form by `price --apply`.
    pub async fn pending_unit_price(&self) -> StoreResult<Option<String>> {
        self.kv.get_json(PENDING_UNIT_PRICE_KEY).await
    }

    pub async fn set_pending_unit_price(&self, price: &str) -> StoreResult<()> {
        self.save(PENDING_UNIT_PRICE_KEY, price).await
    }

    /// Drops the pending price and resets the calculator to `(1, 0, 0)`.
    pub async fn reset_entry_form(&self) -> StoreResult<()> {
        self.kv.remove(PENDING_UNIT_PRICE_KEY).await?;
        self.save_calculator_memory(&CalculatorMemory::default()).await
    }

    pub async fn alternate_supplier(&self) -> StoreResult<Option<String>> {
        self.kv.get_json(ALTERNATE_SUPPLIER_KEY).await
    }

    pub async fn set_alternate_supplier(&self, name: &str) -> StoreResult<()> {
        self.save(ALTERNATE_SUPPLIER_KEY, name).await
    }

    pub async fn clear_alternate_supplier(&self) -> StoreResult<bool> {
        self.kv.remove(ALTERNATE_SUPPLIER_KEY).await
    }

    // =========================================================================
    // Labels
    // =========================================================================

    pub async fn label_items(&self) -> StoreResult<Vec<LabelItem>> {
        self.load(LABEL_ITEMS_KEY).await
    }

    pub async fn save_label_items(&self, items: &[LabelItem]) -> StoreResult<()> {
        self.save(LABEL_ITEMS_KEY, items).await
    }

    pub async fn label_selection(&self) -> StoreResult<LabelSelection> {
        self.load(LABEL_SELECTION_KEY).await
    }

    pub async fn save_label_selection(&self, selection: &LabelSelection) -> StoreResult<()> {
        self.save(LABEL_SELECTION_KEY, selection).await
    }

    pub async fn print_queue(&self) -> StoreResult<PrintQueue> {
        self.load(PRINT_QUEUE_KEY).await
    }

    pub async fn save_print_queue(&self, queue: &PrintQueue) -> StoreResult<()> {
        self.save(PRINT_QUEUE_KEY, queue).await
    }

    pub async fn label_category(&self) -> StoreResult<Option<ActiveCategory>> {
        self.kv.get_json(LABEL_CATEGORY_KEY).await
    }

    pub async fn save_label_category(&self, category: &ActiveCategory) -> StoreResult<()> {
        self.save(LABEL_CATEGORY_KEY, category).await
    }

    // =========================================================================
    // Returns
    // =========================================================================

    /// Branch `username` picked with `returns use-branch`. A choice made
    /// under another login is ignored.
    pub async fn returns_branch(&self, username: &str) -> StoreResult<Option<ReturnBranch>> {
        let choice: Option<ReturnsBranchChoice> = self.kv.get_json(RETURNS_BRANCH_KEY).await?;
        Ok(choice
            .filter(|choice| choice.username == username)
            .map(|choice| choice.branch))
    }

    pub async fn save_returns_branch(&self, username: &str, branch: &ReturnBranch) -> StoreResult<()> {
        let choice = ReturnsBranchChoice {
            username: username.to_string(),
            branch: branch.clone(),
        };
        self.save(RETURNS_BRANCH_KEY, &choice).await
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ReturnsBranchChoice {
    username: String,
    branch: ReturnBranch,
}
