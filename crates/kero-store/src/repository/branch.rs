//! # Branch Repository
//!
//! The selected branch name, stored as plain text under `pricingAppBranch`.

use kero_core::{Branch, BRANCH_KEY};
use tracing::{info, warn};

use crate::error::StoreResult;
use crate::repository::kv::KeyValueRepository;

#[derive(Debug, Clone)]
pub struct BranchRepository {
    kv: KeyValueRepository,
}

impl BranchRepository {
    pub fn new(kv: KeyValueRepository) -> Self {
        BranchRepository { kv }
    }

    /// The stored branch. Names outside the branch list read as unset.
    pub async fn load(&self) -> StoreResult<Option<Branch>> {
        let Some(name) = self.kv.get(BRANCH_KEY).await? else {
            return Ok(None);
        };
        match Branch::parse(&name) {
            Ok(branch) => Ok(Some(branch)),
            Err(e) => {
                warn!(stored = %name, error = %e, "Ignoring stored branch");
                Ok(None)
            }
        }
    }

    pub async fn save(&self, branch: &Branch) -> StoreResult<()> {
        self.kv.set(BRANCH_KEY, branch.as_str()).await?;
        info!(branch = %branch, "Branch selected");
        Ok(())
    }

    pub async fn clear(&self) -> StoreResult<()> {
        self.kv.remove(BRANCH_KEY).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{Store, StoreConfig};
    use kero_core::{Branch, BRANCH_KEY};

    #[tokio::test]
    async fn test_save_and_load() {
        let store = Store::open(StoreConfig::in_memory()).await.unwrap();
        let repo = store.branch();
        assert_eq!(repo.load().await.unwrap(), None);

        let branch = Branch::by_position(3).unwrap();
        repo.save(&branch).await.unwrap();
        assert_eq!(repo.load().await.unwrap(), Some(branch.clone()));
        assert_eq!(
            store.kv().get(BRANCH_KEY).await.unwrap().as_deref(),
            Some(branch.as_str())
        );
    }

    #[tokio::test]
    async fn test_unknown_stored_name_reads_unset() {
        let store = Store::open(StoreConfig::in_memory()).await.unwrap();
        store.kv().set(BRANCH_KEY, "Nowhere").await.unwrap();
        assert_eq!(store.branch().load().await.unwrap(), None);
    }
}
