//! # Session Repository
//!
//! The login record under `keroUser`. The text is handed to the session gate
//! as stored, so an unreadable record can be detected and removed there.

use kero_core::session::Session;
use kero_core::SESSION_KEY;
use tracing::info;

use crate::error::{StoreError, StoreResult};
use crate::repository::kv::KeyValueRepository;

#[derive(Debug, Clone)]
pub struct SessionRepository {
    kv: KeyValueRepository,
}

impl SessionRepository {
    pub fn new(kv: KeyValueRepository) -> Self {
        SessionRepository { kv }
    }

    /// Stored record text, if any.
    pub async fn load_raw(&self) -> StoreResult<Option<String>> {
        self.kv.get(SESSION_KEY).await
    }

    pub async fn save(&self, session: &Session) -> StoreResult<()> {
        let raw = serde_json::to_string(session).map_err(|e| StoreError::encode(SESSION_KEY, e))?;
        self.kv.set(SESSION_KEY, &raw).await?;
        info!(username = %session.username, "Session stored");
        Ok(())
    }

    /// Removes the record. Returns true if one was stored.
    pub async fn clear(&self) -> StoreResult<bool> {
        let removed = self.kv.remove(SESSION_KEY).await?;
        if removed {
            info!("Session removed");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Store, StoreConfig};
    use kero_core::session::{gate, GateDecision, Permissions, Session};

    #[tokio::test]
    async fn test_saved_session_passes_gate() {
        let store = Store::open(StoreConfig::in_memory()).await.unwrap();
        let repo = store.session();

        let mut permissions = Permissions::new();
        permissions.insert("admin", serde_json::Value::Bool(true));
        repo.save(&Session::new("mona", permissions)).await.unwrap();

        let raw = repo.load_raw().await.unwrap();
        match gate(raw.as_deref(), &["admin"]) {
            GateDecision::Granted(session) => assert_eq!(session.username, "mona"),
            other => panic!("expected granted, got {other:?}"),
        }

        assert!(repo.clear().await.unwrap());
        assert!(!repo.clear().await.unwrap());
        assert_eq!(repo.load_raw().await.unwrap(), None);
    }
}
