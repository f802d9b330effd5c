//! # Returns Endpoint
//!
//! Suppliers, branches and the declaration log for the returns tool.
//!
//! Reads use the `{success, data, message}` envelope; `saveLog` answers
//! `{success, message}`.

use kero_core::returns::{ReturnBranch, ReturnLog, ReturnSupplier};
use tracing::info;

use crate::client::{ApiClient, Envelope};
use crate::config::KeroConfig;
use crate::error::{RemoteError, RemoteResult};

pub const GET_SUPPLIERS: &str = "getSuppliers";
pub const GET_BRANCHES: &str = "getBranches";
pub const GET_LOGS: &str = "getLogs";
pub const SAVE_LOG: &str = "saveLog";

/// Notice text for a failed read.
pub fn load_failed_message(err: &RemoteError) -> String {
    format!("فشل تحميل البيانات: {err}. يرجى إعادة تحميل الصفحة.")
}

/// Notice text for a failed save.
pub fn save_failed_message(err: &RemoteError) -> String {
    format!("فشل حفظ الإقرار: {err}")
}

#[derive(Debug, Clone)]
pub struct ReturnsApi {
    client: ApiClient,
}

impl ReturnsApi {
    pub fn new(client: ApiClient) -> Self {
        ReturnsApi { client }
    }

    pub fn from_config(config: &KeroConfig) -> RemoteResult<Self> {
        Ok(Self::new(ApiClient::new(
            &config.endpoints.returns_url,
            config.request_timeout(),
        )?))
    }

    pub async fn suppliers(&self) -> RemoteResult<Vec<ReturnSupplier>> {
        self.read(GET_SUPPLIERS).await
    }

    pub async fn branches(&self) -> RemoteResult<Vec<ReturnBranch>> {
        self.read(GET_BRANCHES).await
    }

    /// Every saved declaration. A missing `data` reads as no logs.
    pub async fn logs(&self) -> RemoteResult<Vec<ReturnLog>> {
        match self.read(GET_LOGS).await {
            Err(RemoteError::MissingData(_)) => Ok(Vec::new()),
            other => other,
        }
    }

    /// Appends one declaration. Returns the server's message, if any.
    pub async fn save_log(&self, log: &ReturnLog) -> RemoteResult<Option<String>> {
        let envelope: Envelope<serde_json::Value> = self.client.post_action(SAVE_LOG, log).await?;
        let message = envelope.into_message()?;
        info!(
            branch = %log.branch_code,
            supplier = %log.supplier_code,
            return_type = ?log.return_type,
            "Return declaration saved"
        );
        Ok(message)
    }

    async fn read<T: serde::de::DeserializeOwned>(&self, action: &str) -> RemoteResult<Vec<T>> {
        let envelope: Envelope<Vec<T>> = self.client.get_action(action, &[]).await?;
        envelope.into_data(action)
    }
}
