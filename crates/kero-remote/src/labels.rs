//! # Labels Endpoint
//!
//! Branch categories and label items. Both actions answer with a bare JSON
//! array; failures come back as `{ "error": true, "message": "..." }`.

use kero_core::label::{label_items_from_rows, BranchCategory, LabelItem, RawLabelItem};
use kero_core::session::is_truthy;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::client::{value_text, ApiClient, UNKNOWN_API_ERROR};
use crate::config::KeroConfig;
use crate::error::{RemoteError, RemoteResult};

pub const GET_BRANCH_CATEGORIES: &str = "getBranchCategories";
pub const GET_ITEMS: &str = "getItems";

pub fn categories_failed_message(err: &RemoteError) -> String {
    format!("فشل تحميل فئات الفروع: {err}.")
}

pub fn items_failed_message(err: &RemoteError) -> String {
    format!("فشل تحميل بيانات الأصناف: {err}.")
}

#[derive(Debug, Clone)]
pub struct LabelsApi {
    client: ApiClient,
}

impl LabelsApi {
    pub fn new(client: ApiClient) -> Self {
        LabelsApi { client }
    }

    pub fn from_config(config: &KeroConfig) -> RemoteResult<Self> {
        Ok(Self::new(ApiClient::new(
            &config.endpoints.labels_url,
            config.request_timeout(),
        )?))
    }

    pub async fn branch_categories(&self) -> RemoteResult<Vec<BranchCategory>> {
        self.read_array(GET_BRANCH_CATEGORIES).await
    }

    /// Label items with ids assigned.
    pub async fn items(&self) -> RemoteResult<Vec<LabelItem>> {
        let rows: Vec<RawLabelItem> = self.read_array(GET_ITEMS).await?;
        Ok(label_items_from_rows(rows))
    }

    async fn read_array<T: DeserializeOwned>(&self, action: &str) -> RemoteResult<Vec<T>> {
        let body: Value = self.client.get_action(action, &[]).await?;
        if let Some(flag) = body.get("error") {
            if is_truthy(flag) {
                let reason = body
                    .get("message")
                    .and_then(value_text)
                    .unwrap_or_else(|| UNKNOWN_API_ERROR.to_string());
                return Err(RemoteError::Server(reason));
            }
        }
        let rows: Vec<T> = serde_json::from_value(body)?;
        debug!(action, rows = rows.len(), "Rows received");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_server;
    use axum::extract::Query;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;
    use std::time::Duration;

    async fn api(router: Router) -> LabelsApi {
        let url = test_server::spawn(router).await;
        LabelsApi::new(ApiClient::new(&url, Duration::from_secs(5)).unwrap())
    }

    #[tokio::test]
    async fn test_reads_bare_arrays() {
        let router = Router::new().route(
            "/exec",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                match params.get("action").map(String::as_str) {
                    Some(GET_BRANCH_CATEGORIES) => Json(json!([
                        { "branchCode": 7, "branchName": "Maadi", "category": "A" }
                    ])),
                    _ => Json(json!([
                        { "name": "Rice 1kg", "code": 1001, "prices": { "a": 30, "b": "32.5" } },
                        { "id": 40, "name": "Tea", "code": "T1", "prices": {} }
                    ])),
                }
            }),
        );
        let api = api(router).await;

        let categories = api.branch_categories().await.unwrap();
        assert_eq!(categories[0].branch_code, "7");

        let items = api.items().await.unwrap();
        assert_eq!(items[0].id, 0);
        assert_eq!(items[0].code, "1001");
        assert_eq!(items[0].price_for("b").format_fixed(2), "32.50");
        assert_eq!(items[1].id, 40);
    }

    #[tokio::test]
    async fn test_error_object() {
        let router = Router::new().route(
            "/exec",
            get(|| async { Json(json!({ "error": true, "message": "Sheet 'Items' not found" })) }),
        );
        let api = api(router).await;

        let err = api.items().await.unwrap_err();
        assert_eq!(
            items_failed_message(&err),
            "فشل تحميل بيانات الأصناف: Sheet 'Items' not found."
        );
    }
}
