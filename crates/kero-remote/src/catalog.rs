//! # Catalog Fetcher
//!
//! Loads the item database from the pricing endpoint.
//!
//! ## Load Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  load_into(catalog, force)                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  GET ?action=getItemDatabase[&force=true&t=<millis>]                   │
//! │       │                                                                 │
//! │       ├── ok       → replace catalog                                   │
//! │       │              "Database loaded successfully from API!"          │
//! │       │              "Database refreshed successfully!" (force)        │
//! │       │                                                                 │
//! │       └── failure  → catalog untouched                                 │
//! │                      "Error loading database: <reason>."               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A forced load adds a millisecond timestamp so no cache in between can
//! answer it.

use chrono::Utc;
use kero_core::CatalogItem;
use tracing::{info, warn};

use crate::client::{ApiClient, Envelope};
use crate::config::KeroConfig;
use crate::error::RemoteResult;
use crate::notice::Notice;

pub const GET_ITEM_DATABASE: &str = "getItemDatabase";

pub const LOADED_MESSAGE: &str = "Database loaded successfully from API!";
pub const REFRESHED_MESSAGE: &str = "Database refreshed successfully!";
pub const CLEARED_MESSAGE: &str = "In-memory database cleared!";
pub const CLEAR_PROMPT: &str =
    "Are you sure you want to clear the locally loaded database? This will require a refresh to fetch it again.";

#[derive(Debug, Clone)]
pub struct CatalogFetcher {
    client: ApiClient,
}

impl CatalogFetcher {
    pub fn new(client: ApiClient) -> Self {
        CatalogFetcher { client }
    }

    pub fn from_config(config: &KeroConfig) -> RemoteResult<Self> {
        Ok(Self::new(ApiClient::new(
            &config.endpoints.pricing_url,
            config.request_timeout(),
        )?))
    }

    /// Fetches the full item list.
    pub async fn fetch(&self, force: bool) -> RemoteResult<Vec<CatalogItem>> {
        let stamp = Utc::now().timestamp_millis().to_string();
        let extra: Vec<(&str, &str)> = if force {
            vec![("force", "true"), ("t", stamp.as_str())]
        } else {
            Vec::new()
        };

        let envelope: Envelope<Vec<CatalogItem>> =
            self.client.get_action(GET_ITEM_DATABASE, &extra).await?;
        envelope.into_data(GET_ITEM_DATABASE)
    }

    /// Replaces `catalog` on success; leaves it alone on failure.
    pub async fn load_into(&self, catalog: &mut Vec<CatalogItem>, force: bool) -> Notice {
        match self.fetch(force).await {
            Ok(items) => {
                info!(items = items.len(), force, "Catalog loaded");
                *catalog = items;
                Notice::success(if force { REFRESHED_MESSAGE } else { LOADED_MESSAGE })
            }
            Err(e) => {
                warn!(error = %e, kept = catalog.len(), "Catalog load failed");
                Notice::error(format!("Error loading database: {e}."))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_server;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;
    use std::time::Duration;

    async fn fetcher(router: Router) -> CatalogFetcher {
        let url = test_server::spawn(router).await;
        CatalogFetcher::new(ApiClient::new(&url, Duration::from_secs(5)).unwrap())
    }

    fn catalog_router() -> Router {
        Router::new().route(
            "/exec",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                let forced = params.get("force").map(String::as_str) == Some("true")
                    && params.get("t").is_some_and(|t| t.parse::<i64>().is_ok());
                let name = if forced { "Fresh Widget" } else { "Widget" };
                Json(json!({
                    "success": true,
                    "data": [{ "code": "A1", "name": name, "supplier name": "X" }]
                }))
            }),
        )
    }

    #[tokio::test]
    async fn test_load_replaces_catalog() {
        let fetcher = fetcher(catalog_router()).await;
        let mut catalog = vec![CatalogItem::new("OLD", "Old", "Y")];

        let notice = fetcher.load_into(&mut catalog, false).await;
        assert_eq!(notice, Notice::success(LOADED_MESSAGE));
        assert_eq!(catalog, vec![CatalogItem::new("A1", "Widget", "X")]);
    }

    #[tokio::test]
    async fn test_forced_load_busts_cache() {
        let fetcher = fetcher(catalog_router()).await;
        let mut catalog = Vec::new();

        let notice = fetcher.load_into(&mut catalog, true).await;
        assert_eq!(notice.message, REFRESHED_MESSAGE);
        assert_eq!(catalog[0].name, "Fresh Widget");
    }

    #[tokio::test]
    async fn test_server_failure_keeps_catalog() {
        let router = Router::new().route(
            "/exec",
            get(|| async { Json(json!({ "success": false, "error": "Sheet not found" })) }),
        );
        let fetcher = fetcher(router).await;
        let mut catalog = vec![CatalogItem::new("A1", "Widget", "X")];

        let notice = fetcher.load_into(&mut catalog, false).await;
        assert!(notice.is_error());
        assert_eq!(notice.message, "Error loading database: Sheet not found.");
        assert_eq!(catalog.len(), 1);
    }

    #[tokio::test]
    async fn test_http_failure_notice() {
        let router = Router::new().route(
            "/exec",
            get(|| async { StatusCode::SERVICE_UNAVAILABLE.into_response() }),
        );
        let fetcher = fetcher(router).await;
        let mut catalog = Vec::new();

        let notice = fetcher.load_into(&mut catalog, false).await;
        assert_eq!(
            notice.message,
            "Error loading database: Network error: Service Unavailable."
        );
    }

    #[tokio::test]
    async fn test_failure_without_reason() {
        let router = Router::new().route("/exec", get(|| async { Json(json!({ "success": false })) }));
        let fetcher = fetcher(router).await;

        let err = fetcher.fetch(false).await.unwrap_err();
        assert_eq!(err.to_string(), crate::client::UNKNOWN_API_ERROR);
    }
}
