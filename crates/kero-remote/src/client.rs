//! # API Client
//!
//! Thin `reqwest` wrapper for the spreadsheet script endpoints.
//!
//! ## Request Shapes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Read:   GET  <endpoint>?action=getSuppliers[&extra=...]               │
//! │                                                                         │
//! │  Write:  POST <endpoint>                                               │
//! │          Content-Type: text/plain;charset=utf-8                        │
//! │          {"action": "saveLog", ...payload fields}                      │
//! │                                                                         │
//! │  Response handling (every call):                                       │
//! │    non-2xx       → RemoteError::Status ("Network error: <reason>")     │
//! │    non-JSON body → RemoteError::InvalidResponse                        │
//! │    JSON body     → caller's type (envelope or raw payload)             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The script host rejects CORS preflights, so writes go out as plain text
//! carrying JSON. Each call runs in a span with a fresh request id.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info_span, warn, Instrument};
use url::Url;
use uuid::Uuid;

use crate::error::{RemoteError, RemoteResult};

/// Fallback when an envelope reports failure without saying why.
pub const UNKNOWN_API_ERROR: &str = "An unknown API error occurred.";

const PLAIN_TEXT_JSON: &str = "text/plain;charset=utf-8";

// =============================================================================
// Response Envelope
// =============================================================================

/// `{ success, data?, error?|message? }` as returned by the pricing and
/// returns endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,

    pub data: Option<T>,

    #[serde(default)]
    pub error: Option<Value>,

    #[serde(default)]
    pub message: Option<Value>,
}

impl<T> Envelope<T> {
    /// Reason the server gave, `error` before `message`.
    pub fn reason(&self) -> Option<String> {
        self.error
            .as_ref()
            .or(self.message.as_ref())
            .and_then(value_text)
    }

    /// The payload of a successful envelope.
    pub fn into_data(self, action: &str) -> RemoteResult<T> {
        if !self.success {
            return Err(RemoteError::Server(
                self.reason().unwrap_or_else(|| UNKNOWN_API_ERROR.to_string()),
            ));
        }
        self.data.ok_or_else(|| RemoteError::MissingData(action.to_string()))
    }

    /// The message of a successful write, if the server sent one.
    pub fn into_message(self) -> RemoteResult<Option<String>> {
        if !self.success {
            return Err(RemoteError::Server(
                self.reason().unwrap_or_else(|| UNKNOWN_API_ERROR.to_string()),
            ));
        }
        Ok(self.message.as_ref().and_then(value_text))
    }
}

/// Display text of a reason field. Null and empty read as absent.
pub(crate) fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// =============================================================================
// Client
// =============================================================================

/// Client bound to one script endpoint.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client for `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> RemoteResult<Self> {
        let base_url = Url::parse(base_url)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::InvalidConfig(format!("Failed to build HTTP client: {e}")))?;

        Ok(ApiClient { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `<endpoint>?action=<action>&<extra...>`
    pub fn action_url(&self, action: &str, extra: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("action", action);
            for (key, value) in extra {
                query.append_pair(key, value);
            }
        }
        url
    }

    /// GET an action and decode the JSON body.
    pub async fn get_action<T: DeserializeOwned>(
        &self,
        action: &str,
        extra: &[(&str, &str)],
    ) -> RemoteResult<T> {
        let url = self.action_url(action, extra);
        let span = info_span!("remote_get", request_id = %Uuid::new_v4(), action);

        async move {
            debug!(url = %url, "Sending request");
            let response = self.client.get(url).send().await?;
            Self::handle_response(response).await
        }
        .instrument(span)
        .await
    }

    /// POST an action with `body` plus an `action` field.
    ///
    /// `body` must serialize to a JSON object.
    pub async fn post_action<T: DeserializeOwned, B: Serialize>(
        &self,
        action: &str,
        body: &B,
    ) -> RemoteResult<T> {
        let mut payload = serde_json::to_value(body)?;
        let Some(fields) = payload.as_object_mut() else {
            return Err(RemoteError::InvalidConfig(format!(
                "Request body for '{action}' must be a JSON object"
            )));
        };
        fields.insert("action".to_string(), Value::String(action.to_string()));
        let text = serde_json::to_string(&payload)?;

        let span = info_span!("remote_post", request_id = %Uuid::new_v4(), action);

        async move {
            debug!(bytes = text.len(), "Sending request");
            let response = self
                .client
                .post(self.base_url.clone())
                .header(CONTENT_TYPE, PLAIN_TEXT_JSON)
                .body(text)
                .send()
                .await?;
            Self::handle_response(response).await
        }
        .instrument(span)
        .await
    }

    /// Handle the HTTP response
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> RemoteResult<T> {
        let status = response.status();

        if !status.is_success() {
            warn!(status = status.as_u16(), "Request failed");
            return Err(RemoteError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("unknown status").to_string(),
            });
        }

        let text = response.text().await?;
        debug!(bytes = text.len(), "Response received");
        serde_json::from_str(&text).map_err(Into::into)
    }
}

#[cfg(test)]
pub(crate) mod test_server {
    //! Local stand-in for a script endpoint.

    use axum::Router;
    use tokio::net::TcpListener;

    /// Serves `router` on an ephemeral port and returns its `/exec` URL.
    pub async fn spawn(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/exec")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    fn client(url: &str) -> ApiClient {
        ApiClient::new(url, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_action_url() {
        let api = client("https://example.com/macros/s/abc/exec");
        let url = api.action_url("getItemDatabase", &[("force", "true"), ("t", "42")]);
        assert_eq!(
            url.as_str(),
            "https://example.com/macros/s/abc/exec?action=getItemDatabase&force=true&t=42"
        );
    }

    #[test]
    fn test_envelope_failure_reasons() {
        let env: Envelope<Vec<u8>> = serde_json::from_value(json!({"success": false})).unwrap();
        assert_eq!(env.into_data("x").unwrap_err().to_string(), UNKNOWN_API_ERROR);

        let env: Envelope<Vec<u8>> =
            serde_json::from_value(json!({"success": false, "message": "Sheet missing"})).unwrap();
        assert_eq!(env.into_data("x").unwrap_err().to_string(), "Sheet missing");

        let env: Envelope<Vec<u8>> = serde_json::from_value(json!({"success": true})).unwrap();
        assert!(matches!(env.into_data("x"), Err(RemoteError::MissingData(_))));
    }

    #[tokio::test]
    async fn test_get_sends_action_query() {
        let router = Router::new().route(
            "/exec",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                Json(json!({ "success": true, "data": params.get("action") }))
            }),
        );
        let url = test_server::spawn(router).await;

        let env: Envelope<String> = client(&url).get_action("getBranches", &[]).await.unwrap();
        assert_eq!(env.into_data("getBranches").unwrap(), "getBranches");
    }

    #[tokio::test]
    async fn test_post_embeds_action_as_plain_text() {
        let router = Router::new().route(
            "/exec",
            axum::routing::post(|headers: HeaderMap, body: String| async move {
                let content_type = headers
                    .get("content-type")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
                Json(json!({ "success": true, "data": { "contentType": content_type, "body": parsed } }))
            }),
        );
        let url = test_server::spawn(router).await;

        let env: Envelope<serde_json::Value> = client(&url)
            .post_action("deleteUser", &json!({ "username": "mona" }))
            .await
            .unwrap();
        let data = env.into_data("deleteUser").unwrap();
        assert_eq!(data["contentType"], "text/plain;charset=utf-8");
        assert_eq!(data["body"], json!({ "username": "mona", "action": "deleteUser" }));
    }

    #[tokio::test]
    async fn test_non_object_body_is_rejected() {
        let api = client("http://127.0.0.1:9/exec");
        let err = api.post_action::<Value, _>("saveLog", &vec![1, 2]).await.unwrap_err();
        assert!(err.is_config_error());
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let router = Router::new().route(
            "/exec",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let url = test_server::spawn(router).await;

        let err = client(&url)
            .get_action::<Value>("getLogs", &[])
            .await
            .unwrap_err();
        assert!(err.is_transport_error());
        assert_eq!(err.to_string(), "Network error: Internal Server Error");
    }

    #[tokio::test]
    async fn test_non_json_body() {
        let router = Router::new().route("/exec", get(|| async { "<html>login</html>" }));
        let url = test_server::spawn(router).await;

        let err = client(&url).get_action::<Value>("getLogs", &[]).await.unwrap_err();
        assert!(matches!(err, RemoteError::InvalidResponse(_)));
    }
}
