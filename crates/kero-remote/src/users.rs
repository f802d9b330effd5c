//! # Users Endpoint
//!
//! Account listing and edits for the user-management tool.
//!
//! ## Wire Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  GET  ?action=getUsers        → { users: [...], headers: [...] }       │
//! │  POST {action: addUser, ...}  → { message }                            │
//! │  POST {action: updateUser...} → { message }                            │
//! │  POST {action: deleteUser...} → { message }                            │
//! │                                                                         │
//! │  Any of them may answer { status: "error", message } instead.          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use kero_core::users::{NewUser, UserDirectory, UserUpdate};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::client::{value_text, ApiClient, UNKNOWN_API_ERROR};
use crate::config::KeroConfig;
use crate::error::{RemoteError, RemoteResult};

pub const GET_USERS: &str = "getUsers";
pub const ADD_USER: &str = "addUser";
pub const UPDATE_USER: &str = "updateUser";
pub const DELETE_USER: &str = "deleteUser";

#[derive(Debug, Clone)]
pub struct UsersApi {
    client: ApiClient,
}

impl UsersApi {
    pub fn new(client: ApiClient) -> Self {
        UsersApi { client }
    }

    pub fn from_config(config: &KeroConfig) -> RemoteResult<Self> {
        Ok(Self::new(ApiClient::new(
            &config.endpoints.users_url,
            config.request_timeout(),
        )?))
    }

    pub async fn list(&self) -> RemoteResult<UserDirectory> {
        let body: Value = self.client.get_action(GET_USERS, &[]).await?;
        decode(body)
    }

    /// Creates an account. Returns the server's message.
    pub async fn add(&self, user: &NewUser) -> RemoteResult<Option<String>> {
        let message = self.write(ADD_USER, user).await?;
        info!(username = %user.username, "User added");
        Ok(message)
    }

    /// Applies one change. Returns the message to show the operator.
    pub async fn update(&self, update: &UserUpdate) -> RemoteResult<String> {
        let server_message = self.write(UPDATE_USER, update).await?;
        info!(username = %update.username(), "User updated");
        Ok(match update {
            // The password form shows whatever the server said.
            UserUpdate::Password { .. } => server_message.unwrap_or_else(|| update.success_message()),
            _ => update.success_message(),
        })
    }

    pub async fn delete(&self, username: &str) -> RemoteResult<Option<String>> {
        #[derive(Serialize)]
        struct DeleteRequest<'a> {
            username: &'a str,
        }

        let message = self.write(DELETE_USER, &DeleteRequest { username }).await?;
        info!(username, "User deleted");
        Ok(message)
    }

    async fn write<B: Serialize>(&self, action: &str, body: &B) -> RemoteResult<Option<String>> {
        let response: Value = self.client.post_action(action, body).await?;
        check_status(&response)?;
        Ok(response.get("message").and_then(value_text))
    }
}

/// Fails on `{ status: "error" }`.
fn check_status(body: &Value) -> RemoteResult<()> {
    if body.get("status").and_then(Value::as_str) == Some("error") {
        let reason = body
            .get("message")
            .and_then(value_text)
            .unwrap_or_else(|| UNKNOWN_API_ERROR.to_string());
        return Err(RemoteError::Server(reason));
    }
    Ok(())
}

fn decode<T: DeserializeOwned>(body: Value) -> RemoteResult<T> {
    check_status(&body)?;
    Ok(serde_json::from_value(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_server;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    async fn api(router: Router) -> UsersApi {
        let url = test_server::spawn(router).await;
        UsersApi::new(ApiClient::new(&url, Duration::from_secs(5)).unwrap())
    }

    fn recording_router(sink: Arc<Mutex<Vec<Value>>>, reply: Value) -> Router {
        Router::new().route(
            "/exec",
            axum::routing::post(move |body: String| {
                let sink = sink.clone();
                let reply = reply.clone();
                async move {
                    sink.lock().unwrap().push(serde_json::from_str(&body).unwrap());
                    Json(reply)
                }
            }),
        )
    }

    #[tokio::test]
    async fn test_list_users() {
        let router = Router::new().route(
            "/exec",
            get(|| async {
                Json(json!({
                    "users": [{ "username": "mona", "position": "Manager",
                                "permissions": { "admin": true, "AssignedBranchCode": "07" } }],
                    "headers": ["admin", "AssignedBranchCode"]
                }))
            }),
        );
        let directory = api(router).await.list().await.unwrap();
        assert_eq!(directory.columns(), vec!["Position", "admin", "AssignedBranchCode"]);
        assert_eq!(directory.find("mona").unwrap().position, "Manager");
    }

    #[tokio::test]
    async fn test_status_error() {
        let router = Router::new().route(
            "/exec",
            get(|| async { Json(json!({ "status": "error", "message": "Not authorised" })) }),
        );
        let err = api(router).await.list().await.unwrap_err();
        assert_eq!(err.to_string(), "Not authorised");
    }

    #[tokio::test]
    async fn test_add_sends_form_fields() {
        let sink = Arc::new(Mutex::new(Vec::new()));
        let api = api(recording_router(sink.clone(), json!({ "message": "User added." }))).await;

        let user = NewUser {
            username: "omar".into(),
            password: "secret".into(),
            assigned_branch_code: "07".into(),
            position: "Cashier".into(),
        };
        assert_eq!(api.add(&user).await.unwrap().as_deref(), Some("User added."));

        let sent = sink.lock().unwrap()[0].clone();
        assert_eq!(
            sent,
            json!({ "action": "addUser", "username": "omar", "password": "secret",
                    "assignedBranchCode": "07", "position": "Cashier" })
        );
    }

    #[tokio::test]
    async fn test_update_messages() {
        let sink = Arc::new(Mutex::new(Vec::new()));
        let api = api(recording_router(sink.clone(), json!({ "message": "Password changed." }))).await;

        let permissions = BTreeMap::from([("admin".to_string(), false), ("labels".to_string(), true)]);
        let message = api
            .update(&UserUpdate::Permissions {
                username: "mona".into(),
                permissions,
            })
            .await
            .unwrap();
        assert_eq!(message, "Permissions updated for mona.");

        let message = api
            .update(&UserUpdate::Password {
                username: "mona".into(),
                password: "n3w".into(),
            })
            .await
            .unwrap();
        assert_eq!(message, "Password changed.");

        let sent = sink.lock().unwrap().clone();
        assert_eq!(sent[0]["permissions"], json!({ "admin": false, "labels": true }));
        assert_eq!(sent[1]["action"], "updateUser");
    }

    #[tokio::test]
    async fn test_delete() {
        let sink = Arc::new(Mutex::new(Vec::new()));
        let api = api(recording_router(sink.clone(), json!({ "message": "User deleted." }))).await;

        api.delete("omar").await.unwrap();
        assert_eq!(
            sink.lock().unwrap()[0],
            json!({ "action": "deleteUser", "username": "omar" })
        );
    }
}
