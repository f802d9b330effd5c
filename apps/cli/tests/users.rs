//! User management against a stand-in users endpoint.

mod common;

use axum::routing::get;
use axum::{Json, Router};
use kero_cli::error::ErrorCode;
use kero_cli::prompt::AutoConfirm;
use kero_cli::state::AppState;
use serde_json::{json, Value};

use common::{config, login, run, run_ok, sink, spawn, state_with, Sink};

fn users_router(posted: Sink) -> Router {
    Router::new().route(
        "/exec",
        get(|| async {
            Json(json!({
                "users": [
                    { "username": "mona", "position": "Manager",
                      "permissions": { "admin": true, "cashier": "TRUE", "AssignedBranchCode": "07" } },
                    { "username": "sara", "position": "",
                      "permissions": { "admin": false, "cashier": false } }
                ],
                "headers": ["admin", "cashier", "AssignedBranchCode"]
            }))
        })
        .post(move |body: String| {
            let posted = posted.clone();
            async move {
                let body: Value = serde_json::from_str(&body).unwrap();
                let reply = match body["action"].as_str() {
                    Some("addUser") if body["username"] == "taken" => {
                        json!({ "status": "error", "message": "Username already exists." })
                    }
                    Some("updateUser") => json!({ "message": "Password changed." }),
                    _ => json!({}),
                };
                posted.lock().unwrap().push(body);
                Json(reply)
            }
        }),
    )
}

async fn users_state(permissions: Value, confirm: AutoConfirm, posted: Sink) -> AppState {
    let url = spawn(users_router(posted)).await;
    let state = state_with(config(&url), confirm).await;
    login(&state, json!({ "username": "mona", "permissions": permissions })).await;
    state
}

fn posted_bodies(posted: &Sink) -> Vec<Value> {
    posted.lock().unwrap().clone()
}

#[tokio::test]
async fn test_gate_denies_without_permission() {
    let posted = sink();
    let state = users_state(json!({ "cashier": true }), AutoConfirm::yes(), posted).await;
    let (result, _) = run(&state, &["users", "list"]).await;
    let err = result.unwrap_err();
    assert_eq!(err.code, ErrorCode::AccessDenied);
    assert_eq!(err.message, "Access Denied: You do not have permission to manage users.");
}

#[tokio::test]
async fn test_gate_redirects_without_session() {
    let url = spawn(users_router(sink())).await;
    let state = state_with(config(&url), AutoConfirm::yes()).await;
    let (result, _) = run(&state, &["users", "list"]).await;
    let err = result.unwrap_err();
    assert_eq!(err.code, ErrorCode::LoginRequired);
    assert!(err.message.contains("/login/"));
}

#[tokio::test]
async fn test_list_shows_position_first() {
    let posted = sink();
    let state = users_state(json!({ "user-management": "yes" }), AutoConfirm::yes(), posted).await;
    let out = run_ok(&state, &["users", "list"]).await;

    let header = out.lines().next().unwrap();
    assert!(header.starts_with("Username"));
    assert!(header.find("Position").unwrap() < header.find("admin").unwrap());
    assert!(out.contains("07"));
    assert!(out.ends_with("2 users\n"));
}

#[tokio::test]
async fn test_grant_sends_full_permission_map() {
    let posted = sink();
    let state = users_state(json!({ "admin": true }), AutoConfirm::yes(), posted.clone()).await;

    let out = run_ok(&state, &["users", "grant", "sara", "cashier"]).await;
    assert_eq!(out, "Permissions updated for sara.\n");

    let bodies = posted_bodies(&posted);
    assert_eq!(bodies[0]["action"], "updateUser");
    assert_eq!(bodies[0]["username"], "sara");
    assert_eq!(bodies[0]["permissions"], json!({ "admin": false, "cashier": true }));

    let (result, _) = run(&state, &["users", "grant", "sara", "superuser"]).await;
    assert_eq!(result.unwrap_err().code, ErrorCode::ValidationError);
    let (result, _) = run(&state, &["users", "revoke", "nobody", "admin"]).await;
    assert_eq!(result.unwrap_err().code, ErrorCode::NotFound);
}

#[tokio::test]
async fn test_password_reset_shows_server_message() {
    let posted = sink();
    let state = users_state(json!({ "admin": true }), AutoConfirm::yes(), posted.clone()).await;
    let out = run_ok(&state, &["users", "password", "sara", "s3cret"]).await;
    assert_eq!(out, "Password changed.\n");
    assert_eq!(posted_bodies(&posted)[0]["password"], "s3cret");
}

#[tokio::test]
async fn test_add_validates_then_reports_server_errors() {
    let posted = sink();
    let state = users_state(json!({ "admin": true }), AutoConfirm::yes(), posted.clone()).await;

    let (result, _) = run(&state, &["users", "add", "new-user"]).await;
    let err = result.unwrap_err();
    assert!(err.message.contains("Password is required for new users."));
    assert!(posted_bodies(&posted).is_empty());

    let (result, _) = run(&state, &["users", "add", "taken", "--password", "x"]).await;
    let err = result.unwrap_err();
    assert_eq!(err.code, ErrorCode::RemoteError);
    assert_eq!(err.message, "Username already exists.");

    let out = run_ok(
        &state,
        &["users", "add", " ali ", "--password", "x", "--branch", " 7 ", "--position", "Cashier"],
    )
    .await;
    assert_eq!(out, "User added.\n");
    let bodies = posted_bodies(&posted);
    let added = bodies.last().unwrap();
    assert_eq!(added["username"], "ali");
    assert_eq!(added["assignedBranchCode"], "7");
}

#[tokio::test]
async fn test_delete_needs_confirmation() {
    let posted = sink();
    let state = users_state(json!({ "admin": true }), AutoConfirm::no(), posted.clone()).await;
    let (result, _) = run(&state, &["users", "delete", "sara"]).await;
    assert!(result.unwrap_err().is_cancelled());
    assert!(posted_bodies(&posted).is_empty());

    let posted = sink();
    let state = users_state(json!({ "admin": true }), AutoConfirm::yes(), posted.clone()).await;
    let out = run_ok(&state, &["users", "delete", "sara"]).await;
    assert_eq!(out, "User deleted.\n");
    assert_eq!(posted_bodies(&posted)[0], json!({ "action": "deleteUser", "username": "sara" }));
}
