//! Stored login and idle logout.

mod common;

use std::time::{Duration, Instant};

use kero_cli::commands::session::watch_idle;
use kero_cli::error::ErrorCode;
use kero_core::SESSION_KEY;
use serde_json::json;
use tokio::io::{AsyncWriteExt, BufReader};

use common::{login, offline_state, run, run_ok};

#[tokio::test]
async fn test_store_show_and_clear() {
    let state = offline_state().await;
    let out = run_ok(&state, &["session", "show"]).await;
    assert!(out.starts_with("Not logged in."));

    let record = r#"{"username":"mona","permissions":{"admin":true,"cashier":0,"AssignedBranchCode":7},"token":"t-1"}"#;
    let out = run_ok(&state, &["session", "store", record]).await;
    assert_eq!(out, "Logged in as mona\n");

    let out = run_ok(&state, &["session", "show"]).await;
    assert_eq!(out, "User: mona\nBranch: 7\nPermissions: admin\n");

    // Fields nothing reads are kept as stored.
    let raw = state.store.kv().get(SESSION_KEY).await.unwrap().unwrap();
    assert!(raw.contains("\"token\":\"t-1\""));

    let out = run_ok(&state, &["session", "clear"]).await;
    assert_eq!(out, "Logged out.\n");
    assert!(state.store.session().load_raw().await.unwrap().is_none());
}

#[tokio::test]
async fn test_store_rejects_unreadable_record() {
    let state = offline_state().await;
    let (result, _) = run(&state, &["session", "store", "not json"]).await;
    assert_eq!(result.unwrap_err().code, ErrorCode::ValidationError);

    let (result, _) = run(&state, &["session", "store", r#"{"permissions":{}}"#]).await;
    assert_eq!(result.unwrap_err().code, ErrorCode::ValidationError);
}

#[tokio::test]
async fn test_corrupt_session_is_removed_by_gate() {
    let state = offline_state().await;
    state.store.kv().set(SESSION_KEY, "{broken").await.unwrap();

    let (result, _) = run(&state, &["returns", "branches"]).await;
    assert_eq!(result.unwrap_err().code, ErrorCode::LoginRequired);
    assert!(state.store.session().load_raw().await.unwrap().is_none());
}

#[tokio::test]
async fn test_idle_logout_after_input_ends() {
    let state = offline_state().await;
    login(&state, json!({ "username": "mona", "permissions": {} })).await;

    let mut out = Vec::new();
    let input: &[u8] = b"";
    watch_idle(&state, input, &mut out, Duration::from_millis(30))
        .await
        .unwrap();

    assert!(String::from_utf8(out).unwrap().ends_with("/login/?reason=idle\n"));
    assert!(state.store.session().load_raw().await.unwrap().is_none());
}

#[tokio::test]
async fn test_activity_postpones_logout() {
    let state = offline_state().await;
    login(&state, json!({ "username": "mona", "permissions": {} })).await;

    let (mut writer, reader) = tokio::io::duplex(64);
    tokio::spawn(async move {
        for _ in 0..5 {
            tokio::time::sleep(Duration::from_millis(40)).await;
            writer.write_all(b"key\n").await.unwrap();
        }
    });

    let started = Instant::now();
    let mut out = Vec::new();
    watch_idle(&state, BufReader::new(reader), &mut out, Duration::from_millis(250))
        .await
        .unwrap();

    // Last keystroke at 200ms or later, then a full timeout.
    assert!(started.elapsed() >= Duration::from_millis(450));
    assert!(state.store.session().load_raw().await.unwrap().is_none());
}

#[tokio::test]
async fn test_watch_needs_login() {
    let state = offline_state().await;
    let mut out = Vec::new();
    let input: &[u8] = b"";
    let err = watch_idle(&state, input, &mut out, Duration::from_millis(10))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::LoginRequired);
}
