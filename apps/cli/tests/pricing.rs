//! Pricing tool end to end: catalog, calculator, ledger, export.

mod common;

use std::collections::HashMap;
use std::time::Duration;

use axum::extract::Query;
use axum::routing::get;
use axum::{Json, Router};
use kero_cli::commands::search::watch_terms;
use kero_cli::error::ErrorCode;
use kero_cli::prompt::AutoConfirm;
use kero_core::LedgerEntry;
use kero_remote::KeroConfig;
use serde_json::json;

use common::{offline_state, run, run_ok, seed_catalog, state_with};

async fn with_branch() -> kero_cli::state::AppState {
    let state = offline_state().await;
    seed_catalog(&state).await;
    run_ok(&state, &["branch", "select", "1"]).await;
    state
}

fn entries(json_out: &str) -> Vec<LedgerEntry> {
    serde_json::from_str(json_out).unwrap()
}

#[tokio::test]
async fn test_price_prints_unit_and_case() {
    let state = offline_state().await;
    let out = run_ok(
        &state,
        &["price", "--cost", "100", "--units", "2", "--discount", "10", "--vat", "14"],
    )
    .await;
    assert_eq!(out, "Unit price: 51.300\nCase price: 102.600\n");

    let out = run_ok(&state, &["price", "--cost", "100", "--units", "0"]).await;
    assert_eq!(out, "Unit price: Invalid Input\nCase price: Invalid Input\n");
}

#[tokio::test]
async fn test_applied_price_fills_next_entry() {
    let state = with_branch().await;
    run_ok(
        &state,
        &["price", "--cost", "100", "--units", "2", "--discount", "10", "--vat", "14", "--apply"],
    )
    .await;

    let out = run_ok(&state, &["ledger", "add", "A1"]).await;
    assert!(out.starts_with("Item added to local list.\n"));
    assert!(out.ends_with("Total entries: 1\n"));

    let ledger = state.store.entries().restore().await.unwrap();
    let entry = ledger.get(1).unwrap();
    assert_eq!(entry.name, "Widget");
    assert_eq!(entry.supplier, "X");
    assert_eq!(entry.units, 2);
    assert_eq!(entry.unit_price.to_string(), "51.300");
    assert_eq!(entry.case_price.to_string(), "102.600");

    // Form and calculator memory reset after the add.
    assert_eq!(state.workspace.pending_unit_price().await.unwrap(), None);
    assert_eq!(state.workspace.calculator_memory().await.unwrap().units, 1);
}

#[tokio::test]
async fn test_add_needs_branch_and_valid_form() {
    let state = offline_state().await;
    seed_catalog(&state).await;

    let (result, _) = run(&state, &["ledger", "add", "A1", "--price", "5"]).await;
    assert_eq!(result.unwrap_err().code, ErrorCode::ValidationError);

    run_ok(&state, &["branch", "select", "1"]).await;
    let (result, _) = run(&state, &["ledger", "add", "A1", "--type", "return", "--price", "5"]).await;
    let err = result.unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
    assert!(err.message.contains("currentPrice"));
    assert!(state.store.entries().restore().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_remove_shifts_later_positions() {
    let mut state = with_branch().await;
    for code in ["A1", "A10", "B7"] {
        run_ok(&state, &["ledger", "add", code, "--price", "3"]).await;
    }

    run_ok(&state, &["ledger", "remove", "2"]).await;
    state.json = true;
    let codes: Vec<String> = entries(&run_ok(&state, &["ledger", "list"]).await)
        .into_iter()
        .map(|e| e.code)
        .collect();
    assert_eq!(codes, vec!["A1", "B7"]);

    let (result, _) = run(&state, &["ledger", "remove", "5"]).await;
    assert_eq!(result.unwrap_err().code, ErrorCode::NotFound);
}

#[tokio::test]
async fn test_declined_clear_keeps_entries() {
    let state = state_with(KeroConfig::default(), AutoConfirm::no()).await;
    seed_catalog(&state).await;
    run_ok(&state, &["branch", "select", "1"]).await;
    run_ok(&state, &["ledger", "add", "A1", "--price", "3"]).await;

    let (result, _) = run(&state, &["ledger", "clear"]).await;
    assert!(result.unwrap_err().is_cancelled());
    assert_eq!(state.store.entries().restore().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_declined_remove_keeps_entry() {
    let state = state_with(KeroConfig::default(), AutoConfirm::no()).await;
    seed_catalog(&state).await;
    run_ok(&state, &["branch", "select", "1"]).await;
    run_ok(&state, &["ledger", "add", "A1", "--price", "3"]).await;
    run_ok(&state, &["ledger", "add", "B7", "--price", "4"]).await;

    let (result, _) = run(&state, &["ledger", "remove", "1"]).await;
    assert!(result.unwrap_err().is_cancelled());

    let entries = state.store.entries().restore().await.unwrap();
    let codes: Vec<&str> = entries.entries().iter().map(|e| e.code.as_str()).collect();
    assert_eq!(codes, vec!["A1", "B7"]);
}

#[tokio::test]
async fn test_clear_removes_stored_ledger() {
    let state = with_branch().await;
    run_ok(&state, &["ledger", "add", "A1", "--price", "3"]).await;

    let out = run_ok(&state, &["ledger", "clear"]).await;
    assert!(out.contains("All local entries cleared."));
    assert!(state.store.entries().restore().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_export_writes_csv() {
    let state = with_branch().await;
    run_ok(&state, &["ledger", "add", "A1", "--price", "4.5"]).await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    let out = run_ok(&state, &["ledger", "export", "-o", path.to_str().unwrap()]).await;
    assert!(out.starts_with("Exported to CSV: "));

    let text = std::fs::read_to_string(&path).unwrap();
    let mut lines = text.lines();
    assert!(lines.next().unwrap().starts_with("#,Code,Name,Supplier,Units"));
    assert!(lines.next().unwrap().starts_with("1,A1,Widget,X,1,"));
    assert!(lines.next().is_none());
}

#[tokio::test]
async fn test_export_empty_ledger_fails() {
    let state = with_branch().await;
    let (result, _) = run(&state, &["ledger", "export"]).await;
    let err = result.unwrap_err();
    assert_eq!(err.message, "No entries to export.");
}

#[tokio::test]
async fn test_alternate_supplier_replaces_catalog_supplier() {
    let state = with_branch().await;
    let out = run_ok(&state, &["supplier", "use", "Z"]).await;
    assert_eq!(out, "Active alternate supplier set to: Z\n");
    run_ok(&state, &["ledger", "add", "A1", "--price", "1"]).await;

    run_ok(&state, &["supplier", "clear"]).await;
    run_ok(&state, &["ledger", "add", "A1", "--price", "1"]).await;

    let ledger = state.store.entries().restore().await.unwrap();
    assert_eq!(ledger.get(1).unwrap().supplier, "Z");
    assert_eq!(ledger.get(2).unwrap().supplier, "X");

    let (result, _) = run(&state, &["supplier", "use", "Nobody"]).await;
    assert_eq!(result.unwrap_err().code, ErrorCode::NotFound);
}

#[tokio::test]
async fn test_search_and_lookup() {
    let state = offline_state().await;
    let (result, _) = run(&state, &["search", "A1"]).await;
    assert_eq!(result.unwrap_err().code, ErrorCode::ValidationError);

    seed_catalog(&state).await;
    let out = run_ok(&state, &["search", "A1"]).await;
    assert_eq!(out, "A1  Widget  (X)\n");

    let out = run_ok(&state, &["search", "zzz"]).await;
    assert_eq!(out, "No matches.\n");

    let out = run_ok(&state, &["lookup", "B7"]).await;
    assert_eq!(out, "Name: Bolt\nSupplier: Z\n");
}

#[tokio::test]
async fn test_watch_searches_last_term_only() {
    let state = offline_state().await;
    seed_catalog(&state).await;

    let mut out = Vec::new();
    let input: &[u8] = b"A\nA1\n";
    watch_terms(&state, input, &mut out, Duration::from_millis(20))
        .await
        .unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "> A1\nA1  Widget  (X)\n");
}

#[tokio::test]
async fn test_catalog_load_and_failure() {
    let router = Router::new().route(
        "/exec",
        get(|Query(params): Query<HashMap<String, String>>| async move {
            if params.contains_key("force") {
                Json(json!({ "success": false, "error": "Sheet locked" }))
            } else {
                Json(json!({
                    "success": true,
                    "data": [{ "code": 1001, "name": "Rice", "supplier name": "Nile" }]
                }))
            }
        }),
    );
    let state = common::online_state(router).await;

    let out = run_ok(&state, &["catalog", "load"]).await;
    assert!(out.contains("(1 items)"));
    assert_eq!(state.workspace.catalog().await.unwrap()[0].code, "1001");

    let (result, _) = run(&state, &["catalog", "refresh"]).await;
    let err = result.unwrap_err();
    assert_eq!(err.code, ErrorCode::RemoteError);
    assert!(err.message.contains("Sheet locked"));
    assert_eq!(state.workspace.catalog().await.unwrap().len(), 1);

    run_ok(&state, &["catalog", "clear"]).await;
    let out = run_ok(&state, &["catalog", "view"]).await;
    assert!(out.contains("Database is empty or not loaded."));
}
