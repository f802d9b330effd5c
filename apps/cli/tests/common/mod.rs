//! Shared setup for the command tests: an in-memory store, stand-in script
//! endpoints on 127.0.0.1 and a stored login.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::Router;
use clap::Parser;
use kero_cli::cli::Cli;
use kero_cli::commands::dispatch;
use kero_cli::error::AppResult;
use kero_cli::prompt::AutoConfirm;
use kero_cli::state::AppState;
use kero_core::session::Session;
use kero_core::CatalogItem;
use kero_remote::KeroConfig;
use kero_store::{Store, StoreConfig};
use serde_json::Value;
use tokio::net::TcpListener;

/// Request bodies received by a stand-in endpoint.
pub type Sink = Arc<Mutex<Vec<Value>>>;

pub fn sink() -> Sink {
    Arc::new(Mutex::new(Vec::new()))
}

/// Serves `router` on an ephemeral port and returns its `/exec` URL.
pub async fn spawn(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/exec")
}

/// Every endpoint pointed at `url`.
pub fn config(url: &str) -> KeroConfig {
    let mut config = KeroConfig::default();
    config.endpoints.pricing_url = url.to_string();
    config.endpoints.returns_url = url.to_string();
    config.endpoints.labels_url = url.to_string();
    config.endpoints.users_url = url.to_string();
    config
}

pub async fn state_with(config: KeroConfig, confirm: AutoConfirm) -> AppState {
    let store = Store::open(StoreConfig::in_memory()).await.unwrap();
    AppState::new(config, store, Box::new(confirm))
}

/// State with default endpoints that answers yes to every prompt.
pub async fn offline_state() -> AppState {
    state_with(KeroConfig::default(), AutoConfirm::yes()).await
}

pub async fn online_state(router: Router) -> AppState {
    let url = spawn(router).await;
    state_with(config(&url), AutoConfirm::yes()).await
}

/// Stores a login record the way the login page writes it.
pub async fn login(state: &AppState, record: Value) {
    let session: Session = serde_json::from_value(record).unwrap();
    state.store.session().save(&session).await.unwrap();
}

pub async fn seed_catalog(state: &AppState) {
    let items = vec![
        CatalogItem::new("A1", "Widget", "X"),
        CatalogItem::new("A10", "Widget XL", "Y"),
        CatalogItem::new("B7", "Bolt", "Z"),
    ];
    state.workspace.save_catalog(&items).await.unwrap();
}

/// Parses `args` as a `kero` command line and runs it.
pub async fn run(state: &AppState, args: &[&str]) -> (AppResult<()>, String) {
    let cli = Cli::try_parse_from(std::iter::once("kero").chain(args.iter().copied()))
        .expect("command line should parse");
    let mut out = Vec::new();
    let result = dispatch(state, &mut out, cli.command).await;
    (result, String::from_utf8(out).unwrap())
}

/// Like [`run`], but the command must succeed.
pub async fn run_ok(state: &AppState, args: &[&str]) -> String {
    let (result, out) = run(state, args).await;
    if let Err(e) = result {
        panic!("`kero {}` failed: {}\noutput:\n{}", args.join(" "), e, out);
    }
    out
}
