mod common;

use kero_cli::error::ErrorCode;
use kero_remote::KeroConfig;

use common::{offline_state, run, run_ok};

#[tokio::test]
async fn test_init_writes_loadable_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kero.toml");
    let state = offline_state().await.with_config_path(Some(path.clone()));

    let out = run_ok(&state, &["config", "path"]).await;
    assert_eq!(out.trim(), path.display().to_string());

    run_ok(&state, &["config", "init"]).await;
    let loaded = KeroConfig::load(Some(path.clone())).unwrap();
    assert_eq!(loaded.endpoints, state.config.endpoints);

    let (result, _) = run(&state, &["config", "init"]).await;
    assert_eq!(result.unwrap_err().code, ErrorCode::ValidationError);
    run_ok(&state, &["config", "init", "--force"]).await;
}

#[tokio::test]
async fn test_show_renders_toml() {
    let state = offline_state().await;
    let out = run_ok(&state, &["config", "show"]).await;
    assert!(out.contains("[endpoints]"));
    assert!(out.contains("pricing_url"));
    assert!(out.contains("# database: "));
}
