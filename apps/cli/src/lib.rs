//! # Kero Terminal Library
//!
//! Everything behind the `kero` binary. `main.rs` only calls [`run`].
//!
//! ## Module Organization
//! ```text
//! kero_cli/
//! ├── lib.rs          ◄─── You are here (startup & exit status)
//! ├── cli.rs          ◄─── clap command tree
//! ├── state/
//! │   ├── mod.rs      ◄─── AppState, session gate
//! │   └── workspace.rs◄─── Working state kept between commands
//! ├── commands/       ◄─── One handler module per tool
//! ├── output.rs       ◄─── Tables and JSON output
//! ├── prompt.rs       ◄─── Confirmations
//! └── error.rs        ◄─── AppError and exit codes
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;
pub mod prompt;
pub mod state;

use std::io::Write;

use clap::Parser;
use kero_remote::KeroConfig;
use kero_store::{Store, StoreConfig};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::error::{AppError, AppResult};
use crate::prompt::{AutoConfirm, Confirm, TerminalConfirm};
use crate::state::AppState;

/// Runs one command and returns the process exit status.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Command Startup                                   │
/// │                                                                         │
/// │  1. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber to stderr, env filter                          │
/// │     • Default: info,kero=debug,sqlx=warn; override with RUST_LOG        │
/// │                                                                         │
/// │  2. Parse Command Line ───────────────────────────────────────────────► │
/// │                                                                         │
/// │  3. Load Configuration ───────────────────────────────────────────────► │
/// │     • defaults → kero.toml → KERO_* environment                         │
/// │                                                                         │
/// │  4. Open Local Storage ───────────────────────────────────────────────► │
/// │     • SQLite with WAL mode, pending migrations applied                  │
/// │                                                                         │
/// │  5. Dispatch ─────────────────────────────────────────────────────────► │
/// │     • Output to stdout; errors to stderr (stdout with --json)           │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> i32 {
    init_tracing();
    let cli = Cli::parse();
    let json = cli.json;

    match execute(cli).await {
        Ok(()) => 0,
        Err(err) => {
            report(&err, json);
            err.code.exit_code()
        }
    }
}

async fn execute(cli: Cli) -> AppResult<()> {
    let mut config = KeroConfig::load(cli.config.clone())
        .map_err(|e| AppError::config(format!("Could not load configuration: {}", e)))?;
    if let Some(db) = cli.db.clone() {
        config.storage.db_path = Some(db);
    }

    let db_path = config.db_path();
    debug!(db_path = %db_path.display(), "Database path determined");
    let store = Store::open(StoreConfig::new(db_path)).await?;

    let confirm: Box<dyn Confirm> = if cli.yes {
        Box::new(AutoConfirm::yes())
    } else {
        Box::new(TerminalConfirm::default())
    };
    let state = AppState::new(config, store, confirm)
        .with_json(cli.json)
        .with_config_path(cli.config);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let result = commands::dispatch(&state, &mut out, cli.command).await;
    out.flush()?;
    state.store.close().await;
    result
}

fn report(err: &AppError, json: bool) {
    if err.is_cancelled() {
        info!("Cancelled by operator");
        eprintln!("{}", err.message);
        return;
    }
    if json {
        match serde_json::to_string_pretty(err) {
            Ok(text) => println!("{}", text),
            Err(_) => eprintln!("{}", err),
        }
    } else {
        eprintln!("{}", err);
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=kero=trace` - Show trace for kero crates only
/// - Default: `info,kero=debug,sqlx=warn`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,kero=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
