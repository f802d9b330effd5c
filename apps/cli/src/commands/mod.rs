//! # Commands Module
//!
//! Command handlers, one module per tool.
//!
//! ## Handler Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Command Handler Flow                                │
//! │                                                                         │
//! │  kero ledger add 1001 --price 51.3                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  clap parses ──► Command::Ledger(LedgerCommand::Add(args))              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  dispatch(&state, &mut out, command)                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ledger::add(state, out, args)                                          │
//! │    1. Read working state (catalog, calculator memory, ledger)           │
//! │    2. Call kero-core (validate_entry)                                   │
//! │    3. Persist through kero-store                                        │
//! │    4. Write the result to `out`                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Result<(), AppError> ──► run() prints the error and sets exit code     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - `pricing` - Calculator
//! - `catalog` - Item database load/refresh/view/clear
//! - `search` - Autocomplete and exact lookup
//! - `ledger` - Local entries and CSV export
//! - `branch`, `supplier` - Ledger branch and alternate supplier
//! - `labels` - Shelf-label staging and print queue
//! - `returns` - Supplier return declarations
//! - `users` - Account management
//! - `session` - Stored login and idle logout
//! - `config` - Configuration file

pub mod branch;
pub mod catalog;
pub mod config;
pub mod labels;
pub mod ledger;
pub mod pricing;
pub mod returns;
pub mod search;
pub mod session;
pub mod supplier;
pub mod users;

use std::io::Write;

use crate::cli::Command;
use crate::error::AppResult;
use crate::state::AppState;

/// Routes a parsed command to its handler.
pub async fn dispatch(state: &AppState, out: &mut dyn Write, command: Command) -> AppResult<()> {
    match command {
        Command::Price(args) => pricing::price(state, out, args).await,
        Command::Catalog(cmd) => catalog::handle(state, out, cmd).await,
        Command::Search(args) => search::search(state, out, args).await,
        Command::Lookup { code } => search::lookup(state, out, &code).await,
        Command::Ledger(cmd) => ledger::handle(state, out, cmd).await,
        Command::Branch(cmd) => branch::handle(state, out, cmd).await,
        Command::Supplier(cmd) => supplier::handle(state, out, cmd).await,
        Command::Labels(cmd) => labels::handle(state, out, cmd).await,
        Command::Returns(cmd) => returns::handle(state, out, cmd).await,
        Command::Users(cmd) => users::handle(state, out, cmd).await,
        Command::Session(cmd) => session::handle(state, out, cmd).await,
        Command::Config(cmd) => config::handle(state, out, cmd).await,
    }
}
