//! # kero-store: Local Storage for the Kero Store Tools
//!
//! A SQLite-backed key/value store holding what the browser tools kept in
//! local storage: the pricing ledger, the selected branch and the login
//! record, plus the CLI's own working state.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  kero CLI command (ledger add)                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   kero-store (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │    Store      │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │◄───│  kv / ledger   │    │  (embedded)  │  │   │
//! │  │   │  SqlitePool   │    │  branch        │    │ 001_local_   │  │   │
//! │  │   │               │    │  session       │    │  storage.sql │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  <config dir>/kero.db                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kero_store::{Store, StoreConfig};
//!
//! let store = Store::open(StoreConfig::new("kero.db")).await?;
//! let mut ledger = store.entries().restore().await?;
//! ledger.append(entry);
//! store.entries().persist(&ledger).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use pool::{Store, StoreConfig};

pub use repository::{BranchRepository, KeyValueRepository, LedgerRepository, SessionRepository};
