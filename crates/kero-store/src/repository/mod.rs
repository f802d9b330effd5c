//! # Repository Module
//!
//! Typed access to the `local_storage` table.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  LedgerRepository   ── pricingAppEntries ──┐                            │
//! │  BranchRepository   ── pricingAppBranch ───┤                            │
//! │  SessionRepository  ── keroUser ───────────┼──► KeyValueRepository     │
//! │  CLI working state  ── kero.* ─────────────┘     get / set / remove     │
//! │                                                        │                │
//! │                                                        ▼                │
//! │                                              local_storage (SQLite)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`KeyValueRepository`] - Raw and JSON-typed key/value access
//! - [`LedgerRepository`] - The pricing ledger
//! - [`BranchRepository`] - The selected branch
//! - [`SessionRepository`] - The stored login record

pub mod branch;
pub mod kv;
pub mod ledger;
pub mod session;

pub use branch::BranchRepository;
pub use kv::KeyValueRepository;
pub use ledger::LedgerRepository;
pub use session::SessionRepository;
