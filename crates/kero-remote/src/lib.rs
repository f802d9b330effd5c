//! # kero-remote: Spreadsheet API Client for the Kero Store Tools
//!
//! Everything that leaves the machine: the four script endpoints, the
//! configuration that names them, and the timers that pace user input.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  kero CLI                                                              │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                 kero-remote (THIS CRATE)                          │  │
//! │  │                                                                  │  │
//! │  │  KeroConfig ──► ApiClient (reqwest, one per endpoint)            │  │
//! │  │                    │                                             │  │
//! │  │        ┌───────────┼────────────┬──────────────┐                 │  │
//! │  │        ▼           ▼            ▼              ▼                 │  │
//! │  │  CatalogFetcher ReturnsApi   LabelsApi      UsersApi             │  │
//! │  │  getItemDatabase getLogs...  getItems...    getUsers...          │  │
//! │  │                                                                  │  │
//! │  │  Debouncer (search input)     IdleWatchdog (session timeout)     │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  Failures become RemoteError values; callers render a Notice and       │
//! │  keep their previous state. Nothing is retried.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`client`] - `ApiClient` and the response envelope
//! - [`config`] - `KeroConfig` (TOML file + environment)
//! - [`error`] - `RemoteError`
//! - [`catalog`] - Item database loader
//! - [`returns`], [`labels`], [`users`] - Per-tool endpoints
//! - [`debounce`], [`idle`] - Cancellable timers
//! - [`notice`] - Operator feedback lines

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod client;
pub mod config;
pub mod debounce;
pub mod error;
pub mod idle;
pub mod labels;
pub mod notice;
pub mod returns;
pub mod users;

// =============================================================================
// Re-exports
// =============================================================================

pub use catalog::CatalogFetcher;
pub use client::{ApiClient, Envelope};
pub use config::KeroConfig;
pub use debounce::Debouncer;
pub use error::{RemoteError, RemoteResult};
pub use idle::IdleWatchdog;
pub use labels::LabelsApi;
pub use notice::{Notice, NoticeLevel};
pub use returns::ReturnsApi;
pub use users::UsersApi;
