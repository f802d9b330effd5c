//! # State Module
//!
//! Everything a command handler needs, built once per invocation.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  run()                                                                  │
//! │    KeroConfig::load ──► Store::open(db_path) ──► AppState::new          │
//! │                                                      │                  │
//! │          ┌───────────────────┬───────────────────────┼──────────┐       │
//! │          ▼                   ▼                       ▼          ▼       │
//! │  ┌──────────────┐  ┌──────────────────┐  ┌──────────────┐ ┌─────────┐  │
//! │  │  KeroConfig  │  │  Store           │  │  Workspace   │ │ Confirm │  │
//! │  │              │  │                  │  │              │ │         │  │
//! │  │  endpoints   │  │  ledger, branch, │  │  catalog,    │ │ prompt  │  │
//! │  │  timings     │  │  session         │  │  calculator, │ │ or      │  │
//! │  │              │  │  (local_storage) │  │  labels, ... │ │ --yes   │  │
//! │  └──────────────┘  └──────────────────┘  └──────────────┘ └─────────┘  │
//! │                                                                         │
//! │  Remote clients are built on demand from the config, so commands that  │
//! │  never leave the machine never touch an endpoint.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod workspace;

pub use workspace::Workspace;

use std::path::PathBuf;

use kero_core::session::{gate, GateDecision, LoginReason, Session};
use kero_remote::{CatalogFetcher, KeroConfig, LabelsApi, ReturnsApi, UsersApi};
use kero_store::Store;
use tracing::{info, warn};

use crate::error::{AppError, AppResult, ErrorCode};
use crate::prompt::Confirm;

pub struct AppState {
    pub config: KeroConfig,
    pub store: Store,
    pub workspace: Workspace,
    /// Print results as JSON where supported.
    pub json: bool,
    /// Config file named on the command line, if any.
    pub config_path: Option<PathBuf>,
    confirm: Box<dyn Confirm>,
}

impl AppState {
    pub fn new(config: KeroConfig, store: Store, confirm: Box<dyn Confirm>) -> Self {
        let workspace = Workspace::new(store.kv());
        AppState {
            config,
            store,
            workspace,
            json: false,
            config_path: None,
            confirm,
        }
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub fn with_config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    /// Asks before a destructive step.
    pub fn confirm(&self, question: &str) -> AppResult<bool> {
        self.confirm.confirm(question)
    }

    /// Asks, and turns a "no" into [`ErrorCode::Cancelled`].
    pub fn require_confirmation(&self, question: &str) -> AppResult<()> {
        if self.confirm(question)? {
            Ok(())
        } else {
            Err(AppError::cancelled())
        }
    }

    // =========================================================================
    // Remote Clients
    // =========================================================================

    pub fn catalog_fetcher(&self) -> AppResult<CatalogFetcher> {
        Ok(CatalogFetcher::from_config(&self.config)?)
    }

    pub fn returns_api(&self) -> AppResult<ReturnsApi> {
        Ok(ReturnsApi::from_config(&self.config)?)
    }

    pub fn labels_api(&self) -> AppResult<LabelsApi> {
        Ok(LabelsApi::from_config(&self.config)?)
    }

    pub fn users_api(&self) -> AppResult<UsersApi> {
        Ok(UsersApi::from_config(&self.config)?)
    }

    // =========================================================================
    // Session Gate
    // =========================================================================

    /// Any logged-in user.
    pub async fn require_session(&self) -> AppResult<Session> {
        self.check_gate(&[], "use this tool").await
    }

    /// A logged-in user holding one of `flags`.
    ///
    /// `purpose` completes "You do not have permission to ...".
    pub async fn require_permission(&self, flags: &[&str], purpose: &str) -> AppResult<Session> {
        self.check_gate(flags, purpose).await
    }

    /// An unreadable record is removed before the operator is sent to log in.
    async fn check_gate(&self, required: &[&str], purpose: &str) -> AppResult<Session> {
        let stored = self.store.session().load_raw().await?;
        match gate(stored.as_deref(), required) {
            GateDecision::Granted(session) => {
                info!(username = %session.username, "Session accepted");
                Ok(session)
            }
            GateDecision::RedirectToLogin {
                reason,
                clear_stored,
            } => {
                if clear_stored {
                    warn!(%reason, "Removing unreadable session");
                    self.store.session().clear().await?;
                }
                Err(login_required(reason))
            }
            GateDecision::Denied => {
                warn!(?required, "Session lacks required permission");
                Err(AppError::new(
                    ErrorCode::AccessDenied,
                    format!("Access Denied: You do not have permission to {purpose}."),
                ))
            }
        }
    }
}

pub fn login_required(reason: LoginReason) -> AppError {
    AppError::new(
        ErrorCode::LoginRequired,
        format!("Login required ({}). Go to {}", reason, reason.login_url()),
    )
}
