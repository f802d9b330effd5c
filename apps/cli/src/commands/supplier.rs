//! Alternate supplier for new ledger lines.
//!
//! While set, the alternate supplier replaces the catalog supplier on every
//! entry added; clearing it brings the catalog supplier back.

use std::io::Write;

use kero_core::search::supplier_names;
use tracing::info;

use crate::cli::SupplierCommand;
use crate::commands::catalog;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

pub const CLEARED_MESSAGE: &str = "Active alternate supplier cleared. Default will now be used.";

pub async fn handle(state: &AppState, out: &mut dyn Write, cmd: SupplierCommand) -> AppResult<()> {
    match cmd {
        SupplierCommand::Use { name } => use_supplier(state, out, &name).await,
        SupplierCommand::Clear => clear(state, out).await,
        SupplierCommand::List { filter } => catalog::suppliers(state, out, filter.as_deref()).await,
    }
}

/// Picks a supplier from the catalog's supplier list.
pub async fn use_supplier(state: &AppState, out: &mut dyn Write, name: &str) -> AppResult<()> {
    let catalog = state.workspace.catalog().await?;
    if catalog.is_empty() {
        return Err(AppError::validation(catalog::NOT_LOADED_MESSAGE));
    }

    let name = name.trim();
    let names = supplier_names(&catalog);
    if !names.iter().any(|n| n == name) {
        return Err(AppError::not_found("Supplier", name));
    }

    state.workspace.set_alternate_supplier(name).await?;
    info!(supplier = %name, "Alternate supplier set");
    writeln!(out, "Active alternate supplier set to: {}", name)?;
    Ok(())
}

pub async fn clear(state: &AppState, out: &mut dyn Write) -> AppResult<()> {
    state.workspace.clear_alternate_supplier().await?;
    writeln!(out, "{}", CLEARED_MESSAGE)?;
    Ok(())
}
