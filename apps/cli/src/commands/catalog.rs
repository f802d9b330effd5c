//! Item database commands.

use std::io::Write;

use kero_core::search::{filter_suppliers, supplier_names};
use kero_remote::catalog::{CLEARED_MESSAGE, CLEAR_PROMPT};
use tracing::info;

use crate::cli::CatalogCommand;
use crate::error::{AppError, AppResult};
use crate::output::{write_json, Table};
use crate::state::AppState;

pub const EMPTY_MESSAGE: &str = "Database is empty or not loaded.";
pub const NOT_LOADED_MESSAGE: &str = "Database not loaded. Please refresh the database first.";
pub const NO_SUPPLIERS_MESSAGE: &str = "No suppliers found.";

pub async fn handle(state: &AppState, out: &mut dyn Write, cmd: CatalogCommand) -> AppResult<()> {
    match cmd {
        CatalogCommand::Load => load(state, out, false).await,
        CatalogCommand::Refresh => load(state, out, true).await,
        CatalogCommand::View => view(state, out).await,
        CatalogCommand::Clear => clear(state, out).await,
        CatalogCommand::Suppliers { filter } => suppliers(state, out, filter.as_deref()).await,
    }
}

/// Fetches the catalog. A failed fetch keeps the stored copy.
pub async fn load(state: &AppState, out: &mut dyn Write, force: bool) -> AppResult<()> {
    let fetcher = state.catalog_fetcher()?;
    let mut catalog = state.workspace.catalog().await?;

    if !state.json {
        writeln!(out, "{}", if force { "Refreshing..." } else { "Loading..." })?;
    }
    let notice = fetcher.load_into(&mut catalog, force).await;
    if notice.is_error() {
        return Err(AppError::remote(notice.message));
    }

    state.workspace.save_catalog(&catalog).await?;
    writeln!(out, "{} ({} items)", notice, catalog.len())?;
    Ok(())
}

pub async fn view(state: &AppState, out: &mut dyn Write) -> AppResult<()> {
    let catalog = state.workspace.catalog().await?;
    if state.json {
        write_json(out, &catalog)?;
        return Ok(());
    }
    if catalog.is_empty() {
        writeln!(out, "{}", EMPTY_MESSAGE)?;
        return Ok(());
    }

    let mut table = Table::new(["Code", "Name", "Supplier"]);
    for item in &catalog {
        table.row([item.code.as_str(), item.name.as_str(), item.supplier.as_str()]);
    }
    table.write_to(out)?;
    writeln!(out, "{} items", catalog.len())?;
    Ok(())
}

pub async fn clear(state: &AppState, out: &mut dyn Write) -> AppResult<()> {
    state.require_confirmation(CLEAR_PROMPT)?;
    let removed = state.workspace.clear_catalog().await?;
    info!(removed, "Catalog cleared");
    writeln!(out, "{}", CLEARED_MESSAGE)?;
    Ok(())
}

/// Distinct supplier names for the supplier picker.
pub async fn suppliers(state: &AppState, out: &mut dyn Write, filter: Option<&str>) -> AppResult<()> {
    let catalog = state.workspace.catalog().await?;
    if catalog.is_empty() {
        return Err(AppError::validation(NOT_LOADED_MESSAGE));
    }

    let names = supplier_names(&catalog);
    let matches = filter_suppliers(&names, filter.unwrap_or(""));
    if state.json {
        write_json(out, &matches)?;
    } else if matches.is_empty() {
        writeln!(out, "{}", NO_SUPPLIERS_MESSAGE)?;
    } else {
        for name in matches {
            writeln!(out, "{}", name)?;
        }
    }
    Ok(())
}
