//! # Ledger Commands
//!
//! The local pricing entries. Every mutation follows the same sequence:
//!
//! ```text
//! restore ──► validate ──► mutate ──► persist (pricingAppEntries) ──► render
//! ```
//!
//! Positions are 1-based as rendered; deleting one shifts the rest up.

use std::io::Write;
use std::path::{Path, PathBuf};

use kero_core::ledger::export_file_name;
use kero_core::search::item_details;
use kero_core::validation::{validate_entry, EntryForm};
use kero_core::{CoreError, Ledger};
use tracing::info;

use crate::cli::{AddEntryArgs, LedgerCommand};
use crate::error::{AppError, AppResult};
use crate::output::{write_json, Table};
use crate::state::AppState;

pub const ADDED_MESSAGE: &str = "Item added to local list.";
pub const DELETE_PROMPT: &str = "Delete this entry from the local list?";
pub const DELETED_MESSAGE: &str = "Entry deleted.";
pub const CLEAR_PROMPT: &str = "Clear all local entries?";
pub const CLEARED_MESSAGE: &str = "All local entries cleared.";
pub const NO_BRANCH_MESSAGE: &str =
    "No branch selected. Select one with `kero branch select <name|number>`.";

pub async fn handle(state: &AppState, out: &mut dyn Write, cmd: LedgerCommand) -> AppResult<()> {
    match cmd {
        LedgerCommand::Add(args) => add(state, out, args).await,
        LedgerCommand::List => list(state, out).await,
        LedgerCommand::Remove { position } => remove(state, out, position).await,
        LedgerCommand::Clear => clear(state, out).await,
        LedgerCommand::Export { output } => export(state, out, output).await,
    }
}

/// Validates the entry form and appends one line.
///
/// Blank name and supplier are filled from the catalog; a blank price falls
/// back to the price applied from the calculator. The line carries the
/// calculator memory, which resets to `(1, 0, 0)` afterwards.
pub async fn add(state: &AppState, out: &mut dyn Write, args: AddEntryArgs) -> AppResult<()> {
    if state.store.branch().load().await?.is_none() {
        return Err(AppError::validation(NO_BRANCH_MESSAGE));
    }

    let catalog = state.workspace.catalog().await?;
    let details = item_details(&catalog, &args.code);
    let unit_price = match args.unit_price {
        Some(price) => price,
        None => state.workspace.pending_unit_price().await?.unwrap_or_default(),
    };

    let form = EntryForm {
        code: args.code,
        name: args.name.unwrap_or(details.name),
        supplier: details.supplier,
        alternate_supplier: state.workspace.alternate_supplier().await?.unwrap_or_default(),
        unit_price,
        entry_type: args.entry_type,
        current_price: args.current_price.unwrap_or_default(),
    };
    let memory = state.workspace.calculator_memory().await?;
    let entry = validate_entry(&form, &memory)?;

    let mut ledger = state.store.entries().restore().await?;
    info!(code = %entry.code, unit_price = %entry.unit_price, "Adding ledger entry");
    ledger.append(entry);
    state.store.entries().persist(&ledger).await?;
    state.workspace.reset_entry_form().await?;

    writeln!(out, "{}", ADDED_MESSAGE)?;
    render(state, out, &ledger)
}

pub async fn list(state: &AppState, out: &mut dyn Write) -> AppResult<()> {
    let ledger = state.store.entries().restore().await?;
    render(state, out, &ledger)
}

/// Deletes the line at a 1-based position after confirmation.
pub async fn remove(state: &AppState, out: &mut dyn Write, position: usize) -> AppResult<()> {
    let mut ledger = state.store.entries().restore().await?;
    if ledger.get(position).is_none() {
        return Err(CoreError::EntryNotFound {
            position,
            len: ledger.len(),
        }
        .into());
    }
    state.require_confirmation(DELETE_PROMPT)?;

    let removed = ledger.remove(position)?;
    state.store.entries().persist(&ledger).await?;
    info!(position, code = %removed.code, "Ledger entry deleted");

    writeln!(out, "{}", DELETED_MESSAGE)?;
    render(state, out, &ledger)
}

/// Empties the ledger and removes the stored key.
pub async fn clear(state: &AppState, out: &mut dyn Write) -> AppResult<()> {
    state.require_confirmation(CLEAR_PROMPT)?;
    state.store.entries().clear().await?;

    writeln!(out, "{}", CLEARED_MESSAGE)?;
    render(state, out, &Ledger::new())
}

/// Writes the ledger as CSV, named after the branch unless `output` is given.
pub async fn export(state: &AppState, out: &mut dyn Write, output: Option<PathBuf>) -> AppResult<()> {
    let ledger = state.store.entries().restore().await?;
    let rows = ledger.export_rows()?;

    let path = match output {
        Some(path) => path,
        None => {
            let branch = state.store.branch().load().await?;
            PathBuf::from(export_file_name(branch.as_ref()))
        }
    };
    write_csv(&path, &rows)?;
    info!(path = %path.display(), rows = rows.len(), "Ledger exported");

    writeln!(out, "Exported to CSV: {}", path.display())?;
    Ok(())
}

fn write_csv<T: serde::Serialize>(path: &Path, rows: &[T]) -> AppResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Table keyed by position, followed by the entry count.
fn render(state: &AppState, out: &mut dyn Write, ledger: &Ledger) -> AppResult<()> {
    if state.json {
        write_json(out, ledger.entries())?;
        return Ok(());
    }

    if !ledger.is_empty() {
        let mut table = Table::new([
            "#", "Code", "Name", "Supplier", "Units", "Disc%", "VAT%", "Piece", "Case", "Type", "Current",
        ]);
        for (position, entry) in ledger.rows() {
            table.row([
                position.to_string(),
                entry.code.clone(),
                entry.name.clone(),
                entry.supplier.clone(),
                entry.units.to_string(),
                entry.discount.to_string(),
                entry.vat.to_string(),
                entry.unit_price.to_string(),
                entry.case_price.to_string(),
                entry.entry_type.label().to_string(),
                entry.current_price.map(|m| m.to_string()).unwrap_or_default(),
            ]);
        }
        table.write_to(out)?;
    }
    writeln!(out, "Total entries: {}", ledger.len())?;
    Ok(())
}
