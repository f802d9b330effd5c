//! Branch selection for the pricing ledger.

use std::io::Write;

use kero_core::{Branch, CoreError};

use crate::cli::BranchCommand;
use crate::error::AppResult;
use crate::output::{write_json, Table};
use crate::state::AppState;

pub async fn handle(state: &AppState, out: &mut dyn Write, cmd: BranchCommand) -> AppResult<()> {
    match cmd {
        BranchCommand::Show => show(state, out).await,
        BranchCommand::List => list(state, out),
        BranchCommand::Select { branch } => select(state, out, &branch).await,
    }
}

pub async fn show(state: &AppState, out: &mut dyn Write) -> AppResult<()> {
    let branch = state.store.branch().load().await?;
    if state.json {
        write_json(out, &branch)?;
        return Ok(());
    }
    match branch {
        Some(branch) => writeln!(out, "Branch: {}", branch)?,
        None => writeln!(out, "No branch selected.")?,
    }
    Ok(())
}

pub fn list(state: &AppState, out: &mut dyn Write) -> AppResult<()> {
    let branches: Vec<Branch> = Branch::all().collect();
    if state.json {
        write_json(out, &branches)?;
        return Ok(());
    }
    let mut table = Table::new(["#", "Branch"]);
    for (i, branch) in branches.iter().enumerate() {
        table.row([(i + 1).to_string(), branch.to_string()]);
    }
    table.write_to(out)?;
    Ok(())
}

/// Accepts a branch name or its number from `branch list`.
pub async fn select(state: &AppState, out: &mut dyn Write, input: &str) -> AppResult<()> {
    let branch = match input.trim().parse::<usize>() {
        Ok(position) => Branch::by_position(position)
            .ok_or_else(|| CoreError::UnknownBranch(input.trim().to_string()))?,
        Err(_) => Branch::parse(input)?,
    };
    state.store.branch().save(&branch).await?;
    writeln!(out, "Branch selected: {}", branch)?;
    Ok(())
}
