//! # Supplier Returns Commands
//!
//! ```text
//! branch: assigned branch (session) ──► this user's `use-branch` choice
//!                               │
//! suppliers ──► submit ─────────┴──► saveLog
//! logs ──► getLogs ──► filter (branch, text, date range)
//! ```
//!
//! The branch is resolved from the live session on every command. Only a
//! manual choice is stored, and only for the user who made it.

use std::io::Write;

use chrono::{Local, Utc};
use kero_core::returns::{
    build_return_log, find_assigned_branch, search_suppliers, LogFilter, ReturnBranch, ReturnDraft,
    ReturnLog, ReturnType, SUPPLIER_SEARCH_MIN_CHARS,
};
use kero_core::session::Session;
use kero_remote::returns::{load_failed_message, save_failed_message};
use tracing::{debug, info, warn};

use crate::cli::{LogFilterArgs, ReturnsCommand, SubmitReturnArgs};
use crate::error::{AppError, AppResult};
use crate::output::{write_json, Table};
use crate::state::AppState;

pub const SELECT_BRANCH_MESSAGE: &str = "الرجاء اختيار فرع. (kero returns use-branch <code>)";
pub const ASSIGNED_BRANCH_MESSAGE: &str = "الفرع محدد لهذا الحساب: ";
pub const NO_BRANCHES_MESSAGE: &str = "فشل تحميل قائمة الفروع. لا يمكن متابعة التطبيق.";
pub const SAVED_MESSAGE: &str = "تم حفظ الإقرار بنجاح.";
pub const NO_LOGS_MESSAGE: &str = "لا توجد سجلات تطابق البحث لهذا الفرع";
pub const NOT_AVAILABLE: &str = "غير متوفر";

pub async fn handle(state: &AppState, out: &mut dyn Write, cmd: ReturnsCommand) -> AppResult<()> {
    let session = state.require_session().await?;
    match cmd {
        ReturnsCommand::Branches => branches(state, out, &session).await,
        ReturnsCommand::Suppliers { query } => suppliers(state, out, &query).await,
        ReturnsCommand::UseBranch { code } => use_branch(state, out, &session, &code).await,
        ReturnsCommand::Submit(args) => submit(state, out, &session, args).await,
        ReturnsCommand::Logs(filter) => logs(state, out, &session, filter).await,
    }
}

// =============================================================================
// Branch
// =============================================================================

pub async fn branches(state: &AppState, out: &mut dyn Write, session: &Session) -> AppResult<()> {
    let branches = fetch_branches(state).await?;
    let current = resolve_branch(state, session, &branches).await?;

    if state.json {
        write_json(out, &branches)?;
        return Ok(());
    }

    let mut table = Table::new(["", "Code", "Branch"]);
    for branch in &branches {
        let mark = current.as_ref().is_some_and(|c| c.code.trim() == branch.code.trim());
        table.row([
            if mark { "*" } else { "" }.to_string(),
            branch.code.clone(),
            branch.name.clone(),
        ]);
    }
    table.write_to(out)?;
    Ok(())
}

pub async fn use_branch(
    state: &AppState,
    out: &mut dyn Write,
    session: &Session,
    code: &str,
) -> AppResult<()> {
    let code = code.trim();
    if code.is_empty() {
        return Err(AppError::validation(SELECT_BRANCH_MESSAGE));
    }
    let branches = fetch_branches(state).await?;
    let assigned = session.permissions.assigned_branch_code();
    if let Some(branch) = find_assigned_branch(&branches, assigned.as_deref()) {
        return Err(AppError::validation(format!("{}{}", ASSIGNED_BRANCH_MESSAGE, branch.name)));
    }
    let branch = branches
        .iter()
        .find(|b| b.code.trim() == code)
        .ok_or_else(|| AppError::not_found("Branch", code))?;

    state
        .workspace
        .save_returns_branch(&session.username, branch)
        .await?;
    info!(code = %branch.code, username = %session.username, "Returns branch selected");
    writeln!(out, "الفرع المحدد: {}", branch.name)?;
    Ok(())
}

/// The session's assigned branch, else the branch this user picked.
async fn resolve_branch(
    state: &AppState,
    session: &Session,
    branches: &[ReturnBranch],
) -> AppResult<Option<ReturnBranch>> {
    let assigned = session.permissions.assigned_branch_code();
    if let Some(branch) = find_assigned_branch(branches, assigned.as_deref()) {
        debug!(code = %branch.code, "Using assigned branch");
        return Ok(Some(branch.clone()));
    }
    if let Some(code) = assigned {
        warn!(code = %code, "Assigned branch not found; manual selection required");
    }

    let chosen = state.workspace.returns_branch(&session.username).await?;
    Ok(chosen.filter(|choice| branches.iter().any(|b| b.code.trim() == choice.code.trim())))
}

async fn current_branch(state: &AppState, session: &Session) -> AppResult<ReturnBranch> {
    let branches = fetch_branches(state).await?;
    resolve_branch(state, session, &branches)
        .await?
        .ok_or_else(|| AppError::validation(SELECT_BRANCH_MESSAGE))
}

async fn fetch_branches(state: &AppState) -> AppResult<Vec<ReturnBranch>> {
    let branches = state
        .returns_api()?
        .branches()
        .await
        .map_err(|e| AppError::remote(load_failed_message(&e)))?;
    if branches.is_empty() {
        return Err(AppError::remote(NO_BRANCHES_MESSAGE));
    }
    Ok(branches)
}

// =============================================================================
// Declarations
// =============================================================================

pub async fn suppliers(state: &AppState, out: &mut dyn Write, query: &str) -> AppResult<()> {
    if query.trim().chars().count() < SUPPLIER_SEARCH_MIN_CHARS {
        return Err(AppError::validation(format!(
            "Enter at least {} characters.",
            SUPPLIER_SEARCH_MIN_CHARS
        )));
    }
    let all = state
        .returns_api()?
        .suppliers()
        .await
        .map_err(|e| AppError::remote(load_failed_message(&e)))?;
    let found = search_suppliers(&all, query.trim());

    if state.json {
        write_json(out, &found)?;
        return Ok(());
    }

    let mut table = Table::new(["Code", "Supplier"]);
    for supplier in &found {
        table.row([supplier.code.as_str(), supplier.name.as_str()]);
    }
    table.write_to(out)?;
    Ok(())
}

/// Builds the declaration for the current branch and saves it.
pub async fn submit(
    state: &AppState,
    out: &mut dyn Write,
    session: &Session,
    args: SubmitReturnArgs,
) -> AppResult<()> {
    let branch = current_branch(state, session).await?;
    let api = state.returns_api()?;

    let code = args.supplier.trim();
    let suppliers = api
        .suppliers()
        .await
        .map_err(|e| AppError::remote(load_failed_message(&e)))?;
    let supplier = suppliers
        .iter()
        .find(|s| s.code.trim() == code)
        .ok_or_else(|| AppError::not_found("Supplier", code))?;

    let draft = ReturnDraft {
        representative_name: args.representative_name,
        representative_id: args.representative_id,
        return_type: if args.has_returns {
            ReturnType::HasReturns
        } else {
            ReturnType::NoReturns
        },
        return_value: args.value,
        return_serial: args.serial,
    };
    let log = build_return_log(&branch, supplier, &draft, Utc::now())?;

    let message = api
        .save_log(&log)
        .await
        .map_err(|e| AppError::remote(save_failed_message(&e)))?;

    if state.json {
        write_json(out, &log)?;
        return Ok(());
    }
    writeln!(out, "{}", message.unwrap_or_else(|| SAVED_MESSAGE.to_string()))?;
    write_declaration(out, &log, &branch)?;
    Ok(())
}

/// The printable form as plain text.
fn write_declaration(out: &mut dyn Write, log: &ReturnLog, branch: &ReturnBranch) -> AppResult<()> {
    let or_na = |s: &str| if s.trim().is_empty() { NOT_AVAILABLE.to_string() } else { s.to_string() };
    let at = log
        .timestamp_utc()
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| log.timestamp.clone());

    writeln!(out, "التاريخ: {}", at)?;
    writeln!(out, "الفرع: {}", branch.name)?;
    writeln!(out, "المورد: {} ({})", log.supplier_name, log.supplier_code)?;
    writeln!(out, "السجل التجاري: {}", or_na(&log.supplier_cr))?;
    writeln!(out, "الرقم الضريبي: {}", or_na(&log.supplier_tax_id))?;
    writeln!(out, "المندوب: {} ({})", log.representative_name, log.representative_id)?;
    writeln!(out, "{}", log.return_type.label())?;
    if log.return_type == ReturnType::HasReturns {
        writeln!(out, "القيمة: {}", log.return_value)?;
        writeln!(out, "رقم المرتجع: {}", log.return_serial)?;
    }
    Ok(())
}

/// Saved declarations of the current branch, in server order.
pub async fn logs(
    state: &AppState,
    out: &mut dyn Write,
    session: &Session,
    args: LogFilterArgs,
) -> AppResult<()> {
    let branch = current_branch(state, session).await?;
    let all = state
        .returns_api()?
        .logs()
        .await
        .map_err(|e| AppError::remote(load_failed_message(&e)))?;

    let filter = LogFilter {
        branch_code: branch.code.clone(),
        text: args.search,
        from: args.from,
        to: args.to,
    };
    let shown = filter.apply(&all, &Local);

    if state.json {
        write_json(out, &shown)?;
        return Ok(());
    }

    writeln!(out, "{}", branch.name)?;
    if shown.is_empty() {
        writeln!(out, "{}", NO_LOGS_MESSAGE)?;
        return Ok(());
    }
    let mut table = Table::new(["Date", "Supplier", "Representative", "Type"]);
    for log in &shown {
        let at = log
            .timestamp_utc()
            .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| log.timestamp.clone());
        table.row([
            at,
            log.supplier_name.clone(),
            log.representative_name.clone(),
            log.return_type.label().to_string(),
        ]);
    }
    table.write_to(out)?;
    Ok(())
}
