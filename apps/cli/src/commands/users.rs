//! User management. Every action needs `admin` or `user-management`.

use std::io::Write;

use kero_core::session::{is_truthy, ASSIGNED_BRANCH_KEY, USER_MANAGEMENT_PERMISSIONS};
use kero_core::users::{delete_prompt, display_header, NewUser, UserAccount, UserUpdate, POSITION_HEADER};
use serde_json::Value;
use tracing::info;

use crate::cli::UsersCommand;
use crate::error::{AppError, AppResult};
use crate::output::{write_json, Table};
use crate::state::AppState;

pub const ADDED_MESSAGE: &str = "User added.";
pub const DELETED_MESSAGE: &str = "User deleted.";

pub async fn handle(state: &AppState, out: &mut dyn Write, cmd: UsersCommand) -> AppResult<()> {
    state
        .require_permission(&USER_MANAGEMENT_PERMISSIONS, "manage users")
        .await?;

    match cmd {
        UsersCommand::List => list(state, out).await,
        UsersCommand::Add {
            username,
            password,
            branch,
            position,
        } => {
            let user = NewUser {
                username,
                password,
                assigned_branch_code: branch,
                position,
            };
            add(state, out, &user).await
        }
        UsersCommand::Password { username, password } => {
            if password.is_empty() {
                return Err(AppError::validation("Password cannot be empty."));
            }
            send_update(state, out, UserUpdate::Password { username, password }).await
        }
        UsersCommand::Grant { username, flag } => set_flag(state, out, &username, &flag, true).await,
        UsersCommand::Revoke { username, flag } => set_flag(state, out, &username, &flag, false).await,
        UsersCommand::SetBranch { username, code } => {
            let update = UserUpdate::AssignedBranch {
                username,
                assigned_branch_code: code.trim().to_string(),
            };
            update_one(state, out, update).await
        }
        UsersCommand::SetPosition { username, position } => {
            let update = UserUpdate::Position {
                username,
                position: position.trim().to_string(),
            };
            update_one(state, out, update).await
        }
        UsersCommand::Delete { username } => delete(state, out, &username).await,
    }
}

/// One row per account: username, `Position`, then the sheet's columns.
pub async fn list(state: &AppState, out: &mut dyn Write) -> AppResult<()> {
    let directory = state.users_api()?.list().await?;

    if state.json {
        write_json(out, &directory)?;
        return Ok(());
    }

    let columns = directory.columns();
    let mut table = Table::new(
        std::iter::once("Username".to_string()).chain(columns.iter().map(|c| display_header(c))),
    );
    for account in &directory.users {
        let mut row = vec![account.username.clone()];
        row.extend(columns.iter().map(|column| cell(account, column)));
        table.row(row);
    }
    table.write_to(out)?;
    writeln!(out, "{} users", directory.users.len())?;
    Ok(())
}

fn cell(account: &UserAccount, column: &str) -> String {
    if column == POSITION_HEADER {
        return account.position.clone();
    }
    if column == ASSIGNED_BRANCH_KEY {
        return account.permissions.assigned_branch_code().unwrap_or_default();
    }
    match account.permissions.get(column) {
        Some(value) if is_truthy(value) => "yes".to_string(),
        Some(Value::Null) | None => String::new(),
        Some(_) => "no".to_string(),
    }
}

pub async fn add(state: &AppState, out: &mut dyn Write, user: &NewUser) -> AppResult<()> {
    let user = user.validate()?;
    let message = state.users_api()?.add(&user).await?;
    writeln!(out, "{}", message.unwrap_or_else(|| ADDED_MESSAGE.to_string()))?;
    Ok(())
}

/// Sends the whole permission map with `flag` changed.
pub async fn set_flag(
    state: &AppState,
    out: &mut dyn Write,
    username: &str,
    flag: &str,
    granted: bool,
) -> AppResult<()> {
    let api = state.users_api()?;
    let directory = api.list().await?;
    if !directory.permission_flags().contains(&flag) {
        return Err(AppError::validation(format!(
            "Unknown permission '{}'. Known: {}",
            flag,
            directory.permission_flags().join(", ")
        )));
    }
    let permissions = directory
        .permissions_with(username, flag, granted)
        .ok_or_else(|| AppError::not_found("User", username))?;

    let update = UserUpdate::Permissions {
        username: username.to_string(),
        permissions,
    };
    info!(username, flag, granted, "Changing permission");
    let message = api.update(&update).await?;
    writeln!(out, "{}", message)?;
    Ok(())
}

/// Branch and position edits are checked against the listing first.
async fn update_one(state: &AppState, out: &mut dyn Write, update: UserUpdate) -> AppResult<()> {
    let directory = state.users_api()?.list().await?;
    if directory.find(update.username()).is_none() {
        return Err(AppError::not_found("User", update.username()));
    }
    send_update(state, out, update).await
}

async fn send_update(state: &AppState, out: &mut dyn Write, update: UserUpdate) -> AppResult<()> {
    let message = state.users_api()?.update(&update).await?;
    writeln!(out, "{}", message)?;
    Ok(())
}

pub async fn delete(state: &AppState, out: &mut dyn Write, username: &str) -> AppResult<()> {
    state.require_confirmation(&delete_prompt(username))?;
    let message = state.users_api()?.delete(username).await?;
    writeln!(out, "{}", message.unwrap_or_else(|| DELETED_MESSAGE.to_string()))?;
    Ok(())
}
