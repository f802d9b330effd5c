//! # Session Commands
//!
//! The stored login record, and the idle logout.
//!
//! ```text
//! watch:  stdin line ──► touch() ──► countdown restarts
//!                                        │ (idle_timeout_secs)
//!                                        ▼
//!                         session removed ──► /login/?reason=idle
//! ```

use std::io::Write;
use std::time::Duration;

use kero_core::session::{LoginReason, Session, ASSIGNED_BRANCH_KEY};
use kero_remote::IdleWatchdog;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cli::SessionCommand;
use crate::error::{AppError, AppResult, ErrorCode};
use crate::output::write_json;
use crate::state::AppState;

pub const LOGGED_OUT_MESSAGE: &str = "Logged out.";
pub const NOT_LOGGED_IN_MESSAGE: &str = "Not logged in.";

pub async fn handle(state: &AppState, out: &mut dyn Write, cmd: SessionCommand) -> AppResult<()> {
    match cmd {
        SessionCommand::Show => show(state, out).await,
        SessionCommand::Store { record } => store(state, out, &record).await,
        SessionCommand::Clear => clear(state, out).await,
        SessionCommand::Watch => {
            let stdin = BufReader::new(tokio::io::stdin());
            watch_idle(state, stdin, out, state.config.idle_timeout()).await
        }
    }
}

pub async fn show(state: &AppState, out: &mut dyn Write) -> AppResult<()> {
    let session = match state.require_session().await {
        Ok(session) => session,
        Err(e) if e.code == ErrorCode::LoginRequired => {
            if state.json {
                write_json(out, &serde_json::Value::Null)?;
            } else {
                writeln!(out, "{} {}", NOT_LOGGED_IN_MESSAGE, e.message)?;
            }
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    if state.json {
        write_json(out, &session)?;
        return Ok(());
    }

    let granted: Vec<&str> = session
        .permissions
        .iter()
        .filter(|(flag, _)| flag.as_str() != ASSIGNED_BRANCH_KEY && session.permissions.is_granted(flag))
        .map(|(flag, _)| flag.as_str())
        .collect();
    writeln!(out, "User: {}", session.username)?;
    writeln!(
        out,
        "Branch: {}",
        session.permissions.assigned_branch_code().unwrap_or_else(|| "-".to_string())
    )?;
    writeln!(
        out,
        "Permissions: {}",
        if granted.is_empty() { "-".to_string() } else { granted.join(", ") }
    )?;
    Ok(())
}

/// Stores a login record as the login page writes it.
pub async fn store(state: &AppState, out: &mut dyn Write, record: &str) -> AppResult<()> {
    let session: Session = serde_json::from_str(record)
        .map_err(|e| AppError::validation(format!("Unreadable login record: {}", e)))?;
    if session.username.trim().is_empty() {
        return Err(AppError::validation("Login record has no username."));
    }
    state.store.session().save(&session).await?;
    writeln!(out, "Logged in as {}", session.username)?;
    Ok(())
}

pub async fn clear(state: &AppState, out: &mut dyn Write) -> AppResult<()> {
    let removed = state.store.session().clear().await?;
    writeln!(
        out,
        "{}",
        if removed { LOGGED_OUT_MESSAGE } else { NOT_LOGGED_IN_MESSAGE }
    )?;
    Ok(())
}

/// Keeps the session while `reader` yields lines, and removes it once
/// `timeout` passes without one. End of input stops counting activity, so
/// the countdown then runs out.
pub async fn watch_idle<R>(
    state: &AppState,
    reader: R,
    out: &mut dyn Write,
    timeout: Duration,
) -> AppResult<()>
where
    R: AsyncBufRead + Unpin,
{
    let session = state.require_session().await?;
    info!(username = %session.username, idle_secs = timeout.as_secs(), "Watching for inactivity");

    let (tx, mut rx) = mpsc::unbounded_channel::<()>();
    let sessions = state.store.session();
    let mut watchdog = IdleWatchdog::start(timeout, move || {
        let sessions = sessions.clone();
        let tx = tx.clone();
        async move {
            if let Err(e) = sessions.clear().await {
                warn!(error = %e, "Could not remove idle session");
            }
            // The receiver outlives the watchdog.
            let _ = tx.send(());
        }
    });

    let mut lines = reader.lines();
    let mut reading = true;
    loop {
        tokio::select! {
            line = lines.next_line(), if reading => match line? {
                Some(_) => {
                    debug!("Activity");
                    watchdog.touch();
                }
                None => reading = false,
            },
            expired = rx.recv() => {
                if expired.is_none() {
                    return Err(AppError::internal("Idle timer stopped unexpectedly"));
                }
                break;
            }
        }
    }

    watchdog.stop();
    writeln!(out, "{}", LoginReason::Idle)?;
    writeln!(out, "{}", LoginReason::Idle.login_url())?;
    Ok(())
}
