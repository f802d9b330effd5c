//! # Config Commands
//!
//! Shows and writes `kero.toml`.
//!
//! ## When Used
//! - `config show` prints the effective settings (file, then `KERO_*`
//!   environment overrides)
//! - `config init` writes them out so they can be edited

use std::io::Write;
use std::path::PathBuf;

use kero_remote::KeroConfig;
use tracing::debug;

use crate::cli::ConfigCommand;
use crate::error::{AppError, AppResult};
use crate::output::write_json;
use crate::state::AppState;

pub async fn handle(state: &AppState, out: &mut dyn Write, cmd: ConfigCommand) -> AppResult<()> {
    match cmd {
        ConfigCommand::Show => show(state, out),
        ConfigCommand::Path => path(state, out),
        ConfigCommand::Init { force } => init(state, out, force),
    }
}

pub fn show(state: &AppState, out: &mut dyn Write) -> AppResult<()> {
    debug!("config show");
    if state.json {
        write_json(out, &state.config)?;
        return Ok(());
    }
    let text = toml::to_string_pretty(&state.config)
        .map_err(|e| AppError::internal(format!("Could not render config: {}", e)))?;
    write!(out, "{}", text)?;
    writeln!(out, "# database: {}", state.config.db_path().display())?;
    Ok(())
}

pub fn path(state: &AppState, out: &mut dyn Write) -> AppResult<()> {
    let path = config_file(state)?;
    writeln!(out, "{}", path.display())?;
    Ok(())
}

/// Refuses to replace an existing file unless `force` is set.
pub fn init(state: &AppState, out: &mut dyn Write, force: bool) -> AppResult<()> {
    let path = config_file(state)?;
    if path.exists() && !force {
        return Err(AppError::validation(format!(
            "{} already exists. Use --force to overwrite it.",
            path.display()
        )));
    }
    state.config.save(Some(path.clone()))?;
    writeln!(out, "Config written to {}", path.display())?;
    Ok(())
}

fn config_file(state: &AppState) -> AppResult<PathBuf> {
    state
        .config_path
        .clone()
        .or_else(KeroConfig::default_config_path)
        .ok_or_else(|| AppError::config("No config directory available on this system."))
}
