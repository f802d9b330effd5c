//! # Confirmation Prompts
//!
//! Destructive commands (delete an entry, clear the ledger, delete a user)
//! ask before acting. The answer comes from a [`Confirm`] implementation so
//! `--yes` and tests can skip the terminal.

use dialoguer::theme::ColorfulTheme;
use dialoguer::Confirm as DialoguerConfirm;

use crate::error::AppResult;

pub trait Confirm: Send + Sync {
    /// Asks a yes/no question. `false` means leave everything untouched.
    fn confirm(&self, question: &str) -> AppResult<bool>;
}

/// Asks on the terminal; Enter means no.
#[derive(Default)]
pub struct TerminalConfirm {
    theme: ColorfulTheme,
}

impl Confirm for TerminalConfirm {
    fn confirm(&self, question: &str) -> AppResult<bool> {
        let answer = DialoguerConfirm::with_theme(&self.theme)
            .with_prompt(question)
            .default(false)
            .interact()?;
        Ok(answer)
    }
}

/// Fixed answer without asking.
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm {
    answer: bool,
}

impl AutoConfirm {
    /// `--yes`
    pub fn yes() -> Self {
        AutoConfirm { answer: true }
    }

    pub fn no() -> Self {
        AutoConfirm { answer: false }
    }
}

impl Confirm for AutoConfirm {
    fn confirm(&self, question: &str) -> AppResult<bool> {
        tracing::debug!(question, answer = self.answer, "Confirmation answered automatically");
        Ok(self.answer)
    }
}
