//! # User Accounts
//!
//! Account rows and edit payloads for the user-management tool.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::FieldErrors;
use crate::session::{Permissions, ASSIGNED_BRANCH_KEY};
use crate::types::loose;

/// Column that always leads the user table.
pub const POSITION_HEADER: &str = "Position";

pub const PASSWORD_REQUIRED_MESSAGE: &str = "Password is required for new users.";

/// One account as listed by `getUsers`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    #[serde(deserialize_with = "loose::string", default)]
    pub username: String,

    #[serde(deserialize_with = "loose::string", default)]
    pub position: String,

    #[serde(default)]
    pub permissions: Permissions,
}

/// The `getUsers` payload: accounts plus the permission columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserDirectory {
    #[serde(default)]
    pub users: Vec<UserAccount>,

    #[serde(default)]
    pub headers: Vec<String>,
}

impl UserDirectory {
    /// Table columns after the username: `Position` first, then the sheet's.
    pub fn columns(&self) -> Vec<String> {
        let mut columns = self.headers.clone();
        if !columns.iter().any(|h| h == POSITION_HEADER) {
            columns.insert(0, POSITION_HEADER.to_string());
        }
        columns
    }

    /// Columns rendered as checkboxes.
    pub fn permission_flags(&self) -> Vec<&str> {
        self.headers
            .iter()
            .map(String::as_str)
            .filter(|h| *h != POSITION_HEADER && *h != ASSIGNED_BRANCH_KEY)
            .collect()
    }

    pub fn find(&self, username: &str) -> Option<&UserAccount> {
        self.users.iter().find(|u| u.username == username)
    }

    /// Full checkbox map for `username` with one flag changed.
    ///
    /// The server replaces the whole map, so every flag column is sent.
    pub fn permissions_with(&self, username: &str, flag: &str, granted: bool) -> Option<BTreeMap<String, bool>> {
        let account = self.find(username)?;
        let mut map: BTreeMap<String, bool> = self
            .permission_flags()
            .into_iter()
            .map(|f| (f.to_string(), account.permissions.is_granted(f)))
            .collect();
        map.insert(flag.to_string(), granted);
        Some(map)
    }
}

/// Header text as shown in the table.
pub fn display_header(header: &str) -> String {
    header.replace('_', " ")
}

// =============================================================================
// Edit Payloads
// =============================================================================

/// The add-user form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    #[serde(rename = "assignedBranchCode")]
    pub assigned_branch_code: String,
    pub position: String,
}

impl NewUser {
    /// Checks the form and returns it trimmed. The password is kept as typed.
    pub fn validate(&self) -> Result<NewUser, FieldErrors> {
        let mut errors = FieldErrors::default();
        let username = self.username.trim();
        if username.is_empty() {
            errors.push("username", "Username is required.");
        }
        if self.password.is_empty() {
            errors.push("password", PASSWORD_REQUIRED_MESSAGE);
        }
        errors.into_result(NewUser {
            username: username.to_string(),
            password: self.password.clone(),
            assigned_branch_code: self.assigned_branch_code.trim().to_string(),
            position: self.position.trim().to_string(),
        })
    }
}

/// A single `updateUser` change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum UserUpdate {
    Password {
        username: String,
        password: String,
    },
    Permissions {
        username: String,
        permissions: BTreeMap<String, bool>,
    },
    AssignedBranch {
        username: String,
        #[serde(rename = "assignedBranchCode")]
        assigned_branch_code: String,
    },
    Position {
        username: String,
        position: String,
    },
}

impl UserUpdate {
    pub fn username(&self) -> &str {
        match self {
            UserUpdate::Password { username, .. }
            | UserUpdate::Permissions { username, .. }
            | UserUpdate::AssignedBranch { username, .. }
            | UserUpdate::Position { username, .. } => username,
        }
    }

    /// Message shown after the server accepts the change.
    pub fn success_message(&self) -> String {
        match self {
            UserUpdate::Password { username, .. } => format!("Password reset for {username}."),
            UserUpdate::Permissions { username, .. } => format!("Permissions updated for {username}."),
            UserUpdate::AssignedBranch { username, .. } | UserUpdate::Position { username, .. } => {
                format!("Data updated for {username}.")
            }
        }
    }
}

/// Confirmation prompt for deleting an account.
pub fn delete_prompt(username: &str) -> String {
    format!("Are you sure you want to delete \"{username}\"?")
}

// =============================================================================
// Unit Tests
// =============================================================================
