//! # Session Gate
//!
//! The logged-in user record kept under `keroUser`, and the checks a tool
//! runs against it before starting.
//!
//! ## Gate Decision
//! ```text
//! stored keroUser
//!   │
//!   ├── absent ───────────────► RedirectToLogin (nothing to clear)
//!   ├── not valid JSON ───────► RedirectToLogin (clear stored value)
//!   ├── lacks every required ─► Denied
//!   │   permission
//!   └── otherwise ────────────► Granted(session)
//! ```
//!
//! Login itself happens elsewhere; this module only reads what it left.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::loose;

/// Permission key holding the user's branch code rather than a flag.
pub const ASSIGNED_BRANCH_KEY: &str = "AssignedBranchCode";

/// Permissions that open user management.
pub const USER_MANAGEMENT_PERMISSIONS: [&str; 2] = ["admin", "user-management"];

/// Path of the login page.
pub const LOGIN_PATH: &str = "/login/";

// =============================================================================
// Permissions
// =============================================================================

/// Permission map as stored: flags plus `AssignedBranchCode`.
///
/// Flag values come from a spreadsheet, so `true`, `1`, `"TRUE"` and `"yes"`
/// all count as granted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permissions(BTreeMap<String, Value>);

impl Permissions {
    pub fn new() -> Self {
        Permissions::default()
    }

    /// True if the flag is present and truthy.
    pub fn is_granted(&self, flag: &str) -> bool {
        self.0.get(flag).is_some_and(is_truthy)
    }

    /// True if any of the flags is granted.
    pub fn any_granted(&self, flags: &[&str]) -> bool {
        flags.iter().any(|flag| self.is_granted(flag))
    }

    /// Assigned branch code as text, `None` when blank or missing.
    pub fn assigned_branch_code(&self) -> Option<String> {
        self.0
            .get(ASSIGNED_BRANCH_KEY)
            .map(loose::to_text)
            .map(|code| code.trim().to_string())
            .filter(|code| !code.is_empty())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl FromIterator<(String, Value)> for Permissions {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Permissions(iter.into_iter().collect())
    }
}

/// Spreadsheet truthiness for permission cells.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(s.trim().to_lowercase().as_str(), "true" | "yes" | "1"),
        _ => false,
    }
}

// =============================================================================
// Session
// =============================================================================

/// The stored login record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(deserialize_with = "loose::string", default)]
    pub username: String,

    #[serde(default)]
    pub permissions: Permissions,

    /// Fields the login page stores that nothing here reads.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Session {
    pub fn new(username: impl Into<String>, permissions: Permissions) -> Self {
        Session {
            username: username.into(),
            permissions,
            extra: BTreeMap::new(),
        }
    }
}

/// Why the user is being sent to the login page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginReason {
    /// No stored session.
    Missing,
    /// Stored session could not be read.
    Corrupt,
    /// Logged out after the idle timeout.
    Idle,
}

impl LoginReason {
    /// Login page URL for this reason.
    pub fn login_url(&self) -> String {
        match self {
            LoginReason::Idle => format!("{LOGIN_PATH}?reason=idle"),
            LoginReason::Missing | LoginReason::Corrupt => LOGIN_PATH.to_string(),
        }
    }
}

impl fmt::Display for LoginReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoginReason::Missing => f.write_str("not logged in"),
            LoginReason::Corrupt => f.write_str("stored session is unreadable"),
            LoginReason::Idle => f.write_str("logged out after inactivity"),
        }
    }
}

/// Outcome of a gate check.
#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    Granted(Session),
    RedirectToLogin {
        reason: LoginReason,
        /// The stored value must be removed before redirecting.
        clear_stored: bool,
    },
    Denied,
}

/// Checks the stored session text.
///
/// An empty `required` list only checks that a readable session exists.
///
/// ## Example
/// ```rust
/// use kero_core::session::{gate, GateDecision};
///
/// let stored = r#"{"username":"mona","permissions":{"admin":true}}"#;
/// assert!(matches!(gate(Some(stored), &["admin"]), GateDecision::Granted(_)));
/// assert_eq!(gate(Some(stored), &["user-management"]), GateDecision::Denied);
/// ```
pub fn gate(stored: Option<&str>, required: &[&str]) -> GateDecision {
    let Some(text) = stored else {
        return GateDecision::RedirectToLogin {
            reason: LoginReason::Missing,
            clear_stored: false,
        };
    };

    let session: Session = match serde_json::from_str(text) {
        Ok(session) => session,
        Err(_) => {
            return GateDecision::RedirectToLogin {
                reason: LoginReason::Corrupt,
                clear_stored: true,
            }
        }
    };

    if required.is_empty() || session.permissions.any_granted(required) {
        GateDecision::Granted(session)
    } else {
        GateDecision::Denied
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthiness() {
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!(" TRUE ")));
        assert!(is_truthy(&json!("yes")));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!("FALSE")));
        assert!(!is_truthy(&Value::Null));
    }

    #[test]
    fn test_gate_missing_and_corrupt() {
        assert_eq!(
            gate(None, &[]),
            GateDecision::RedirectToLogin {
                reason: LoginReason::Missing,
                clear_stored: false
            }
        );
        assert_eq!(
            gate(Some("{not json"), &[]),
            GateDecision::RedirectToLogin {
                reason: LoginReason::Corrupt,
                clear_stored: true
            }
        );
    }

    #[test]
    fn test_gate_permissions() {
        let stored = json!({
            "username": "mona",
            "permissions": {"user-management": "TRUE", "AssignedBranchCode": 101},
            "displayName": "Mona"
        })
        .to_string();

        match gate(Some(&stored), &USER_MANAGEMENT_PERMISSIONS) {
            GateDecision::Granted(session) => {
                assert_eq!(session.username, "mona");
                assert_eq!(session.permissions.assigned_branch_code().as_deref(), Some("101"));
                assert_eq!(session.extra["displayName"], "Mona");
            }
            other => panic!("expected granted, got {other:?}"),
        }

        let plain = json!({"username": "ali", "permissions": {}}).to_string();
        assert_eq!(gate(Some(&plain), &USER_MANAGEMENT_PERMISSIONS), GateDecision::Denied);
        assert!(matches!(gate(Some(&plain), &[]), GateDecision::Granted(_)));
    }

    #[test]
    fn test_login_urls() {
        assert_eq!(LoginReason::Idle.login_url(), "/login/?reason=idle");
        assert_eq!(LoginReason::Missing.login_url(), "/login/");
    }

    #[test]
    fn test_blank_branch_code_is_none() {
        let perms: Permissions = serde_json::from_value(json!({"AssignedBranchCode": "  "})).unwrap();
        assert!(perms.assigned_branch_code().is_none());
    }
}
