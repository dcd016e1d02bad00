//! Dashboard user accounts.
//!
//! # Invariants
//! - `username` and `email` are unique; the store enforces both.
//! - The password column is write-only from the caller's point of view:
//!   [`User`] has no password field and `Debug` output redacts it.
//!
//! Passwords are kept as plain text. This mirrors the existing data set and
//! is a known weakness, not a security mechanism.

use super::validation::{email, require, when_present, ValidationResult};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};

/// Read model for a user. Never carries the password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub active: bool,
    pub created_at: i64,
    pub last_login: Option<i64>,
}

#[derive(Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub email: String,
}

impl NewUser {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            email: email.into(),
        }
    }

    pub fn validate(&self) -> ValidationResult {
        require("username", &self.username)?;
        require("password", &self.password)?;
        email(&self.email)
    }
}

impl Debug for NewUser {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("email", &self.email)
            .finish()
    }
}

#[derive(Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub email: Option<String>,
    pub password: Option<String>,
    pub active: Option<bool>,
}

impl UserPatch {
    pub fn validate(&self) -> ValidationResult {
        when_present(self.email.as_deref(), email)?;
        when_present(self.password.as_deref(), |value| require("password", value))
    }
}

impl Debug for UserPatch {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserPatch")
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("active", &self.active)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::NewUser;

    #[test]
    fn debug_output_never_contains_password() {
        let user = NewUser::new("jkowalski", "hunter2", "j.kowalski@devicelab.com");
        let rendered = format!("{user:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("jkowalski"));
    }
}
