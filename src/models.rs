//! Wire DTOs for the account endpoints.
//!
//! DESIGN
//! ======
//! Field names mirror the backend's JSON exactly (snake_case) so serde needs
//! no renames. Profile fields the backend may omit or null are `Option`.

#[cfg(test)]
#[path = "models_test.rs"]
mod tests;

use serde::{Deserialize, Serialize};

/// Account returned by `/login/test-token`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub is_active: bool,
    pub is_superuser: bool,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    /// ISO date as sent by the backend; not parsed client-side.
    #[serde(default)]
    pub birthdate: Option<String>,
    #[serde(default)]
    pub gender: Option<i32>,
    #[serde(default)]
    pub photo_path: Option<String>,
    #[serde(default)]
    pub preferred_language: Option<String>,
    #[serde(default)]
    pub access_type: Option<i32>,
}

/// Registration payload for `POST /users`. New accounts start inactive and
/// unprivileged until the emailed activation link is used.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct UserCreate {
    pub email: String,
    pub username: String,
    pub password: String,
    pub is_active: bool,
    pub is_superuser: bool,
}

impl UserCreate {
    pub fn new(email: impl Into<String>, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            username: username.into(),
            password: password.into(),
            is_active: false,
            is_superuser: false,
        }
    }
}

impl std::fmt::Debug for UserCreate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserCreate")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish_non_exhaustive()
    }
}

/// `{ "msg": ... }` acknowledgement returned by the account endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Msg {
    pub msg: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ActivateAccount {
    pub email: String,
    pub nonce: String,
}

#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct ResetPassword {
    pub email: String,
    pub new_password: String,
    pub nonce: String,
}

impl std::fmt::Debug for ResetPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResetPassword")
            .field("email", &self.email)
            .field("new_password", &"<redacted>")
            .finish_non_exhaustive()
    }
}
