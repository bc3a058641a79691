//! Account endpoints: current user, registration, activation, password reset.

#[cfg(test)]
#[path = "users_test.rs"]
mod tests;

use serde_json::Value;

use super::Api;
use crate::envelope::Envelope;
use crate::models::{ActivateAccount, Msg, ResetPassword, User, UserCreate};
use crate::transport::Request;

pub const TEST_TOKEN_PATH: &str = "/login/test-token";
pub const USERS_PATH: &str = "/users";
pub const ACTIVATE_PATH: &str = "/users/activate-account";
pub const RESEND_ACTIVATION_PATH: &str = "/users/resend-activation-email";
pub const RESET_PASSWORD_PATH: &str = "/reset-password";

fn forgot_password_path(email: &str) -> String {
    format!("/forgot-password/{}", urlencoding::encode(email))
}

impl Api {
    /// Fetch the account behind the session token.
    ///
    /// The `Authorization` header is attached here rather than by the
    /// transport, so this works as the first call after a restart.
    pub async fn get_current_user(&self) -> Envelope<User> {
        let request = Request::post(TEST_TOKEN_PATH).headers(self.session.auth_header());
        let envelope: Envelope<User> = self.call("get_current_user", request).await;
        if let Some(user) = envelope.content() {
            self.set_current_user(Some(user.clone()));
        }
        envelope
    }

    pub async fn create_user(&self, email: &str, username: &str, password: &str) -> Envelope<Msg> {
        let body = UserCreate::new(email, username, password);
        self.post_json("create_user", USERS_PATH, &body).await
    }

    pub async fn activate(&self, email: &str, nonce: &str) -> Envelope<Msg> {
        let body = ActivateAccount { email: email.to_owned(), nonce: nonce.to_owned() };
        self.post_json("activate", ACTIVATE_PATH, &body).await
    }

    /// The body is the bare email as a JSON string.
    pub async fn resend_activation(&self, email: &str) -> Envelope<Msg> {
        let request = Request::post(RESEND_ACTIVATION_PATH).json(Value::String(email.to_owned()));
        self.call("resend_activation", request).await
    }

    pub async fn forgot_password(&self, email: &str) -> Envelope<Msg> {
        self.call("forgot_password", Request::post(forgot_password_path(email))).await
    }

    pub async fn reset_password(&self, email: &str, new_password: &str, nonce: &str) -> Envelope<Msg> {
        let body =
            ResetPassword { email: email.to_owned(), new_password: new_password.to_owned(), nonce: nonce.to_owned() };
        self.post_json("reset_password", RESET_PASSWORD_PATH, &body).await
    }
}
