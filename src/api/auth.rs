//! Login and logout.

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;

use tracing::info;

use super::Api;
use crate::envelope::Envelope;
use crate::guard::LOGIN_PATH;
use crate::navigation::{Location, NavigationIntent};
use crate::session::Token;
use crate::transport::Request;

pub const ACCESS_TOKEN_PATH: &str = "/login/access-token";

impl Api {
    /// Exchange credentials for a token (OAuth2 password grant, form encoded).
    ///
    /// On success the token is installed in the session; `keep_me` decides
    /// whether it is persisted.
    pub async fn authenticate(&self, username: &str, password: &str, keep_me: bool) -> Envelope<Token> {
        let request = Request::post(ACCESS_TOKEN_PATH).form([("username", username), ("password", password)]);
        let envelope: Envelope<Token> = self.call("authenticate", request).await;
        if let Some(token) = envelope.content() {
            self.session.set_token(token.clone(), keep_me);
            info!(username, keep_me, "login succeeded");
        }
        envelope
    }

    /// Drop the session and the cached user. The caller executes the
    /// returned intent.
    pub fn logout(&self) -> NavigationIntent {
        self.session.clear_token();
        self.set_current_user(None);
        info!("logged out");
        NavigationIntent::Route(Location::new(LOGIN_PATH))
    }
}
