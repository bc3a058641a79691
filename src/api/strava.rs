//! Strava account linking.
//!
//! Linking is a browser redirect to Strava's consent page; Strava then calls
//! the backend's `/strava/link` with the code and the `state` we passed (the
//! user id), so the client never sees Strava tokens.

#[cfg(test)]
#[path = "strava_test.rs"]
mod tests;

use tracing::info;
use url::Url;

use super::Api;
use crate::envelope::Envelope;
use crate::navigation::NavigationIntent;
use crate::normalize::FailureKind;

pub const AUTHORIZE_URL: &str = "https://www.strava.com/oauth/authorize";
pub const SCOPES: &str = "read,read_all,profile:read_all,activity:read,activity:read_all";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StravaConfig {
    pub client_id: String,
    /// Backend origin Strava redirects back to, without trailing slash.
    pub backend_url: String,
}

impl StravaConfig {
    pub fn new(client_id: impl Into<String>, backend_url: &str) -> Self {
        Self { client_id: client_id.into(), backend_url: backend_url.trim_end_matches('/').to_owned() }
    }

    /// Load from `STRAVA_CLIENT_ID` and `CYCLITY_BACKEND_URL`.
    /// Returns `None` if either is missing (linking will be disabled).
    #[must_use]
    pub fn from_env() -> Option<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let present = |key: &str| var(key).filter(|value| !value.trim().is_empty());
        let client_id = present("STRAVA_CLIENT_ID")?;
        let backend_url = present("CYCLITY_BACKEND_URL")?;
        Some(Self::new(client_id.trim(), backend_url.trim()))
    }

    pub fn redirect_uri(&self) -> String {
        format!("{}/strava/link", self.backend_url)
    }

    /// Build the consent page URL carrying `state` through the round trip.
    ///
    /// # Errors
    ///
    /// Returns the parse error if the authorize URL cannot be built.
    pub fn authorize_url(&self, state: &str) -> Result<Url, url::ParseError> {
        let redirect_uri = self.redirect_uri();
        Url::parse_with_params(
            AUTHORIZE_URL,
            [
                ("client_id", self.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", redirect_uri.as_str()),
                ("approval_prompt", "force"),
                ("scope", SCOPES),
                ("state", state),
            ],
        )
    }
}

impl Api {
    /// Intent sending the user to Strava's consent page.
    pub fn link_external_provider(&self, state: &str) -> Envelope<NavigationIntent> {
        const OPERATION: &str = "link_external_provider";
        let Some(config) = &self.strava else {
            return self
                .normalizer
                .fail(OPERATION, FailureKind::RequestSetupFailed { reason: "strava linking is not configured".into() });
        };
        match config.authorize_url(state) {
            Ok(url) => {
                info!(client_id = %config.client_id, "strava link prepared");
                Envelope::ok(NavigationIntent::External(url.into()), 200)
            }
            Err(e) => self.normalizer.fail(OPERATION, FailureKind::RequestSetupFailed { reason: e.to_string() }),
        }
    }
}
