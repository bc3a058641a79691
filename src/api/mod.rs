//! API facade: every remote operation the UI can trigger.
//!
//! SYSTEM CONTEXT
//! ==============
//! UI code calls methods on [`Api`] and branches on `envelope.success()`.
//! Operations live in `auth`, `users` and `strava`; all of them funnel
//! through [`Api::call`], which is the only place a transport outcome turns
//! into an [`Envelope`].
//!
//! ERROR HANDLING
//! ==============
//! Nothing escapes as `Err`. Transport failures go through the
//! [`ErrorNormalizer`]; a 2xx body that does not decode as the expected type
//! is reported as `Unknown`; a body that cannot be serialized before sending
//! is reported as `RequestSetupFailed`.

pub mod auth;
pub mod strava;
pub mod users;

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ClientConfig;
use crate::envelope::Envelope;
use crate::models::User;
use crate::normalize::{ErrorNormalizer, FailureKind};
use crate::session::Session;
use crate::transport::{HttpTransport, Request, Transport, TransportError};

use strava::StravaConfig;

pub struct Api {
    transport: Arc<dyn Transport>,
    session: Session,
    normalizer: ErrorNormalizer,
    strava: Option<StravaConfig>,
    current_user: RwLock<Option<User>>,
}

impl Api {
    pub fn new(transport: Arc<dyn Transport>, session: Session) -> Self {
        Self {
            transport,
            session,
            normalizer: ErrorNormalizer::default(),
            strava: None,
            current_user: RwLock::new(None),
        }
    }

    /// Facade over an [`HttpTransport`] built from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Setup`] if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig, session: Session) -> Result<Self, TransportError> {
        let transport = HttpTransport::from_config(config)?;
        Ok(Self::new(Arc::new(transport), session).with_strava(config.strava.clone()))
    }

    #[must_use]
    pub fn with_normalizer(mut self, normalizer: ErrorNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    #[must_use]
    pub fn with_strava(mut self, strava: Option<StravaConfig>) -> Self {
        self.strava = strava;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// User fetched by the last successful `get_current_user`, until logout.
    pub fn current_user(&self) -> Option<User> {
        self.current_user.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn set_current_user(&self, user: Option<User>) {
        *self.current_user.write().unwrap_or_else(PoisonError::into_inner) = user;
    }

    /// Send `request` and fold the outcome into an envelope.
    async fn call<T: DeserializeOwned>(&self, operation: &'static str, request: Request) -> Envelope<T> {
        debug!(operation, method = request.method.as_str(), path = %request.path, "api call");
        match self.transport.send(request).await {
            Ok(response) if response.is_success() => {
                let status = response.status;
                match serde_json::from_value::<T>(response.data) {
                    Ok(content) => Envelope::ok(content, status),
                    Err(e) => self
                        .normalizer
                        .fail(operation, FailureKind::Unknown { reason: format!("undecodable payload: {e}") }),
                }
            }
            Ok(response) => self
                .normalizer
                .normalize(operation, &TransportError::Response { status: response.status, data: response.data }),
            Err(error) => self.normalizer.normalize(operation, &error),
        }
    }

    /// POST `body` as JSON to `path`.
    async fn post_json<B, T>(&self, operation: &'static str, path: &str, body: &B) -> Envelope<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        match serde_json::to_value(body) {
            Ok(value) => self.call(operation, Request::post(path).json(value)).await,
            Err(e) => self.normalizer.fail(operation, FailureKind::RequestSetupFailed { reason: e.to_string() }),
        }
    }
}

impl std::fmt::Debug for Api {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Api")
            .field("session", &self.session)
            .field("strava", &self.strava)
            .finish_non_exhaustive()
    }
}
