//! Transport failure → failed [`Envelope`].
//!
//! DESIGN
//! ======
//! Classification is total: every [`TransportError`] maps to exactly one
//! [`FailureKind`], and every kind maps to a displayable message. Priority
//! order is server answer, then missing answer, then everything else (treated
//! as a client-side failure with status 500).
//!
//! Each classified failure goes to a [`FailureReporter`] before the envelope
//! is handed back. The default reporter writes a `tracing` warning.

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::envelope::Envelope;
use crate::transport::TransportError;

pub const NO_RESPONSE_MESSAGE: &str = "No response from server, try again later.";
pub const GENERIC_SERVER_MESSAGE: &str = "An error occurred, please retry.";
pub const GENERIC_CLIENT_MESSAGE: &str = "Could not send the request, please retry.";

/// Status reported when the server never answered.
pub const NO_RESPONSE_STATUS: u16 = 0;
/// Status reported for failures on the client side of the exchange.
pub const CLIENT_FAILURE_STATUS: u16 = 500;

// =============================================================================
// FAILURE KIND
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// The server answered with a non-success status.
    ServerRejected { status: u16, detail: Option<String> },
    /// The request went out and nothing came back.
    NoResponse,
    /// The request could not be built or sent.
    RequestSetupFailed { reason: String },
    /// A failure shape outside the transport's convention.
    Unknown { reason: String },
}

impl FailureKind {
    #[must_use]
    pub fn classify(error: &TransportError) -> Self {
        match error {
            TransportError::Response { status, data } if !(200..300).contains(status) => {
                Self::ServerRejected { status: *status, detail: detail_message(data) }
            }
            TransportError::Response { status, .. } => {
                Self::Unknown { reason: format!("failure carried success status {status}") }
            }
            TransportError::NoResponse(_) => Self::NoResponse,
            TransportError::Setup(reason) => Self::RequestSetupFailed { reason: reason.clone() },
            TransportError::Unrecognized(reason) => Self::Unknown { reason: reason.clone() },
        }
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::ServerRejected { status, .. } => *status,
            Self::NoResponse => NO_RESPONSE_STATUS,
            Self::RequestSetupFailed { .. } | Self::Unknown { .. } => CLIENT_FAILURE_STATUS,
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::ServerRejected { detail: Some(detail), .. } => detail,
            Self::ServerRejected { detail: None, .. } => GENERIC_SERVER_MESSAGE,
            Self::NoResponse => NO_RESPONSE_MESSAGE,
            Self::RequestSetupFailed { .. } | Self::Unknown { .. } => GENERIC_CLIENT_MESSAGE,
        }
    }

    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::ServerRejected { .. } => "E_SERVER_REJECTED",
            Self::NoResponse => "E_NO_RESPONSE",
            Self::RequestSetupFailed { .. } => "E_REQUEST_SETUP",
            Self::Unknown { .. } => "E_UNKNOWN",
        }
    }

    pub fn into_envelope<T>(self) -> Envelope<T> {
        Envelope::failed(self.status(), self.message())
    }
}

/// Pull a displayable message out of an error body.
///
/// Accepts `{"detail": "..."}` and validation errors shaped
/// `{"detail": [{"msg": "..."}, ...]}`.
fn detail_message(data: &Value) -> Option<String> {
    match data.get("detail")? {
        Value::String(detail) if !detail.trim().is_empty() => Some(detail.clone()),
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .filter(|msg| !msg.trim().is_empty())
                .collect();
            if messages.is_empty() { None } else { Some(messages.join("; ")) }
        }
        _ => None,
    }
}

// =============================================================================
// REPORTING
// =============================================================================

/// Receives every classified failure.
pub trait FailureReporter: Send + Sync {
    fn report(&self, operation: &str, kind: &FailureKind);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl FailureReporter for TracingReporter {
    fn report(&self, operation: &str, kind: &FailureKind) {
        match kind {
            FailureKind::ServerRejected { status, detail } => {
                warn!(operation, code = kind.code(), status, detail = ?detail, "server rejected request");
            }
            FailureKind::NoResponse => warn!(operation, code = kind.code(), "no response from server"),
            FailureKind::RequestSetupFailed { reason } | FailureKind::Unknown { reason } => {
                warn!(operation, code = kind.code(), %reason, "request failed on client side");
            }
        }
    }
}

// =============================================================================
// NORMALIZER
// =============================================================================

#[derive(Clone)]
pub struct ErrorNormalizer {
    reporter: Arc<dyn FailureReporter>,
}

impl Default for ErrorNormalizer {
    fn default() -> Self {
        Self::new(Arc::new(TracingReporter))
    }
}

impl ErrorNormalizer {
    pub fn new(reporter: Arc<dyn FailureReporter>) -> Self {
        Self { reporter }
    }

    /// Classify `error`, report it, and wrap it in a failed envelope.
    pub fn normalize<T>(&self, operation: &str, error: &TransportError) -> Envelope<T> {
        self.fail(operation, FailureKind::classify(error))
    }

    /// Report an already classified failure and wrap it in a failed envelope.
    pub fn fail<T>(&self, operation: &str, kind: FailureKind) -> Envelope<T> {
        self.reporter.report(operation, &kind);
        kind.into_envelope()
    }
}

impl std::fmt::Debug for ErrorNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorNormalizer").finish_non_exhaustive()
    }
}
