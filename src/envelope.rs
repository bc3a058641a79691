//! Uniform result wrapper returned by every remote operation.
//!
//! UI code branches on `success` only. A failed envelope's `message` is ready
//! to display as-is.

#[cfg(test)]
#[path = "envelope_test.rs"]
mod tests;

use serde::{Deserialize, Serialize};

/// Outcome of one API facade call.
///
/// Fields are private so the two shapes below are the only ones that exist:
/// success carries content and a 2xx status, failure carries no content and a
/// non-empty message. Deserialization rejects any other shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEnvelope<T>", bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    success: bool,
    content: Option<T>,
    status: u16,
    message: String,
}

impl<T> Envelope<T> {
    /// A successful outcome. Statuses outside 2xx are clamped to 200.
    pub fn ok(content: T, status: u16) -> Self {
        let status = if (200..300).contains(&status) { status } else { 200 };
        Self { success: true, content: Some(content), status, message: String::new() }
    }

    /// A failed outcome. An empty `message` is replaced by a generic one.
    pub fn failed(status: u16, message: impl Into<String>) -> Self {
        let mut message = message.into();
        if message.trim().is_empty() {
            message = crate::normalize::GENERIC_SERVER_MESSAGE.to_owned();
        }
        Self { success: false, content: None, status, message }
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn content(&self) -> Option<&T> {
        self.content.as_ref()
    }

    pub fn into_content(self) -> Option<T> {
        self.content
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Convert the payload, keeping status and message.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        Envelope { success: self.success, content: self.content.map(f), status: self.status, message: self.message }
    }

    /// `Ok(content)` on success, `Err((status, message))` on failure.
    ///
    /// # Errors
    ///
    /// Returns the status and message of a failed envelope.
    pub fn into_result(self) -> Result<T, (u16, String)> {
        match self.content {
            Some(content) if self.success => Ok(content),
            _ => Err((self.status, self.message)),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("success envelope needs content and a 2xx status")]
    InvalidSuccess,
    #[error("failed envelope must carry no content and a non-empty message")]
    InvalidFailure,
}

/// Wire shape accepted on input, validated into an [`Envelope`].
#[derive(Deserialize)]
struct RawEnvelope<T> {
    success: bool,
    content: Option<T>,
    status: u16,
    #[serde(default)]
    message: String,
}

impl<T> TryFrom<RawEnvelope<T>> for Envelope<T> {
    type Error = EnvelopeError;

    fn try_from(raw: RawEnvelope<T>) -> Result<Self, Self::Error> {
        if raw.success {
            match raw.content {
                Some(content) if (200..300).contains(&raw.status) => Ok(Self::ok(content, raw.status)),
                _ => Err(EnvelopeError::InvalidSuccess),
            }
        } else if raw.content.is_none() && !raw.message.trim().is_empty() {
            Ok(Self::failed(raw.status, raw.message))
        } else {
            Err(EnvelopeError::InvalidFailure)
        }
    }
}
