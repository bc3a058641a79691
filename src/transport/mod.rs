//! Transport seam between the API facade and whatever sends HTTP.
//!
//! DESIGN
//! ======
//! The facade only ever sees [`Request`], [`Response`] and
//! [`TransportError`]. Implementations classify their own failures into the
//! error variants once, so downstream code matches exhaustively instead of
//! probing optional fields. [`http::HttpTransport`] is the reqwest-backed
//! implementation; tests substitute in-memory stubs.

pub mod http;

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

use std::collections::BTreeMap;

use serde_json::Value;

pub use http::HttpTransport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// Request payload encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Empty,
    Json(Value),
    /// `application/x-www-form-urlencoded` pairs, in order.
    Form(Vec<(String, String)>),
}

/// An outgoing call, addressed relative to the transport's base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub body: Body,
    pub headers: BTreeMap<String, String>,
}

impl Request {
    pub fn post(path: impl Into<String>) -> Self {
        Self { method: Method::Post, path: path.into(), body: Body::Empty, headers: BTreeMap::new() }
    }

    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Body::Json(body);
        self
    }

    #[must_use]
    pub fn form<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.body = Body::Form(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    #[must_use]
    pub fn headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers.extend(headers);
        self
    }
}

/// A completed exchange. `data` is the decoded JSON body, `Value::Null` when
/// the body was empty, or `Value::String` when it was not JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub data: Value,
}

impl Response {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failures a [`Transport`] can report.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    /// The server answered with a non-success status.
    #[error("server responded with status {status}")]
    Response { status: u16, data: Value },

    /// The request went out but nothing came back (timeout, reset, DNS).
    #[error("no response received: {0}")]
    NoResponse(String),

    /// The request could not be built or sent.
    #[error("request setup failed: {0}")]
    Setup(String),

    /// Anything the transport could not place in the variants above.
    #[error("unrecognized transport failure: {0}")]
    Unrecognized(String),
}

/// Sends requests on behalf of the API facade.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` and wait for the outcome.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] for non-success statuses and for any
    /// failure to complete the exchange.
    async fn send(&self, request: Request) -> Result<Response, TransportError>;
}
