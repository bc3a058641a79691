//! reqwest-backed [`Transport`].
//!
//! Thin wrapper: joins the request path onto the API base URL, encodes the
//! body, and sorts reqwest's failures into [`TransportError`] variants. Pure
//! body decoding lives in `decode_body` for testability.

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use super::{Body, Method, Request, Response, Transport, TransportError};
use crate::config::{ClientConfig, Timeouts};

pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Build a transport for `base_url` (e.g. `http://localhost:8000/api/v1`).
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Setup`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeouts: Timeouts) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| TransportError::Setup(e.to_string()))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_owned() })
    }

    /// Build a transport from the API settings in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Setup`] if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        Self::new(&config.api_url, config.timeouts)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: Request) -> Result<Response, TransportError> {
        let url = self.url(&request.path);
        debug!(method = request.method.as_str(), %url, "sending request");

        let mut builder = match request.method {
            Method::Get => self.http.get(&url),
            Method::Post => self.http.post(&url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match &request.body {
            Body::Empty => builder,
            Body::Json(value) => builder.json(value),
            Body::Form(pairs) => builder.form(pairs),
        };

        let response = builder.send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::NoResponse(e.to_string()))?;
        let data = decode_body(&text);

        if !(200..300).contains(&status) {
            return Err(TransportError::Response { status, data });
        }
        Ok(Response { status, data })
    }
}

/// Sort a reqwest failure into a [`TransportError`] variant.
fn classify(e: reqwest::Error) -> TransportError {
    if e.is_builder() {
        TransportError::Setup(e.to_string())
    } else if e.is_timeout() || e.is_connect() || e.is_request() || e.is_body() {
        TransportError::NoResponse(e.to_string())
    } else {
        TransportError::Unrecognized(e.to_string())
    }
}

fn decode_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_owned()))
}
