//! HTTP request value type.

use crate::error::RequestError;
use crate::message::{Headers, Message};

/// An immutable HTTP request.
///
/// The method defaults to `GET` and is always read back uppercase. The
/// body is a plain string; the empty string is the canonical "no body"
/// representation so content-length computation never deals with absence.
/// All `with_*` constructors copy rather than mutate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    url: String,
    method: String,
    headers: Headers,
    body: String,
}

impl Request {
    /// Creates a `GET` request for `url` with no headers and no body.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: String::from("GET"),
            headers: Headers::new(),
            body: String::new(),
        }
    }

    /// Creates a request whose body is `value` serialized as JSON, with
    /// `Content-Type: application/json` set.
    pub fn json<T: serde::Serialize>(
        url: impl Into<String>,
        method: impl Into<String>,
        value: &T,
    ) -> Result<Self, RequestError> {
        let body = serde_json::to_string(value)
            .map_err(|err| RequestError::new(format!("JSON encoding failed: {err}")))?;
        Ok(Self::new(url)
            .with_method(method)
            .with_body(body)
            .with_header("Content-Type", "application/json"))
    }

    /// Returns a copy with the given method. Empty input falls back to
    /// `GET`; case is accepted as-is and normalized on read.
    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        let method = method.into();
        self.method = if method.is_empty() {
            String::from("GET")
        } else {
            method
        };
        self
    }

    /// Returns a copy with the given body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns a copy with `name` set to `value`, replacing any entry
    /// whose name matches case-insensitively.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Returns a copy with all headers replaced by `headers`.
    #[must_use]
    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    /// Target URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Request method, always uppercase.
    #[must_use]
    pub fn method(&self) -> String {
        self.method.to_ascii_uppercase()
    }
}

impl Message for Request {
    fn headers(&self) -> &Headers {
        &self.headers
    }

    fn body(&self) -> &str {
        &self.body
    }
}

impl From<&str> for Request {
    fn from(url: &str) -> Self {
        Self::new(url)
    }
}

impl From<String> for Request {
    fn from(url: String) -> Self {
        Self::new(url)
    }
}
