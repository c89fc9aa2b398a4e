//! HTTP response value type.

use crate::message::{Headers, Message};

/// An immutable HTTP response.
///
/// Constructed by the response parser, or explicitly (mostly in tests).
/// The default value is an empty `200 OK`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status_code: u16,
    reason_phrase: String,
    headers: Headers,
    body: String,
}

impl Response {
    /// Creates a response from its parts.
    #[must_use]
    pub fn new(
        body: impl Into<String>,
        status_code: u16,
        headers: Headers,
        reason_phrase: impl Into<String>,
    ) -> Self {
        Self {
            status_code,
            reason_phrase: reason_phrase.into(),
            headers,
            body: body.into(),
        }
    }

    /// Status code, e.g. 200 or 404.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Reason phrase, e.g. "OK".
    #[must_use]
    pub fn reason_phrase(&self) -> &str {
        &self.reason_phrase
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new("", 200, Headers::new(), "OK")
    }
}

impl Message for Response {
    fn headers(&self) -> &Headers {
        &self.headers
    }

    fn body(&self) -> &str {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_empty_200_ok() {
        let response = Response::default();
        assert_eq!(response.body(), "");
        assert_eq!(response.status_code(), 200);
        assert!(response.headers().is_empty());
        assert_eq!(response.reason_phrase(), "OK");
    }

    #[test]
    fn carries_provided_body_and_status() {
        let body = "{\"errors\":{\"password\":[\"password is required\"]}}";
        let response = Response::new(body, 422, Headers::new(), "Unprocessable Entity");
        assert_eq!(response.body(), body);
        assert_eq!(response.status_code(), 422);
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let headers: Headers = [
            ("Content-Type", "application/json"),
            ("Origin", "http://localhost"),
        ]
        .into_iter()
        .collect();
        let response = Response::new("", 200, headers, "OK");

        assert_eq!(
            response.header("content-type").as_deref(),
            Some("application/json")
        );
        assert_eq!(response.header("ORIGIN").as_deref(), Some("http://localhost"));
        assert!(!response.has_header("X-Missing"));
    }
}
