//! Request error carrier.

use crate::response::Response;
use std::io;
use thiserror::Error;

/// Default error code when none applies.
const DEFAULT_CODE: u16 = 500;

/// Classification of a request failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The URL could not be resolved to a transport address.
    Address,
    /// The socket could not be opened, or I/O failed mid-flight.
    Connection,
    /// The response byte stream could not be parsed.
    Protocol,
    /// Any other caller-raised failure.
    Other,
}

/// Error produced by a failed fetch, covering transport failures,
/// protocol failures, and caller-raised errors.
///
/// A received [`Response`] is attached only when the caller explicitly
/// constructs the error with one ([`RequestError::with_response`]); the
/// parser never flags non-2xx responses as errors on its own.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct RequestError {
    kind: ErrorKind,
    message: String,
    code: u16,
    response: Option<Response>,
}

impl RequestError {
    /// Creates a general error with the default code 500.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Other,
            message: message.into(),
            code: DEFAULT_CODE,
            response: None,
        }
    }

    /// Creates an address-resolution error.
    #[must_use]
    pub fn address(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Address,
            ..Self::new(message)
        }
    }

    /// Creates a connection error carrying the underlying system error
    /// text.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Connection,
            ..Self::new(message)
        }
    }

    /// Creates a protocol error with an explicit code.
    #[must_use]
    pub fn protocol(message: impl Into<String>, code: u16) -> Self {
        Self {
            kind: ErrorKind::Protocol,
            code,
            ..Self::new(message)
        }
    }

    /// Creates an error judged from an already-received response, keeping
    /// that response attached.
    #[must_use]
    pub fn with_response(response: Response, message: impl Into<String>, code: u16) -> Self {
        Self {
            message: message.into(),
            code,
            response: Some(response),
            ..Self::new("")
        }
    }

    /// Failure classification.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Human-readable failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Error code; defaults to 500.
    #[must_use]
    pub fn code(&self) -> u16 {
        self.code
    }

    /// Returns true when a received response is attached.
    #[must_use]
    pub fn has_response(&self) -> bool {
        self.response.is_some()
    }

    /// The attached response, if any.
    #[must_use]
    pub fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    /// Consumes the error, yielding the attached response, if any.
    #[must_use]
    pub fn into_response(self) -> Option<Response> {
        self.response
    }
}

impl From<io::Error> for RequestError {
    fn from(err: io::Error) -> Self {
        Self::connection(err.to_string())
    }
}
