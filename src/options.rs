//! Per-fetch options.

use std::path::{Path, PathBuf};

/// Basic-auth credentials for the `Authorization: Basic` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicAuth {
    /// Account name; the auth header is only emitted when non-empty.
    pub username: String,
    /// Account password.
    pub password: String,
}

/// Options recognized by [`fetch`](crate::fetch).
///
/// Passed read-only through the whole pipeline; nothing mutates them.
#[derive(Debug, Clone, Default)]
pub struct Options {
    debug: bool,
    cert: Option<PathBuf>,
    auth: Option<BasicAuth>,
    port: Option<u16>,
}

impl Options {
    /// Creates options with every knob unset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables observational request tracing. Never changes the request
    /// lifecycle, only what gets logged.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Sets a CA file to verify the peer against. When absent,
    /// self-signed certificates are accepted.
    #[must_use]
    pub fn with_cert(mut self, cert: impl Into<PathBuf>) -> Self {
        self.cert = Some(cert.into());
        self
    }

    /// Sets basic-auth credentials.
    #[must_use]
    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = Some(BasicAuth {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    /// Overrides the port, taking precedence over the URL and the scheme
    /// default.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Whether debug tracing is enabled.
    #[must_use]
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// CA file path, if configured.
    #[must_use]
    pub fn cert(&self) -> Option<&Path> {
        self.cert.as_deref()
    }

    /// Basic-auth credentials, if configured.
    #[must_use]
    pub fn auth(&self) -> Option<&BasicAuth> {
        self.auth.as_ref()
    }

    /// Explicit port override, if configured.
    #[must_use]
    pub fn port(&self) -> Option<u16> {
        self.port
    }
}
