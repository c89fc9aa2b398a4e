//! HTTP/1.1 request serialization.
//!
//! Turns a [`Request`] plus [`Options`] into the literal wire bytes
//! written to the socket. No header-name validation is performed; header
//! lines are copied verbatim in insertion order.

use crate::message::Message;
use crate::options::Options;
use crate::request::Request;
use crate::resolver::parse_url;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

/// Serializes `request` into a complete HTTP/1.1 request byte sequence.
///
/// The request path is the URL with its `scheme://host` prefix stripped
/// and the leading slash trimmed. `Content-length` is always emitted,
/// including for an empty body. `Connection: close` terminates the header
/// block; a non-empty body is appended verbatim followed by a trailing
/// line break.
#[must_use]
pub fn build(request: &Request, options: &Options) -> String {
    let url = request.url();
    let (scheme, host) = match parse_url(url) {
        Some(parsed) => (parsed.scheme, parsed.host),
        None => (String::new(), String::new()),
    };
    let prefix = format!("{scheme}://{host}");
    let path = url.replacen(&prefix, "", 1);
    let path = path.trim_start_matches('/');

    let body = request.body();
    let mut out = String::new();
    out.push_str(&format!("{} /{path} HTTP/1.1\r\n", request.method()));
    out.push_str(&format!("Host: {host}\r\n"));
    out.push_str(&format!("Content-length: {}\r\n", body.len()));

    for (name, value) in request.headers().iter() {
        out.push_str(&format!("{name}: {value}\r\n"));
    }

    if let Some(auth) = options.auth().filter(|auth| !auth.username.is_empty()) {
        let credentials = BASE64.encode(format!("{}:{}", auth.username, auth.password));
        out.push_str(&format!("Authorization: Basic {credentials}\r\n"));
    }

    out.push_str("Connection: close\r\n\r\n");

    if !body.is_empty() {
        out.push_str(body);
        out.push_str("\r\n");
    }

    out
}
