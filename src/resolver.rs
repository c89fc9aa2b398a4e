//! URL to transport-address resolution.
//!
//! Maps a request URL (plus an optional explicit port override) to the
//! `transport://host[:port]` connection string used to open the socket.

use crate::error::RequestError;
use regex::Regex;
use std::sync::LazyLock;

/// Dotted-quad pattern for the raw-IP fast path. Textual only; values
/// above 255 still match, exactly like the address heuristic this client
/// documents.
static IPV4: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}").expect("ipv4 pattern"));

/// Scheme, host, and optional port extracted from a URL.
///
/// Deliberately not a general URL parser: the client only needs the
/// `scheme://host[:port]` prefix, everything past the authority is left to
/// the request serializer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    /// URL scheme, e.g. `http`.
    pub scheme: String,
    /// Host name or address literal.
    pub host: String,
    /// Port embedded in the URL, if any.
    pub port: Option<u16>,
}

/// Splits `url` into scheme, host, and embedded port. Returns `None` when
/// no scheme separator or no host is present.
#[must_use]
pub fn parse_url(url: &str) -> Option<ParsedUrl> {
    let (scheme, rest) = url.split_once("://")?;
    let authority = rest
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    let (host, port) = match authority.split_once(':') {
        Some((host, port)) => (host, port.parse::<u16>().ok()),
        None => (authority, None),
    };
    if scheme.is_empty() || host.is_empty() {
        return None;
    }
    Some(ParsedUrl {
        scheme: scheme.to_owned(),
        host: host.to_owned(),
        port,
    })
}

/// Resolves `url` to a `transport://host[:port]` connection string.
///
/// An IPv4-literal input bypasses URL parsing entirely and resolves to
/// plain TCP on port 80. Otherwise `https` maps to the `ssl` transport,
/// `http` to `tcp`, and any other scheme is passed through unchanged. The
/// effective port precedence is: explicit override, port embedded in the
/// URL, scheme default (443 for https, 80 for http, none otherwise).
///
/// # Errors
///
/// Returns an address-resolution error when no host can be extracted.
pub fn resolve(url: &str, port: Option<u16>) -> Result<String, RequestError> {
    if let Some(literal) = IPV4.find(url) {
        return Ok(format!("tcp://{}:80", literal.as_str()));
    }

    let parsed = parse_url(url).ok_or_else(|| {
        RequestError::address("HOST URL is not a valid url component nor a valid address")
    })?;

    let transport = match parsed.scheme.as_str() {
        "https" => "ssl",
        "http" => "tcp",
        other => other,
    };
    let default_port = match parsed.scheme.as_str() {
        "https" => Some(443),
        "http" => Some(80),
        _ => None,
    };
    let port = port.or(parsed.port).or(default_port);

    Ok(match port {
        Some(port) => format!("{transport}://{}:{port}", parsed.host),
        None => format!("{transport}://{}", parsed.host),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn https_resolves_to_ssl_443() {
        assert_eq!(
            resolve("https://example.com", None).unwrap(),
            "ssl://example.com:443"
        );
    }

    #[test]
    fn http_keeps_the_embedded_port() {
        assert_eq!(
            resolve("http://example.com:8080", None).unwrap(),
            "tcp://example.com:8080"
        );
    }

    #[test]
    fn ipv4_literal_bypasses_parsing() {
        assert_eq!(resolve("127.0.0.1", None).unwrap(), "tcp://127.0.0.1:80");
        // Textual match only, not a range-checked address.
        assert_eq!(resolve("999.1.1.1", None).unwrap(), "tcp://999.1.1.1:80");
        // The fast path extracts the literal regardless of scheme.
        assert_eq!(
            resolve("https://10.0.0.1", None).unwrap(),
            "tcp://10.0.0.1:80"
        );
    }

    #[test]
    fn explicit_port_wins_over_url_and_default() {
        assert_eq!(
            resolve("https://example.com:444", Some(9443)).unwrap(),
            "ssl://example.com:9443"
        );
    }

    #[test]
    fn unknown_scheme_passes_through_without_port() {
        assert_eq!(resolve("ws://example.com", None).unwrap(), "ws://example.com");
    }

    #[test]
    fn missing_host_is_an_address_error() {
        let err = resolve("example.com", None).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Address);
        let err = resolve("http://", None).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Address);
    }

    #[test]
    fn path_and_query_are_ignored() {
        assert_eq!(
            resolve("http://example.com/a/b?c=d", None).unwrap(),
            "tcp://example.com:80"
        );
    }
}
