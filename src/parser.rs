//! HTTP/1.1 response parsing.
//!
//! Parses the raw bytes accumulated from one connection into a
//! [`Response`]. Parsing never fails for non-2xx status codes; the only
//! parse failure is an unmatchable status line.

use crate::error::RequestError;
use crate::message::Headers;
use crate::response::Response;
use memchr::memmem;
use regex::Regex;
use std::sync::LazyLock;

/// Status line: `HTTP/<version> <3-digit-code>[ <reason>]`.
static STATUS_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^HTTP/[0-9.]* ([0-9]{3})(?: ([^\r\n]*))?").expect("status-line pattern")
});

/// JSON-family media types: `application`/`text` top level, optional
/// vendor or suffix segments, ending in a `json` variant.
static JSON_MEDIA_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:application|text)/(?:[a-z]+(?:[.-][0-9a-z]+)*[+.]|x-)?json(?:-[a-z]+)?")
        .expect("json media-type pattern")
});

/// Narrow success band treated as "Ok" by this client. Intentionally
/// 200–201, not a general 2xx classifier.
const SUCCESS_BAND: std::ops::RangeInclusive<u16> = 200..=201;

/// Parses one accumulated response byte stream into a [`Response`].
///
/// The header block's first line is stored verbatim under the synthetic
/// `Request-Line` key. When the `Content-Type` is a JSON-family media
/// type, a best-effort cleanup pass trims any bytes outside the first
/// `{` .. last `}` span of the body.
///
/// # Errors
///
/// Fails with a protocol error (`"Invalid HTTP reply."`, code 500) when
/// the first line does not match the status-line pattern. Non-2xx status
/// codes are never treated as errors here.
pub fn parse(raw: &[u8]) -> Result<Response, RequestError> {
    let text = String::from_utf8_lossy(raw);

    let captures = STATUS_LINE
        .captures(&text)
        .ok_or_else(|| RequestError::protocol("Invalid HTTP reply.", 500))?;
    let status_code: u16 = captures[1].parse().expect("three digits fit u16");

    let (header_block, body) = match memmem::find(text.as_bytes(), b"\r\n\r\n") {
        Some(at) => (&text[..at], &text[at + 4..]),
        // No blank-line boundary: the whole remainder is headers.
        None => (text.as_ref(), ""),
    };
    let headers = parse_headers(header_block);

    let body = if headers
        .get("Content-Type")
        .is_some_and(|value| JSON_MEDIA_TYPE.is_match(&value))
    {
        cleanup_json(body)
    } else {
        body.to_owned()
    };

    let default_reason = if SUCCESS_BAND.contains(&status_code) {
        "Ok"
    } else {
        "Bad Request"
    };
    let reason = captures
        .get(2)
        .map_or(default_reason, |group| group.as_str());

    Ok(Response::new(body, status_code, headers, reason))
}

/// Parses a response header block.
///
/// Line 0 is kept verbatim under the synthetic `Request-Line` key for
/// diagnostic parity; each following line splits on the first colon into
/// trimmed name and value. Lines without a colon are skipped.
fn parse_headers(block: &str) -> Headers {
    let mut lines = block.split("\r\n").filter(|line| !line.is_empty());
    let mut headers = Headers::new();
    headers.insert("Request-Line", lines.next().unwrap_or_default());
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.trim(), value.trim());
        }
    }
    headers
}

/// Trims noise around a JSON object body: everything before the first `{`
/// and after the last `}` is discarded. A body without both braces is
/// returned unchanged; this is extraction, not validation.
fn cleanup_json(body: &str) -> String {
    match (body.find('{'), body.rfind('}')) {
        (Some(start), Some(end)) if start <= end => body[start..=end].to_owned(),
        _ => body.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;

    #[test]
    fn parses_a_json_response() {
        let raw = b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\r\n{\"a\":1}";
        let response = parse(raw).unwrap();

        assert_eq!(response.status_code(), 200);
        assert_eq!(response.reason_phrase(), "OK");
        assert_eq!(
            response.header("Content-Type").as_deref(),
            Some("application/json")
        );
        assert_eq!(response.body(), "{\"a\":1}");
    }

    #[test]
    fn invalid_status_line_fails_with_protocol_error() {
        let err = parse(b"garbage\r\n\r\n").unwrap_err();
        assert_eq!(err.message(), "Invalid HTTP reply.");
        assert_eq!(err.code(), 500);
        assert_eq!(err.kind(), crate::ErrorKind::Protocol);
        assert!(!err.has_response());
    }

    #[test]
    fn keeps_the_request_line_as_synthetic_header() {
        let raw = b"HTTP/1.1 404 Not Found\r\nX-A: 1\r\n\r\nmissing";
        let response = parse(raw).unwrap();

        assert_eq!(
            response.header("request-line").as_deref(),
            Some("HTTP/1.1 404 Not Found")
        );
        assert_eq!(response.header("x-a").as_deref(), Some("1"));
        assert_eq!(response.status_code(), 404);
        assert_eq!(response.reason_phrase(), "Not Found");
        assert_eq!(response.body(), "missing");
    }

    #[test]
    fn missing_body_boundary_treats_remainder_as_headers() {
        let response = parse(b"HTTP/1.1 204 No Content\r\nX-A: 1").unwrap();
        assert_eq!(response.body(), "");
        assert_eq!(response.header("X-A").as_deref(), Some("1"));
    }

    #[test]
    fn missing_reason_defaults_by_success_band() {
        assert_eq!(parse(b"HTTP/1.1 201\r\n\r\n").unwrap().reason_phrase(), "Ok");
        assert_eq!(
            parse(b"HTTP/1.1 204\r\n\r\n").unwrap().reason_phrase(),
            "Bad Request"
        );
        // The band is exactly 200..=201; 204 and 301 fall outside it.
        assert_eq!(
            parse(b"HTTP/1.1 301\r\n\r\n").unwrap().reason_phrase(),
            "Bad Request"
        );
    }

    #[test]
    fn non_2xx_codes_are_not_errors() {
        for raw in [
            &b"HTTP/1.1 404 Not Found\r\n\r\n"[..],
            b"HTTP/1.1 500 Internal Server Error\r\n\r\n",
            // Malformed code outside normal HTTP ranges still parses.
            b"HTTP/1.1 999 Weird\r\n\r\n",
        ] {
            assert!(parse(raw).is_ok(), "raw={raw:?}");
        }
    }

    #[test]
    fn json_cleanup_trims_noise_around_the_object() {
        let raw =
            b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\r\ngarbled{\"a\":1}trailing";
        assert_eq!(parse(raw).unwrap().body(), "{\"a\":1}");
    }

    #[test]
    fn json_cleanup_skips_non_json_content_types() {
        let raw = b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\ngarbled{\"a\":1}trailing";
        assert_eq!(parse(raw).unwrap().body(), "garbled{\"a\":1}trailing");
    }

    #[test]
    fn json_cleanup_leaves_braceless_bodies_unchanged() {
        assert_eq!(cleanup_json("no braces here"), "no braces here");
        assert_eq!(cleanup_json("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(cleanup_json("}{"), "}{");
    }

    #[test]
    fn json_media_type_variants_match() {
        for value in [
            "application/json",
            "application/json; charset=utf-8",
            "text/json",
            "application/vnd.api+json",
            "application/x-json",
            "application/json-seq",
            "APPLICATION/JSON",
        ] {
            assert!(JSON_MEDIA_TYPE.is_match(value), "{value}");
        }
        for value in ["text/plain", "application/xml", "image/png"] {
            assert!(!JSON_MEDIA_TYPE.is_match(value), "{value}");
        }
    }

    #[test]
    fn header_values_trim_whitespace() {
        let raw = b"HTTP/1.1 200 OK\r\nContent-Type:   text/plain  \r\nEmpty:\r\n\r\n";
        let response = parse(raw).unwrap();
        assert_eq!(response.header("content-type").as_deref(), Some("text/plain"));
        assert_eq!(response.header("empty").as_deref(), Some(""));
    }
}
