//! Request lifecycle and the `fetch` entry point.
//!
//! One request runs as a single suspendable unit of work:
//! resolve → connect → write → read-to-eof → close → parse. The stream
//! and accumulation buffer are exclusively owned by that unit; nothing
//! interleaves I/O on the same socket.

use crate::error::RequestError;
use crate::net::{self, Stream};
use crate::options::Options;
use crate::parser;
use crate::request::Request;
use crate::resolver;
use crate::response::Response;
use crate::task::{BoxFuture, FetchHandle, FetchOutput, join_ordered};
use crate::wire;

/// Bytes requested per read call while draining the response.
const READ_CHUNK: usize = 100;

/// Runs one request's full lifecycle.
///
/// Suspension points are exactly: connect, write, each bounded read, and
/// close. The stream is released on every exit path; an error partway
/// through the read loop drops it, which closes the descriptor.
async fn perform(request: Request, options: Options) -> Result<Response, RequestError> {
    let address = resolver::resolve(request.url(), options.port())?;
    if options.debug() {
        tracing::debug!(%address, "reading from");
    }

    let mut stream: Stream = net::connect(&address, &options).await?;

    let bytes = wire::build(&request, &options);
    if options.debug() {
        tracing::debug!(request = %bytes, "sending request");
    }
    stream.write_all(bytes.as_bytes()).await?;

    let mut content = Vec::new();
    loop {
        let chunk = stream.read(READ_CHUNK).await?;
        content.extend_from_slice(&chunk);
        if stream.eof() {
            break;
        }
    }
    stream.close().await?;

    parser::parse(&content)
}

/// One fetch target: a bare URL (lifted to a default `GET` request) or a
/// full [`Request`].
#[derive(Debug, Clone)]
pub enum FetchTarget {
    /// A URL fetched with a default `GET` request.
    Url(String),
    /// A fully specified request.
    Request(Request),
}

impl FetchTarget {
    fn into_request(self) -> Request {
        match self {
            Self::Url(url) => Request::new(url),
            Self::Request(request) => request,
        }
    }
}

impl From<&str> for FetchTarget {
    fn from(url: &str) -> Self {
        Self::Url(url.to_owned())
    }
}

impl From<String> for FetchTarget {
    fn from(url: String) -> Self {
        Self::Url(url)
    }
}

impl From<Request> for FetchTarget {
    fn from(request: Request) -> Self {
        Self::Request(request)
    }
}

/// Input accepted by [`fetch`]: a single target, or an ordered collection
/// of targets mixing URLs and requests.
#[derive(Debug, Clone)]
pub enum FetchInput {
    /// A single target, yielding [`FetchOutput::Single`].
    One(FetchTarget),
    /// An ordered collection, yielding [`FetchOutput::Batch`].
    Many(Vec<FetchTarget>),
}

impl From<&str> for FetchInput {
    fn from(url: &str) -> Self {
        Self::One(url.into())
    }
}

impl From<String> for FetchInput {
    fn from(url: String) -> Self {
        Self::One(url.into())
    }
}

impl From<Request> for FetchInput {
    fn from(request: Request) -> Self {
        Self::One(request.into())
    }
}

impl From<FetchTarget> for FetchInput {
    fn from(target: FetchTarget) -> Self {
        Self::One(target)
    }
}

impl<T: Into<FetchTarget>> From<Vec<T>> for FetchInput {
    fn from(targets: Vec<T>) -> Self {
        Self::Many(targets.into_iter().map(Into::into).collect())
    }
}

/// Issues one or many HTTP requests.
///
/// A single target returns a lazily-started handle wrapping one request;
/// no I/O begins until the handle is driven. A collection starts every
/// member concurrently and completes when all finish, preserving input
/// order in the results regardless of completion order. A failing member
/// does not cancel its siblings; they run to completion and the aggregate
/// then reports the first failure encountered.
///
/// ```no_run
/// use afetch::{Message, Options, fetch};
///
/// let response = fetch("http://example.com", Options::new())
///     .wait()?
///     .into_response()
///     .expect("single target");
/// println!("Content-Length: {}", response.body().len());
/// # Ok::<(), afetch::RequestError>(())
/// ```
pub fn fetch(target: impl Into<FetchInput>, options: Options) -> FetchHandle {
    match target.into() {
        FetchInput::One(target) => {
            let request = target.into_request();
            FetchHandle::new(async move {
                perform(request, options).await.map(FetchOutput::Single)
            })
        }
        FetchInput::Many(targets) => {
            let futures: Vec<BoxFuture<Result<Response, RequestError>>> = targets
                .into_iter()
                .map(|target| {
                    let request = target.into_request();
                    let options = options.clone();
                    Box::pin(perform(request, options)) as BoxFuture<_>
                })
                .collect();
            FetchHandle::new(async move { join_ordered(futures).await.map(FetchOutput::Batch) })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn bare_urls_lift_to_get_requests() {
        let request = FetchTarget::from("http://example.com").into_request();
        assert_eq!(request.method(), "GET");
        assert_eq!(request.url(), "http://example.com");
    }

    #[test]
    fn collections_lift_each_member() {
        let input: FetchInput = vec![
            FetchTarget::from("http://a"),
            FetchTarget::from(Request::new("http://b").with_method("POST")),
        ]
        .into();
        let FetchInput::Many(targets) = input else {
            panic!("expected a multi-target input");
        };
        assert_eq!(targets.len(), 2);
    }

    #[test]
    fn unresolvable_url_fails_before_any_io() {
        let error = fetch("example.com", Options::new()).wait().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Address);
    }
}
