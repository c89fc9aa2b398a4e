//! afetch: a minimal asynchronous HTTP/1.1 client over raw sockets.
//!
//! The client speaks literal HTTP/1.1 over non-blocking stream sockets,
//! without a full HTTP library. One call to [`fetch`] issues a single
//! request or a concurrent batch of requests under a cooperative
//! scheduling model; results come back as parsed [`Response`] values, in
//! input order for batches.
//!
//! # Module structure
//!
//! - [`message`]: [`Headers`] and the shared [`Message`] surface
//! - [`request`] / [`response`]: immutable message value types
//! - [`resolver`]: URL → `transport://host:port` address resolution
//! - [`wire`]: request serialization to HTTP/1.1 wire bytes
//! - [`parser`]: response parsing, including JSON body cleanup
//! - [`net`]: non-blocking TCP (and, with the `tls` feature, TLS) streams
//! - [`task`]: schedulable [`FetchHandle`] and the ordered join
//! - [`client`]: the request lifecycle and the [`fetch`] entry point
//!
//! # Example
//!
//! ```no_run
//! use afetch::{Options, fetch};
//!
//! fetch("http://www.dneonline.com/calculator.asmx?wsdl", Options::new().with_debug(true))
//!     .on_complete(
//!         |output| {
//!             let response = output.into_response().expect("single target");
//!             println!("status: {}", response.status_code());
//!         },
//!         |error| eprintln!("request error: {error}"),
//!     );
//! ```
//!
//! # Scope
//!
//! Deliberately not covered: chunked transfer-encoding, keep-alive and
//! pipelining, redirects, cookies, HTTP/2, header-name validation, and
//! connection reuse. Every request opens one connection, sends
//! `Connection: close`, and reads to end of stream.

pub mod client;
pub mod error;
pub mod message;
pub mod net;
pub mod options;
pub mod parser;
pub mod request;
pub mod resolver;
pub mod response;
pub mod task;
pub mod wire;

pub use client::{FetchInput, FetchTarget, fetch};
pub use error::{ErrorKind, RequestError};
pub use message::{Headers, Message};
pub use options::{BasicAuth, Options};
pub use request::Request;
pub use response::Response;
pub use task::{FetchHandle, FetchOutput};
