//! Non-blocking socket primitives for the request lifecycle.
//!
//! This module provides [`Stream`], the transport used by one request:
//! plain TCP, or TLS when the `tls` feature is enabled. Each stream is
//! exclusively owned by a single request future; readiness is handled
//! cooperatively by yielding (wake-by-ref, then `Pending`) on
//! `WouldBlock`, so sibling request futures keep making progress under a
//! single-threaded executor.

#[cfg(feature = "tls")]
pub mod tls;

use crate::error::RequestError;
use crate::options::Options;
#[cfg(any(feature = "tls", test))]
use std::future::Future;
use std::future::poll_fn;
use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, ToSocketAddrs};
#[cfg(any(feature = "tls", test))]
use std::pin::Pin;
#[cfg(any(feature = "tls", test))]
use std::task::Context;
use std::task::Poll;
use std::time::Duration;

/// Connect timeout matching the underlying primitive's default.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(60);

/// Opens a stream to a resolved transport address of the form
/// `transport://host:port`.
///
/// `tcp` yields a plain stream; `ssl`/`tls` require the `tls` cargo
/// feature and honor the CA-file option (present: verify the peer against
/// it, absent: accept self-signed certificates). Any other transport is
/// rejected with a connection error.
pub async fn connect(address: &str, options: &Options) -> Result<Stream, RequestError> {
    let (transport, endpoint) = address
        .split_once("://")
        .ok_or_else(|| RequestError::connection(format!("invalid transport address: {address}")))?;
    if !matches!(transport, "tcp" | "ssl" | "tls") {
        return Err(RequestError::connection(format!(
            "unsupported transport: {transport}"
        )));
    }

    let tcp = TcpStream::connect(endpoint).await.map_err(|err| {
        RequestError::connection(format!("failed to connect to {address}: {err}"))
    })?;

    if transport == "tcp" {
        return Ok(Stream::Tcp(tcp));
    }
    #[cfg(feature = "tls")]
    {
        let host = endpoint.split(':').next().unwrap_or(endpoint);
        Ok(Stream::Tls(tls::TlsStream::connect(tcp, host, options).await?))
    }
    #[cfg(not(feature = "tls"))]
    {
        let _ = options;
        Err(RequestError::connection(
            "TLS transport requires the `tls` feature",
        ))
    }
}

/// The transport stream for one request.
#[derive(Debug)]
pub enum Stream {
    /// Plain TCP.
    Tcp(TcpStream),
    /// TLS over TCP.
    #[cfg(feature = "tls")]
    Tls(tls::TlsStream),
}

impl Stream {
    /// Writes the whole buffer, suspending until fully sent.
    pub async fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        match self {
            Self::Tcp(stream) => stream.write_all(bytes).await,
            #[cfg(feature = "tls")]
            Self::Tls(stream) => stream.write_all(bytes).await,
        }
    }

    /// Reads up to `max` bytes, suspending until some data arrives or the
    /// stream ends. Returns an empty chunk at end of stream.
    pub async fn read(&mut self, max: usize) -> io::Result<Vec<u8>> {
        match self {
            Self::Tcp(stream) => stream.read(max).await,
            #[cfg(feature = "tls")]
            Self::Tls(stream) => stream.read(max).await,
        }
    }

    /// Whether the peer has closed its end of the stream.
    #[must_use]
    pub fn eof(&self) -> bool {
        match self {
            Self::Tcp(stream) => stream.eof(),
            #[cfg(feature = "tls")]
            Self::Tls(stream) => stream.eof(),
        }
    }

    /// Gracefully closes the stream, consuming it. Dropping without
    /// calling this still releases the descriptor; close only adds the
    /// orderly shutdown.
    pub async fn close(self) -> io::Result<()> {
        match self {
            Self::Tcp(stream) => stream.close().await,
            #[cfg(feature = "tls")]
            Self::Tls(stream) => stream.close().await,
        }
    }
}

/// A non-blocking TCP stream owned by one request future.
///
/// The descriptor is released on drop, so an error partway through a read
/// cannot leak the connection.
#[derive(Debug)]
pub struct TcpStream {
    inner: std::net::TcpStream,
    eof: bool,
}

impl TcpStream {
    /// Connects to `host:port`, bounded by [`CONNECT_TIMEOUT`], and
    /// switches the stream to non-blocking mode.
    pub async fn connect(endpoint: &str) -> io::Result<Self> {
        // Address resolution and connect are bounded synchronous steps,
        // matching the underlying primitive's behavior. All subsequent
        // I/O is non-blocking.
        let addr: SocketAddr = endpoint
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no address for endpoint"))?;
        let inner = std::net::TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT)?;
        inner.set_nonblocking(true)?;
        Ok(Self { inner, eof: false })
    }

    /// Writes the whole buffer, yielding on `WouldBlock`.
    pub async fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        let mut written = 0;
        while written < bytes.len() {
            let n = poll_io(|| (&self.inner).write(&bytes[written..])).await?;
            if n == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "socket closed mid-write",
                ));
            }
            written += n;
        }
        Ok(())
    }

    /// Reads up to `max` bytes into a fresh chunk, yielding until data is
    /// available. An empty chunk marks end of stream and latches `eof`.
    pub async fn read(&mut self, max: usize) -> io::Result<Vec<u8>> {
        let mut chunk = vec![0u8; max];
        let n = poll_io(|| (&self.inner).read(&mut chunk)).await?;
        chunk.truncate(n);
        if n == 0 {
            self.eof = true;
        }
        Ok(chunk)
    }

    /// Whether end of stream has been observed.
    #[must_use]
    pub fn eof(&self) -> bool {
        self.eof
    }

    /// Shuts down both directions and releases the descriptor.
    pub async fn close(self) -> io::Result<()> {
        match self.inner.shutdown(Shutdown::Both) {
            Err(err) if err.kind() != io::ErrorKind::NotConnected => Err(err),
            _ => Ok(()),
        }
    }

    #[cfg(feature = "tls")]
    pub(crate) fn inner(&self) -> &std::net::TcpStream {
        &self.inner
    }

    #[cfg(feature = "tls")]
    pub(crate) fn set_eof(&mut self) {
        self.eof = true;
    }
}

/// Drives one non-blocking I/O attempt to readiness: `WouldBlock` yields
/// back to the executor, `Interrupted` retries.
async fn poll_io<T>(mut op: impl FnMut() -> io::Result<T>) -> io::Result<T> {
    poll_fn(|cx| match op() {
        Ok(value) => Poll::Ready(Ok(value)),
        Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
            cx.waker().wake_by_ref();
            Poll::Pending
        }
        Err(err) if err.kind() == io::ErrorKind::Interrupted => {
            cx.waker().wake_by_ref();
            Poll::Pending
        }
        Err(err) => Poll::Ready(Err(err)),
    })
    .await
}

/// Future that yields execution back to the executor exactly once.
#[cfg(any(feature = "tls", test))]
pub(crate) struct YieldNow {
    yielded: bool,
}

#[cfg(any(feature = "tls", test))]
impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.yielded {
            Poll::Ready(())
        } else {
            self.yielded = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

/// Yields once, letting sibling request futures run.
#[cfg(any(feature = "tls", test))]
pub(crate) fn yield_now() -> YieldNow {
    YieldNow { yielded: false }
}
