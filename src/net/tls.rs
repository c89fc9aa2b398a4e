//! TLS client stream over rustls.
//!
//! Wraps the non-blocking [`TcpStream`] with a rustls `ClientConnection`,
//! driving handshake and record I/O cooperatively: `WouldBlock` on the
//! underlying socket yields back to the executor.
//!
//! Peer verification follows the `cert` option: a CA file is loaded as
//! the root store and the peer is verified against it; without one, any
//! certificate is accepted (self-signed peers included).

use super::{TcpStream, yield_now};
use crate::error::RequestError;
use crate::options::Options;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, ClientConnection, DigitallySignedStruct, RootCertStore, SignatureScheme};
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::sync::Arc;

/// A TLS stream owned by one request future.
pub struct TlsStream {
    tcp: TcpStream,
    conn: ClientConnection,
    eof: bool,
}

impl TlsStream {
    /// Performs the TLS handshake over an established TCP stream.
    pub async fn connect(
        tcp: TcpStream,
        host: &str,
        options: &Options,
    ) -> Result<Self, RequestError> {
        let config = client_config(options)?;
        let server_name = ServerName::try_from(host.to_owned()).map_err(|err| {
            RequestError::connection(format!("invalid TLS server name {host}: {err}"))
        })?;
        let conn = ClientConnection::new(Arc::new(config), server_name)
            .map_err(|err| RequestError::connection(format!("TLS session setup failed: {err}")))?;

        let mut stream = Self {
            tcp,
            conn,
            eof: false,
        };
        stream.handshake().await.map_err(|err| {
            RequestError::connection(format!("TLS handshake with {host} failed: {err}"))
        })?;
        Ok(stream)
    }

    /// Writes the whole plaintext buffer and flushes the resulting TLS
    /// records to the socket.
    pub async fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.conn.writer().write_all(bytes)?;
        self.flush_tls().await
    }

    /// Reads up to `max` plaintext bytes. Returns an empty chunk at end
    /// of stream (close-notify or peer hangup) and latches `eof`.
    pub async fn read(&mut self, max: usize) -> io::Result<Vec<u8>> {
        let mut chunk = vec![0u8; max];
        loop {
            match self.conn.reader().read(&mut chunk) {
                Ok(n) => {
                    chunk.truncate(n);
                    if n == 0 {
                        self.eof = true;
                    }
                    return Ok(chunk);
                }
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                    // No buffered plaintext; pull more records.
                    if !self.fill_tls().await? {
                        self.eof = true;
                        chunk.clear();
                        return Ok(chunk);
                    }
                }
                // Peer closed without close-notify. A Connection: close
                // client treats that as a normal end of stream.
                Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                    self.eof = true;
                    chunk.clear();
                    return Ok(chunk);
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Whether end of stream has been observed.
    #[must_use]
    pub fn eof(&self) -> bool {
        self.eof
    }

    /// Sends close-notify and shuts the socket down.
    pub async fn close(mut self) -> io::Result<()> {
        self.conn.send_close_notify();
        // The peer may already be gone; closing stays best-effort.
        let _ = self.flush_tls().await;
        self.tcp.close().await
    }

    /// Runs the handshake to completion, alternating pending writes and
    /// reads.
    async fn handshake(&mut self) -> io::Result<()> {
        while self.conn.is_handshaking() {
            self.flush_tls().await?;
            if self.conn.is_handshaking() && self.conn.wants_read() && !self.fill_tls().await? {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "peer closed during TLS handshake",
                ));
            }
        }
        self.flush_tls().await
    }

    /// Writes buffered TLS records until none remain, yielding on
    /// `WouldBlock`.
    async fn flush_tls(&mut self) -> io::Result<()> {
        while self.conn.wants_write() {
            let mut sock = self.tcp.inner();
            match self.conn.write_tls(&mut sock) {
                Ok(_) => {}
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => yield_now().await,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    /// Reads one batch of TLS records and processes them. Returns false
    /// on a clean socket end of stream.
    async fn fill_tls(&mut self) -> io::Result<bool> {
        loop {
            let mut sock = self.tcp.inner();
            match self.conn.read_tls(&mut sock) {
                Ok(0) => {
                    self.tcp.set_eof();
                    return Ok(false);
                }
                Ok(_) => {
                    self.conn
                        .process_new_packets()
                        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
                    return Ok(true);
                }
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => yield_now().await,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err),
            }
        }
    }
}

impl fmt::Debug for TlsStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsStream")
            .field("eof", &self.eof)
            .finish_non_exhaustive()
    }
}

/// Builds the client configuration for one connection.
fn client_config(options: &Options) -> Result<ClientConfig, RequestError> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let builder = ClientConfig::builder_with_provider(Arc::clone(&provider))
        .with_safe_default_protocol_versions()
        .map_err(|err| RequestError::connection(format!("TLS configuration failed: {err}")))?;

    let config = match options.cert() {
        Some(path) => {
            let file = File::open(path).map_err(|err| {
                RequestError::connection(format!("cannot open CA file {}: {err}", path.display()))
            })?;
            let mut roots = RootCertStore::empty();
            for cert in rustls_pemfile::certs(&mut BufReader::new(file)) {
                let cert = cert.map_err(|err| {
                    RequestError::connection(format!("invalid certificate in CA file: {err}"))
                })?;
                roots.add(cert).map_err(|err| {
                    RequestError::connection(format!("rejected CA certificate: {err}"))
                })?;
            }
            builder.with_root_certificates(roots).with_no_client_auth()
        }
        None => builder
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyCert { provider }))
            .with_no_client_auth(),
    };
    Ok(config)
}

/// Verifier used when no CA file is configured: accepts any peer
/// certificate, self-signed included.
#[derive(Debug)]
struct AcceptAnyCert {
    provider: Arc<CryptoProvider>,
}

impl ServerCertVerifier for AcceptAnyCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_without_cert_uses_the_permissive_verifier() {
        let config = client_config(&Options::new()).unwrap();
        // Smoke-check that the configuration is usable for a session.
        let name = ServerName::try_from("example.com".to_owned()).unwrap();
        assert!(ClientConnection::new(Arc::new(config), name).is_ok());
    }

    #[test]
    fn missing_ca_file_is_a_connection_error() {
        let options = Options::new().with_cert("/nonexistent/ca.pem");
        let err = client_config(&options).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Connection);
    }
}
