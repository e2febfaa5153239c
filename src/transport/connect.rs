//! Collector connection establishment.

use std::{
    fmt, io,
    net::{SocketAddr, TcpStream, ToSocketAddrs},
    time::Duration,
};

use crate::{batch::BatchRef, error::ShipError};

use super::{
    auth::{AUTH_CONTEXT, AuthToken, PROTOCOL_VERSION},
    codec::{FrameDecoder, FrameEncoder},
};

/// Host and port of the remote collector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectorEndpoint {
    pub host: String,
    pub port: u16,
}

impl CollectorEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Resolve the host, failing when the lookup errors or yields nothing.
    pub fn resolve(&self) -> Result<Vec<SocketAddr>, ShipError> {
        let addrs: Vec<SocketAddr> = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|err| ShipError::Resolution {
                host: self.host.clone(),
                reason: err.to_string(),
            })?
            .collect();
        if addrs.is_empty() {
            return Err(ShipError::Resolution {
                host: self.host.clone(),
                reason: "no addresses returned".into(),
            });
        }
        Ok(addrs)
    }
}

impl fmt::Display for CollectorEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Timeouts and limits applied to collector sockets.
#[derive(Clone, Copy, Debug)]
pub struct SocketOptions {
    pub connect_timeout: Duration,
    pub write_timeout: Duration,
    pub max_frame_size: usize,
}

fn connect_tcp(
    endpoint: &CollectorEndpoint,
    addrs: &[SocketAddr],
    timeout: Duration,
) -> Result<TcpStream, ShipError> {
    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect_timeout(addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(err) => last_err = Some(err),
        }
    }
    Err(ShipError::Connect {
        endpoint: endpoint.to_string(),
        source: last_err.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "no addresses to connect to")
        }),
    })
}

/// Open an authenticated connection to the collector.
///
/// Sends the protocol version and a token derived from `secret`, then returns
/// encode/decode handles bound to the same socket. Any failure closes the
/// socket before returning.
pub fn connect(
    endpoint: &CollectorEndpoint,
    secret: &str,
    options: SocketOptions,
) -> Result<(FrameEncoder<TcpStream>, FrameDecoder<TcpStream>), ShipError> {
    let addrs = endpoint.resolve()?;
    let stream = connect_tcp(endpoint, &addrs, options.connect_timeout)?;
    let handshake_err = |source: io::Error| ShipError::Handshake {
        endpoint: endpoint.to_string(),
        source,
    };
    stream
        .set_write_timeout(Some(options.write_timeout))
        .map_err(handshake_err)?;
    let read_half = stream.try_clone().map_err(handshake_err)?;
    let mut encoder = FrameEncoder::new(stream, options.max_frame_size);
    let token = AuthToken::derive(secret, AUTH_CONTEXT)
        .map_err(|err| handshake_err(io::Error::other(err)))?;
    encoder.encode(&PROTOCOL_VERSION).map_err(handshake_err)?;
    encoder.encode(token.as_str()).map_err(handshake_err)?;
    Ok((
        encoder,
        FrameDecoder::new(read_half, options.max_frame_size),
    ))
}

/// A live connection able to deliver batches.
pub trait BatchSink: Send + 'static {
    /// Encode and write one batch.
    fn send_batch(&mut self, batch: &BatchRef<'_>) -> Result<(), ShipError>;
}

/// Factory for collector connections.
///
/// The flush path calls [`Connector::connect`] lazily whenever no live
/// connection exists.
pub trait Connector: Send + Sync + 'static {
    type Connection: BatchSink;

    fn connect(&self) -> Result<Self::Connection, ShipError>;

    /// Human-readable description of the remote end used in diagnostics.
    fn describe(&self) -> String;
}

/// Connector dialling a collector over TCP.
#[derive(Clone)]
pub struct TcpConnector {
    endpoint: CollectorEndpoint,
    secret: String,
    options: SocketOptions,
}

impl TcpConnector {
    pub fn new(endpoint: CollectorEndpoint, secret: impl Into<String>, options: SocketOptions) -> Self {
        Self {
            endpoint,
            secret: secret.into(),
            options,
        }
    }

    /// Open a connection and return both wire handles.
    pub fn open(&self) -> Result<(FrameEncoder<TcpStream>, FrameDecoder<TcpStream>), ShipError> {
        connect(&self.endpoint, &self.secret, self.options)
    }
}

impl fmt::Debug for TcpConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TcpConnector")
            .field("endpoint", &self.endpoint)
            .field("secret", &"[REDACTED]")
            .field("options", &self.options)
            .finish()
    }
}

/// Send side of an established collector connection.
#[derive(Debug)]
pub struct TcpConnection {
    encoder: FrameEncoder<TcpStream>,
}

impl BatchSink for TcpConnection {
    fn send_batch(&mut self, batch: &BatchRef<'_>) -> Result<(), ShipError> {
        let frame = self.encoder.frame(batch).map_err(ShipError::Frame)?;
        self.encoder.write_frame(&frame).map_err(ShipError::Encode)
    }
}

impl Connector for TcpConnector {
    type Connection = TcpConnection;

    fn connect(&self) -> Result<Self::Connection, ShipError> {
        // Collectors never reply, so the read half is released here.
        let (encoder, _decoder) = self.open()?;
        Ok(TcpConnection { encoder })
    }

    fn describe(&self) -> String {
        self.endpoint.to_string()
    }
}
