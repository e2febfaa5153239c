//! Collector transport: connection setup, handshake, and frame codec.
//!
//! [`connect`] resolves the collector, opens a TCP stream, sends the protocol
//! version and an [`AuthToken`], and yields a matching
//! [`FrameEncoder`]/[`FrameDecoder`] pair. The [`Connector`] trait is the seam
//! the flush path uses so tests can substitute scripted connections.

pub mod auth;
pub mod codec;
mod connect;


pub use auth::{AUTH_CONTEXT, AuthToken, DEFAULT_MAX_SKEW, PROTOCOL_VERSION};
pub use codec::{DEFAULT_MAX_FRAME_SIZE, FrameDecoder, FrameEncoder, frame_payload};
pub use connect::{
    BatchSink, CollectorEndpoint, Connector, SocketOptions, TcpConnection, TcpConnector, connect,
};
