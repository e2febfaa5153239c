//! Collector-side counterpart of the shipper handshake.
//!
//! A [`CatcherSession`] reads the protocol version and auth token a shipper
//! sends when it connects, rejects the stream if either is wrong, and then
//! decodes batches until the shipper hangs up.

use std::{io::Read, time::Duration};

use chrono::Utc;

use crate::{
    batch::Batch,
    error::CatcherError,
    transport::{AUTH_CONTEXT, AuthToken, FrameDecoder, PROTOCOL_VERSION},
};

/// An authenticated inbound shipper stream.
#[derive(Debug)]
pub struct CatcherSession<R> {
    decoder: FrameDecoder<R>,
}

impl<R: Read> CatcherSession<R> {
    /// Validate the handshake at the head of `reader`.
    ///
    /// Tokens must be signed with `secret` and issued within `max_skew` of the
    /// local clock.
    pub fn accept(
        reader: R,
        secret: &str,
        max_skew: Duration,
        max_frame_size: usize,
    ) -> Result<Self, CatcherError> {
        let mut decoder = FrameDecoder::new(reader, max_frame_size);
        let version: i32 = decoder.decode()?;
        if version != PROTOCOL_VERSION {
            return Err(CatcherError::UnsupportedProtocol(version));
        }
        let token = AuthToken::from_wire(decoder.decode::<String>()?);
        if !token.verify(secret, AUTH_CONTEXT, Utc::now().timestamp(), max_skew) {
            return Err(CatcherError::Unauthorised);
        }
        Ok(Self { decoder })
    }

    /// Decode the next batch, or `None` once the shipper closes the stream.
    pub fn next_batch(&mut self) -> std::io::Result<Option<Batch>> {
        match self.decoder.decode() {
            Ok(batch) => Ok(Some(batch)),
            Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => Ok(None),
            Err(err) => Err(err),
        }
    }
}
