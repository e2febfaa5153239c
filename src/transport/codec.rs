//! MessagePack frame codec.
//!
//! Every value on the wire is a 4-byte big-endian length prefix followed by a
//! MessagePack payload with structs encoded as maps, so a decoder can rebuild
//! a batch without sharing field order with the encoder.

use std::io::{self, Read, Write};

use rmp_serde::Serializer;
use serde::{Serialize, de::DeserializeOwned};

/// Default maximum payload size (in bytes) for a single frame.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 16 << 20; // 16 MiB

const LEN_PREFIX: usize = 4;

/// Serialise a value into a MessagePack payload.
pub fn serialise_value<T: Serialize + ?Sized>(value: &T) -> io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(128);
    value
        .serialize(&mut Serializer::new(&mut buf).with_struct_map())
        .map_err(io::Error::other)?;
    Ok(buf)
}

/// Frame the payload with a big-endian length prefix.
pub fn frame_payload(payload: &[u8], max_size: usize) -> Option<Vec<u8>> {
    if payload.len() > max_size {
        return None;
    }
    let len = u32::try_from(payload.len()).ok()?;
    let capacity = payload.len().checked_add(LEN_PREFIX)?;
    let mut framed = Vec::with_capacity(capacity);
    framed.extend(len.to_be_bytes());
    framed.extend_from_slice(payload);
    Some(framed)
}

/// Send-side handle writing framed values to a stream.
#[derive(Debug)]
pub struct FrameEncoder<W> {
    writer: W,
    max_frame_size: usize,
}

impl<W: Write> FrameEncoder<W> {
    pub fn new(writer: W, max_frame_size: usize) -> Self {
        Self {
            writer,
            max_frame_size,
        }
    }

    /// Serialise `value` and frame it without touching the writer.
    ///
    /// Fails with [`io::ErrorKind::InvalidData`] when the payload exceeds the
    /// frame limit.
    pub fn frame<T: Serialize + ?Sized>(&self, value: &T) -> io::Result<Vec<u8>> {
        let payload = serialise_value(value)?;
        frame_payload(&payload, self.max_frame_size).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "frame of {} bytes exceeds limit of {} bytes",
                    payload.len(),
                    self.max_frame_size
                ),
            )
        })
    }

    /// Write a frame produced by [`frame`](Self::frame) in full.
    pub fn write_frame(&mut self, frame: &[u8]) -> io::Result<()> {
        self.writer.write_all(frame)?;
        self.writer.flush()
    }

    /// Serialise `value`, frame it, and write the frame in full.
    pub fn encode<T: Serialize + ?Sized>(&mut self, value: &T) -> io::Result<()> {
        let frame = self.frame(value)?;
        self.write_frame(&frame)
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Receive-side handle reading framed values from a stream.
#[derive(Debug)]
pub struct FrameDecoder<R> {
    reader: R,
    max_frame_size: usize,
}

impl<R: Read> FrameDecoder<R> {
    pub fn new(reader: R, max_frame_size: usize) -> Self {
        Self {
            reader,
            max_frame_size,
        }
    }

    /// Read one frame and decode it.
    ///
    /// A stream that ends before the length prefix yields
    /// [`io::ErrorKind::UnexpectedEof`].
    pub fn decode<T: DeserializeOwned>(&mut self) -> io::Result<T> {
        let mut len_buf = [0u8; LEN_PREFIX];
        self.reader.read_exact(&mut len_buf)?;
        let len = u32::from_be_bytes(len_buf) as usize;
        if len > self.max_frame_size {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "frame of {len} bytes exceeds limit of {} bytes",
                    self.max_frame_size
                ),
            ));
        }
        let mut payload = vec![0u8; len];
        self.reader.read_exact(&mut payload)?;
        rmp_serde::from_slice(&payload).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

}
