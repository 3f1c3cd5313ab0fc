//! Native-messaging framing.
//!
//! Each message is a 4-byte little-endian length followed by that many
//! bytes of UTF-8 JSON.

use bytes::{Buf, BufMut, BytesMut};
use deskpilot_protocols::ChannelError;
use serde_json::Value;
use tokio_util::codec::{Decoder, Encoder};

/// Largest frame accepted in either direction.
pub const MAX_FRAME_BYTES: usize = 1024 * 1024;

const HEADER_BYTES: usize = 4;

/// Codec for [`tokio_util::codec::Framed`] over stdio or a child process.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeMessageCodec;

impl Decoder for NativeMessageCodec {
    type Item = Value;
    type Error = ChannelError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Value>, ChannelError> {
        if src.len() < HEADER_BYTES {
            return Ok(None);
        }

        let mut header = [0u8; HEADER_BYTES];
        header.copy_from_slice(&src[..HEADER_BYTES]);
        let len = u32::from_le_bytes(header) as usize;
        if len == 0 || len > MAX_FRAME_BYTES {
            return Err(ChannelError::Protocol(format!(
                "invalid message length {}",
                len
            )));
        }

        if src.len() < HEADER_BYTES + len {
            src.reserve(HEADER_BYTES + len - src.len());
            return Ok(None);
        }

        src.advance(HEADER_BYTES);
        let body = src.split_to(len);
        serde_json::from_slice(&body)
            .map(Some)
            .map_err(|e| ChannelError::InvalidMessage(format!("invalid JSON message: {}", e)))
    }
}

/// Decoder that hands undecodable bodies to the caller as items instead of
/// failing the stream, so reading can go on with the next frame. Framing
/// errors still end the stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct LenientMessageCodec;

impl Decoder for LenientMessageCodec {
    type Item = Result<Value, ChannelError>;
    type Error = ChannelError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, ChannelError> {
        match NativeMessageCodec.decode(src) {
            Ok(frame) => Ok(frame.map(Ok)),
            Err(e @ ChannelError::InvalidMessage(_)) => Ok(Some(Err(e))),
            Err(e) => Err(e),
        }
    }
}

impl Encoder<Value> for NativeMessageCodec {
    type Error = ChannelError;

    fn encode(&mut self, item: Value, dst: &mut BytesMut) -> Result<(), ChannelError> {
        let body = serde_json::to_vec(&item)
            .map_err(|e| ChannelError::Protocol(e.to_string()))?;
        if body.len() > MAX_FRAME_BYTES {
            return Err(ChannelError::Protocol(format!(
                "message of {} bytes exceeds the {} byte limit",
                body.len(),
                MAX_FRAME_BYTES
            )));
        }

        dst.reserve(HEADER_BYTES + body.len());
        dst.put_u32_le(body.len() as u32);
        dst.extend_from_slice(&body);
        Ok(())
    }
}
