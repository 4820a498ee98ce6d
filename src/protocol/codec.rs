//! Wire format for frame and control messages
//!
//! Every message is sent as:
//! - 4 bytes: payload length (big-endian u32)
//! - N bytes: MessagePack map
//!
//! Outbound (server -> client):
//! `{image: bin, gesture: str, landmarks: [[[x, y], ...], ...]}`
//!
//! Inbound (client -> server):
//! `{type: "resize", width: u32, height: u32}`

use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{RelayError, RelayResult};
use crate::gesture::GestureLabel;

/// Size of the big-endian length prefix
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Upper bound on a single payload
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// Per-hand landmarks in pixel space of the encoded image
pub type PixelHand = Vec<(i32, i32)>;

/// One outbound frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FramePayload {
    /// Compressed image bytes (JPEG)
    #[serde(with = "serde_bytes")]
    pub image: Vec<u8>,
    pub gesture: GestureLabel,
    pub landmarks: Vec<PixelHand>,
}

/// Inbound out-of-band control message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ControlMessage {
    Resize { width: u32, height: u32 },
    /// Any `type` this server does not understand
    #[serde(other)]
    Unknown,
}

fn frame_bytes(payload: &[u8]) -> RelayResult<Bytes> {
    if payload.len() > MAX_MESSAGE_SIZE {
        return Err(RelayError::MessageTooLarge(payload.len(), MAX_MESSAGE_SIZE));
    }
    let mut buf = BytesMut::with_capacity(LENGTH_PREFIX_SIZE + payload.len());
    buf.put_u32(payload.len() as u32);
    buf.put_slice(payload);
    Ok(buf.freeze())
}

/// Strip and check the length prefix of one complete framed message
fn unframe(framed: &[u8]) -> RelayResult<&[u8]> {
    if framed.len() < LENGTH_PREFIX_SIZE {
        return Err(RelayError::InvalidFrame(format!(
            "buffer too small for length prefix: {} < {}",
            framed.len(),
            LENGTH_PREFIX_SIZE
        )));
    }
    let (prefix, payload) = framed.split_at(LENGTH_PREFIX_SIZE);
    let len = u32::from_be_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]) as usize;
    if len == 0 {
        return Err(RelayError::InvalidFrame("zero length prefix".to_string()));
    }
    if len != payload.len() {
        return Err(RelayError::InvalidFrame(format!(
            "length prefix {} does not match payload size {}",
            len,
            payload.len()
        )));
    }
    Ok(payload)
}

/// Serialize and frame an outbound payload
pub fn encode_frame(frame: &FramePayload) -> RelayResult<Bytes> {
    let payload = rmp_serde::to_vec_named(frame)?;
    frame_bytes(&payload)
}

/// Decode one complete framed outbound message
pub fn decode_frame(framed: &[u8]) -> RelayResult<FramePayload> {
    decode_frame_payload(unframe(framed)?)
}

pub fn decode_frame_payload(payload: &[u8]) -> RelayResult<FramePayload> {
    Ok(rmp_serde::from_slice(payload)?)
}

/// Serialize and frame an inbound control message
pub fn encode_control(msg: &ControlMessage) -> RelayResult<Bytes> {
    let payload = rmp_serde::to_vec_named(msg)?;
    frame_bytes(&payload)
}

/// Decode one complete framed control message
pub fn decode_control(framed: &[u8]) -> RelayResult<ControlMessage> {
    decode_control_payload(unframe(framed)?)
}

pub fn decode_control_payload(payload: &[u8]) -> RelayResult<ControlMessage> {
    Ok(rmp_serde::from_slice(payload)?)
}

/// Write one already framed message and flush it
pub async fn write_message<W: AsyncWrite + Unpin>(writer: &mut W, framed: &[u8]) -> RelayResult<()> {
    writer.write_all(framed).await?;
    writer.flush().await?;
    Ok(())
}

/// Read the payload of one framed message.
///
/// Returns `Ok(None)` when the stream is terminated: a clean end of stream
/// before a new prefix, or a zero length prefix. End of stream after part of
/// a message is [`RelayError::TruncatedMessage`].
pub async fn read_message<R: AsyncRead + Unpin>(reader: &mut R) -> RelayResult<Option<Vec<u8>>> {
    let mut len_bytes = [0u8; LENGTH_PREFIX_SIZE];
    let got = read_full(reader, &mut len_bytes).await?;
    if got == 0 {
        return Ok(None);
    }
    if got < LENGTH_PREFIX_SIZE {
        return Err(RelayError::TruncatedMessage {
            expected: LENGTH_PREFIX_SIZE,
            received: got,
        });
    }

    let len = u32::from_be_bytes(len_bytes) as usize;
    if len == 0 {
        return Ok(None);
    }
    if len > MAX_MESSAGE_SIZE {
        return Err(RelayError::MessageTooLarge(len, MAX_MESSAGE_SIZE));
    }

    let mut buf = vec![0u8; len];
    let got = read_full(reader, &mut buf).await?;
    if got < len {
        return Err(RelayError::TruncatedMessage {
            expected: len,
            received: got,
        });
    }
    Ok(Some(buf))
}

/// Fill `buf` unless the stream ends first; returns the bytes read
async fn read_full<R: AsyncRead + Unpin>(reader: &mut R, buf: &mut [u8]) -> RelayResult<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
