//! Stream reassembly
//!
//! Turns arbitrary received chunks into complete MBAP frames. A frame is
//! complete once `6 + length` bytes are buffered; frames come out strictly in
//! arrival order and a stalled partial frame holds back everything behind it.

use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::{debug, trace};

use crate::constants::{LENGTH_OFFSET, MBAP_HEADER_LEN};
use crate::error::MbapError;
use crate::frame::Frame;

/// Length-delimited MBAP decoder
#[derive(Debug, Clone, Copy, Default)]
pub struct MbapCodec;

impl Decoder for MbapCodec {
    type Item = Frame;
    type Error = MbapError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, MbapError> {
        if src.len() < MBAP_HEADER_LEN {
            return Ok(None);
        }

        let length = u16::from_be_bytes([src[LENGTH_OFFSET], src[LENGTH_OFFSET + 1]]) as usize;
        let total_length = MBAP_HEADER_LEN + length;

        if src.len() < total_length {
            src.reserve(total_length - src.len());
            return Ok(None);
        }

        let raw = src.split_to(total_length).freeze();
        trace!("Frame cut: {}B, {}B left buffered", total_length, src.len());
        Ok(Frame::from_bytes(raw))
    }
}

/// Receive buffer plus the codec that drains it
#[derive(Debug, Default)]
pub struct FrameBuffer {
    buffer: BytesMut,
    codec: MbapCodec,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a received chunk and return every frame it completes
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Frame> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Ok(Some(frame)) = self.codec.decode(&mut self.buffer) {
            frames.push(frame);
        }

        if !frames.is_empty() {
            debug!(
                "RX chunk {}B -> {} frame(s), {}B pending",
                chunk.len(),
                frames.len(),
                self.buffer.len()
            );
        }
        frames
    }

    /// Bytes held while waiting for the rest of a frame
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Drop any partial frame
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
