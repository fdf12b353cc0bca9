//! MBAP frame view
//!
//! A [`Frame`] owns the raw bytes of exactly one ADU as cut by the framer.
//! Every accessor is bounds-checked against the bytes actually received, so a
//! header that claims more than the frame carries never causes an out-of-range read.

use bytes::Bytes;

use crate::constants::{
    FUNCTION_CODE_OFFSET, LENGTH_OFFSET, MBAP_HEADER_LEN, PAYLOAD_OFFSET, UNIT_ID_OFFSET,
};

/// One complete Modbus TCP frame
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    raw: Bytes,
}

impl Frame {
    /// Wrap raw frame bytes
    ///
    /// Returns `None` when there is not even a full MBAP header.
    pub fn from_bytes(raw: impl Into<Bytes>) -> Option<Self> {
        let raw = raw.into();
        if raw.len() < MBAP_HEADER_LEN {
            return None;
        }
        Some(Self { raw })
    }

    /// Transaction identifier
    pub fn transaction_id(&self) -> u16 {
        u16::from_be_bytes([self.raw[0], self.raw[1]])
    }

    /// Protocol identifier (zero for Modbus)
    pub fn protocol_id(&self) -> u16 {
        u16::from_be_bytes([self.raw[2], self.raw[3]])
    }

    /// Length field: bytes following the length field itself
    pub fn length(&self) -> u16 {
        u16::from_be_bytes([self.raw[LENGTH_OFFSET], self.raw[LENGTH_OFFSET + 1]])
    }

    /// Unit identifier, if the frame carries one
    pub fn unit_id(&self) -> Option<u8> {
        self.raw.get(UNIT_ID_OFFSET).copied()
    }

    /// Function code, if the frame carries one
    pub fn function_code(&self) -> Option<u8> {
        self.raw.get(FUNCTION_CODE_OFFSET).copied()
    }

    /// Function-specific payload (possibly empty)
    pub fn payload(&self) -> &[u8] {
        self.raw.get(PAYLOAD_OFFSET..).unwrap_or(&[])
    }

    /// The whole frame as received
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    /// Total frame length in bytes
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("transaction_id", &format_args!("{:04X}", self.transaction_id()))
            .field("length", &self.length())
            .field("unit_id", &self.unit_id())
            .field("function_code", &self.function_code())
            .field("payload", &format_args!("{} bytes", self.payload().len()))
            .finish()
    }
}
