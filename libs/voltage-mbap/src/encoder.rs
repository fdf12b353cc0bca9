//! Frame encoding (MBAP header + PDU)

use bytes::{BufMut, Bytes, BytesMut};
use tracing::debug;

use crate::constants::{function_code_name, LENGTH_PREFIX, PAYLOAD_OFFSET, PROTOCOL_ID};

/// Build a complete Modbus TCP frame
///
/// The length field is `2 + payload.len()` (unit id and function code plus payload).
pub fn encode_frame(transaction_id: u16, unit_id: u8, function_code: u8, payload: &[u8]) -> Bytes {
    let length = (LENGTH_PREFIX + payload.len()) as u16;

    let mut frame = BytesMut::with_capacity(PAYLOAD_OFFSET + payload.len());
    frame.put_u16(transaction_id);
    frame.put_u16(PROTOCOL_ID);
    frame.put_u16(length);
    frame.put_u8(unit_id);
    frame.put_u8(function_code);
    frame.put_slice(payload);

    debug!(
        "Building TCP frame: trans_id={:04X}, unit_id={}, FC={:02X} ({}), payload_len={}",
        transaction_id,
        unit_id,
        function_code,
        function_code_name(function_code),
        payload.len()
    );

    frame.freeze()
}
