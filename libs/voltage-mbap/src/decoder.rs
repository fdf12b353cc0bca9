//! Response decoding
//!
//! Validates a received frame against the request it answers and extracts
//! typed results. Every offset is checked against the bytes actually
//! received; a short frame is discarded as malformed instead of read past.

use tracing::{debug, trace};

use crate::bits::unpack_bits;
use crate::constants::{COIL_OFF, COIL_ON, EXCEPTION_FLAG};
use crate::error::DiscardReason;
use crate::frame::Frame;
use crate::request::Request;

/// Decoded result delivered to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// FC06 echo
    WriteSingleRegister {
        success: bool,
        address: u16,
        value: u16,
    },
    /// One register out of an FC03 response
    HoldingRegister { address: u16, value: u16 },
    /// Whole FC03 response
    HoldingRegisters {
        start_address: u16,
        values: Vec<u16>,
    },
    /// One register out of an FC04 response
    InputRegister { address: u16, value: u16 },
    /// Whole FC04 response
    InputRegisters {
        start_address: u16,
        values: Vec<u16>,
    },
    /// FC05 echo
    ForceSingleCoil {
        success: bool,
        address: u16,
        value: bool,
    },
    /// FC15 confirmation
    ForceMultipleCoils {
        success: bool,
        start_address: u16,
        requested: Vec<bool>,
        written: u16,
    },
    /// FC02 response
    InputStatus {
        start_address: u16,
        values: Vec<bool>,
    },
    /// FC16 confirmation
    PresetMultipleRegisters {
        success: bool,
        start_address: u16,
        requested: Vec<u16>,
        written: u16,
    },
}

/// Decode `frame` as the answer to `request`
///
/// Register reads produce one entry per register followed by the aggregate.
/// All other requests produce exactly one entry.
pub fn decode(frame: &Frame, request: Request) -> Result<Vec<Response>, DiscardReason> {
    let expected = request.function_code();
    let actual = frame
        .function_code()
        .ok_or_else(|| DiscardReason::malformed("frame has no function code"))?;

    if actual != expected {
        let exception_code = if actual & EXCEPTION_FLAG != 0 {
            frame.payload().first().copied()
        } else {
            None
        };
        return Err(DiscardReason::FunctionCodeMismatch {
            expected,
            actual,
            exception_code,
        });
    }

    let payload = frame.payload();
    trace!("Decoding FC{:02X} payload {:02X?}", actual, payload);

    let responses = match request {
        Request::WriteSingleRegister { address, value } => {
            let (echo_address, echo_value) = read_pair(payload)?;
            vec![Response::WriteSingleRegister {
                success: echo_address == address && echo_value == value,
                address: echo_address,
                value: echo_value,
            }]
        },
        Request::ReadHoldingRegisters { start_address, .. } => {
            let values = read_registers(payload)?;
            let mut responses: Vec<Response> = values
                .iter()
                .enumerate()
                .map(|(index, &value)| Response::HoldingRegister {
                    address: start_address.wrapping_add(index as u16),
                    value,
                })
                .collect();
            responses.push(Response::HoldingRegisters {
                start_address,
                values,
            });
            responses
        },
        Request::ReadInputRegisters { start_address, .. } => {
            let values = read_registers(payload)?;
            let mut responses: Vec<Response> = values
                .iter()
                .enumerate()
                .map(|(index, &value)| Response::InputRegister {
                    address: start_address.wrapping_add(index as u16),
                    value,
                })
                .collect();
            responses.push(Response::InputRegisters {
                start_address,
                values,
            });
            responses
        },
        Request::ForceSingleCoil { address, value } => {
            let (echo_address, code) = read_pair(payload)?;
            let consistent = (value && code == COIL_ON) || (!value && code == COIL_OFF);
            vec![Response::ForceSingleCoil {
                success: echo_address == address && consistent,
                address: echo_address,
                value: code == COIL_ON,
            }]
        },
        Request::ForceMultipleCoils {
            start_address,
            values,
        } => {
            let (echo_address, written) = read_pair(payload)?;
            vec![Response::ForceMultipleCoils {
                success: echo_address == start_address && values.len() == written as usize,
                start_address,
                requested: values,
                written,
            }]
        },
        Request::ReadInputStatus {
            start_address,
            count,
        } => {
            let data = counted_bytes(payload)?;
            vec![Response::InputStatus {
                start_address,
                values: unpack_bits(data, count as usize),
            }]
        },
        Request::PresetMultipleRegisters {
            start_address,
            values,
        } => {
            let (echo_address, written) = read_pair(payload)?;
            vec![Response::PresetMultipleRegisters {
                success: echo_address == start_address && values.len() == written as usize,
                start_address,
                requested: values,
                written,
            }]
        },
    };

    debug!(
        "Decoded FC{:02X} response: {} result(s)",
        actual,
        responses.len()
    );
    Ok(responses)
}

/// Two big-endian words at payload offsets 0..4
fn read_pair(payload: &[u8]) -> Result<(u16, u16), DiscardReason> {
    match payload {
        [a0, a1, b0, b1, ..] => Ok((
            u16::from_be_bytes([*a0, *a1]),
            u16::from_be_bytes([*b0, *b1]),
        )),
        _ => Err(DiscardReason::malformed(format!(
            "echo needs 4 payload bytes, got {}",
            payload.len()
        ))),
    }
}

/// Data bytes announced by the leading byte count
fn counted_bytes(payload: &[u8]) -> Result<&[u8], DiscardReason> {
    let (&byte_count, rest) = payload
        .split_first()
        .ok_or_else(|| DiscardReason::malformed("missing byte count"))?;

    rest.get(..byte_count as usize).ok_or_else(|| {
        DiscardReason::malformed(format!(
            "byte count {} exceeds {} received data bytes",
            byte_count,
            rest.len()
        ))
    })
}

/// `byte_count / 2` big-endian registers; an odd trailing byte is ignored
fn read_registers(payload: &[u8]) -> Result<Vec<u16>, DiscardReason> {
    let data = counted_bytes(payload)?;
    Ok(data
        .chunks_exact(2)
        .map(|word| u16::from_be_bytes([word[0], word[1]]))
        .collect())
}
