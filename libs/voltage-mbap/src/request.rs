//! Outgoing request variants
//!
//! Each variant keeps the fields needed to validate the response that will
//! eventually answer it.

use bytes::{BufMut, Bytes, BytesMut};

use crate::bits::{bytes_needed, pack_bits};
use crate::constants::{
    COIL_OFF, COIL_ON, FC_READ_DISCRETE_INPUTS, FC_READ_HOLDING_REGISTERS,
    FC_READ_INPUT_REGISTERS, FC_WRITE_MULTIPLE_COILS, FC_WRITE_MULTIPLE_REGISTERS,
    FC_WRITE_SINGLE_COIL, FC_WRITE_SINGLE_REGISTER, MAX_COIL_BYTES, MAX_PRESET_REGISTERS,
};
use crate::error::{MbapError, Result};

/// A request awaiting its response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// FC06
    WriteSingleRegister { address: u16, value: u16 },
    /// FC03
    ReadHoldingRegisters { start_address: u16, count: u16 },
    /// FC04
    ReadInputRegisters { start_address: u16, count: u16 },
    /// FC05
    ForceSingleCoil { address: u16, value: bool },
    /// FC15
    ForceMultipleCoils {
        start_address: u16,
        values: Vec<bool>,
    },
    /// FC02
    ReadInputStatus { start_address: u16, count: u16 },
    /// FC16
    PresetMultipleRegisters {
        start_address: u16,
        values: Vec<u16>,
    },
}

impl Request {
    /// Function code carried by this request and expected back in its response
    pub fn function_code(&self) -> u8 {
        match self {
            Request::WriteSingleRegister { .. } => FC_WRITE_SINGLE_REGISTER,
            Request::ReadHoldingRegisters { .. } => FC_READ_HOLDING_REGISTERS,
            Request::ReadInputRegisters { .. } => FC_READ_INPUT_REGISTERS,
            Request::ForceSingleCoil { .. } => FC_WRITE_SINGLE_COIL,
            Request::ForceMultipleCoils { .. } => FC_WRITE_MULTIPLE_COILS,
            Request::ReadInputStatus { .. } => FC_READ_DISCRETE_INPUTS,
            Request::PresetMultipleRegisters { .. } => FC_WRITE_MULTIPLE_REGISTERS,
        }
    }

    /// Serialize the function-specific payload (everything after the function code)
    ///
    /// Fails with `OversizeRequest` when FC15 would need more than 255 packed
    /// bytes or FC16 carries more than 255 registers.
    pub fn encode_payload(&self) -> Result<Bytes> {
        match self {
            Request::WriteSingleRegister { address, value } => Ok(pair(*address, *value)),
            Request::ReadHoldingRegisters {
                start_address,
                count,
            }
            | Request::ReadInputRegisters {
                start_address,
                count,
            }
            | Request::ReadInputStatus {
                start_address,
                count,
            } => Ok(pair(*start_address, *count)),
            Request::ForceSingleCoil { address, value } => {
                Ok(pair(*address, if *value { COIL_ON } else { COIL_OFF }))
            },
            Request::ForceMultipleCoils {
                start_address,
                values,
            } => {
                let byte_count = bytes_needed(values.len());
                if byte_count > MAX_COIL_BYTES {
                    return Err(MbapError::OversizeRequest {
                        function_code: FC_WRITE_MULTIPLE_COILS,
                        count: values.len(),
                        limit: MAX_COIL_BYTES * 8,
                    });
                }

                let mut payload = BytesMut::with_capacity(5 + byte_count);
                payload.put_u16(*start_address);
                payload.put_u16(values.len() as u16);
                payload.put_u8(byte_count as u8);
                payload.put_slice(&pack_bits(values));
                Ok(payload.freeze())
            },
            Request::PresetMultipleRegisters {
                start_address,
                values,
            } => {
                if values.len() > MAX_PRESET_REGISTERS {
                    return Err(MbapError::OversizeRequest {
                        function_code: FC_WRITE_MULTIPLE_REGISTERS,
                        count: values.len(),
                        limit: MAX_PRESET_REGISTERS,
                    });
                }

                let byte_count = 2 * values.len();
                let mut payload = BytesMut::with_capacity(5 + byte_count);
                payload.put_u16(*start_address);
                payload.put_u16(values.len() as u16);
                // One-byte field: wraps above 127 registers
                payload.put_u8(byte_count as u8);
                for value in values {
                    payload.put_u16(*value);
                }
                Ok(payload.freeze())
            },
        }
    }
}

fn pair(first: u16, second: u16) -> Bytes {
    let mut payload = BytesMut::with_capacity(4);
    payload.put_u16(first);
    payload.put_u16(second);
    payload.freeze()
}
