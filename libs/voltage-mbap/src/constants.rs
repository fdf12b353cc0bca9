//! Modbus TCP wire constants
//!
//! Offsets are relative to the start of an MBAP frame:
//! Transaction ID(2) + Protocol ID(2) + Length(2) + Unit ID(1) + Function Code(1) + payload.

// ============================================================================
// Frame Layout
// ============================================================================

/// Bytes preceding the unit identifier (transaction id, protocol id, length).
///
/// The length field counts every byte after this header.
pub const MBAP_HEADER_LEN: usize = 6;

/// Offset of the 16-bit length field
pub const LENGTH_OFFSET: usize = 4;

/// Offset of the unit identifier
pub const UNIT_ID_OFFSET: usize = 6;

/// Offset of the function code
pub const FUNCTION_CODE_OFFSET: usize = 7;

/// Offset of the first payload byte
pub const PAYLOAD_OFFSET: usize = 8;

/// Protocol identifier for Modbus, always zero
pub const PROTOCOL_ID: u16 = 0x0000;

/// Bytes counted by the length field ahead of the payload (unit id + function code)
pub const LENGTH_PREFIX: usize = 2;

// ============================================================================
// Modbus Function Codes
// ============================================================================

/// Read Discrete Inputs (FC02)
pub const FC_READ_DISCRETE_INPUTS: u8 = 0x02;

/// Read Holding Registers (FC03)
pub const FC_READ_HOLDING_REGISTERS: u8 = 0x03;

/// Read Input Registers (FC04)
pub const FC_READ_INPUT_REGISTERS: u8 = 0x04;

/// Write Single Coil (FC05)
pub const FC_WRITE_SINGLE_COIL: u8 = 0x05;

/// Write Single Register (FC06)
pub const FC_WRITE_SINGLE_REGISTER: u8 = 0x06;

/// Write Multiple Coils (FC15)
pub const FC_WRITE_MULTIPLE_COILS: u8 = 0x0F;

/// Write Multiple Registers (FC16)
pub const FC_WRITE_MULTIPLE_REGISTERS: u8 = 0x10;

/// Bit set on the function code of an exception response
pub const EXCEPTION_FLAG: u8 = 0x80;

// ============================================================================
// Coil Encoding
// ============================================================================

/// Single coil ON value (FC05)
pub const COIL_ON: u16 = 0xFF00;

/// Single coil OFF value (FC05)
pub const COIL_OFF: u16 = 0x0000;

// ============================================================================
// Request Limits
// ============================================================================

/// Largest packed coil byte count accepted for FC15 (2040 coils)
pub const MAX_COIL_BYTES: usize = 255;

/// Largest register count accepted for FC16
///
/// Looser than the 123 registers a 253-byte PDU can actually carry.
pub const MAX_PRESET_REGISTERS: usize = 255;

/// Default Modbus TCP port
pub const DEFAULT_TCP_PORT: u16 = 502;

/// Default unit identifier
pub const DEFAULT_UNIT_ID: u8 = 0;

/// Default connect timeout in milliseconds
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5000;

/// Socket read buffer size; one read may hold several frames or part of one
pub const READ_BUFFER_SIZE: usize = 512;

/// Human-readable function code name for logs
pub fn function_code_name(fc: u8) -> &'static str {
    match fc & !EXCEPTION_FLAG {
        FC_READ_DISCRETE_INPUTS => "Read Discrete Inputs",
        FC_READ_HOLDING_REGISTERS => "Read Holding Registers",
        FC_READ_INPUT_REGISTERS => "Read Input Registers",
        FC_WRITE_SINGLE_COIL => "Write Single Coil",
        FC_WRITE_SINGLE_REGISTER => "Write Single Register",
        FC_WRITE_MULTIPLE_COILS => "Write Multiple Coils",
        FC_WRITE_MULTIPLE_REGISTERS => "Write Multiple Registers",
        _ => "Unknown Function",
    }
}
