//! Coil and discrete-input bit packing
//!
//! Bit `i` lives in byte `i / 8` at position `i % 8`, least significant bit first.

const BITS_PER_BYTE: usize = 8;

/// Number of bytes needed to carry `count` bits
pub const fn bytes_needed(count: usize) -> usize {
    count.div_ceil(BITS_PER_BYTE)
}

/// Pack booleans into bytes, leaving unused high bits of the last byte zero
pub fn pack_bits(values: &[bool]) -> Vec<u8> {
    let mut bytes = vec![0u8; bytes_needed(values.len())];

    for (index, &value) in values.iter().enumerate() {
        if value {
            bytes[index / BITS_PER_BYTE] |= 1 << (index % BITS_PER_BYTE);
        }
    }

    bytes
}

/// Unpack up to `count` bits from `bytes`
///
/// Stops early if `bytes` runs out; trailing pad bits are ignored.
pub fn unpack_bits(bytes: &[u8], count: usize) -> Vec<bool> {
    let count = count.min(bytes.len() * BITS_PER_BYTE);

    (0..count)
        .map(|index| bytes[index / BITS_PER_BYTE] & (1 << (index % BITS_PER_BYTE)) != 0)
        .collect()
}
