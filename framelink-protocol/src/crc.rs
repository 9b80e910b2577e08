//! Table-driven CRC-32
//!
//! Standard reflected CRC-32 (IEEE 802.3): polynomial `0xEDB88320` in
//! reversed form, seed `0xFFFFFFFF`, final inversion. The lookup table is
//! built at compile time, so there is nothing to initialise at runtime and
//! every byte costs one table lookup.
//!
//! [`concat`] continues a finished checksum over more bytes, which lets a
//! frame header and its payload be checksummed from two separate buffers.

/// CRC-32 polynomial in normal (MSB-first) form
pub const POLYNOMIAL: u32 = 0x04C1_1DB7;

/// CRC-32 polynomial in reversed (LSB-first) form, used by the table
pub const POLYNOMIAL_REVERSED: u32 = 0xEDB8_8320;

/// Initial register value
pub const SEED: u32 = 0xFFFF_FFFF;

/// Checksum of the ASCII string `"123456789"`
pub const CHECK_VALUE: u32 = 0xCBF4_3926;

/// Size of a serialized checksum in bytes
pub const CHECKSUM_SIZE: usize = 4;

static TABLE: [u32; 256] = build_table();

/// Build the 256-entry lookup table
///
/// Entry `i` is the register after shifting byte `i` through eight rounds
/// of shift-right, XOR-ing the polynomial whenever the low bit falls out.
pub const fn build_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut bit = 0;
        while bit < 8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ POLYNOMIAL_REVERSED;
            } else {
                crc >>= 1;
            }
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// The process-wide lookup table
pub fn table() -> &'static [u32; 256] {
    &TABLE
}

/// Run raw register updates without seeding or final inversion
fn update(mut crc: u32, data: &[u8]) -> u32 {
    for &byte in data {
        let index = ((crc ^ byte as u32) & 0xFF) as usize;
        crc = (crc >> 8) ^ TABLE[index];
    }
    crc
}

/// Compute the CRC-32 of `data`
pub fn compute(data: &[u8]) -> u32 {
    !update(SEED, data)
}

/// Continue a checksum over more data
///
/// `concat(compute(a), b) == compute(a ++ b)`, without re-reading `a`.
pub fn concat(prior: u32, data: &[u8]) -> u32 {
    !update(!prior, data)
}

/// Check `data` against an expected checksum
pub fn self_check(data: &[u8], expected: u32) -> bool {
    compute(data) == expected
}

/// Verify a buffer that carries its own checksum
///
/// The last four bytes are the little-endian checksum of everything before
/// them. Buffers shorter than a checksum never verify.
pub fn verify(data: &[u8]) -> bool {
    if data.len() < CHECKSUM_SIZE {
        return false;
    }
    let (body, tail) = data.split_at(data.len() - CHECKSUM_SIZE);
    let expected = u32::from_le_bytes([tail[0], tail[1], tail[2], tail[3]]);
    self_check(body, expected)
}

/// Reverse the bit order within a single byte (bit 7 <-> bit 0, ...)
pub const fn reflect_byte(b: u8) -> u8 {
    let mut x = b;
    x = (x >> 4) | (x << 4);
    x = ((x & 0b1100_1100) >> 2) | ((x & 0b0011_0011) << 2);
    x = ((x & 0b1010_1010) >> 1) | ((x & 0b0101_0101) << 1);
    x
}
