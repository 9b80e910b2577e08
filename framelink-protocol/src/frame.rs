//! Frame encoding for the Framelink wire format
//!
//! Frame format:
//! - PREAMBLE (4 bytes): synchronization pattern, default `AA BB CC DD`
//! - ADDRESS (2 bytes): destination, then source
//! - SIZE (1 byte): payload length (0-100)
//! - PAYLOAD (0-100 bytes): opaque application data
//! - CHECKSUM (4 bytes): CRC-32 of ADDRESS, SIZE and PAYLOAD, little-endian
//!
//! The preamble is not covered by the checksum. There is no byte stuffing,
//! so the preamble pattern should not occur inside the address and size
//! fields if a receiver is to resynchronize reliably.

use heapless::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::crc;

/// Length of the synchronization preamble
pub const PREAMBLE_SIZE: usize = 4;

/// Length of the address field (destination, source)
pub const ADDRESS_SIZE: usize = 2;

/// Length of the checksummed header (ADDRESS + SIZE)
pub const HEADER_SIZE: usize = ADDRESS_SIZE + 1;

/// Length of the trailing checksum
pub const CHECKSUM_SIZE: usize = crc::CHECKSUM_SIZE;

/// Maximum payload size in bytes
pub const MAX_PAYLOAD_SIZE: usize = 100;

/// Maximum complete frame size (PREAMBLE + HEADER + MAX_PAYLOAD + CHECKSUM)
pub const MAX_FRAME_SIZE: usize = PREAMBLE_SIZE + HEADER_SIZE + MAX_PAYLOAD_SIZE + CHECKSUM_SIZE;

/// Default synchronization pattern
pub const DEFAULT_PREAMBLE: [u8; PREAMBLE_SIZE] = [0xAA, 0xBB, 0xCC, 0xDD];

/// Errors that can occur during frame encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// Four-byte synchronization pattern marking the start of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Preamble([u8; PREAMBLE_SIZE]);

impl Preamble {
    /// Build a preamble from its four bytes, in transmission order
    pub const fn new(b1: u8, b2: u8, b3: u8, b4: u8) -> Self {
        Self([b1, b2, b3, b4])
    }

    /// Preamble bytes in transmission order
    pub const fn as_bytes(&self) -> &[u8; PREAMBLE_SIZE] {
        &self.0
    }
}

impl Default for Preamble {
    fn default() -> Self {
        Self(DEFAULT_PREAMBLE)
    }
}

impl From<[u8; PREAMBLE_SIZE]> for Preamble {
    fn from(bytes: [u8; PREAMBLE_SIZE]) -> Self {
        Self(bytes)
    }
}

/// Checksum over a frame header and its payload
///
/// The header and payload may live in different buffers; the checksum is
/// the same as over their concatenation. Sender and receiver both go
/// through this function.
pub fn frame_checksum(header: &[u8; HEADER_SIZE], payload: &[u8]) -> u32 {
    crc::concat(crc::compute(header), payload)
}

/// An outgoing frame
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    /// Destination address
    pub destination: u8,
    /// Source address
    pub source: u8,
    /// Payload data
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Frame {
    /// Create a new frame
    ///
    /// Payloads longer than [`MAX_PAYLOAD_SIZE`] are truncated.
    pub fn new(destination: u8, source: u8, payload: &[u8]) -> Self {
        let len = payload.len().min(MAX_PAYLOAD_SIZE);
        Self {
            destination,
            source,
            payload: Vec::from_slice(&payload[..len]).unwrap_or_default(),
        }
    }

    /// Create a frame with no payload
    pub fn empty(destination: u8, source: u8) -> Self {
        Self {
            destination,
            source,
            payload: Vec::new(),
        }
    }

    /// Declared payload size
    pub fn payload_size(&self) -> u8 {
        self.payload.len() as u8
    }

    /// Address and size bytes, the checksummed header
    pub fn header(&self) -> [u8; HEADER_SIZE] {
        [self.destination, self.source, self.payload_size()]
    }

    /// Checksum carried by this frame on the wire
    pub fn checksum(&self) -> u32 {
        frame_checksum(&self.header(), &self.payload)
    }

    /// Number of bytes this frame occupies on the wire
    pub fn encoded_len(&self) -> usize {
        PREAMBLE_SIZE + HEADER_SIZE + self.payload.len() + CHECKSUM_SIZE
    }

    /// Encode this frame into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, preamble: &Preamble, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let frame_len = self.encoded_len();
        if buffer.len() < frame_len {
            return Err(FrameError::BufferTooSmall);
        }

        let payload_end = PREAMBLE_SIZE + HEADER_SIZE + self.payload.len();
        buffer[..PREAMBLE_SIZE].copy_from_slice(preamble.as_bytes());
        buffer[PREAMBLE_SIZE..PREAMBLE_SIZE + HEADER_SIZE].copy_from_slice(&self.header());
        buffer[PREAMBLE_SIZE + HEADER_SIZE..payload_end].copy_from_slice(&self.payload);
        buffer[payload_end..frame_len].copy_from_slice(&self.checksum().to_le_bytes());

        Ok(frame_len)
    }

    /// Encode this frame into a heapless Vec
    pub fn encode_to_vec(&self, preamble: &Preamble) -> Vec<u8, MAX_FRAME_SIZE> {
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        // A clamped payload always fits MAX_FRAME_SIZE
        let len = self.encode(preamble, &mut buffer).unwrap_or(0);
        Vec::from_slice(&buffer[..len]).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_encode_empty_payload() {
        let frame = Frame::empty(0x02, 0x01);
        let mut buffer = [0u8; 16];
        let len = frame.encode(&Preamble::default(), &mut buffer).unwrap();

        assert_eq!(len, 11);
        assert_eq!(&buffer[..4], &DEFAULT_PREAMBLE);
        assert_eq!(buffer[4], 0x02); // destination
        assert_eq!(buffer[5], 0x01); // source
        assert_eq!(buffer[6], 0); // size
        let crc = crc::compute(&[0x02, 0x01, 0x00]);
        assert_eq!(&buffer[7..11], &crc.to_le_bytes());
    }

    #[test]
    fn test_frame_encode_with_payload() {
        let frame = Frame::new(0x10, 0x20, b"Hello");
        let encoded = frame.encode_to_vec(&Preamble::default());

        assert_eq!(encoded.len(), 4 + 3 + 5 + 4);
        assert_eq!(encoded[6], 5);
        assert_eq!(&encoded[7..12], b"Hello");
        assert!(crc::verify(&encoded[4..]));
    }

    #[test]
    fn test_checksum_excludes_preamble() {
        let frame = Frame::new(1, 2, &[9, 8, 7]);
        let a = frame.encode_to_vec(&Preamble::default());
        let b = frame.encode_to_vec(&Preamble::new(0x55, 0x55, 0x55, 0x55));

        assert_eq!(&a[4..], &b[4..]);
        assert_ne!(&a[..4], &b[..4]);
    }

    #[test]
    fn test_checksum_matches_contiguous_computation() {
        let frame = Frame::new(0x42, 0x07, &[1, 2, 3, 4, 5]);
        assert_eq!(frame.checksum(), crc::compute(&[0x42, 0x07, 5, 1, 2, 3, 4, 5]));
    }

    #[test]
    fn test_oversized_payload_is_truncated() {
        let large_payload = [0x5Au8; MAX_PAYLOAD_SIZE + 20];
        let frame = Frame::new(1, 2, &large_payload);

        assert_eq!(frame.payload.len(), MAX_PAYLOAD_SIZE);
        assert_eq!(frame.payload_size() as usize, MAX_PAYLOAD_SIZE);
        assert_eq!(frame.encode_to_vec(&Preamble::default()).len(), MAX_FRAME_SIZE);
    }

    #[test]
    fn test_encode_buffer_too_small() {
        let frame = Frame::new(1, 2, &[0; 10]);
        let mut buffer = [0u8; 20];
        assert_eq!(
            frame.encode(&Preamble::default(), &mut buffer),
            Err(FrameError::BufferTooSmall)
        );
    }

    #[test]
    fn test_preamble_from_bytes() {
        let preamble = Preamble::from([1, 2, 3, 4]);
        assert_eq!(preamble, Preamble::new(1, 2, 3, 4));
        assert_eq!(preamble.as_bytes(), &[1, 2, 3, 4]);
        assert_eq!(Preamble::default().as_bytes(), &DEFAULT_PREAMBLE);
    }
}
