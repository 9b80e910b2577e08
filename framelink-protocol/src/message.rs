//! Application-facing messages
//!
//! A [`Message`] is what survives of a frame once it has been verified: the
//! addresses and the payload. Queue slots hold messages by value, so a
//! message is overwritten in place when its slot is reused.

use heapless::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::frame::{Frame, MAX_PAYLOAD_SIZE};

/// A verified message delivered to the application
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Message {
    /// Address the frame was sent to
    pub destination: u8,
    /// Address of the sender
    pub source: u8,
    /// Payload data
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Message {
    /// An empty message, used to fill queue backing stores
    pub const EMPTY: Message = Message {
        destination: 0,
        source: 0,
        payload: Vec::new(),
    };

    /// Create a new message
    ///
    /// Payloads longer than [`MAX_PAYLOAD_SIZE`] are truncated.
    pub fn new(destination: u8, source: u8, payload: &[u8]) -> Self {
        let mut message = Self {
            destination,
            source,
            payload: Vec::new(),
        };
        message.set_payload(payload);
        message
    }

    /// Address of the sender
    pub fn source_address(&self) -> u8 {
        self.source
    }

    /// Number of valid payload bytes
    pub fn payload_size(&self) -> u8 {
        self.payload.len() as u8
    }

    /// Payload bytes
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Replace the payload in place, truncating to [`MAX_PAYLOAD_SIZE`]
    pub fn set_payload(&mut self, data: &[u8]) {
        let len = data.len().min(MAX_PAYLOAD_SIZE);
        self.payload.clear();
        // Cannot fail: len is clamped to capacity
        let _ = self.payload.extend_from_slice(&data[..len]);
    }
}

impl From<&Frame> for Message {
    fn from(frame: &Frame) -> Self {
        Self {
            destination: frame.destination,
            source: frame.source,
            payload: frame.payload.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_message() {
        let message = Message::EMPTY;
        assert_eq!(message.payload_size(), 0);
        assert_eq!(message, Message::default());
    }

    #[test]
    fn test_set_payload_overwrites() {
        let mut message = Message::new(1, 2, &[1, 2, 3, 4]);
        message.set_payload(&[9]);
        assert_eq!(message.payload(), &[9]);
        assert_eq!(message.payload_size(), 1);
    }

    #[test]
    fn test_set_payload_truncates() {
        let message = Message::new(1, 2, &[7u8; MAX_PAYLOAD_SIZE + 1]);
        assert_eq!(message.payload_size() as usize, MAX_PAYLOAD_SIZE);
    }

    #[test]
    fn test_from_frame() {
        let frame = Frame::new(3, 4, b"abc");
        let message = Message::from(&frame);
        assert_eq!(message.destination, 3);
        assert_eq!(message.source_address(), 4);
        assert_eq!(message.payload(), b"abc");
    }
}
