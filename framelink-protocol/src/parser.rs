//! Byte-fed frame parser
//!
//! [`FrameParser::feed`] consumes exactly one byte per call and is meant to
//! be driven straight from a receive interrupt: it never blocks, never
//! allocates and never fails. Verified frames are written into a
//! [`FrameQueue`]; everything else (noise between frames, corrupted frames,
//! frames arriving while the queue is full) is discarded and the parser
//! goes back to hunting for a preamble.
//!
//! ```text
//! ParsingPreamble ──4 matching bytes──▶ ParsingAddress ──2 bytes──▶ ParsingSize
//!        ▲                                                              │
//!        │                                               size > 0 │ size == 0
//!        │                                                        ▼       │
//!        └──── verify, deliver ◀── ParsingChecksum ◀── ParsingPayload     │
//!                                     ▲                                   │
//!                                     └───────────────────────────────────┘
//! ```

use crate::frame::{
    frame_checksum, Preamble, ADDRESS_SIZE, CHECKSUM_SIZE, HEADER_SIZE, MAX_PAYLOAD_SIZE,
    PREAMBLE_SIZE,
};
use crate::queue::FrameQueue;

/// Parser stages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseState {
    /// Searching for the preamble
    ParsingPreamble,
    /// Reading destination and source
    ParsingAddress,
    /// Reading the payload length
    ParsingSize,
    /// Reading payload bytes
    ParsingPayload,
    /// Reading checksum bytes; the frame is verified on the last one
    ParsingChecksum,
}

/// What a single [`FrameParser::feed`] call did
///
/// Purely informational. Callers in interrupt context are free to ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FeedStatus {
    /// Byte consumed, frame not complete yet
    Pending,
    /// A verified message was queued
    Delivered,
    /// A verified message was dropped because the queue was full
    Dropped,
    /// The frame failed its checksum and was discarded
    Rejected,
}

/// State machine for parsing incoming frames
#[derive(Debug, Clone)]
pub struct FrameParser {
    state: ParseState,
    /// Bytes consumed in the current stage
    offset: usize,
    preamble: Preamble,
    address: [u8; ADDRESS_SIZE],
    payload_size: u8,
    payload: [u8; MAX_PAYLOAD_SIZE],
    checksum: [u8; CHECKSUM_SIZE],
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new(Preamble::default())
    }
}

impl FrameParser {
    /// Create a new frame parser looking for `preamble`
    pub const fn new(preamble: Preamble) -> Self {
        Self {
            state: ParseState::ParsingPreamble,
            offset: 0,
            preamble,
            address: [0; ADDRESS_SIZE],
            payload_size: 0,
            payload: [0; MAX_PAYLOAD_SIZE],
            checksum: [0; CHECKSUM_SIZE],
        }
    }

    /// Current stage
    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Check whether the parser is between frames
    ///
    /// True when hunting for a preamble with no bytes of it matched yet.
    pub fn is_idle(&self) -> bool {
        self.state == ParseState::ParsingPreamble && self.offset == 0
    }

    /// Preamble the parser is looking for
    pub fn preamble(&self) -> Preamble {
        self.preamble
    }

    /// Change the preamble to look for
    ///
    /// A frame already past its preamble completes normally. A partial
    /// preamble match is abandoned and the search restarts with the new
    /// pattern.
    pub fn set_preamble(&mut self, preamble: Preamble) {
        self.preamble = preamble;
        if self.state == ParseState::ParsingPreamble {
            self.offset = 0;
        }
    }

    /// Reset the parser state
    ///
    /// Any partially received frame is discarded.
    pub fn reset(&mut self) {
        self.enter(ParseState::ParsingPreamble);
    }

    /// Feed a single byte to the parser
    ///
    /// On the last checksum byte the frame is verified and, if intact, copied
    /// into `queue`. The parser is back in [`ParseState::ParsingPreamble`]
    /// after every completed frame, whatever the outcome.
    pub fn feed(&mut self, byte: u8, queue: &mut FrameQueue<'_>) -> FeedStatus {
        match self.state {
            ParseState::ParsingPreamble => {
                self.parse_preamble(byte);
            }
            ParseState::ParsingAddress => {
                self.address[self.offset] = byte;
                self.offset += 1;
                if self.offset == ADDRESS_SIZE {
                    self.enter(ParseState::ParsingSize);
                }
            }
            ParseState::ParsingSize => {
                self.payload_size = if usize::from(byte) > MAX_PAYLOAD_SIZE {
                    trace!("declared payload size {} clamped", byte);
                    MAX_PAYLOAD_SIZE as u8
                } else {
                    byte
                };

                if self.payload_size == 0 {
                    self.enter(ParseState::ParsingChecksum);
                } else {
                    self.enter(ParseState::ParsingPayload);
                }
            }
            ParseState::ParsingPayload => {
                self.payload[self.offset] = byte;
                self.offset += 1;
                if self.offset == usize::from(self.payload_size) {
                    self.enter(ParseState::ParsingChecksum);
                }
            }
            ParseState::ParsingChecksum => {
                self.checksum[self.offset] = byte;
                self.offset += 1;
                if self.offset == CHECKSUM_SIZE {
                    let status = self.verify_and_deliver(queue);
                    self.reset();
                    return status;
                }
            }
        }

        FeedStatus::Pending
    }

    /// Feed multiple bytes to the parser
    ///
    /// Returns the number of messages queued.
    pub fn feed_bytes(&mut self, bytes: &[u8], queue: &mut FrameQueue<'_>) -> usize {
        let mut delivered = 0;
        for &byte in bytes {
            if self.feed(byte, queue) == FeedStatus::Delivered {
                delivered += 1;
            }
        }
        delivered
    }

    fn enter(&mut self, state: ParseState) {
        self.state = state;
        self.offset = 0;
    }

    fn parse_preamble(&mut self, byte: u8) {
        let expected = self.preamble.as_bytes();

        if byte == expected[self.offset] {
            self.offset += 1;
        } else {
            self.offset = self.resync_offset(byte);
        }

        if self.offset == PREAMBLE_SIZE {
            self.enter(ParseState::ParsingAddress);
        }
    }

    /// Longest preamble prefix that ends with `byte` after a mismatch
    ///
    /// The bytes just seen are `preamble[..offset]` followed by `byte`. A
    /// spurious byte in the middle of a preamble must not hide a real
    /// preamble starting inside it, e.g. `AA AA BB CC DD`.
    fn resync_offset(&self, byte: u8) -> usize {
        let expected = self.preamble.as_bytes();
        let matched = self.offset;

        let mut len = matched;
        while len > 0 {
            let start = matched + 1 - len;
            if expected[len - 1] == byte && expected[..len - 1] == expected[start..matched] {
                return len;
            }
            len -= 1;
        }
        0
    }

    fn verify_and_deliver(&self, queue: &mut FrameQueue<'_>) -> FeedStatus {
        let header: [u8; HEADER_SIZE] = [self.address[0], self.address[1], self.payload_size];
        let payload = &self.payload[..usize::from(self.payload_size)];

        let computed = frame_checksum(&header, payload);
        let received = u32::from_le_bytes(self.checksum);
        if computed != received {
            debug!(
                "checksum mismatch: computed {=u32:#x}, received {=u32:#x}",
                computed, received
            );
            return FeedStatus::Rejected;
        }

        let delivered = queue.push_with(|slot| {
            slot.destination = header[0];
            slot.source = header[1];
            slot.set_payload(payload);
        });

        if delivered {
            FeedStatus::Delivered
        } else {
            warn!("message queue full, dropping frame from {=u8:#x}", header[1]);
            FeedStatus::Dropped
        }
    }
}
