//! Framelink data-link protocol
//!
//! This crate defines the wire format and the receive machinery of a
//! point-to-point framed link over UART-class transports.
//!
//! # Protocol Overview
//!
//! All messages use a simple binary frame format:
//! ```text
//! ┌──────────┬─────────┬─────────┬──────┬─────────────┬──────────┐
//! │ PREAMBLE │ DEST    │ SOURCE  │ SIZE │ PAYLOAD     │ CHECKSUM │
//! │ 4B       │ 1B      │ 1B      │ 1B   │ 0–100B      │ 4B (LE)  │
//! └──────────┴─────────┴─────────┴──────┴─────────────┴──────────┘
//! ```
//!
//! The checksum is a CRC-32 over DEST, SOURCE, SIZE and PAYLOAD.
//!
//! Incoming bytes go one at a time into a [`FrameParser`], typically from a
//! receive interrupt. Frames that verify are copied into a [`FrameQueue`]
//! as [`Message`]s for the application to pop at its own pace. Nothing on
//! the receive path blocks, allocates or returns an error.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

// Must come first so the other modules see its macros
mod fmt;

pub mod crc;
pub mod frame;
pub mod message;
pub mod parser;
pub mod queue;

pub use frame::{
    Frame, FrameError, Preamble, DEFAULT_PREAMBLE, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE,
};
pub use message::Message;
pub use parser::{FeedStatus, FrameParser, ParseState};
pub use queue::{FrameQueue, QueueError};
