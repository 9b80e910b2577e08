//! Application surface of the Framelink data-link layer
//!
//! This crate ties the protocol pieces to a transport:
//!
//! - [`config::LinkConfig`] - Preamble, line speed, idle timeout; postcard persistence
//! - [`link::Link`] - Receive context: parser, message queue, statistics
//! - [`shared::SharedLink`] - Interrupt-safe wrapper around a link
//! - [`transmit::Transmitter`] - Outbound frames over a [`framelink_hal::UartTx`]
//!
//! Reception and transmission are deliberately separate objects: the
//! receive interrupt only ever touches the link, and blocking writes only
//! ever happen on the transmitter from task context.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

// Must come first so the other modules see its macros
mod fmt;

pub mod config;
pub mod link;
pub mod shared;
pub mod transmit;

pub use config::{ConfigError, LinkConfig};
pub use link::{Link, LinkStats};
pub use shared::SharedLink;
pub use transmit::{SendError, Transmitter};

pub use framelink_protocol::{FeedStatus, Frame, Message, Preamble, QueueError};
