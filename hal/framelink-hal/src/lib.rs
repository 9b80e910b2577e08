//! Framelink Hardware Abstraction Layer
//!
//! This crate defines the transport traits the link layer needs from a
//! serial peripheral. Chip-specific HALs (or a host-side test double)
//! implement them; the link layer never touches registers itself.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application                            │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  framelink-core (link, transmitter)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  framelink-hal (this crate - traits)    │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  chip UART    │       │ host loopback │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::UartTx`] - Opening the link and blocking transmission
//! - [`uart::UartRx`] - Non-blocking reception for polled environments
//!
//! Interrupt-driven reception does not go through a trait: the receive
//! interrupt hands each byte to the link layer directly.

#![no_std]
#![deny(unsafe_code)]

pub mod uart;

pub use uart::{DataBits, Parity, StopBits, UartConfig, UartRx, UartTx};
