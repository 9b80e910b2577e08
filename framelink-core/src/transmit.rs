//! Outbound frames
//!
//! The [`Transmitter`] owns the transport's transmit half. It runs in task
//! context only and may block on the transport; the receive interrupt
//! never goes through here.

use framelink_hal::UartTx;
use framelink_protocol::{Frame, Preamble};

use crate::config::LinkConfig;

/// Errors from sending a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SendError<E> {
    /// The transport failed to open or write
    Transport(E),
}

/// Frame sender over a UART transmitter
#[derive(Debug)]
pub struct Transmitter<T> {
    uart: T,
    preamble: Preamble,
}

impl<T: UartTx> Transmitter<T> {
    /// Wrap a transport that is already open
    pub fn new(uart: T, preamble: Preamble) -> Self {
        Self { uart, preamble }
    }

    /// Open the transport with the configured line settings
    pub fn open(mut uart: T, config: &LinkConfig) -> Result<Self, SendError<T::Error>> {
        uart.open(&config.uart_config()).map_err(SendError::Transport)?;
        info!("Transport opened at {} baud", config.baudrate);
        Ok(Self::new(uart, config.preamble))
    }

    /// Frame and send a payload
    ///
    /// Payloads longer than [`framelink_protocol::MAX_PAYLOAD_SIZE`] are
    /// truncated, and the size field says so.
    pub fn send(
        &mut self,
        destination: u8,
        source: u8,
        payload: &[u8],
    ) -> Result<(), SendError<T::Error>> {
        self.send_frame(&Frame::new(destination, source, payload))
    }

    /// Send a prebuilt frame
    ///
    /// Writes preamble, address, size, payload and checksum, in that order,
    /// then flushes the transport.
    pub fn send_frame(&mut self, frame: &Frame) -> Result<(), SendError<T::Error>> {
        self.write_frame(frame).map_err(SendError::Transport)?;
        trace!(
            "Sent frame {=u8:#x} -> {=u8:#x}, {} bytes",
            frame.source,
            frame.destination,
            frame.payload.len()
        );
        Ok(())
    }

    fn write_frame(&mut self, frame: &Frame) -> Result<(), T::Error> {
        self.uart.write_blocking(self.preamble.as_bytes())?;
        self.uart.write_blocking(&[frame.destination, frame.source])?;
        self.uart.write_byte(frame.payload_size())?;
        self.uart.write_blocking(&frame.payload)?;
        self.uart.write_blocking(&frame.checksum().to_le_bytes())?;
        self.uart.flush()
    }

    /// Preamble prepended to outgoing frames
    pub fn preamble(&self) -> Preamble {
        self.preamble
    }

    /// Change the preamble prepended to outgoing frames
    pub fn set_preamble(&mut self, preamble: Preamble) {
        self.preamble = preamble;
    }

    /// Access the underlying transport
    pub fn uart_mut(&mut self) -> &mut T {
        &mut self.uart
    }

    /// Give the transport back
    pub fn release(self) -> T {
        self.uart
    }
}
