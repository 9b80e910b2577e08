//! UART serial communication abstractions
//!
//! Provides the transport collaborator the link layer drives: opening the
//! peripheral at a signalling rate and writing raw bytes in order.

/// UART transmitter
///
/// Only ever driven from task context; implementations may block.
pub trait UartTx {
    /// Error type for transmit operations
    type Error;

    /// Bring up the peripheral with the given line settings
    fn open(&mut self, config: &UartConfig) -> Result<(), Self::Error>;

    /// Write data to the UART
    ///
    /// Blocks until all data has been written or an error occurs.
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Write a single byte to the UART
    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.write_blocking(&[byte])
    }

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// UART receiver
///
/// For environments without a receive interrupt. Interrupt-driven targets
/// feed the link layer from their RX handler instead.
pub trait UartRx {
    /// Error type for receive operations
    type Error;

    /// Read one byte if one is pending
    ///
    /// Returns `Ok(None)` when the receive FIFO is empty. Never blocks.
    fn try_read_byte(&mut self) -> Result<Option<u8>, Self::Error>;
}

/// Combined UART interface
///
/// For UARTs that provide both TX and RX on a single peripheral.
pub trait Uart: UartTx + UartRx {}

// Blanket implementation
impl<T: UartTx + UartRx> Uart for T {}

/// UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl UartConfig {
    /// 8N1 at the given baud rate
    pub const fn with_baudrate(baudrate: u32) -> Self {
        Self {
            baudrate,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

impl Default for UartConfig {
    fn default() -> Self {
        Self::with_baudrate(115200)
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Seven,
    Eight,
    Nine,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingTx {
        written: usize,
    }

    impl UartTx for CountingTx {
        type Error = ();

        fn open(&mut self, _config: &UartConfig) -> Result<(), ()> {
            Ok(())
        }

        fn write_blocking(&mut self, data: &[u8]) -> Result<(), ()> {
            self.written += data.len();
            Ok(())
        }

        fn flush(&mut self) -> Result<(), ()> {
            Ok(())
        }
    }

    #[test]
    fn test_default_is_8n1_115200() {
        let config = UartConfig::default();
        assert_eq!(config.baudrate, 115200);
        assert_eq!(config.data_bits, DataBits::Eight);
        assert_eq!(config.parity, Parity::None);
        assert_eq!(config.stop_bits, StopBits::One);
    }

    #[test]
    fn test_write_byte_defaults_to_write_blocking() {
        let mut tx = CountingTx { written: 0 };
        tx.write_byte(0xAA).unwrap();
        tx.write_byte(0xBB).unwrap();
        assert_eq!(tx.written, 2);
    }
}
