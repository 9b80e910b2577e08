//! Link configuration
//!
//! Board-agnostic link settings. Configuration is persisted as postcard
//! binary data and carries a version byte checked on load.

use serde::{Deserialize, Serialize};

use framelink_hal::UartConfig;
use framelink_protocol::Preamble;

/// Current configuration layout version
pub const CONFIG_VERSION: u8 = 1;

/// Buffer size that always fits a serialized [`LinkConfig`]
pub const MAX_CONFIG_SIZE: usize = 32;

/// Default line speed in bits per second
pub const DEFAULT_BAUDRATE: u32 = 115200;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Serialization failed (buffer too small)
    Serialize,
    /// Deserialization failed
    Deserialize,
    /// Config version mismatch
    VersionMismatch,
    /// Baud rate of zero
    InvalidBaudrate,
    /// Idle timeout of zero milliseconds
    InvalidIdleTimeout,
}

/// Link configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkConfig {
    /// Layout version, [`CONFIG_VERSION`] for configs written by this crate
    pub version: u8,
    /// Frame synchronization pattern, shared by sender and receiver
    pub preamble: Preamble,
    /// Line speed in bits per second
    pub baudrate: u32,
    /// Abandon a half-received frame after this long without a byte
    ///
    /// `None` parks the parser until more bytes arrive.
    pub idle_timeout_ms: Option<u32>,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            preamble: Preamble::default(),
            baudrate: DEFAULT_BAUDRATE,
            idle_timeout_ms: None,
        }
    }
}

impl LinkConfig {
    /// Default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom preamble
    pub fn with_preamble(mut self, preamble: Preamble) -> Self {
        self.preamble = preamble;
        self
    }

    /// Use a different line speed
    pub fn with_baudrate(mut self, baudrate: u32) -> Self {
        self.baudrate = baudrate;
        self
    }

    /// Reset the parser after `timeout_ms` of silence mid-frame
    pub fn with_idle_timeout(mut self, timeout_ms: u32) -> Self {
        self.idle_timeout_ms = Some(timeout_ms);
        self
    }

    /// Line settings for opening the transport
    pub fn uart_config(&self) -> UartConfig {
        UartConfig::with_baudrate(self.baudrate)
    }

    /// Check the values make sense
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.baudrate == 0 {
            return Err(ConfigError::InvalidBaudrate);
        }
        if self.idle_timeout_ms == Some(0) {
            return Err(ConfigError::InvalidIdleTimeout);
        }
        Ok(())
    }

    /// Serialize into `buffer`, returning the used part
    pub fn to_slice<'b>(&self, buffer: &'b mut [u8]) -> Result<&'b mut [u8], ConfigError> {
        postcard::to_slice(self, buffer).map_err(|_| ConfigError::Serialize)
    }

    /// Load a configuration written by [`LinkConfig::to_slice`]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: LinkConfig =
            postcard::from_bytes(bytes).map_err(|_| ConfigError::Deserialize)?;

        if config.version != CONFIG_VERSION {
            warn!(
                "Config version mismatch: found {}, expected {}",
                config.version, CONFIG_VERSION
            );
            return Err(ConfigError::VersionMismatch);
        }

        config.validate()?;
        Ok(config)
    }
}
