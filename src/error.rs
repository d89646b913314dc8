//! Error types for the I2C ADC driver.
//!
//! Every failure the driver can produce is a typed result: request
//! validation problems are reported before any bus traffic happens and are
//! recoverable by retrying with a corrected request, while transport
//! failures are surfaced unmodified (retry policy belongs to the transport
//! or the host, never to this crate).

use thiserror::Error;

/// Convenience alias for results using the driver error type.
pub type Result<T> = std::result::Result<T, AdcError>;

/// Failure reported by the bus transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BusError {
    #[error("I2C write to 0x{address:02x} failed: {message}")]
    Write { address: u8, message: String },

    #[error("I2C read from 0x{address:02x} failed: {message}")]
    Read { address: u8, message: String },
}

#[derive(Error, Debug)]
pub enum AdcError {
    #[error("ADC model '{0}' is not supported")]
    UnsupportedDevice(String),

    #[error("Channel {channel} out of range: device has {channel_count} channel(s)")]
    InvalidChannel { channel: u8, channel_count: u8 },

    #[error("Invalid resolution: {0} bit")]
    InvalidResolution(u32),

    #[error("Invalid PGA setting: {0}")]
    InvalidGain(f64),

    #[error("Rate {rate} S/s is not available at {bits} bit resolution")]
    InvalidRate { rate: f64, bits: u32 },

    #[error("{model} does not support {bits} bit sampling")]
    ResolutionUnsupportedByFamily { model: &'static str, bits: u32 },

    #[error(transparent)]
    Bus(#[from] BusError),

    #[error("Conversion response too short: got {got} byte(s), need {need}")]
    MalformedResponse { got: usize, need: usize },
}
