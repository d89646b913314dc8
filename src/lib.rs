//! Async driver for MCP342x and ADS101x I2C analog-to-digital converters.
//!
//! The driver turns a sampling request (channel, gain, resolution, rate)
//! into the device-specific configuration bytes, sequences the one-shot
//! write → timed wait → read protocol over a host-supplied bus adapter and
//! decodes the signed conversion result into volts. Bus I/O itself is
//! delegated to an [`I2cAdapter`] implementation, so the protocol core
//! stays independent of the bus backend and fully testable in memory.
//!
//! Supported hardware:
//!
//! - MCP3421–MCP3428: 1–4 channels, 12/14/16/18 bit, PGA x1–x8
//! - ADS1013–ADS1015: 1–8 mux selections, 12 bit, PGA x0.25–x8

pub mod adapters;
pub mod command;
pub mod config;
pub mod decode;
pub mod device;
pub mod error;
pub mod model;

pub use adapters::{BusReading, I2cAdapter, MockI2c, MockOp};
pub use command::{encode_config, ConfigCommand};
pub use config::{AdcConfig, ConfigError, DeviceEntry};
pub use decode::decode_voltage;
pub use device::{AdcDevice, SampleOverrides, VoltageSample};
pub use error::{AdcError, BusError, Result};
pub use model::{
    lookup_model, validate_request, Family, Gain, ModelSpec, Resolution, SamplingRequest,
    REFERENCE_VOLTS,
};
