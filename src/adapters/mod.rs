//! Bus transport adapters.
//!
//! The driver core never owns an I2C bus; it drives an [`I2cAdapter`]
//! supplied by the host, which keeps the protocol logic testable against
//! the in-memory [`MockI2c`] and portable across bus backends.

pub mod mock;

pub use mock::{MockI2c, MockOp};

use std::time::Instant;

use async_trait::async_trait;

use crate::error::BusError;

/// A completed bus read: payload plus the transport's receive timestamp.
#[derive(Debug, Clone)]
pub struct BusReading {
    /// Raw bytes returned by the device.
    pub bytes: Vec<u8>,
    /// Monotonic timestamp taken when the read completed.
    pub received_at: Instant,
}

/// Generic async adapter trait for I2C communication.
///
/// Implementations must make each call atomic with respect to other traffic
/// on the same bus; the driver relies on that to interleave devices safely.
#[async_trait]
pub trait I2cAdapter: Send + Sync {
    /// Write `bytes` to the device at `address`.
    async fn write_raw(&mut self, address: u8, bytes: &[u8]) -> Result<(), BusError>;

    /// Read `length` bytes from the device at `address`, transmitting the
    /// register `pointer` first when it is non-empty.
    async fn read_raw(
        &mut self,
        address: u8,
        pointer: &[u8],
        length: usize,
    ) -> Result<BusReading, BusError>;
}
