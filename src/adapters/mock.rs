//! Scripted in-memory adapter for driver tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{BusReading, I2cAdapter};
use crate::error::BusError;

/// One logged bus operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOp {
    /// A write of the given bytes to the given address.
    Write(u8, Vec<u8>),
    /// A read from the given address: pointer bytes and requested length.
    Read(u8, Vec<u8>, usize),
}

#[derive(Debug, Default)]
struct MockState {
    ops: Vec<MockOp>,
    responses: VecDeque<Vec<u8>>,
    fail_writes: bool,
    fail_reads: bool,
}

/// In-memory bus double: records traffic and serves queued responses.
///
/// Cloning yields another handle onto the same script, so a test keeps one
/// clone for inspection while the device owns the other.
#[derive(Debug, Clone, Default)]
pub struct MockI2c {
    state: Arc<Mutex<MockState>>,
}

impl MockI2c {
    /// Create an empty mock bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the bytes served by the next read. Reads with nothing queued
    /// return zeros of the requested length.
    pub fn push_response(&self, bytes: &[u8]) {
        self.state.lock().responses.push_back(bytes.to_vec());
    }

    /// Make every subsequent write fail.
    pub fn fail_writes(&self) {
        self.state.lock().fail_writes = true;
    }

    /// Make every subsequent read fail.
    pub fn fail_reads(&self) {
        self.state.lock().fail_reads = true;
    }

    /// All bus operations performed so far, in order.
    pub fn ops(&self) -> Vec<MockOp> {
        self.state.lock().ops.clone()
    }

    /// Writes performed so far, as (address, bytes) pairs.
    pub fn writes(&self) -> Vec<(u8, Vec<u8>)> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                MockOp::Write(address, bytes) => Some((address, bytes)),
                MockOp::Read(..) => None,
            })
            .collect()
    }

    /// Reads performed so far, as (address, pointer, length) triples.
    pub fn reads(&self) -> Vec<(u8, Vec<u8>, usize)> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                MockOp::Read(address, pointer, length) => Some((address, pointer, length)),
                MockOp::Write(..) => None,
            })
            .collect()
    }
}

#[async_trait]
impl I2cAdapter for MockI2c {
    async fn write_raw(&mut self, address: u8, bytes: &[u8]) -> Result<(), BusError> {
        let mut state = self.state.lock();
        if state.fail_writes {
            return Err(BusError::Write {
                address,
                message: "injected write failure".to_string(),
            });
        }
        state.ops.push(MockOp::Write(address, bytes.to_vec()));
        Ok(())
    }

    async fn read_raw(
        &mut self,
        address: u8,
        pointer: &[u8],
        length: usize,
    ) -> Result<BusReading, BusError> {
        let mut state = self.state.lock();
        if state.fail_reads {
            return Err(BusError::Read {
                address,
                message: "injected read failure".to_string(),
            });
        }
        state
            .ops
            .push(MockOp::Read(address, pointer.to_vec(), length));
        let bytes = state
            .responses
            .pop_front()
            .unwrap_or_else(|| vec![0; length]);
        Ok(BusReading {
            bytes,
            received_at: Instant::now(),
        })
    }
}
