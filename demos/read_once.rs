//! Take one reading from the first configured ADC and print it.
//!
//! Runs against the in-memory mock bus so it works on any machine; swap in
//! a real `I2cAdapter` implementation on deployment hardware.
//!
//! ```bash
//! cargo run --example read_once
//! ```

use anyhow::Result;
use daq_driver_i2c_adc::{AdcConfig, AdcDevice, DeviceEntry, MockI2c};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AdcConfig::load()?;
    let entry = config.devices.into_iter().next().unwrap_or(DeviceEntry {
        id: "demo_adc".to_string(),
        sensor_id: "MCP3421".to_string(),
        i2c_address: None,
        resolution: 16,
        gain: 1.0,
        channel: 1,
        rate: None,
    });

    let bus = MockI2c::new();
    // A positive reading; trailing bytes are ignored at lower resolutions.
    bus.push_response(&[0x7F, 0xFF, 0xFF]);

    let device = AdcDevice::configure(&entry, Box::new(bus))?;
    let sample = device.sample_default().await?;
    println!(
        "{} ({} @ 0x{:02x}): {:.6} V",
        device.id(),
        device.spec().model,
        device.address(),
        sample.volts
    );
    Ok(())
}
