//! Device aggregate and the one-shot conversion scheduler.
//!
//! Protocol overview (both families):
//!
//! 1. Write the configuration bytes that start a one-shot conversion.
//! 2. Suspend for the conversion time of the selected rate. The wait is a
//!    cooperative timer, never a busy loop; it is the only suspension point
//!    in the driver.
//! 3. Read the result register (the ADS101x needs a pointer write first)
//!    and decode it into volts.
//!
//! The bus handle is locked for the whole transaction, so requests against
//! one device execute strictly one at a time while other devices on the
//! bus proceed freely.
//!
//! # Example Usage
//!
//! ```no_run
//! use daq_driver_i2c_adc::{AdcDevice, DeviceEntry, MockI2c, SampleOverrides};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let entry = DeviceEntry {
//!         id: "adc0".to_string(),
//!         sensor_id: "MCP3424".to_string(),
//!         i2c_address: None,
//!         resolution: 16,
//!         gain: 1.0,
//!         channel: 1,
//!         rate: None,
//!     };
//!     let device = AdcDevice::configure(&entry, Box::new(MockI2c::new()))?;
//!
//!     // One reading with the stored defaults.
//!     let sample = device.sample_default().await?;
//!     println!("{:.6} V", sample.volts);
//!
//!     // One 18 bit reading on channel 2, defaults untouched.
//!     let overrides = SampleOverrides {
//!         channel: Some(2),
//!         resolution: daq_driver_i2c_adc::Resolution::from_bits(18),
//!         ..Default::default()
//!     };
//!     let sample = device.sample(overrides).await?;
//!     println!("{:.6} V", sample.volts);
//!     Ok(())
//! }
//! ```

use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::adapters::I2cAdapter;
use crate::command::encode_config;
use crate::config::{ConfigError, DeviceEntry};
use crate::decode::decode_voltage;
use crate::error::{AdcError, Result};
use crate::model::{self, Family, Gain, ModelSpec, Resolution, SamplingRequest};

/// Headroom over the nominal ADS101x conversion period.
const ADS_RATE_MARGIN: f64 = 1.05;

/// One calibrated measurement.
#[derive(Debug, Clone, Copy)]
pub struct VoltageSample {
    /// Measured voltage.
    pub volts: f64,
    /// Transport timestamp of the result read (monotonic).
    pub received_at: Instant,
}

/// Per-call overrides applied on top of the device defaults.
///
/// `channel` is the 0-indexed internal numbering, like
/// [`SamplingRequest::channel`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleOverrides {
    /// Input channel for this call only.
    pub channel: Option<u8>,
    /// PGA gain for this call only.
    pub gain: Option<Gain>,
    /// Resolution for this call only.
    pub resolution: Option<Resolution>,
    /// Rate for this call only.
    pub rate_sps: Option<f64>,
}

/// One configured ADC on the bus.
pub struct AdcDevice {
    id: String,
    spec: &'static ModelSpec,
    address: u8,
    /// Bus handle protected by a mutex held across the whole
    /// write → wait → read transaction.
    bus: Mutex<Box<dyn I2cAdapter>>,
    defaults: SamplingRequest,
}

impl AdcDevice {
    /// Build a device from a configuration entry.
    ///
    /// Construction-time only: resolves the model, converts the 1-based
    /// user-facing channel to the internal 0-based index and validates the
    /// resulting default request before the device exists.
    pub fn configure(
        entry: &DeviceEntry,
        bus: Box<dyn I2cAdapter>,
    ) -> std::result::Result<Self, ConfigError> {
        let spec = model::lookup_model(&entry.sensor_id)?;
        let resolution = Resolution::from_bits(entry.resolution)
            .ok_or(AdcError::InvalidResolution(entry.resolution))?;
        let gain = Gain::from_factor(entry.gain).ok_or(AdcError::InvalidGain(entry.gain))?;
        if entry.channel == 0 {
            return Err(ConfigError::Validation(format!(
                "device '{}': channel numbering starts at 1",
                entry.id
            )));
        }
        let defaults = SamplingRequest {
            channel: entry.channel - 1,
            gain,
            resolution,
            rate_sps: entry
                .rate
                .unwrap_or_else(|| spec.family.default_rate(resolution)),
        };
        let address = entry.i2c_address.unwrap_or(spec.default_address);
        Ok(Self::new(entry.id.clone(), spec, address, defaults, bus)?)
    }

    /// Create a device directly from its parts. The default request is
    /// validated against the model before the device exists.
    pub fn new(
        id: String,
        spec: &'static ModelSpec,
        address: u8,
        defaults: SamplingRequest,
        bus: Box<dyn I2cAdapter>,
    ) -> Result<Self> {
        model::validate_request(spec, &defaults)?;
        info!(
            device = %id,
            model = spec.model,
            address,
            "configured I2C ADC"
        );
        Ok(Self {
            id,
            spec,
            address,
            bus: Mutex::new(bus),
            defaults,
        })
    }

    /// Device identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Capability descriptor of the underlying model.
    pub fn spec(&self) -> &'static ModelSpec {
        self.spec
    }

    /// Bus address.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// The stored idle profile used by [`AdcDevice::sample_default`].
    pub fn defaults(&self) -> SamplingRequest {
        self.defaults
    }

    /// Replace the stored idle profile.
    ///
    /// Takes `&mut self`, so reconfiguration cannot race an in-flight
    /// sample.
    pub fn set_defaults(&mut self, defaults: SamplingRequest) -> Result<()> {
        model::validate_request(self.spec, &defaults)?;
        self.defaults = defaults;
        Ok(())
    }

    /// Perform one one-shot conversion and return the calibrated sample.
    ///
    /// The request is validated before any bus traffic; a validation error
    /// therefore leaves the device untouched. A bus failure aborts the
    /// remaining phases and is surfaced unmodified — the driver never
    /// retries.
    pub async fn sample(&self, overrides: SampleOverrides) -> Result<VoltageSample> {
        let request = self.resolve(overrides);
        model::validate_request(self.spec, &request)?;

        let command = encode_config(self.spec, &request);
        let delay = conversion_delay(self.spec.family, request.rate_sps);

        let mut bus = self.bus.lock().await;
        debug!(
            device = %self.id,
            channel = request.channel,
            bits = request.resolution.bits(),
            rate = request.rate_sps,
            "starting one-shot conversion"
        );
        bus.write_raw(self.address, &command.bytes).await?;
        tokio::time::sleep(delay).await;
        let reading = bus
            .read_raw(self.address, &command.result_pointer, command.response_len)
            .await?;
        drop(bus);

        let volts = decode_voltage(
            self.spec.family,
            &reading.bytes,
            request.resolution,
            request.gain,
            self.spec.reference_volts,
        )?;
        debug!(device = %self.id, volts, "conversion complete");
        Ok(VoltageSample {
            volts,
            received_at: reading.received_at,
        })
    }

    /// Perform one conversion with the stored defaults.
    pub async fn sample_default(&self) -> Result<VoltageSample> {
        self.sample(SampleOverrides::default()).await
    }

    /// Merge per-call overrides onto the stored defaults.
    fn resolve(&self, overrides: SampleOverrides) -> SamplingRequest {
        let resolution = overrides.resolution.unwrap_or(self.defaults.resolution);
        let rate_sps = match overrides.rate_sps {
            Some(rate) => rate,
            // A resolution override retires the stored rate: each MCP342x
            // bit width converts at its own fixed rate.
            None if resolution != self.defaults.resolution => {
                self.spec.family.default_rate(resolution)
            }
            None => self.defaults.rate_sps,
        };
        SamplingRequest {
            channel: overrides.channel.unwrap_or(self.defaults.channel),
            gain: overrides.gain.unwrap_or(self.defaults.gain),
            resolution,
            rate_sps,
        }
    }
}

/// Time to let a one-shot conversion finish before reading the result.
///
/// The MCP342x converts in exactly one nominal period; the ADS101x gets 5%
/// headroom over its nominal period.
pub(crate) fn conversion_delay(family: Family, rate_sps: f64) -> Duration {
    let seconds = match family {
        Family::Mcp342x => 1.0 / rate_sps,
        Family::Ads101x => ADS_RATE_MARGIN / rate_sps,
    };
    Duration::from_secs_f64(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MockI2c;

    fn entry(sensor_id: &str) -> DeviceEntry {
        DeviceEntry {
            id: "adc0".to_string(),
            sensor_id: sensor_id.to_string(),
            i2c_address: None,
            resolution: 12,
            gain: 1.0,
            channel: 1,
            rate: None,
        }
    }

    #[test]
    fn test_conversion_delay() {
        let delay = conversion_delay(Family::Mcp342x, 240.0);
        assert!((delay.as_secs_f64() - 1.0 / 240.0).abs() < 1e-12);

        // 18 bit conversions take 64x longer than 12 bit ones.
        let slow = conversion_delay(Family::Mcp342x, 3.75);
        assert!((slow.as_secs_f64() - 0.266_666_666).abs() < 1e-6);

        let ads = conversion_delay(Family::Ads101x, 1600.0);
        assert!((ads.as_secs_f64() - 1.05 / 1600.0).abs() < 1e-12);
    }

    #[test]
    fn test_configure_applies_model_defaults() {
        let device = AdcDevice::configure(&entry("mcp3421"), Box::new(MockI2c::new())).unwrap();
        assert_eq!(device.address(), 0x68);
        assert_eq!(device.spec().model, "MCP3421");
        // User-facing channel 1 is internal channel 0.
        assert_eq!(device.defaults().channel, 0);
        assert_eq!(device.defaults().rate_sps, 240.0);
    }

    #[test]
    fn test_configure_rejects_channel_zero() {
        let mut bad = entry("MCP3421");
        bad.channel = 0;
        assert!(matches!(
            AdcDevice::configure(&bad, Box::new(MockI2c::new())),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_configure_rejects_unknown_model() {
        assert!(matches!(
            AdcDevice::configure(&entry("MCP9999"), Box::new(MockI2c::new())),
            Err(ConfigError::InvalidDevice(AdcError::UnsupportedDevice(_)))
        ));
    }

    #[test]
    fn test_configure_rejects_out_of_range_defaults() {
        let mut bad = entry("MCP3422");
        bad.channel = 3; // two-channel device
        assert!(matches!(
            AdcDevice::configure(&bad, Box::new(MockI2c::new())),
            Err(ConfigError::InvalidDevice(AdcError::InvalidChannel { .. }))
        ));

        let mut bad = entry("ADS1015");
        bad.resolution = 16;
        assert!(matches!(
            AdcDevice::configure(&bad, Box::new(MockI2c::new())),
            Err(ConfigError::InvalidDevice(
                AdcError::ResolutionUnsupportedByFamily { .. }
            ))
        ));
    }

    #[test]
    fn test_resolve_merges_overrides() {
        let device = AdcDevice::configure(&entry("MCP3424"), Box::new(MockI2c::new())).unwrap();

        let resolved = device.resolve(SampleOverrides::default());
        assert_eq!(resolved, device.defaults());

        let resolved = device.resolve(SampleOverrides {
            channel: Some(2),
            gain: Some(Gain::G4),
            ..Default::default()
        });
        assert_eq!(resolved.channel, 2);
        assert_eq!(resolved.gain, Gain::G4);
        assert_eq!(resolved.resolution, device.defaults().resolution);
    }

    #[test]
    fn test_resolve_recomputes_rate_on_resolution_override() {
        let device = AdcDevice::configure(&entry("MCP3424"), Box::new(MockI2c::new())).unwrap();
        let resolved = device.resolve(SampleOverrides {
            resolution: Some(Resolution::Bits18),
            ..Default::default()
        });
        assert_eq!(resolved.rate_sps, 3.75);

        // An explicit rate override wins.
        let resolved = device.resolve(SampleOverrides {
            resolution: Some(Resolution::Bits18),
            rate_sps: Some(240.0),
            ..Default::default()
        });
        assert_eq!(resolved.rate_sps, 240.0);
    }

    #[test]
    fn test_set_defaults_validates() {
        let mut device =
            AdcDevice::configure(&entry("MCP3421"), Box::new(MockI2c::new())).unwrap();

        let mut new_defaults = device.defaults();
        new_defaults.channel = 1; // single-channel device
        assert!(device.set_defaults(new_defaults).is_err());

        let mut new_defaults = device.defaults();
        new_defaults.resolution = Resolution::Bits18;
        new_defaults.rate_sps = 3.75;
        device.set_defaults(new_defaults).unwrap();
        assert_eq!(device.defaults().resolution, Resolution::Bits18);
    }
}
