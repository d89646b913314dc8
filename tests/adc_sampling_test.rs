//! End-to-end sampling tests over the mock bus adapter.
//!
//! These run under a paused tokio clock, so the conversion waits (up to
//! 267 ms at 18 bit) complete instantly while remaining observable.

use std::sync::Arc;
use std::time::Duration;

use daq_driver_i2c_adc::{
    AdcDevice, AdcError, DeviceEntry, Gain, MockI2c, MockOp, Resolution, SampleOverrides,
};

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

fn device(entry: &DeviceEntry, bus: &MockI2c) -> AdcDevice {
    AdcDevice::configure(entry, Box::new(bus.clone())).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_mcp_full_scale_positive() {
    let bus = MockI2c::new();
    bus.push_response(&[0x7F, 0xFF]);

    let mut cfg = entry("MCP3425");
    cfg.resolution = 16;
    let device = device(&cfg, &bus);

    let sample = device.sample_default().await.unwrap();
    assert!((sample.volts - 32767.0 * 4.096 / 65536.0).abs() < 1e-9);

    // Exactly one start command on the wire, then one pointerless read.
    assert_eq!(bus.writes(), vec![(0x68, vec![0x88])]);
    assert_eq!(bus.reads(), vec![(0x68, vec![], 2)]);
}

#[tokio::test(start_paused = true)]
async fn test_mcp_negative_full_scale() {
    let bus = MockI2c::new();
    bus.push_response(&[0x80, 0x00]);

    let mut cfg = entry("MCP3425");
    cfg.resolution = 16;
    let device = device(&cfg, &bus);

    let sample = device.sample_default().await.unwrap();
    assert!((sample.volts + 2.048).abs() < 1e-9);
}

#[tokio::test(start_paused = true)]
async fn test_mcp_18_bit_reads_three_bytes() {
    let bus = MockI2c::new();
    bus.push_response(&[0x01, 0xFF, 0xFF]);

    let device = device(&entry("MCP3421"), &bus);
    let started = tokio::time::Instant::now();
    let sample = device
        .sample(SampleOverrides {
            resolution: Resolution::from_bits(18),
            ..Default::default()
        })
        .await
        .unwrap();

    assert!((sample.volts - 131071.0 * 4.096 / 262144.0).abs() < 1e-9);
    assert_eq!(bus.writes(), vec![(0x68, vec![0x8C])]);
    assert_eq!(bus.reads(), vec![(0x68, vec![], 3)]);
    // The scheduler waited out the full 18 bit conversion period.
    assert!(started.elapsed() >= Duration::from_secs_f64(1.0 / 3.75));
}

#[tokio::test(start_paused = true)]
async fn test_ads_pointer_sequencing() {
    let bus = MockI2c::new();
    bus.push_response(&[0x80, 0x00]);

    let mut cfg = entry("ADS1015");
    cfg.channel = 5; // user-facing, maps to mux code 4
    cfg.gain = 2.0;
    let device = device(&cfg, &bus);

    let sample = device.sample_default().await.unwrap();
    assert!((sample.volts + 2.048 / 2.0).abs() < 1e-9);

    // Config write at the ADS default address, then a pointer-selected read
    // of the conversion register.
    assert_eq!(bus.writes(), vec![(0x48, vec![0x01, 0b1100_0111, 0b1000_0011])]);
    assert_eq!(bus.reads(), vec![(0x48, vec![0x00], 2)]);
}

#[tokio::test(start_paused = true)]
async fn test_invalid_channel_triggers_no_bus_traffic() {
    let bus = MockI2c::new();
    let device = device(&entry("MCP3424"), &bus);

    let err = device
        .sample(SampleOverrides {
            channel: Some(5),
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AdcError::InvalidChannel {
            channel: 5,
            channel_count: 4
        }
    ));
    assert!(bus.ops().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_invalid_rate_triggers_no_bus_traffic() {
    let bus = MockI2c::new();
    let device = device(&entry("ADS1014"), &bus);

    let err = device
        .sample(SampleOverrides {
            rate_sps: Some(1000.0),
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert!(matches!(err, AdcError::InvalidRate { .. }));
    assert!(bus.ops().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_write_failure_aborts_without_wait_or_read() {
    let bus = MockI2c::new();
    bus.fail_writes();

    let device = device(&entry("MCP3421"), &bus);
    let started = tokio::time::Instant::now();
    let err = device.sample_default().await.unwrap_err();

    assert!(matches!(err, AdcError::Bus(_)));
    assert!(bus.reads().is_empty());
    // The paused clock never advanced: no conversion wait happened.
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_read_failure_surfaces_unmodified() {
    let bus = MockI2c::new();
    bus.fail_reads();

    let device = device(&entry("MCP3421"), &bus);
    let err = device.sample_default().await.unwrap_err();

    assert!(matches!(err, AdcError::Bus(_)));
    assert_eq!(bus.writes().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_short_response_is_malformed() {
    let bus = MockI2c::new();
    bus.push_response(&[0x7F]);

    let mut cfg = entry("MCP3425");
    cfg.resolution = 16;
    let device = device(&cfg, &bus);

    let err = device.sample_default().await.unwrap_err();
    assert!(matches!(
        err,
        AdcError::MalformedResponse { got: 1, need: 2 }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_overrides_leave_defaults_untouched() {
    let bus = MockI2c::new();
    bus.push_response(&[0x00, 0x00]);
    bus.push_response(&[0x00, 0x00]);

    let device = device(&entry("MCP3424"), &bus);
    let defaults = device.defaults();

    device
        .sample(SampleOverrides {
            channel: Some(3),
            gain: Some(Gain::G8),
            ..Default::default()
        })
        .await
        .unwrap();
    device.sample_default().await.unwrap();

    assert_eq!(device.defaults(), defaults);

    let writes = bus.writes();
    // First write carries channel 3 and gain x8, the second the defaults.
    assert_eq!(writes[0].1, vec![0x80 | (3 << 5) | 0b11]);
    assert_eq!(writes[1].1, vec![0x80]);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_samples_serialize() {
    let bus = MockI2c::new();
    bus.push_response(&[0x10, 0x00]);
    bus.push_response(&[0x20, 0x00]);

    let device = Arc::new(device(&entry("MCP3421"), &bus));
    let first = device.clone();
    let second = device.clone();

    let (a, b) = tokio::join!(first.sample_default(), second.sample_default());
    a.unwrap();
    b.unwrap();

    // One conversion register: write/read pairs never interleave.
    let ops = bus.ops();
    assert_eq!(ops.len(), 4);
    assert!(matches!(ops[0], MockOp::Write(..)));
    assert!(matches!(ops[1], MockOp::Read(..)));
    assert!(matches!(ops[2], MockOp::Write(..)));
    assert!(matches!(ops[3], MockOp::Read(..)));
}

#[tokio::test(start_paused = true)]
async fn test_config_file_to_sample() {
    use std::io::Write;

    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .unwrap();
    file.write_all(
        br#"
        [[devices]]
        id = "bed_adc"
        sensor_id = "mcp3426"
        resolution = 14
        channel = 2
        "#,
    )
    .unwrap();

    let config = daq_driver_i2c_adc::AdcConfig::from_file(file.path()).unwrap();
    let entry = config.device("bed_adc").unwrap();

    let bus = MockI2c::new();
    bus.push_response(&[0x1F, 0xFF]);
    let device = AdcDevice::configure(entry, Box::new(bus.clone())).unwrap();

    let sample = device.sample_default().await.unwrap();
    // 0x1FFF = 8191, the largest positive 14 bit code.
    assert!((sample.volts - 8191.0 * 4.096 / 16384.0).abs() < 1e-9);
    // Channel 2 (user-facing) is channel index 1; 14 bit is code 01.
    assert_eq!(bus.writes(), vec![(0x68, vec![0x80 | (1 << 5) | (1 << 2)])]);
}
