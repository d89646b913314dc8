//! Device capability registry for the supported ADC models.
//!
//! Two chip families are covered:
//!
//! - **MCP342x** (MCP3421–MCP3428): 1–4 channel delta-sigma converters with
//!   selectable 12/14/16/18 bit resolution and x1–x8 PGA. The conversion
//!   rate is fixed by the resolution (240 S/s at 12 bit down to 3.75 S/s at
//!   18 bit).
//! - **ADS101x** (ADS1013–ADS1015): 12 bit converters with a programmable
//!   data rate (128–3300 S/s) and, except for the ADS1013, a x0.25–x8 PGA.
//!
//! The registry is a construction-time immutable table: models resolve by
//! name, and every per-family decision downstream is a `match` over
//! [`Family`].

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::error::{AdcError, Result};

/// Onboard reference voltage shared by both families, in volts.
pub const REFERENCE_VOLTS: f64 = 2.048;

/// Factory-default bus address of the MCP342x family.
pub const MCP_DEFAULT_ADDRESS: u8 = 0x68;
/// Factory-default bus address of the ADS101x family.
pub const ADS_DEFAULT_ADDRESS: u8 = 0x48;

/// A set of devices sharing one configuration-register layout and command
/// protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// Microchip MCP3421–MCP3428.
    Mcp342x,
    /// Texas Instruments ADS1013–ADS1015.
    Ads101x,
}

impl Family {
    /// Supported (resolution, rate in S/s, rate code) combinations.
    ///
    /// For the MCP342x the rate code doubles as the resolution code of the
    /// configuration byte. The ADS101x converts at 12 bit only; the code is
    /// the DR field of the configuration register.
    pub(crate) fn rate_table(self) -> &'static [(Resolution, f64, u8)] {
        match self {
            Family::Mcp342x => &[
                (Resolution::Bits12, 240.0, 0),
                (Resolution::Bits14, 60.0, 1),
                (Resolution::Bits16, 15.0, 2),
                (Resolution::Bits18, 3.75, 3),
            ],
            Family::Ads101x => &[
                (Resolution::Bits12, 128.0, 0),
                (Resolution::Bits12, 250.0, 1),
                (Resolution::Bits12, 490.0, 2),
                (Resolution::Bits12, 920.0, 3),
                (Resolution::Bits12, 1600.0, 4),
                (Resolution::Bits12, 2400.0, 5),
                (Resolution::Bits12, 3300.0, 6),
            ],
        }
    }

    /// Rate code for a (resolution, rate) pair, `None` if the pair is not in
    /// the family's table.
    pub(crate) fn rate_code(self, resolution: Resolution, rate_sps: f64) -> Option<u8> {
        self.rate_table()
            .iter()
            .find(|&&(res, sps, _)| res == resolution && sps == rate_sps)
            .map(|&(_, _, code)| code)
    }

    /// Rate used when the host does not pick one explicitly.
    pub fn default_rate(self, resolution: Resolution) -> f64 {
        match self {
            Family::Mcp342x => match resolution {
                Resolution::Bits12 => 240.0,
                Resolution::Bits14 => 60.0,
                Resolution::Bits16 => 15.0,
                Resolution::Bits18 => 3.75,
            },
            Family::Ads101x => 1600.0,
        }
    }
}

/// Conversion bit width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// 12 bit conversion.
    Bits12,
    /// 14 bit conversion.
    Bits14,
    /// 16 bit conversion.
    Bits16,
    /// 18 bit conversion.
    Bits18,
}

impl Resolution {
    /// Bit width as a number.
    pub fn bits(self) -> u32 {
        match self {
            Resolution::Bits12 => 12,
            Resolution::Bits14 => 14,
            Resolution::Bits16 => 16,
            Resolution::Bits18 => 18,
        }
    }

    /// Parse a configured bit width. `None` for widths no supported device
    /// converts at.
    pub fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            12 => Some(Resolution::Bits12),
            14 => Some(Resolution::Bits14),
            16 => Some(Resolution::Bits16),
            18 => Some(Resolution::Bits18),
            _ => None,
        }
    }

    /// Resolution code of the MCP342x configuration byte (bits 3–2).
    pub(crate) fn code(self) -> u8 {
        match self {
            Resolution::Bits12 => 0b00,
            Resolution::Bits14 => 0b01,
            Resolution::Bits16 => 0b10,
            Resolution::Bits18 => 0b11,
        }
    }
}

/// PGA gain setting.
///
/// The sub-unity settings exist only on the ADS101x, where the PGA scales
/// the full-scale range rather than the signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Gain {
    G0_25,
    G0_5,
    G1,
    G2,
    G4,
    G8,
}

impl Gain {
    /// Gain as a multiplier.
    pub fn factor(self) -> f64 {
        match self {
            Gain::G0_25 => 0.25,
            Gain::G0_5 => 0.5,
            Gain::G1 => 1.0,
            Gain::G2 => 2.0,
            Gain::G4 => 4.0,
            Gain::G8 => 8.0,
        }
    }

    /// Parse a configured gain factor. All six legal factors are exactly
    /// representable, so the comparison is exact.
    pub fn from_factor(factor: f64) -> Option<Self> {
        [
            Gain::G0_25,
            Gain::G0_5,
            Gain::G1,
            Gain::G2,
            Gain::G4,
            Gain::G8,
        ]
        .into_iter()
        .find(|gain| gain.factor() == factor)
    }
}

/// A fully-resolved single-shot sampling request.
///
/// `channel` is the 0-indexed input; host-facing configuration is 1-based
/// and converted exactly once, at device construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingRequest {
    /// 0-indexed input channel.
    pub channel: u8,
    /// PGA gain.
    pub gain: Gain,
    /// Conversion bit width.
    pub resolution: Resolution,
    /// Conversion rate in samples per second.
    pub rate_sps: f64,
}

/// Immutable capability descriptor for one ADC model.
#[derive(Debug)]
pub struct ModelSpec {
    /// Canonical model name, e.g. `"MCP3421"`.
    pub model: &'static str,
    /// Protocol family.
    pub family: Family,
    /// Number of input channels (mux selections on the ADS1015).
    pub channels: u8,
    /// Resolutions the model converts at.
    pub resolutions: &'static [Resolution],
    /// PGA settings the model accepts.
    pub gains: &'static [Gain],
    /// Onboard reference voltage in volts.
    pub reference_volts: f64,
    /// Factory-default bus address.
    pub default_address: u8,
}

const MCP_RESOLUTIONS_18: &[Resolution] = &[
    Resolution::Bits12,
    Resolution::Bits14,
    Resolution::Bits16,
    Resolution::Bits18,
];
const MCP_RESOLUTIONS_16: &[Resolution] = &[
    Resolution::Bits12,
    Resolution::Bits14,
    Resolution::Bits16,
];
const ADS_RESOLUTIONS: &[Resolution] = &[Resolution::Bits12];

const MCP_GAINS: &[Gain] = &[Gain::G1, Gain::G2, Gain::G4, Gain::G8];
const ADS_GAINS: &[Gain] = &[
    Gain::G0_25,
    Gain::G0_5,
    Gain::G1,
    Gain::G2,
    Gain::G4,
    Gain::G8,
];
// The ADS1013 has no PGA; its full-scale range is pinned at x1.
const ADS_GAINS_FIXED: &[Gain] = &[Gain::G1];

const fn mcp(model: &'static str, channels: u8, resolutions: &'static [Resolution]) -> ModelSpec {
    ModelSpec {
        model,
        family: Family::Mcp342x,
        channels,
        resolutions,
        gains: MCP_GAINS,
        reference_volts: REFERENCE_VOLTS,
        default_address: MCP_DEFAULT_ADDRESS,
    }
}

const fn ads(model: &'static str, channels: u8, gains: &'static [Gain]) -> ModelSpec {
    ModelSpec {
        model,
        family: Family::Ads101x,
        channels,
        resolutions: ADS_RESOLUTIONS,
        gains,
        reference_volts: REFERENCE_VOLTS,
        default_address: ADS_DEFAULT_ADDRESS,
    }
}

/// Capability table for every supported model.
const SPECS: &[ModelSpec] = &[
    mcp("MCP3421", 1, MCP_RESOLUTIONS_18),
    mcp("MCP3422", 2, MCP_RESOLUTIONS_18),
    mcp("MCP3423", 3, MCP_RESOLUTIONS_18),
    mcp("MCP3424", 4, MCP_RESOLUTIONS_18),
    mcp("MCP3425", 1, MCP_RESOLUTIONS_16),
    mcp("MCP3426", 2, MCP_RESOLUTIONS_16),
    mcp("MCP3427", 3, MCP_RESOLUTIONS_16),
    mcp("MCP3428", 4, MCP_RESOLUTIONS_16),
    ads("ADS1013", 1, ADS_GAINS_FIXED),
    ads("ADS1014", 1, ADS_GAINS),
    ads("ADS1015", 8, ADS_GAINS),
];

static MODELS: Lazy<HashMap<&'static str, &'static ModelSpec>> =
    Lazy::new(|| SPECS.iter().map(|spec| (spec.model, spec)).collect());

/// Resolve a model name to its capability descriptor.
///
/// Lookup is case-insensitive; unknown names fail with
/// [`AdcError::UnsupportedDevice`].
pub fn lookup_model(id: &str) -> Result<&'static ModelSpec> {
    let key = id.trim().to_ascii_uppercase();
    MODELS
        .get(key.as_str())
        .copied()
        .ok_or_else(|| AdcError::UnsupportedDevice(id.to_string()))
}

/// Validate a request against a model descriptor.
///
/// Pure function of descriptor and request; checks run in a fixed order
/// (channel bound, resolution membership, gain membership, rate/resolution
/// consistency) and nothing touches the bus on failure.
pub fn validate_request(spec: &ModelSpec, request: &SamplingRequest) -> Result<()> {
    if request.channel >= spec.channels {
        return Err(AdcError::InvalidChannel {
            channel: request.channel,
            channel_count: spec.channels,
        });
    }
    if !spec.resolutions.contains(&request.resolution) {
        return Err(AdcError::ResolutionUnsupportedByFamily {
            model: spec.model,
            bits: request.resolution.bits(),
        });
    }
    if !spec.gains.contains(&request.gain) {
        return Err(AdcError::InvalidGain(request.gain.factor()));
    }
    if spec.family.rate_code(request.resolution, request.rate_sps).is_none() {
        return Err(AdcError::InvalidRate {
            rate: request.rate_sps,
            bits: request.resolution.bits(),
        });
    }
    Ok(())
}
