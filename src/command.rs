//! Configuration-command encoding for both ADC families.
//!
//! Register layouts:
//!
//! MCP342x — single configuration byte:
//!
//! ```text
//! bit 7    : start one-shot conversion
//! bits 6–5 : channel select
//! bit 4    : mode (0 = one-shot, 1 = continuous; always one-shot here)
//! bits 3–2 : resolution (00=12, 01=14, 10=16, 11=18 bit)
//! bits 1–0 : gain (00=x1, 01=x2, 10=x4, 11=x8)
//! ```
//!
//! ADS101x — pointer byte selecting the 16 bit config register, then the
//! register value MSB first:
//!
//! ```text
//! MSB: OS | MUX[2:0] | PGA[2:0] | MODE      (OS=1 start, MODE=1 one-shot)
//! LSB: DR[2:0] | COMP_MODE | COMP_POL | COMP_LAT | COMP_QUE[1:0]
//! ```
//!
//! The comparator is unused, so the LSB always carries the disabled pattern
//! in its low bits. Encoding is a pure transform of an already-validated
//! request; nothing here re-checks capabilities or touches the bus.

use crate::model::{Family, Gain, ModelSpec, Resolution, SamplingRequest};

/// Start-conversion bit of the MCP342x configuration byte.
const MCP_START: u8 = 0x80;
/// OS (start) bit of the ADS101x configuration MSB.
const ADS_START: u8 = 0x80;
/// Single-shot MODE bit of the ADS101x configuration MSB.
const ADS_MODE_SINGLE: u8 = 0x01;
/// Comparator-disable pattern (COMP_QUE = 11) of the ADS101x LSB.
const ADS_COMP_DISABLE: u8 = 0b0000_0011;
/// ADS101x conversion-result register pointer.
const ADS_REG_CONVERSION: u8 = 0x00;
/// ADS101x configuration register pointer.
const ADS_REG_CONFIG: u8 = 0x01;
/// DR code for the ADS101x power-on default of 1600 S/s. Unreachable
/// fallback: requests are validated before encoding.
const ADS_RATE_FALLBACK: u8 = 0b100;

/// An encoded one-shot conversion command plus its read-phase parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigCommand {
    /// Bytes written to start the conversion.
    pub bytes: Vec<u8>,
    /// Register pointer written before reading the result (empty when the
    /// device needs none).
    pub result_pointer: Vec<u8>,
    /// Number of bytes the conversion result occupies.
    pub response_len: usize,
}

/// Number of bytes a conversion result occupies on the wire.
///
/// The 18 bit MCP342x result spills into a third byte; everything else fits
/// in two.
pub(crate) fn response_len(family: Family, resolution: Resolution) -> usize {
    match family {
        Family::Mcp342x if resolution == Resolution::Bits18 => 3,
        Family::Mcp342x | Family::Ads101x => 2,
    }
}

/// Encode a validated request into the device's configuration bytes.
pub fn encode_config(spec: &ModelSpec, request: &SamplingRequest) -> ConfigCommand {
    match spec.family {
        Family::Mcp342x => {
            let config = MCP_START
                | (request.channel << 5)
                | (request.resolution.code() << 2)
                | mcp_gain_code(request.gain);
            ConfigCommand {
                bytes: vec![config],
                result_pointer: Vec::new(),
                response_len: response_len(spec.family, request.resolution),
            }
        }
        Family::Ads101x => {
            let rate_code = spec
                .family
                .rate_code(request.resolution, request.rate_sps)
                .unwrap_or(ADS_RATE_FALLBACK);
            let msb = ADS_START
                | (request.channel << 4)
                | (ads_gain_code(request.gain) << 1)
                | ADS_MODE_SINGLE;
            let lsb = (rate_code << 5) | ADS_COMP_DISABLE;
            ConfigCommand {
                bytes: vec![ADS_REG_CONFIG, msb, lsb],
                result_pointer: vec![ADS_REG_CONVERSION],
                response_len: response_len(spec.family, request.resolution),
            }
        }
    }
}

/// MCP342x gain field. Sub-unity settings never validate for this family
/// and map to the power-on default.
fn mcp_gain_code(gain: Gain) -> u8 {
    match gain {
        Gain::G0_25 | Gain::G0_5 | Gain::G1 => 0b00,
        Gain::G2 => 0b01,
        Gain::G4 => 0b10,
        Gain::G8 => 0b11,
    }
}

/// ADS101x PGA field.
fn ads_gain_code(gain: Gain) -> u8 {
    match gain {
        Gain::G0_25 => 0b000,
        Gain::G0_5 => 0b001,
        Gain::G1 => 0b010,
        Gain::G2 => 0b011,
        Gain::G4 => 0b100,
        Gain::G8 => 0b101,
    }
}
