//! Raw conversion-result decoding.
//!
//! Both families return the result MSB first, but align it differently:
//! the MCP342x sign-extends the value into the unused upper bits, the
//! ADS101x left-aligns it and pads the low nibble with zeros. Either way
//! exactly `resolution` bits are significant; the rest are discarded before
//! two's-complement correction and LSB scaling.

use crate::command::response_len;
use crate::error::{AdcError, Result};
use crate::model::{Family, Gain, Resolution};

/// Decode a conversion result into volts.
///
/// `bytes` is the raw register read (extra trailing bytes are ignored);
/// fails with [`AdcError::MalformedResponse`] when fewer bytes arrive than
/// the resolution requires.
pub fn decode_voltage(
    family: Family,
    bytes: &[u8],
    resolution: Resolution,
    gain: Gain,
    reference_volts: f64,
) -> Result<f64> {
    let need = response_len(family, resolution);
    if bytes.len() < need {
        return Err(AdcError::MalformedResponse {
            got: bytes.len(),
            need,
        });
    }

    let word = bytes[..need]
        .iter()
        .fold(0i64, |acc, &b| (acc << 8) | i64::from(b));

    let bits = resolution.bits();
    let full_scale = 1i64 << bits;
    let value = match family {
        Family::Mcp342x => word & (full_scale - 1),
        Family::Ads101x => word >> (need as u32 * 8 - bits),
    };

    // Two's complement: the top bit of the field is the sign.
    let value = if value > full_scale / 2 - 1 {
        value - full_scale
    } else {
        value
    };

    let lsb = (2.0 * reference_volts) / full_scale as f64;
    Ok(value as f64 * lsb / gain.factor())
}
