//! Cheap pre-checks before any bit-level work, and the acceptance policy
//! applied to decoded frames.

use thiserror::Error;

use crate::ec3k::capture::CaptureMeta;
use crate::ec3k::config::DecoderConfig;
use crate::ec3k::fields::DecodedFields;

/// Why a capture was judged "not this protocol" before decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PreconditionFailure {
    #[error("expected exactly one row, got {0}")]
    RowCount(usize),

    #[error("bit_per_row {bits} out of range [{min}, {max}]")]
    BitCount { bits: usize, min: u64, max: u64 },

    #[error("frequency shift {hz} out of range [{min}, {max}]")]
    ToneSeparation { hz: i32, min: i32, max: i32 },
}

/// Why a complete frame was dropped as corrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    #[error("padding group {group} is {value:#x}, expected zero")]
    Padding { group: usize, value: u64 },

    #[error("CRC mismatch: received {received:04X}, computed {computed:04X}")]
    Crc { received: u16, computed: u16 },
}

/// Row length and tone separation gate.
pub fn check_preconditions(
    bit_len: usize,
    meta: &CaptureMeta,
    config: &DecoderConfig,
) -> Result<(), PreconditionFailure> {
    let (min, max) = config.bit_bounds(meta.sample_rate_hz);
    let bits = bit_len as u64;
    if bits < min || bits > max {
        return Err(PreconditionFailure::BitCount {
            bits: bit_len,
            min,
            max,
        });
    }

    let hz = meta.tone_separation_hz;
    if hz < config.min_tone_separation_hz || hz > config.max_tone_separation_hz {
        return Err(PreconditionFailure::ToneSeparation {
            hz,
            min: config.min_tone_separation_hz,
            max: config.max_tone_separation_hz,
        });
    }
    Ok(())
}

/// A frame is accepted only with all padding groups zero and a matching CRC.
pub fn validate_fields(fields: &DecodedFields) -> Result<(), ValidationFailure> {
    if let Some((group, &value)) = fields.padding.iter().enumerate().find(|(_, &v)| v != 0) {
        return Err(ValidationFailure::Padding {
            group: group + 1,
            value,
        });
    }
    if !fields.crc_matches() {
        return Err(ValidationFailure::Crc {
            received: fields.crc_received,
            computed: fields.crc_computed,
        });
    }
    Ok(())
}
