//! Decoder configuration.
//!
//! Defaults reproduce the protocol constants; a JSON file can override any
//! subset of them:
//!
//! ```rust
//! use ec3k_rs::ec3k::DecoderConfig;
//!
//! let config = DecoderConfig::from_json_str(r#"{ "max_tone_separation_hz": 90000 }"#).unwrap();
//! assert_eq!(config.max_tone_separation_hz, 90_000);
//! assert_eq!(config.min_bits, 90);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    EC3K_FRAME_LEN, MAX_ROW_BITS, MAX_TONE_SEPARATION_HZ, MIN_ROW_BITS, MIN_TONE_SEPARATION_HZ,
    REFERENCE_SAMPLE_RATE, SCRAMBLER_TAP_LONG, SYMBOL_CAPACITY,
};
use crate::ec3k::framer::FlagPolicy;
use crate::error::Ec3kError;

/// Smallest symbol buffer that can hold scrambler history plus one framed frame.
pub const MIN_SYMBOL_CAPACITY: usize = SCRAMBLER_TAP_LONG + (EC3K_FRAME_LEN + 2) * 8;

/// Tunable bounds and policies of the decoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Sample rate `min_bits`/`max_bits` are expressed at.
    pub reference_sample_rate: u32,
    /// Shortest accepted row at the reference rate.
    pub min_bits: u32,
    /// Longest accepted row at the reference rate.
    pub max_bits: u32,
    pub min_tone_separation_hz: i32,
    pub max_tone_separation_hz: i32,
    /// Capacity of the symbol scratch buffer.
    pub symbol_capacity: usize,
    pub flag_policy: FlagPolicy,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            reference_sample_rate: REFERENCE_SAMPLE_RATE,
            min_bits: MIN_ROW_BITS,
            max_bits: MAX_ROW_BITS,
            min_tone_separation_hz: MIN_TONE_SEPARATION_HZ,
            max_tone_separation_hz: MAX_TONE_SEPARATION_HZ,
            symbol_capacity: SYMBOL_CAPACITY,
            flag_policy: FlagPolicy::default(),
        }
    }
}

impl DecoderConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, Ec3kError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, Ec3kError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        log::debug!("Loading decoder configuration from {}", path.display());
        Self::from_json_str(&contents)
    }

    pub fn to_json_pretty(&self) -> Result<String, Ec3kError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), Ec3kError> {
        if self.reference_sample_rate == 0 {
            return Err(Ec3kError::InvalidConfig(
                "reference_sample_rate must be non-zero".into(),
            ));
        }
        if self.min_bits > self.max_bits {
            return Err(Ec3kError::InvalidConfig(format!(
                "min_bits {} exceeds max_bits {}",
                self.min_bits, self.max_bits
            )));
        }
        if self.min_tone_separation_hz > self.max_tone_separation_hz {
            return Err(Ec3kError::InvalidConfig(format!(
                "min_tone_separation_hz {} exceeds max_tone_separation_hz {}",
                self.min_tone_separation_hz, self.max_tone_separation_hz
            )));
        }
        if self.symbol_capacity < MIN_SYMBOL_CAPACITY {
            return Err(Ec3kError::InvalidConfig(format!(
                "symbol_capacity {} cannot hold a frame (minimum {MIN_SYMBOL_CAPACITY})",
                self.symbol_capacity
            )));
        }
        Ok(())
    }

    /// Accepted row length range at `sample_rate`, inclusive.
    pub fn bit_bounds(&self, sample_rate: u32) -> (u64, u64) {
        let scale = |bits: u32| {
            u64::from(bits) * u64::from(sample_rate) / u64::from(self.reference_sample_rate.max(1))
        };
        (scale(self.min_bits), scale(self.max_bits))
    }
}
