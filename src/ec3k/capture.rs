//! Capture input: sliced bit rows and their per-capture metadata.
//!
//! The FSK demodulator and pulse slicer are external; what reaches the
//! decoder is a [`Capture`] of one or more MSB-first [`BitRow`]s plus the
//! [`CaptureMeta`] the slicer measured. A [`RawFrame`] is the single-row view
//! the decoding pipeline works on.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Ec3kError;
use crate::util::bits::{bit_at, format_bit_string, pack_msb_first, parse_bit_string};
use crate::util::hex::{decode_hex, encode_hex};

/// An ordered, immutable row of sliced bits, packed MSB-first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BitRow {
    bytes: Vec<u8>,
    bit_len: usize,
}

impl BitRow {
    /// Wrap packed bytes holding `bit_len` valid bits.
    pub fn from_bytes(bytes: Vec<u8>, bit_len: usize) -> Result<Self, Ec3kError> {
        if bit_len > bytes.len() * 8 {
            return Err(Ec3kError::InvalidBitRow(format!(
                "{bit_len} bits do not fit into {} bytes",
                bytes.len()
            )));
        }
        Ok(Self { bytes, bit_len })
    }

    /// Build a row from one 0/1 value per bit.
    pub fn from_bits(bits: &[u8]) -> Self {
        Self {
            bytes: pack_msb_first(bits),
            bit_len: bits.len(),
        }
    }

    /// Parse the slicer's `{len}hex` dump format, e.g. `{12}a5f0`.
    pub fn parse_dump(input: &str) -> Result<Self, Ec3kError> {
        let rest = input
            .trim()
            .strip_prefix('{')
            .ok_or_else(|| Ec3kError::InvalidBitRow("missing '{' length prefix".into()))?;
        let (len, hex_part) = rest
            .split_once('}')
            .ok_or_else(|| Ec3kError::InvalidBitRow("missing '}' after length".into()))?;
        let bit_len: usize = len
            .trim()
            .parse()
            .map_err(|_| Ec3kError::InvalidBitRow(format!("invalid bit length '{len}'")))?;
        let bytes = if bit_len == 0 && hex_part.trim().is_empty() {
            Vec::new()
        } else {
            decode_hex(hex_part)?
        };
        Self::from_bytes(bytes, bit_len)
    }

    /// Number of valid bits in the row.
    pub fn len(&self) -> usize {
        self.bit_len
    }

    pub fn is_empty(&self) -> bool {
        self.bit_len == 0
    }

    /// Bit at `index`, or `None` past the end of the row.
    #[inline]
    pub fn get(&self, index: usize) -> Option<u8> {
        (index < self.bit_len).then(|| bit_at(&self.bytes, index))
    }

    /// Packed backing bytes (trailing pad bits are zero or slicer garbage).
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Iterate the row's bits in order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..self.bit_len).map(move |i| bit_at(&self.bytes, i))
    }

    /// Render in the slicer's `{len}hex` dump format.
    pub fn to_dump(&self) -> String {
        let used = self.bit_len.div_ceil(8);
        format!("{{{}}}{}", self.bit_len, encode_hex(&self.bytes[..used]))
    }
}

impl FromStr for BitRow {
    type Err = Ec3kError;

    /// Accepts either a `{len}hex` dump or a plain `0101…` bit string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.starts_with('{') {
            Self::parse_dump(trimmed)
        } else {
            Ok(Self::from_bits(&parse_bit_string(trimmed)?))
        }
    }
}

impl fmt::Display for BitRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bits: Vec<u8> = self.iter().collect();
        f.write_str(&format_bit_string(&bits))
    }
}

/// Per-capture measurements supplied by the demodulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureMeta {
    /// Sample rate the row was sliced at, in Hz.
    pub sample_rate_hz: u32,
    /// Estimated separation between the two FSK tones, in Hz.
    pub tone_separation_hz: i32,
}

impl CaptureMeta {
    pub fn new(sample_rate_hz: u32, tone_separation_hz: i32) -> Self {
        Self {
            sample_rate_hz,
            tone_separation_hz,
        }
    }

    /// Derive the separation from the two tone estimates.
    ///
    /// Half a hertz is added before truncating, so positive separations round
    /// to the nearest Hz.
    pub fn from_tones(sample_rate_hz: u32, freq1_hz: f32, freq2_hz: f32) -> Self {
        Self::new(sample_rate_hz, (freq2_hz - freq1_hz + 0.5) as i32)
    }
}

/// One delimited capture row plus its metadata: the unit of one decode attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    pub bits: BitRow,
    pub meta: CaptureMeta,
}

impl RawFrame {
    pub fn new(bits: BitRow, meta: CaptureMeta) -> Self {
        Self { bits, meta }
    }
}

/// Everything the slicer produced for one burst: any number of rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    pub rows: Vec<BitRow>,
    pub meta: CaptureMeta,
}

impl Capture {
    pub fn new(rows: Vec<BitRow>, meta: CaptureMeta) -> Self {
        Self { rows, meta }
    }

    /// A capture holding exactly one row.
    pub fn single(row: BitRow, meta: CaptureMeta) -> Self {
        Self::new(vec![row], meta)
    }
}

impl From<RawFrame> for Capture {
    fn from(frame: RawFrame) -> Self {
        Capture::single(frame.bits, frame.meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bits_and_get() {
        let row = BitRow::from_bits(&[1, 0, 0, 1, 1]);
        assert_eq!(row.len(), 5);
        assert_eq!(row.get(0), Some(1));
        assert_eq!(row.get(1), Some(0));
        assert_eq!(row.get(4), Some(1));
        assert_eq!(row.get(5), None);
        assert_eq!(row.to_string(), "10011");
    }

    #[test]
    fn test_from_bytes_rejects_overlong_length() {
        assert!(BitRow::from_bytes(vec![0xFF], 9).is_err());
        assert_eq!(BitRow::from_bytes(vec![0xFF], 3).unwrap().len(), 3);
    }

    #[test]
    fn test_parse_dump() {
        let row: BitRow = "{12}a5f0".parse().unwrap();
        assert_eq!(row.len(), 12);
        assert_eq!(row.to_string(), "101001011111");
        assert_eq!(row.to_dump(), "{12}a5f0");
    }

    #[test]
    fn test_parse_dump_errors() {
        assert!(BitRow::parse_dump("12}a5").is_err());
        assert!(BitRow::parse_dump("{12a5").is_err());
        assert!(BitRow::parse_dump("{x}a5").is_err());
        assert!(BitRow::parse_dump("{17}a5f0").is_err());
    }

    #[test]
    fn test_parse_bit_string_row() {
        let row: BitRow = "0110 1".parse().unwrap();
        assert_eq!(row.len(), 5);
        assert_eq!(row.iter().collect::<Vec<_>>(), vec![0, 1, 1, 0, 1]);
    }

    #[test]
    fn test_meta_from_tones_rounds() {
        let meta = CaptureMeta::from_tones(1_000_000, -30_000.0, 29_999.6);
        assert_eq!(meta.tone_separation_hz, 60_000);
        let meta = CaptureMeta::from_tones(1_000_000, 0.0, 40_000.4);
        assert_eq!(meta.tone_separation_hz, 40_000);
    }
}
