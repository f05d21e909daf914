//! # Bit Manipulation Utilities
//!
//! The slicer hands rows over MSB-first: bit `i` of a row lives in bit
//! `7 - (i % 8)` of byte `i / 8`. The data-link layer on the other hand
//! assembles bytes LSB-first (the first received bit ends up as bit 0).
//! These helpers keep both orders in one place.
//!
//! ```rust
//! use ec3k_rs::util::bits::{bit_at, lsb_first_bits, pack_msb_first};
//!
//! let packed = pack_msb_first(&[1, 0, 1, 1]);
//! assert_eq!(packed, vec![0b1011_0000]);
//! assert_eq!(bit_at(&packed, 2), 1);
//!
//! let bits: Vec<u8> = lsb_first_bits(0x7E).collect();
//! assert_eq!(bits, vec![0, 1, 1, 1, 1, 1, 1, 0]);
//! ```

use crate::error::Ec3kError;

/// Read bit `bit` of an MSB-first packed byte slice.
///
/// The caller guarantees `bit / 8 < bytes.len()`.
#[inline]
pub fn bit_at(bytes: &[u8], bit: usize) -> u8 {
    (bytes[bit >> 3] >> (7 - (bit & 7))) & 1
}

/// Pack a slice of 0/1 values MSB-first, zero-padding the last byte.
pub fn pack_msb_first(bits: &[u8]) -> Vec<u8> {
    let mut packed = vec![0u8; bits.len().div_ceil(8)];
    for (i, &bit) in bits.iter().enumerate() {
        if bit & 1 == 1 {
            packed[i >> 3] |= 0x80 >> (i & 7);
        }
    }
    packed
}

/// Iterate the bits of a byte least-significant first, in transmit order.
pub fn lsb_first_bits(byte: u8) -> impl Iterator<Item = u8> {
    (0..8).map(move |i| (byte >> i) & 1)
}

/// Parse a string of `0`/`1` characters. Whitespace, `_` and `-` are ignored.
pub fn parse_bit_string(input: &str) -> Result<Vec<u8>, Ec3kError> {
    input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .map(|c| match c {
            '0' => Ok(0),
            '1' => Ok(1),
            other => Err(Ec3kError::InvalidBitRow(format!(
                "unexpected character '{other}' in bit string"
            ))),
        })
        .collect()
}

/// Render 0/1 values as a compact bit string.
pub fn format_bit_string(bits: &[u8]) -> String {
    bits.iter()
        .map(|&b| if b & 1 == 1 { '1' } else { '0' })
        .collect()
}
