//! EC3K frame check sequence.
//!
//! Byte-wise feedback update seeded with `0xFFFF` and inverted at the end.
//! Implemented exactly as the transmitter computes it, one byte at a time.

use crate::constants::{CRC_INIT, CRC_XOR_OUT};

/// Fold one byte into the running CRC accumulator.
#[inline]
pub fn crc_update(crc: u16, byte: u8) -> u16 {
    let mut c = byte ^ (crc & 0xFF) as u8;
    c ^= c << 4;
    let c = c as u16;
    ((c << 8) | (crc >> 8)) ^ (c >> 4) ^ (c << 3)
}

/// CRC of `buf`: seed, fold every byte, final XOR.
pub fn calc_ec3k_crc(buf: &[u8]) -> u16 {
    buf.iter().fold(CRC_INIT, |crc, &byte| crc_update(crc, byte)) ^ CRC_XOR_OUT
}
