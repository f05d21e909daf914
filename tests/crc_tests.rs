//! Tests for the EC3K CRC
//!
//! The checksum is the reflected CCITT polynomial with 0xFFFF seed and final
//! inversion, so it is cross-checked against the `crc` crate's CRC-16/IBM-SDLC.

use crc::{Crc, CRC_16_IBM_SDLC};
use ec3k_rs::ec3k::{calc_ec3k_crc, crc_update, DecodedFields, FrameBuilder};
use proptest::prelude::*;

const SDLC: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_SDLC);

#[test]
fn test_crc_golden_vectors() {
    assert_eq!(calc_ec3k_crc(b""), 0x0000);
    assert_eq!(calc_ec3k_crc(b"123456789"), 0x906E);
    assert_eq!(calc_ec3k_crc(&[0x00]), 0xF078);
}

#[test]
fn test_crc_matches_reference_on_frames() {
    for id in [0u16, 1, 0x1234, 0xFFFF] {
        let frame = FrameBuilder::new(id)
            .power_raw(id)
            .energy_ws(u64::from(id) * 1000)
            .build()
            .unwrap();
        let region = &frame.as_bytes()[..39];
        assert_eq!(calc_ec3k_crc(region), SDLC.checksum(region));
    }
}

#[test]
fn test_crc_stored_little_endian() {
    let frame = FrameBuilder::new(0x0F0F).build().unwrap();
    let bytes = frame.as_bytes();
    let crc = calc_ec3k_crc(&bytes[..39]);
    assert_eq!(bytes[39], (crc & 0xFF) as u8);
    assert_eq!(bytes[40], (crc >> 8) as u8);

    let fields = DecodedFields::from_frame(&frame).unwrap();
    assert_eq!(fields.crc_received, crc);
    assert_eq!(fields.crc_computed, crc);
}

#[test]
fn test_crc_update_is_incremental() {
    let data = b"EnergyCounter";
    let partial = data[..5].iter().fold(0xFFFF, |c, &b| crc_update(c, b));
    let whole = data[5..].iter().fold(partial, |c, &b| crc_update(c, b));
    assert_eq!(whole ^ 0xFFFF, calc_ec3k_crc(data));
}

proptest! {
    #[test]
    fn prop_crc_matches_reference(data in prop::collection::vec(any::<u8>(), 0..128)) {
        prop_assert_eq!(calc_ec3k_crc(&data), SDLC.checksum(&data));
    }

    #[test]
    fn prop_single_bit_flip_detected(
        data in prop::collection::vec(any::<u8>(), 1..64),
        position in any::<prop::sample::Index>(),
    ) {
        let bit = position.index(data.len() * 8);
        let mut corrupted = data.clone();
        corrupted[bit / 8] ^= 1 << (bit % 8);
        prop_assert_ne!(calc_ec3k_crc(&data), calc_ec3k_crc(&corrupted));
    }
}
