//! Unit tests for the `Ec3kError` enum and its `Display` implementation.

use ec3k_rs::ec3k::{BitRow, FrameBytes, PreconditionFailure, ValidationFailure};
use ec3k_rs::error::Ec3kError;

/// Tests that the `CapacityExceeded` variant is correctly formatted.
#[test]
fn test_capacity_exceeded_error() {
    let err = Ec3kError::CapacityExceeded {
        buffer: "frame buffer",
        capacity: 41,
    };
    assert_eq!(err.to_string(), "frame buffer capacity exceeded: limit 41");
}

#[test]
fn test_invalid_frame_length_error() {
    let err = FrameBytes::try_from(&[0u8; 40][..]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid frame length: expected 41 bytes, got 40"
    );
}

#[test]
fn test_invalid_bit_row_errors() {
    assert!(matches!(
        "01x1".parse::<BitRow>(),
        Err(Ec3kError::InvalidBitRow(_))
    ));
    assert!(matches!(
        BitRow::parse_dump("{12a5f0"),
        Err(Ec3kError::InvalidBitRow(_))
    ));
    assert!(matches!(
        BitRow::parse_dump("{12}zz"),
        Err(Ec3kError::InvalidHexString(_))
    ));
}

#[test]
fn test_io_error_conversion() {
    let err: Ec3kError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
    assert_eq!(err.to_string(), "I/O error: gone");
}

/// Rejections are outcomes, but they still render for logs.
#[test]
fn test_outcome_messages() {
    let failure = PreconditionFailure::BitCount {
        bits: 10,
        min: 90,
        max: 225,
    };
    assert_eq!(failure.to_string(), "bit_per_row 10 out of range [90, 225]");

    let failure = ValidationFailure::Crc {
        received: 0x1234,
        computed: 0xABCD,
    };
    assert_eq!(
        failure.to_string(),
        "CRC mismatch: received 1234, computed ABCD"
    );
}
