//! # EC3K Error Handling
//!
//! This module defines the Ec3kError enum, which represents the hard failures
//! that can occur in the ec3k-rs crate.
//!
//! Ordinary radio noise is not an error: precondition rejections, missed frame
//! sync and CRC/padding failures are reported as
//! [`DecodeOutcome`](crate::ec3k::DecodeOutcome) values instead.

use thiserror::Error;

/// Represents the different error types that can occur in the EC3K crate.
#[derive(Debug, Error)]
pub enum Ec3kError {
    /// A bounded working buffer would have been written past its capacity.
    #[error("{buffer} capacity exceeded: limit {capacity}")]
    CapacityExceeded {
        buffer: &'static str,
        capacity: usize,
    },

    /// A nibble field reaches outside the frame it is read from.
    #[error("Nibble range {start}+{width} out of bounds for {available} nibbles")]
    NibbleOutOfRange {
        start: usize,
        width: usize,
        available: usize,
    },

    /// A byte sequence handed over as a frame has the wrong length.
    #[error("Invalid frame length: expected {expected} bytes, got {actual}")]
    InvalidFrameLength { expected: usize, actual: usize },

    /// A value does not fit into the nibbles reserved for it.
    #[error("Value {value:#x} does not fit into {width} nibbles")]
    ValueTooWide { value: u64, width: usize },

    /// Indicates an invalid bit row representation was provided.
    #[error("Invalid bit row: {0}")]
    InvalidBitRow(String),

    /// Indicates an invalid hexadecimal string was provided.
    #[error("Invalid hexadecimal string: {0}")]
    InvalidHexString(String),

    /// Decoder configuration failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A record sink could not accept a record.
    #[error("Sink error: {0}")]
    SinkError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<crate::util::hex::HexError> for Ec3kError {
    fn from(err: crate::util::hex::HexError) -> Self {
        Ec3kError::InvalidHexString(err.to_string())
    }
}
