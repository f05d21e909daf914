//! # ec3k-rs - A Rust Crate for EnergyCounter 3000 Energy Monitors
//!
//! The ec3k-rs crate decodes the radio frames of EnergyCounter 3000 (ec3k)
//! plug-in energy monitors. It takes one demodulated FSK bit row, as sliced
//! by an SDR front end, and yields the monitor's id, current power and
//! cumulative energy.
//!
//! ## Features
//!
//! - NRZI symbol recovery, descrambling and HDLC-style deframing of a bit row
//! - Field extraction from the 41-byte frame, with padding and CRC checks
//! - Row length and tone separation pre-checks, scaled to the sample rate
//! - A transmit-side encoder for synthesising test rows
//! - JSON configuration, JSON-lines output and a receive session with statistics
//! - Support for logging and error handling
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! ec3k-rs = "1.0.0"
//! ```
//!
//! ```rust
//! use ec3k_rs::{decode, BitRow, CaptureMeta, DecoderConfig, EncodeOptions, FrameBuilder};
//! use ec3k_rs::ec3k::encode_row;
//!
//! let frame = FrameBuilder::new(0x1234).power_raw(605).build().unwrap();
//! let row: BitRow = encode_row(&frame, &EncodeOptions::default());
//!
//! let record = decode(&row, &CaptureMeta::new(1_000_000, 50_000)).unwrap().unwrap();
//! assert_eq!(record.id, 0x1234);
//! assert!((record.power - 60.5).abs() < 1e-9);
//! ```

pub mod constants;
pub mod ec3k;
pub mod error;
pub mod logging;
pub mod receiver;
pub mod sink;
pub mod util;

pub use crate::error::Ec3kError;
pub use crate::logging::{init_logger, log_info};

// Core decoder types
pub use ec3k::{
    BitRow, Capture, CaptureMeta, DecodeOutcome, DecodedFields, DecoderConfig, Ec3kDecoder,
    EncodeOptions, EnergyRecord, FrameBuilder, RawFrame, RowDecoder,
};

// Output and session
pub use receiver::{DecodeStats, Receiver};
pub use sink::{JsonLinesSink, MemorySink, RecordSink};

/// Decode a single row with the default configuration.
///
/// # Returns
/// * `Ok(Some(EnergyRecord))` - A frame was found and accepted
/// * `Ok(None)` - The row was rejected, held no frame, or failed validation
/// * `Err(Ec3kError)` - A working buffer was exhausted
pub fn decode(row: &BitRow, meta: &CaptureMeta) -> Result<Option<EnergyRecord>, Ec3kError> {
    Ok(ec3k::decode_row(row, meta, &DecoderConfig::default())?.record())
}
