//! Full decode path for one capture row, and the device registration the
//! outer dispatcher uses to pick this decoder.
//!
//! A row runs through symbol recovery, descrambling and the framer in a
//! single pass. Each exact-length frame that closes is decoded and checked;
//! the first one that passes wins.

use serde::Serialize;

use crate::constants::{BIT_TIME_US, EC3K_MODEL};
use crate::ec3k::capture::{BitRow, Capture, CaptureMeta, RawFrame};
use crate::ec3k::config::DecoderConfig;
use crate::ec3k::fields::DecodedFields;
use crate::ec3k::framer::{Deframer, FrameEvent};
use crate::ec3k::nrzi::recover_symbols;
use crate::ec3k::record::EnergyRecord;
use crate::ec3k::scrambler::Descrambler;
use crate::ec3k::validator::{
    check_preconditions, validate_fields, PreconditionFailure, ValidationFailure,
};
use crate::error::Ec3kError;
use crate::util::logging::{debug::log_crc_result, log_frame_hex};

/// Result of one decode attempt that ran to completion.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeOutcome {
    /// The capture does not look like this protocol; nothing was decoded.
    Rejected(PreconditionFailure),
    /// No flag-delimited frame of the expected length was found.
    NoFrame,
    /// Frames were found but none passed validation; holds the last failure.
    Invalid(ValidationFailure),
    Accepted(Box<DecodedFields>),
}

impl DecodeOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, DecodeOutcome::Accepted(_))
    }

    pub fn fields(&self) -> Option<&DecodedFields> {
        match self {
            DecodeOutcome::Accepted(fields) => Some(fields.as_ref()),
            _ => None,
        }
    }

    /// The record to emit, if the frame was accepted.
    pub fn record(&self) -> Option<EnergyRecord> {
        self.fields().map(EnergyRecord::from)
    }
}

/// Decode one row.
///
/// Rejections and corrupted frames come back as [`DecodeOutcome`] values.
/// `Err` means a working buffer ran out of room.
pub fn decode_row(
    bits: &BitRow,
    meta: &CaptureMeta,
    config: &DecoderConfig,
) -> Result<DecodeOutcome, Ec3kError> {
    if let Err(failure) = check_preconditions(bits.len(), meta, config) {
        log::debug!(
            "bit_per_row {} out of range or frequency shift {} out of range: {}",
            bits.len(),
            meta.tone_separation_hz,
            failure
        );
        return Ok(DecodeOutcome::Rejected(failure));
    }

    let symbols = recover_symbols(bits, config.symbol_capacity)?;
    let mut deframer = Deframer::new(config.flag_policy);
    let mut last_failure = None;

    for bit in Descrambler::new(&symbols) {
        match deframer.push_bit(bit)? {
            Some(FrameEvent::Closed(frame)) => {
                log_frame_hex("EC3K frame", frame.as_bytes());
                let fields = DecodedFields::from_frame(&frame)?;
                log_crc_result(fields.crc_received, fields.crc_computed);
                match validate_fields(&fields) {
                    Ok(()) => {
                        log::debug!("Accepted EC3K frame from id {:04X}", fields.id);
                        return Ok(DecodeOutcome::Accepted(Box::new(fields)));
                    }
                    Err(failure) => {
                        log::debug!("Dropping EC3K frame: {failure}");
                        last_failure = Some(failure);
                    }
                }
            }
            Some(FrameEvent::Discarded { len }) => {
                log::trace!("Discarding {len}-byte frame");
            }
            Some(FrameEvent::Aborted { len }) => {
                log::trace!("Frame aborted after {len} bytes");
            }
            Some(FrameEvent::Opened) | None => {}
        }
    }

    Ok(last_failure.map_or(DecodeOutcome::NoFrame, DecodeOutcome::Invalid))
}

/// Decode a capture, which must hold exactly one row.
pub fn decode_capture(capture: &Capture, config: &DecoderConfig) -> Result<DecodeOutcome, Ec3kError> {
    match capture.rows.as_slice() {
        [row] => decode_row(row, &capture.meta, config),
        rows => {
            log::debug!("Expected a single row, got {}", rows.len());
            Ok(DecodeOutcome::Rejected(PreconditionFailure::RowCount(
                rows.len(),
            )))
        }
    }
}

impl RawFrame {
    pub fn decode(&self, config: &DecoderConfig) -> Result<DecodeOutcome, Ec3kError> {
        decode_row(&self.bits, &self.meta, config)
    }
}

/// Demodulation scheme the slicer has to run for a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Modulation {
    /// FSK, one pulse per bit time.
    FskPulsePcm,
}

/// Registration metadata for a device decoder. Widths and limits in µs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceDescriptor {
    pub name: &'static str,
    pub modulation: Modulation,
    pub short_width_us: f32,
    pub long_width_us: f32,
    pub tolerance_us: f32,
    pub gap_limit_us: f32,
    pub reset_limit_us: f32,
    /// Output fields, in order.
    pub fields: &'static [&'static str],
}

/// The EnergyCounter 3000 registration.
pub static EC3K_DEVICE: DeviceDescriptor = DeviceDescriptor {
    name: EC3K_MODEL,
    modulation: Modulation::FskPulsePcm,
    short_width_us: BIT_TIME_US as f32,
    long_width_us: BIT_TIME_US as f32,
    // up to five equal levels in a row, and the flag is six
    tolerance_us: (BIT_TIME_US / 7) as f32,
    gap_limit_us: 3000.0,
    reset_limit_us: 5000.0,
    fields: &["model", "id", "power", "energy"],
};

/// A decoder the dispatcher can run on a sliced capture.
pub trait RowDecoder: Send + Sync + std::fmt::Debug {
    fn descriptor(&self) -> &DeviceDescriptor;

    /// Decode one capture. Must not keep state between calls.
    fn decode(&self, capture: &Capture) -> Result<DecodeOutcome, Ec3kError>;
}

/// EnergyCounter 3000 decoder.
#[derive(Debug, Clone, Default)]
pub struct Ec3kDecoder {
    config: DecoderConfig,
}

impl Ec3kDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DecoderConfig) -> Result<Self, Ec3kError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }
}

impl RowDecoder for Ec3kDecoder {
    fn descriptor(&self) -> &DeviceDescriptor {
        &EC3K_DEVICE
    }

    fn decode(&self, capture: &Capture) -> Result<DecodeOutcome, Ec3kError> {
        decode_capture(capture, &self.config)
    }
}
