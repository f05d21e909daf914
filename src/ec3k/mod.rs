//! EnergyCounter 3000 protocol: from a sliced FSK bit row to an energy record.
//!
//! The receive chain, in order:
//!
//! 1. [`nrzi`]: NRZI inverse over the raw row
//! 2. [`scrambler`]: self-synchronizing descrambler, taps 12 and 17
//! 3. [`framer`]: flag detection and bit destuffing into 41-byte frames
//! 4. [`fields`] and [`crc`]: field extraction and checksum
//! 5. [`validator`]: capture preconditions and frame acceptance
//!
//! [`decoder`] drives the chain; [`encoder`] runs it backwards.

pub mod capture;
pub mod config;
pub mod crc;
pub mod decoder;
pub mod encoder;
pub mod fields;
pub mod framer;
pub mod nrzi;
pub mod record;
pub mod scrambler;
pub mod validator;

pub use capture::{BitRow, Capture, CaptureMeta, RawFrame};
pub use config::DecoderConfig;
pub use crc::{calc_ec3k_crc, crc_update};
pub use decoder::{
    decode_capture, decode_row, DecodeOutcome, DeviceDescriptor, Ec3kDecoder, Modulation,
    RowDecoder, EC3K_DEVICE,
};
pub use encoder::{encode_payload, encode_row, EncodeOptions};
pub use fields::{DecodedFields, DeviceFlags, Field, FieldSpec, FrameBuilder, LAYOUT};
pub use framer::{Deframer, FlagPolicy, FrameBytes, FrameEvent};
pub use record::EnergyRecord;
pub use validator::{PreconditionFailure, ValidationFailure};
