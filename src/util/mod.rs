//! # Utility Modules
//!
//! Common helpers used throughout the ec3k-rs crate: bit-order handling,
//! hex encoding/decoding, and rate-limited logging.

pub mod bits;
pub mod hex;
pub mod logging;

pub use bits::{bit_at, format_bit_string, lsb_first_bits, pack_msb_first, parse_bit_string};
pub use hex::{decode_hex, encode_hex, format_hex_compact};
pub use logging::{log_frame_hex, LogThrottle};
