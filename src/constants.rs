//! Protocol constants for the EnergyCounter 3000 radio format.

/// Model string reported in every emitted record.
pub const EC3K_MODEL: &str = "EnergyCounter 3000";

/// Length of a destuffed frame between two flags, in bytes.
pub const EC3K_FRAME_LEN: usize = 41;

/// Number of leading frame bytes covered by the CRC (everything except the CRC itself).
pub const EC3K_CRC_COVERED_LEN: usize = EC3K_FRAME_LEN - 2;

/// Number of nibbles in a frame.
pub const EC3K_FRAME_NIBBLES: usize = EC3K_FRAME_LEN * 2;

/// Scrambler feedback taps (bit offsets into the symbol history).
pub const SCRAMBLER_TAP_SHORT: usize = 12;
pub const SCRAMBLER_TAP_LONG: usize = 17;

/// Consecutive ones forming a flag.
pub const FLAG_RUN: u8 = 6;

/// Consecutive ones after which the transmitter inserts a stuffed zero.
pub const STUFF_RUN: u8 = 5;

/// HDLC flag byte, transmitted LSB first.
pub const FLAG_BYTE: u8 = 0x7E;

/// CRC accumulator seed and final XOR.
pub const CRC_INIT: u16 = 0xFFFF;
pub const CRC_XOR_OUT: u16 = 0xFFFF;

/// Sample rate the row-length bounds below are expressed in.
pub const REFERENCE_SAMPLE_RATE: u32 = 200_000;

/// Row length bounds at [`REFERENCE_SAMPLE_RATE`].
pub const MIN_ROW_BITS: u32 = 90;
pub const MAX_ROW_BITS: u32 = MIN_ROW_BITS * 5 / 2; // NRZI, stuffing and noise

/// Accepted FSK tone separation, inclusive, in Hz.
pub const MIN_TONE_SEPARATION_HZ: i32 = 20_000;
pub const MAX_TONE_SEPARATION_HZ: i32 = 110_000;

/// Nominal bit time of the transmitter.
pub const BIT_TIME_US: u32 = 50;

/// Capacity of the symbol scratch buffer: one frame plus generous margin.
pub const SYMBOL_CAPACITY: usize = (EC3K_FRAME_LEN + 2 * 50) * 8;
