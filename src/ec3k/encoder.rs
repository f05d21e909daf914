//! Transmit-side chain: frame, scramble and NRZI-encode a payload into a
//! capture row the decoder accepts.
//!
//! The decoder never needs this; it exists to synthesise test signals and
//! backs the CLI `encode` command.

use crate::ec3k::capture::BitRow;
use crate::ec3k::framer::{frame_bits, FrameBytes};
use crate::ec3k::nrzi::nrzi_encode;
use crate::ec3k::scrambler::scramble;

/// Idle data-link bits surrounding the framed payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Zero bits sent before the opening flag.
    pub preamble_bits: usize,
    /// Zero bits sent after the closing flag.
    pub trailer_bits: usize,
}

impl Default for EncodeOptions {
    /// Enough padding for a 41-byte frame to fall inside the row length
    /// bounds at a 1 MHz sample rate.
    fn default() -> Self {
        Self {
            preamble_bits: 64,
            trailer_bits: 64,
        }
    }
}

impl EncodeOptions {
    pub fn new(preamble_bits: usize, trailer_bits: usize) -> Self {
        Self {
            preamble_bits,
            trailer_bits,
        }
    }
}

/// Encode an arbitrary payload. Any length is accepted so that wrong-length
/// frames can be produced on purpose.
pub fn encode_payload(payload: &[u8], options: &EncodeOptions) -> BitRow {
    let mut bits = vec![0u8; options.preamble_bits];
    bits.extend(frame_bits(payload));
    bits.resize(bits.len() + options.trailer_bits, 0);

    BitRow::from_bits(&nrzi_encode(&scramble(&bits)))
}

/// Encode a complete frame.
pub fn encode_row(frame: &FrameBytes, options: &EncodeOptions) -> BitRow {
    encode_payload(frame.as_bytes(), options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SCRAMBLER_TAP_LONG;
    use crate::ec3k::framer::{Deframer, FrameEvent};
    use crate::ec3k::nrzi::recover_symbols;
    use crate::ec3k::scrambler::Descrambler;

    fn deframe(row: &BitRow) -> Vec<FrameEvent> {
        let symbols = recover_symbols(row, usize::MAX).unwrap();
        let mut deframer = Deframer::default();
        Descrambler::new(&symbols)
            .filter_map(|bit| deframer.push_bit(bit).unwrap())
            .collect()
    }

    #[test]
    fn test_row_length() {
        let payload = [0u8; 41];
        let row = encode_payload(&payload, &EncodeOptions::new(10, 20));
        // seed + preamble + two flags + unstuffed zero payload + trailer
        assert_eq!(row.len(), SCRAMBLER_TAP_LONG + 10 + 16 + 41 * 8 + 20);
    }

    #[test]
    fn test_encoded_frame_deframes() {
        let mut bytes = [0u8; 41];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = (i as u8).wrapping_mul(37) ^ 0xFF;
        }
        let frame = FrameBytes::new(bytes);
        let events = deframe(&encode_row(&frame, &EncodeOptions::default()));
        assert_eq!(events, vec![FrameEvent::Opened, FrameEvent::Closed(frame)]);
    }

    #[test]
    fn test_short_payload_discarded() {
        let events = deframe(&encode_payload(&[0xAA; 12], &EncodeOptions::default()));
        assert_eq!(
            events,
            vec![FrameEvent::Opened, FrameEvent::Discarded { len: 12 }]
        );
    }
}
