//! Flag-delimited framing with bit destuffing.
//!
//! The [`Deframer`] consumes descrambled data-link bits one at a time. Six
//! consecutive ones followed by a zero form a flag that toggles the
//! frame-active state; a zero after exactly five ones is a stuffed bit and is
//! dropped. Bytes are assembled LSB-first and collected only while a frame is
//! active. A frame closing with exactly [`EC3K_FRAME_LEN`] bytes is handed on
//! as [`FrameBytes`]; any other length is discarded.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{EC3K_CRC_COVERED_LEN, EC3K_FRAME_LEN, FLAG_BYTE, FLAG_RUN, STUFF_RUN};
use crate::error::Ec3kError;
use crate::util::bits::lsb_first_bits;

/// How runs of more than six ones are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagPolicy {
    /// Only a run of exactly six ones is a flag. A longer run aborts: any open
    /// frame is dropped without evaluation and the framer returns to idle.
    #[default]
    ExactSix,
    /// Any run of six or more ones is a flag.
    SixOrMore,
}

/// A complete frame of exactly [`EC3K_FRAME_LEN`] bytes.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct FrameBytes([u8; EC3K_FRAME_LEN]);

impl FrameBytes {
    pub fn new(bytes: [u8; EC3K_FRAME_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; EC3K_FRAME_LEN] {
        &self.0
    }

    /// The bytes covered by the CRC: everything but the trailing two CRC bytes.
    pub fn crc_region(&self) -> &[u8] {
        &self.0[..EC3K_CRC_COVERED_LEN]
    }

    pub fn into_inner(self) -> [u8; EC3K_FRAME_LEN] {
        self.0
    }
}

impl TryFrom<&[u8]> for FrameBytes {
    type Error = Ec3kError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let array: [u8; EC3K_FRAME_LEN] = bytes.try_into().map_err(|_| {
            Ec3kError::InvalidFrameLength {
                expected: EC3K_FRAME_LEN,
                actual: bytes.len(),
            }
        })?;
        Ok(Self(array))
    }
}

impl fmt::Debug for FrameBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FrameBytes({})", crate::util::hex::encode_hex(&self.0))
    }
}

/// Bounded accumulator for the bytes of the frame currently being captured.
#[derive(Debug, Clone)]
pub struct ByteFrame {
    buf: [u8; EC3K_FRAME_LEN],
    len: usize,
}

impl ByteFrame {
    pub fn new() -> Self {
        Self {
            buf: [0; EC3K_FRAME_LEN],
            len: 0,
        }
    }

    /// Append a byte; a full buffer is a hard failure, never an overwrite.
    pub fn push(&mut self, byte: u8) -> Result<(), Ec3kError> {
        if self.len >= EC3K_FRAME_LEN {
            return Err(Ec3kError::CapacityExceeded {
                buffer: "frame buffer",
                capacity: EC3K_FRAME_LEN,
            });
        }
        self.buf[self.len] = byte;
        self.len += 1;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// The completed frame, if exactly [`EC3K_FRAME_LEN`] bytes were collected.
    pub fn complete(&self) -> Option<FrameBytes> {
        (self.len == EC3K_FRAME_LEN).then_some(FrameBytes(self.buf))
    }
}

impl Default for ByteFrame {
    fn default() -> Self {
        Self::new()
    }
}

/// What a single bit did to the framer state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameEvent {
    /// A flag was seen while idle; capture starts with the next bit.
    Opened,
    /// A flag closed a frame of exactly the expected length.
    Closed(FrameBytes),
    /// A flag closed a frame of any other length.
    Discarded { len: usize },
    /// An over-long run of ones terminated an open frame.
    Aborted { len: usize },
}

/// Framer/destuffer state for one decode attempt.
#[derive(Debug, Clone)]
pub struct Deframer {
    policy: FlagPolicy,
    one_run: u8,
    accumulator: u8,
    bit_pos: u8,
    active: bool,
    frame: ByteFrame,
}

impl Deframer {
    pub fn new(policy: FlagPolicy) -> Self {
        Self {
            policy,
            one_run: 0,
            accumulator: 0,
            bit_pos: 0,
            active: false,
            frame: ByteFrame::new(),
        }
    }

    /// Feed one descrambled bit.
    ///
    /// Fails only when an active frame would grow past [`EC3K_FRAME_LEN`] bytes.
    pub fn push_bit(&mut self, bit: u8) -> Result<Option<FrameEvent>, Ec3kError> {
        if bit & 1 == 1 {
            self.one_run = self.one_run.saturating_add(1);
            // a sixth or later one is never data; the run ends as a flag or an abort
            if self.one_run <= STUFF_RUN {
                self.shift_in(1)?;
            }
            return Ok(None);
        }

        let run = std::mem::take(&mut self.one_run);
        if run < STUFF_RUN {
            self.shift_in(0)?;
            return Ok(None);
        }
        if run == STUFF_RUN {
            // stuffed zero
            return Ok(None);
        }
        if run == FLAG_RUN || self.policy == FlagPolicy::SixOrMore {
            return Ok(Some(self.on_flag()));
        }
        Ok(self.on_abort())
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Bytes collected for the current frame.
    pub fn byte_count(&self) -> usize {
        self.frame.len()
    }

    /// Bits accumulated towards the next byte.
    pub fn bit_position(&self) -> u8 {
        self.bit_pos
    }

    /// Length of the current run of ones.
    pub fn one_run(&self) -> u8 {
        self.one_run
    }

    fn shift_in(&mut self, bit: u8) -> Result<(), Ec3kError> {
        self.accumulator = (self.accumulator >> 1) | (bit << 7);
        self.bit_pos += 1;
        if self.bit_pos == 8 {
            self.bit_pos = 0;
            if self.active {
                self.frame.push(self.accumulator)?;
            }
        }
        Ok(())
    }

    fn on_flag(&mut self) -> FrameEvent {
        let event = if self.active {
            match self.frame.complete() {
                Some(frame) => FrameEvent::Closed(frame),
                None => FrameEvent::Discarded {
                    len: self.frame.len(),
                },
            }
        } else {
            FrameEvent::Opened
        };
        self.active = !self.active;
        self.bit_pos = 0;
        self.frame.clear();
        event
    }

    fn on_abort(&mut self) -> Option<FrameEvent> {
        let event = self.active.then(|| FrameEvent::Aborted {
            len: self.frame.len(),
        });
        self.active = false;
        self.bit_pos = 0;
        self.frame.clear();
        event
    }
}

impl Default for Deframer {
    fn default() -> Self {
        Self::new(FlagPolicy::default())
    }
}

/// The flag in transmit order.
pub fn flag_bits() -> impl Iterator<Item = u8> {
    lsb_first_bits(FLAG_BYTE)
}

/// Serialize bytes LSB-first, inserting a zero after every five consecutive ones.
pub fn stuff_bits(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() * 8 + bytes.len() * 8 / 5);
    let mut ones = 0u8;
    for bit in bytes.iter().flat_map(|&b| lsb_first_bits(b)) {
        out.push(bit);
        if bit == 1 {
            ones += 1;
            if ones == STUFF_RUN {
                out.push(0);
                ones = 0;
            }
        } else {
            ones = 0;
        }
    }
    out
}

/// Data-link bits of one frame: opening flag, stuffed payload, closing flag.
pub fn frame_bits(payload: &[u8]) -> Vec<u8> {
    let mut bits: Vec<u8> = flag_bits().collect();
    bits.extend(stuff_bits(payload));
    bits.extend(flag_bits());
    bits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(deframer: &mut Deframer, bits: &[u8]) -> Vec<FrameEvent> {
        bits.iter()
            .filter_map(|&b| deframer.push_bit(b).unwrap())
            .collect()
    }

    #[test]
    fn test_six_ones_open_frame() {
        let mut deframer = Deframer::default();
        // a few data bits so the counters are non-zero beforehand
        feed(&mut deframer, &[1, 0, 1]);
        assert_eq!(deframer.bit_position(), 3);

        let events = feed(&mut deframer, &[0, 1, 1, 1, 1, 1, 1, 0]);
        assert_eq!(events, vec![FrameEvent::Opened]);
        assert!(deframer.is_active());
        assert_eq!(deframer.bit_position(), 0);
        assert_eq!(deframer.byte_count(), 0);
        assert_eq!(deframer.one_run(), 0);
    }

    #[test]
    fn test_stuffed_zero_is_dropped() {
        let mut deframer = Deframer::default();
        feed(&mut deframer, &flag_bits().collect::<Vec<_>>());
        // 0xFF stuffed: 1 1 1 1 1 0 1 1 1
        let events = feed(&mut deframer, &stuff_bits(&[0xFF]));
        assert!(events.is_empty());
        assert_eq!(deframer.byte_count(), 1);
        assert_eq!(deframer.bit_position(), 0);
    }

    #[test]
    fn test_close_with_exact_length() {
        let payload: Vec<u8> = (0..EC3K_FRAME_LEN as u8).collect();
        let mut deframer = Deframer::default();
        let events = feed(&mut deframer, &frame_bits(&payload));
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], FrameEvent::Opened);
        match &events[1] {
            FrameEvent::Closed(frame) => assert_eq!(frame.as_bytes().as_slice(), payload.as_slice()),
            other => panic!("expected closed frame, got {other:?}"),
        }
        assert!(!deframer.is_active());
    }

    #[test]
    fn test_close_with_wrong_length_discards() {
        let payload = [0x55u8; 10];
        let mut deframer = Deframer::default();
        let events = feed(&mut deframer, &frame_bits(&payload));
        assert_eq!(
            events,
            vec![FrameEvent::Opened, FrameEvent::Discarded { len: 10 }]
        );
        assert!(!deframer.is_active());
        assert_eq!(deframer.byte_count(), 0);
    }

    #[test]
    fn test_seven_ones_abort_exact_policy() {
        let mut deframer = Deframer::new(FlagPolicy::ExactSix);
        feed(&mut deframer, &flag_bits().collect::<Vec<_>>());
        feed(&mut deframer, &stuff_bits(&[0x12, 0x34]));
        let events = feed(&mut deframer, &[1, 1, 1, 1, 1, 1, 1, 0]);
        assert_eq!(events, vec![FrameEvent::Aborted { len: 2 }]);
        assert!(!deframer.is_active());

        // While idle an over-long run changes nothing
        let events = feed(&mut deframer, &[1, 1, 1, 1, 1, 1, 1, 1, 0]);
        assert!(events.is_empty());
        assert!(!deframer.is_active());
    }

    /// A 41-byte frame ending on a byte boundary, then `0` and seven ones.
    fn aligned_frame_then_seven_ones(deframer: &mut Deframer) -> Vec<FrameEvent> {
        let payload: Vec<u8> = (0..EC3K_FRAME_LEN as u8).collect();
        let mut bits: Vec<u8> = flag_bits().collect();
        bits.extend(stuff_bits(&payload));
        bits.extend([0, 1, 1, 1, 1, 1, 1, 1, 0]);
        let events = feed(deframer, &bits);
        assert_eq!(events[0], FrameEvent::Opened);
        events[1..].to_vec()
    }

    #[test]
    fn test_seven_ones_abort_full_frame() {
        let mut deframer = Deframer::new(FlagPolicy::ExactSix);
        let events = aligned_frame_then_seven_ones(&mut deframer);
        assert_eq!(
            events,
            vec![FrameEvent::Aborted {
                len: EC3K_FRAME_LEN
            }]
        );
        assert!(!deframer.is_active());
        assert_eq!(deframer.byte_count(), 0);
    }

    #[test]
    fn test_seven_ones_close_full_frame_lenient_policy() {
        let mut deframer = Deframer::new(FlagPolicy::SixOrMore);
        let events = aligned_frame_then_seven_ones(&mut deframer);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], FrameEvent::Closed(_)));
        assert!(!deframer.is_active());
    }

    #[test]
    fn test_seven_ones_toggle_lenient_policy() {
        let mut deframer = Deframer::new(FlagPolicy::SixOrMore);
        let events = feed(&mut deframer, &[0, 1, 1, 1, 1, 1, 1, 1, 0]);
        assert_eq!(events, vec![FrameEvent::Opened]);
        assert!(deframer.is_active());
    }

    #[test]
    fn test_byte_frame_capacity() {
        let mut frame = ByteFrame::new();
        for i in 0..EC3K_FRAME_LEN {
            frame.push(i as u8).unwrap();
        }
        assert!(frame.complete().is_some());
        let err = frame.push(0xAA).unwrap_err();
        assert!(matches!(
            err,
            Ec3kError::CapacityExceeded {
                capacity: EC3K_FRAME_LEN,
                ..
            }
        ));
        assert_eq!(frame.len(), EC3K_FRAME_LEN);
    }

    #[test]
    fn test_overlong_frame_is_hard_failure() {
        let payload = [0u8; EC3K_FRAME_LEN + 1];
        let mut deframer = Deframer::default();
        let mut result = Ok(None);
        for bit in frame_bits(&payload) {
            result = deframer.push_bit(bit);
            if result.is_err() {
                break;
            }
        }
        assert!(matches!(result, Err(Ec3kError::CapacityExceeded { .. })));
    }

    #[test]
    fn test_stuff_bits_never_six_ones() {
        let bits = stuff_bits(&[0xFF; 8]);
        let mut run = 0;
        for bit in bits {
            run = if bit == 1 { run + 1 } else { 0 };
            assert!(run <= 5);
        }
    }

    #[test]
    fn test_frame_bytes_try_from() {
        assert!(FrameBytes::try_from(&[0u8; 40][..]).is_err());
        let frame = FrameBytes::try_from(&[7u8; EC3K_FRAME_LEN][..]).unwrap();
        assert_eq!(frame.crc_region().len(), EC3K_CRC_COVERED_LEN);
    }
}
