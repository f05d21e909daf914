//! Self-synchronizing scrambler (taps 12 and 17).
//!
//! The descrambler needs no seed: each output bit depends only on the symbol
//! history of the current row. Positions below the long tap carry no output.

use crate::constants::{SCRAMBLER_TAP_LONG, SCRAMBLER_TAP_SHORT};
use crate::ec3k::nrzi::SymbolBuffer;

/// Descrambled bit at position `i`, or `None` while the history is too short
/// or `i` lies past the end of the buffer.
#[inline]
pub fn descramble_at(symbols: &[u8], i: usize) -> Option<u8> {
    if i < SCRAMBLER_TAP_LONG || i >= symbols.len() {
        return None;
    }
    Some(symbols[i] ^ symbols[i - SCRAMBLER_TAP_SHORT] ^ symbols[i - SCRAMBLER_TAP_LONG])
}

/// Iterator over the descrambled data-link bits of a symbol buffer.
#[derive(Debug, Clone)]
pub struct Descrambler<'a> {
    symbols: &'a [u8],
    pos: usize,
}

impl<'a> Descrambler<'a> {
    pub fn new(symbols: &'a SymbolBuffer) -> Self {
        Self::from_slice(symbols.as_slice())
    }

    pub fn from_slice(symbols: &'a [u8]) -> Self {
        Self {
            symbols,
            pos: SCRAMBLER_TAP_LONG,
        }
    }

    /// Symbol index the next output bit is derived from.
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl Iterator for Descrambler<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        let bit = descramble_at(self.symbols, self.pos)?;
        self.pos += 1;
        Some(bit)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.symbols.len().saturating_sub(self.pos);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Descrambler<'_> {}

/// Transmit-side scrambler.
///
/// Starts from a zero history of [`SCRAMBLER_TAP_LONG`] symbols which it
/// emits first, so that the descrambler's first output is the first data bit.
#[derive(Debug, Clone)]
pub struct Scrambler {
    history: Vec<u8>,
}

impl Scrambler {
    pub fn new() -> Self {
        Self {
            history: vec![0; SCRAMBLER_TAP_LONG],
        }
    }

    /// Scramble one data-link bit into the next symbol.
    pub fn push(&mut self, bit: u8) -> u8 {
        let n = self.history.len();
        let symbol = (bit & 1)
            ^ self.history[n - SCRAMBLER_TAP_SHORT]
            ^ self.history[n - SCRAMBLER_TAP_LONG];
        self.history.push(symbol);
        symbol
    }

    /// Every symbol produced so far, seed included.
    pub fn into_symbols(self) -> Vec<u8> {
        self.history
    }
}

impl Default for Scrambler {
    fn default() -> Self {
        Self::new()
    }
}

/// Scramble a whole data-link bit sequence, seed symbols included.
pub fn scramble(bits: &[u8]) -> Vec<u8> {
    let mut scrambler = Scrambler::new();
    for &bit in bits {
        scrambler.push(bit);
    }
    scrambler.into_symbols()
}
