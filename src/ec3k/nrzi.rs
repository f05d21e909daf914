//! NRZI symbol recovery.
//!
//! A level that holds for one bit time encodes `1`, a level change encodes
//! `0`. The first bit of a row is compared against an implicit low level.

use crate::ec3k::capture::BitRow;
use crate::error::Ec3kError;

/// Recover the symbol at `index` of `row`.
///
/// Pure function of position: `1` when the bit equals its predecessor,
/// `0` on a transition. Positions past the end of the row read as `0`.
#[inline]
pub fn recover_symbol(row: &BitRow, index: usize) -> u8 {
    let Some(level) = row.get(index) else {
        return 0;
    };
    let previous = match index {
        0 => 0,
        _ => row.get(index - 1).unwrap_or(0),
    };
    u8::from(level == previous)
}

/// Bounded scratch buffer of recovered symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolBuffer {
    symbols: Vec<u8>,
    capacity: usize,
}

impl SymbolBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            symbols: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a symbol, refusing to grow past the fixed capacity.
    pub fn push(&mut self, symbol: u8) -> Result<(), Ec3kError> {
        if self.symbols.len() >= self.capacity {
            return Err(Ec3kError::CapacityExceeded {
                buffer: "symbol buffer",
                capacity: self.capacity,
            });
        }
        self.symbols.push(symbol & 1);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.symbols
    }
}

/// Recover every symbol of `row` into a buffer holding at most `capacity` symbols.
///
/// A row longer than the scratch capacity aborts the decode attempt instead of
/// being silently truncated.
pub fn recover_symbols(row: &BitRow, capacity: usize) -> Result<SymbolBuffer, Ec3kError> {
    let mut buffer = SymbolBuffer {
        symbols: Vec::with_capacity(capacity.min(row.len())),
        capacity,
    };
    let mut last_level = 0u8;
    for level in row.iter() {
        buffer.push(u8::from(level == last_level))?;
        last_level = level;
    }
    Ok(buffer)
}

/// Transmit-side NRZI: hold the level for a `1`, toggle it for a `0`.
pub fn nrzi_encode(symbols: &[u8]) -> Vec<u8> {
    let mut level = 0u8;
    symbols
        .iter()
        .map(|&symbol| {
            if symbol & 1 == 0 {
                level ^= 1;
            }
            level
        })
        .collect()
}
