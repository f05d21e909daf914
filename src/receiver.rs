//! Long-running receive session.
//!
//! Feeds successive captures through a [`RowDecoder`] and forwards accepted
//! records to a [`RecordSink`]. Decoding is stateless; only the counters in
//! [`DecodeStats`] persist between captures.

use crate::ec3k::{
    Capture, DecodeOutcome, DecoderConfig, Ec3kDecoder, EnergyRecord, RowDecoder,
    ValidationFailure,
};
use crate::error::Ec3kError;
use crate::log_warn_throttled;
use crate::sink::RecordSink;
use crate::util::logging::LogThrottle;

/// Statistics for a receive session
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DecodeStats {
    pub captures: u64,
    pub rejected: u64,
    pub no_frame: u64,
    pub padding_errors: u64,
    pub crc_errors: u64,
    pub records: u64,
    /// Decode attempts abandoned because a scratch buffer filled up.
    pub buffer_exhausted: u64,
}

impl DecodeStats {
    fn count(&mut self, outcome: &DecodeOutcome) {
        match outcome {
            DecodeOutcome::Rejected(_) => self.rejected += 1,
            DecodeOutcome::NoFrame => self.no_frame += 1,
            DecodeOutcome::Invalid(ValidationFailure::Padding { .. }) => self.padding_errors += 1,
            DecodeOutcome::Invalid(ValidationFailure::Crc { .. }) => self.crc_errors += 1,
            DecodeOutcome::Accepted(_) => self.records += 1,
        }
    }
}

pub struct Receiver<S: RecordSink> {
    decoder: Box<dyn RowDecoder>,
    sink: S,
    stats: DecodeStats,
    /// Throttle for buffer exhaustion warnings
    warn_throttle: LogThrottle,
}

impl<S: RecordSink> Receiver<S> {
    /// Receiver running the EC3K decoder with `config`.
    pub fn new(config: DecoderConfig, sink: S) -> Result<Self, Ec3kError> {
        Ok(Self::with_decoder(
            Box::new(Ec3kDecoder::with_config(config)?),
            sink,
        ))
    }

    pub fn with_decoder(decoder: Box<dyn RowDecoder>, sink: S) -> Self {
        Self {
            decoder,
            sink,
            stats: DecodeStats::default(),
            warn_throttle: LogThrottle::new(1000, 5), // 5 warnings per second
        }
    }

    /// Decode one capture and emit its record, if any.
    ///
    /// A capture that overflows a scratch buffer is counted and skipped.
    /// Sink failures are returned.
    pub fn process(&mut self, capture: &Capture) -> Result<Option<EnergyRecord>, Ec3kError> {
        self.stats.captures += 1;

        let outcome = match self.decoder.decode(capture) {
            Ok(outcome) => outcome,
            Err(err @ Ec3kError::CapacityExceeded { .. }) => {
                self.stats.buffer_exhausted += 1;
                log_warn_throttled!(self.warn_throttle, "Abandoning capture: {err}");
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        self.stats.count(&outcome);

        let record = outcome.record();
        if let Some(record) = &record {
            log::info!("{record}");
            self.sink.emit(record)?;
        }
        Ok(record)
    }

    /// Process captures until the iterator ends, then flush the sink.
    pub fn run<I>(&mut self, captures: I) -> Result<DecodeStats, Ec3kError>
    where
        I: IntoIterator<Item = Capture>,
    {
        for capture in captures {
            self.process(&capture)?;
        }
        self.sink.flush()?;
        Ok(self.stats)
    }

    pub fn stats(&self) -> &DecodeStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = DecodeStats::default();
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
