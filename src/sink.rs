//! Destinations for decoded records.

use std::io::Write;

use crate::ec3k::EnergyRecord;
use crate::error::Ec3kError;

/// Receives every accepted record.
pub trait RecordSink {
    fn emit(&mut self, record: &EnergyRecord) -> Result<(), Ec3kError>;

    fn flush(&mut self) -> Result<(), Ec3kError> {
        Ok(())
    }
}

/// Writes one JSON object per line.
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    writer: W,
    written: u64,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Records written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for JsonLinesSink<W> {
    fn emit(&mut self, record: &EnergyRecord) -> Result<(), Ec3kError> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Ec3kError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Keeps records in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    records: Vec<EnergyRecord>,
    /// Refuse records beyond this count, if set.
    limit: Option<usize>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            records: Vec::new(),
            limit: Some(limit),
        }
    }

    pub fn records(&self) -> &[EnergyRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<EnergyRecord> {
        self.records
    }
}

impl RecordSink for MemorySink {
    fn emit(&mut self, record: &EnergyRecord) -> Result<(), Ec3kError> {
        if self.limit.is_some_and(|limit| self.records.len() >= limit) {
            return Err(Ec3kError::SinkError(format!(
                "memory sink full ({} records)",
                self.records.len()
            )));
        }
        self.records.push(record.clone());
        Ok(())
    }
}
