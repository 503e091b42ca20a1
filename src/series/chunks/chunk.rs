use crate::common::{Sample, Timestamp};
use crate::error::{Error, Result};

use super::gorilla::GorillaEncoder;

/// A single Gorilla-compressed chunk of a series: append-only, holding
/// samples for one contiguous window of time before the series cuts over to
/// a fresh chunk.
#[derive(Debug, Clone, Default)]
pub struct MemChunk {
    encoder: GorillaEncoder,
}

impl MemChunk {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.encoder.is_empty()
    }

    pub fn len(&self) -> u32 {
        self.encoder.num_samples()
    }

    pub fn first_timestamp(&self) -> Timestamp {
        self.encoder.first_timestamp()
    }

    pub fn last_timestamp(&self) -> Timestamp {
        self.encoder.last_timestamp()
    }

    pub fn last_value(&self) -> f64 {
        self.encoder.last_value()
    }

    /// Encoded size in bytes, used by the series to decide when to cut a new chunk.
    pub fn size(&self) -> usize {
        self.encoder.size()
    }

    /// Releases any excess buffer capacity once a chunk stops being the head.
    pub fn compact(&mut self) {
        self.encoder.compact();
    }

    /// Samples must be appended with a strictly increasing timestamp.
    pub fn add_sample(&mut self, sample: Sample) -> Result<()> {
        if !self.is_empty() && sample.timestamp <= self.last_timestamp() {
            return Err(Error::General(format!(
                "out-of-order sample: {} <= {}",
                sample.timestamp,
                self.last_timestamp()
            )));
        }
        self.encoder.add_sample(sample);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = Sample> + '_ {
        self.encoder
            .iter()
            .map(|r| r.expect("chunk bit stream is internally consistent"))
    }

    /// All samples with `start <= timestamp <= end`.
    pub fn get_range(&self, start: Timestamp, end: Timestamp) -> Vec<Sample> {
        self.iter()
            .filter(|s| s.timestamp >= start && s.timestamp <= end)
            .collect()
    }
}
