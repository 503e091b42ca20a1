use crate::common::{Sample, Timestamp};

use super::chunks::MemChunk;

/// Forward-only, seekable iterator over a snapshot of a series' chunks.
pub struct MemSeriesIterator {
    chunks: Vec<MemChunk>,
    maxt: Timestamp,
    chunk_idx: usize,
    samples: Vec<Sample>,
    sample_idx: usize,
    current: Option<Sample>,
}

impl MemSeriesIterator {
    pub(crate) fn new(chunks: Vec<MemChunk>, maxt: Timestamp) -> Self {
        Self {
            chunks,
            maxt,
            chunk_idx: 0,
            samples: Vec::new(),
            sample_idx: 0,
            current: None,
        }
    }

    /// Positions the iterator at the first sample with `timestamp >= t`.
    /// Returns `false` if `t` is past the series' last sample.
    pub fn seek(&mut self, t: Timestamp) -> bool {
        if t > self.maxt || self.chunks.is_empty() {
            self.current = None;
            return false;
        }

        let target = t.max(self.chunks[0].first_timestamp());

        self.chunk_idx = 0;
        while self.chunk_idx < self.chunks.len()
            && self.chunks[self.chunk_idx].last_timestamp() < target
        {
            self.chunk_idx += 1;
        }
        if self.chunk_idx >= self.chunks.len() {
            self.current = None;
            return false;
        }

        self.samples = self.chunks[self.chunk_idx].iter().collect();
        match self.samples.iter().position(|s| s.timestamp >= target) {
            Some(i) => {
                self.sample_idx = i;
                self.current = Some(self.samples[i]);
                true
            }
            None => {
                self.current = None;
                false
            }
        }
    }

    /// Advances to the next sample; `false` once past the last chunk.
    pub fn next(&mut self) -> bool {
        self.sample_idx += 1;
        if self.sample_idx < self.samples.len() {
            self.current = Some(self.samples[self.sample_idx]);
            return true;
        }

        loop {
            self.chunk_idx += 1;
            if self.chunk_idx >= self.chunks.len() {
                self.current = None;
                return false;
            }
            self.samples = self.chunks[self.chunk_idx].iter().collect();
            self.sample_idx = 0;
            if let Some(first) = self.samples.first() {
                self.current = Some(*first);
                return true;
            }
        }
    }

    /// The sample at the current position. Undefined before the first
    /// `seek`/`next` call.
    pub fn at(&self) -> Option<Sample> {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk_from(samples: &[(i64, f64)]) -> MemChunk {
        let mut c = MemChunk::new();
        for &(t, v) in samples {
            c.add_sample(Sample::new(t, v)).unwrap();
        }
        c
    }

    #[test]
    fn seek_clamps_to_mint() {
        let chunks = vec![chunk_from(&[(10, 1.0), (20, 2.0), (30, 3.0)])];
        let mut it = MemSeriesIterator::new(chunks, 30);
        assert!(it.seek(0));
        assert_eq!(it.at().unwrap().timestamp, 10);
    }

    #[test]
    fn seek_past_maxt_fails() {
        let chunks = vec![chunk_from(&[(10, 1.0)])];
        let mut it = MemSeriesIterator::new(chunks, 10);
        assert!(!it.seek(11));
    }

    #[test]
    fn next_crosses_chunk_boundary() {
        let chunks = vec![
            chunk_from(&[(0, 0.0), (10, 1.0)]),
            chunk_from(&[(20, 2.0), (30, 3.0)]),
        ];
        let mut it = MemSeriesIterator::new(chunks, 30);
        assert!(it.seek(0));
        let mut seen = vec![it.at().unwrap().timestamp];
        while it.next() {
            seen.push(it.at().unwrap().timestamp);
        }
        assert_eq!(seen, vec![0, 10, 20, 30]);
    }
}
