use crate::common::{Sample, Timestamp};
use crate::labels::Labels;

use super::chunks::MemChunk;
use super::iterator::MemSeriesIterator;

/// Samples accumulated before the expected-chunk-end estimate is refined.
const SAMPLES_PER_CHUNK: u32 = 120;

/// One label set's append-only storage: an ordered, non-overlapping run of
/// [`MemChunk`]s with bounded retention.
pub struct MemSeries {
    id: u64,
    labels: Labels,
    chunks: Vec<MemChunk>,
    chunk_range: i64,
    first_chunk_id: usize,
    next_at: Timestamp,
    mint: Timestamp,
    maxt: Timestamp,
}

impl MemSeries {
    pub fn new(id: u64, labels: Labels, chunk_range: i64) -> Self {
        Self {
            id,
            labels,
            chunks: Vec::new(),
            chunk_range,
            first_chunk_id: 0,
            next_at: 0,
            mint: 0,
            maxt: 0,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    pub fn mint(&self) -> Timestamp {
        self.mint
    }

    pub fn maxt(&self) -> Timestamp {
        self.maxt
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Appends `(t, v)`. Returns `false` (and leaves the series unchanged) if
    /// `t` is not strictly greater than the current head's last timestamp.
    pub fn append(&mut self, t: Timestamp, v: f64) -> bool {
        if self.chunks.is_empty() {
            self.mint = t;
            self.cut_head(t);
        } else {
            let head = self.chunks.last().unwrap();
            if !head.is_empty() && head.last_timestamp() >= t {
                return false;
            }
            if t >= self.next_at {
                self.cut_head(t);
            }
        }

        let head = self.chunks.last_mut().unwrap();
        head.add_sample(Sample::new(t, v))
            .expect("order already validated above");

        if head.len() == SAMPLES_PER_CHUNK / 4 {
            self.next_at =
                compute_chunk_end_time(head.first_timestamp(), head.last_timestamp(), self.next_at);
        }

        self.maxt = t;
        self.truncate();
        true
    }

    fn cut_head(&mut self, t: Timestamp) {
        if let Some(prev) = self.chunks.last_mut() {
            prev.compact();
        }
        self.chunks.push(MemChunk::new());
        self.next_at = (t / self.chunk_range) * self.chunk_range + self.chunk_range;
    }

    fn truncate(&mut self) {
        let threshold = (self.chunk_range / 2) * 3;
        if self.maxt - self.mint <= threshold {
            return;
        }

        let before = (self.maxt - self.mint) * 2 / 3;
        let mut dropped = 0usize;
        while let Some(first) = self.chunks.first() {
            if first.last_timestamp() < before {
                self.chunks.remove(0);
                dropped += 1;
            } else {
                break;
            }
        }

        if dropped > 0 {
            self.first_chunk_id += dropped;
            self.mint = self
                .chunks
                .first()
                .map(|c| c.first_timestamp())
                .unwrap_or(self.maxt);
        }
    }

    /// A forward-only iterator over a consistent snapshot of this series'
    /// chunk list, taken under whatever lock the caller holds on `self`.
    pub fn iterator(&self) -> MemSeriesIterator {
        MemSeriesIterator::new(self.chunks.clone(), self.maxt)
    }
}

/// Prometheus' head-chunk span estimator: refines the expected chunk end
/// once a chunk has accumulated a quarter of its target sample count, based
/// on the observed density so far.
fn compute_chunk_end_time(start: Timestamp, cur: Timestamp, max: Timestamp) -> Timestamp {
    let a = (max - start) / ((cur - start + 1) * 4);
    if a == 0 {
        return max;
    }
    start + (max - start) / a
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::Label;

    fn series() -> MemSeries {
        MemSeries::new(1, vec![Label::new("x", "y")].into_iter().collect(), 100)
    }

    #[test]
    fn rejects_non_increasing_timestamps() {
        let mut s = series();
        assert!(s.append(10, 1.0));
        assert!(!s.append(10, 2.0));
        assert!(!s.append(5, 2.0));
        assert_eq!(s.maxt(), 10);
    }

    #[test]
    fn cuts_new_chunk_past_next_at() {
        let mut s = series();
        for t in (0..250).step_by(10) {
            s.append(t, t as f64);
        }
        assert!(s.chunks.len() >= 2);
    }

    #[test]
    fn truncates_old_chunks() {
        let mut s = series();
        for t in 0..=200i64 {
            s.append(t, t as f64);
        }
        assert!(s.mint() >= 66);
        assert!(s
            .chunks
            .iter()
            .all(|c| c.last_timestamp() >= 66 || c.is_empty()));
    }
}
