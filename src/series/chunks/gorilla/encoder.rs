use crate::common::{Sample, Timestamp};

use super::buffered_writer::BufferedWriter;
use super::iterator::GorillaIterator;
use super::traits::BitWrite;
use super::varbit::write_varbit_int;
use super::varbit_xor::{write_varbit_xor, XorWindow};

/// Appends `(timestamp, value)` samples to a Gorilla-compressed bit stream:
/// the first sample is stored verbatim, the second stores a plain timestamp
/// delta, and every sample after that stores a delta-of-delta for the
/// timestamp and an XOR of the value against the previous one.
#[derive(Debug, Clone, Default)]
pub struct GorillaEncoder {
    writer: BufferedWriter,
    num_samples: u32,
    first_timestamp: Timestamp,
    last_timestamp: Timestamp,
    last_delta: i64,
    last_value: f64,
    xor_window: XorWindow,
}

impl GorillaEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_samples(&self) -> u32 {
        self.num_samples
    }

    pub fn is_empty(&self) -> bool {
        self.num_samples == 0
    }

    pub fn first_timestamp(&self) -> Timestamp {
        self.first_timestamp
    }

    pub fn last_timestamp(&self) -> Timestamp {
        self.last_timestamp
    }

    pub fn last_value(&self) -> f64 {
        self.last_value
    }

    /// Size of the encoded bit stream in bytes.
    pub fn size(&self) -> usize {
        self.writer.len()
    }

    pub fn add_sample(&mut self, sample: Sample) {
        match self.num_samples {
            0 => self.write_first_sample(sample),
            1 => self.write_second_sample(sample),
            _ => self.write_nth_sample(sample),
        }
        self.num_samples += 1;
    }

    fn write_first_sample(&mut self, sample: Sample) {
        self.writer.write_varint(sample.timestamp);
        self.writer.write_f64(sample.value);
        self.first_timestamp = sample.timestamp;
        self.last_timestamp = sample.timestamp;
        self.last_value = sample.value;
    }

    fn write_second_sample(&mut self, sample: Sample) {
        let delta = sample.timestamp - self.last_timestamp;
        self.writer.write_varint(delta);
        write_varbit_xor(
            &mut self.writer,
            sample.value,
            self.last_value,
            &mut self.xor_window,
        )
        .expect("writing to an in-memory buffer cannot fail");

        self.last_delta = delta;
        self.last_timestamp = sample.timestamp;
        self.last_value = sample.value;
    }

    fn write_nth_sample(&mut self, sample: Sample) {
        let delta = sample.timestamp - self.last_timestamp;
        let dod = delta - self.last_delta;
        write_varbit_int(&mut self.writer, dod).expect("writing to an in-memory buffer cannot fail");
        write_varbit_xor(
            &mut self.writer,
            sample.value,
            self.last_value,
            &mut self.xor_window,
        )
        .expect("writing to an in-memory buffer cannot fail");

        self.last_delta = delta;
        self.last_timestamp = sample.timestamp;
        self.last_value = sample.value;
    }

    pub fn iter(&self) -> GorillaIterator<'_> {
        GorillaIterator::new(self.writer.get_ref(), self.num_samples)
    }

    pub fn compact(&mut self) {
        self.writer.shrink_to_fit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_a_series() {
        let mut enc = GorillaEncoder::new();
        let samples = [
            Sample::new(1_000, 1.0),
            Sample::new(1_010, 1.0),
            Sample::new(1_020, 2.5),
            Sample::new(1_030, 2.5),
            Sample::new(1_045, -1.25),
            Sample::new(1_100, 0.0),
        ];
        for s in samples {
            enc.add_sample(s);
        }

        let decoded: Vec<Sample> = enc.iter().map(|r| r.unwrap()).collect();
        assert_eq!(decoded, samples);
        assert_eq!(enc.num_samples(), samples.len() as u32);
        assert_eq!(enc.first_timestamp(), 1_000);
        assert_eq!(enc.last_timestamp(), 1_100);
    }

    #[test]
    fn irregular_intervals_still_decode() {
        let mut enc = GorillaEncoder::new();
        let samples = [
            Sample::new(0, 10.0),
            Sample::new(7, 11.0),
            Sample::new(19, 9.0),
            Sample::new(20, 9.0),
            Sample::new(1_000_000, 42.5),
        ];
        for s in samples {
            enc.add_sample(s);
        }
        let decoded: Vec<Sample> = enc.iter().map(|r| r.unwrap()).collect();
        assert_eq!(decoded, samples);
    }
}
