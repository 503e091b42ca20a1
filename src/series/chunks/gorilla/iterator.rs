use crate::common::Sample;

use super::buffered_reader::BufferedReader;
use super::traits::Error;
use super::varbit::read_varbit_int;
use super::varbit_xor::{read_varbit_xor, XorWindow};

/// Forward-only decoder over a [`super::encoder::GorillaEncoder`]'s bit stream.
pub struct GorillaIterator<'a> {
    reader: BufferedReader<'a>,
    remaining: u32,
    read: u32,
    last_timestamp: i64,
    last_delta: i64,
    last_value: f64,
    xor_window: XorWindow,
}

impl<'a> GorillaIterator<'a> {
    pub(crate) fn new(bytes: &'a [u8], num_samples: u32) -> Self {
        Self {
            reader: BufferedReader::new(bytes),
            remaining: num_samples,
            read: 0,
            last_timestamp: 0,
            last_delta: 0,
            last_value: 0.0,
            xor_window: XorWindow::default(),
        }
    }

    fn read_first(&mut self) -> Result<Sample, Error> {
        let t = self.reader.read_varint()?;
        let v = self.reader.read_f64()?;
        self.last_timestamp = t;
        self.last_value = v;
        Ok(Sample::new(t, v))
    }

    fn read_second(&mut self) -> Result<Sample, Error> {
        let delta = self.reader.read_varint()?;
        let v = read_varbit_xor(&mut self.reader, self.last_value, &mut self.xor_window)?;
        self.last_delta = delta;
        self.last_timestamp += delta;
        self.last_value = v;
        Ok(Sample::new(self.last_timestamp, v))
    }

    fn read_nth(&mut self) -> Result<Sample, Error> {
        let dod = read_varbit_int(&mut self.reader)?;
        let delta = self.last_delta + dod;
        let v = read_varbit_xor(&mut self.reader, self.last_value, &mut self.xor_window)?;
        self.last_delta = delta;
        self.last_timestamp += delta;
        self.last_value = v;
        Ok(Sample::new(self.last_timestamp, v))
    }
}

impl<'a> Iterator for GorillaIterator<'a> {
    type Item = Result<Sample, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let sample = match self.read {
            0 => self.read_first(),
            1 => self.read_second(),
            _ => self.read_nth(),
        };
        self.read += 1;
        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining as usize, Some(self.remaining as usize))
    }
}
