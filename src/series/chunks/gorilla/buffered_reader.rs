// MIT License
//
// Portions Copyright (c) 2016 Jerome Froelich
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.
use super::traits::{BitRead, Error};

/// Reads bits out of a byte buffer, MSB-first within each byte.
#[derive(Debug, Clone)]
pub struct BufferedReader<'a> {
    bytes: &'a [u8],
    index: usize,
    pos: u32,
}

impl<'a> BufferedReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            index: 0,
            pos: 0,
        }
    }

    fn current(&self) -> Result<u8, Error> {
        self.bytes.get(self.index).copied().ok_or(Error::Eof)
    }
}

impl<'a> BitRead for BufferedReader<'a> {
    fn read_bit(&mut self) -> Result<bool, Error> {
        if self.pos == 8 {
            self.index += 1;
            self.pos = 0;
        }

        let byte = self.current()?;
        let bit = byte & (1 << (7 - self.pos)) != 0;
        self.pos += 1;
        Ok(bit)
    }

    fn read_byte(&mut self) -> Result<u8, Error> {
        if self.pos == 0 {
            let byte = self.current()?;
            self.index += 1;
            return Ok(byte);
        }
        if self.pos == 8 {
            self.index += 1;
            self.pos = 0;
            let byte = self.current()?;
            self.index += 1;
            return Ok(byte);
        }

        let mut byte = self.current()? << self.pos;
        self.index += 1;
        let next = self.current().unwrap_or(0);
        byte |= next >> (8 - self.pos);
        Ok(byte)
    }

    fn read_bits(&mut self, num: u32) -> Result<u64, Error> {
        if num > 64 {
            return Err(Error::Overflow);
        }

        let mut value: u64 = 0;
        let mut remaining = num;

        while remaining >= 8 {
            let byte = self.read_byte()?;
            value = (value << 8) | byte as u64;
            remaining -= 8;
        }

        while remaining > 0 {
            let bit = self.read_bit()?;
            value = (value << 1) | bit as u64;
            remaining -= 1;
        }

        Ok(value)
    }
}

impl<'a> BufferedReader<'a> {
    pub fn read_uvarint(&mut self) -> Result<u64, Error> {
        let mut result: u64 = 0;
        let mut shift = 0u32;
        loop {
            let b = self.read_byte()?;
            result |= ((b & super::utils::DROP_MSB) as u64) << shift;
            if b & super::utils::MSB == 0 {
                break;
            }
            shift += 7;
            if shift >= 64 {
                return Err(Error::Overflow);
            }
        }
        Ok(result)
    }

    pub fn read_varint(&mut self) -> Result<i64, Error> {
        let u = self.read_uvarint()?;
        Ok(super::utils::zigzag_decode(u))
    }

    pub fn read_u64(&mut self) -> Result<u64, Error> {
        let mut bytes = [0u8; 8];
        for b in bytes.iter_mut() {
            *b = self.read_byte()?;
        }
        Ok(u64::from_be_bytes(bytes))
    }

    pub fn read_f64(&mut self) -> Result<f64, Error> {
        Ok(f64::from_bits(self.read_u64()?))
    }
}

#[cfg(test)]
mod tests {
    use super::super::buffered_writer::BufferedWriter;
    use super::*;
    use crate::series::chunks::gorilla::traits::BitWrite;

    #[test]
    fn bits_roundtrip_unaligned() {
        let mut w = BufferedWriter::new();
        w.write_bit(true).unwrap();
        w.write(5, 0b10110u32).unwrap();
        w.write_bit(false).unwrap();
        w.write(16, 0xBEEFu32).unwrap();

        let bytes = w.get_ref().to_vec();
        let mut r = BufferedReader::new(&bytes);
        assert!(r.read_bit().unwrap());
        assert_eq!(r.read_bits(5).unwrap(), 0b10110);
        assert!(!r.read_bit().unwrap());
        assert_eq!(r.read_bits(16).unwrap(), 0xBEEF);
    }

    #[test]
    fn varint_roundtrip() {
        let mut w = BufferedWriter::new();
        for v in [0i64, 1, -1, 300, -300, i64::MAX / 2, i64::MIN / 2] {
            w.write_varint(v);
        }
        let bytes = w.get_ref().to_vec();
        let mut r = BufferedReader::new(&bytes);
        for v in [0i64, 1, -1, 300, -300, i64::MAX / 2, i64::MIN / 2] {
            assert_eq!(r.read_varint().unwrap(), v);
        }
    }

    #[test]
    fn f64_roundtrip() {
        let mut w = BufferedWriter::new();
        for v in [0.0f64, 1.5, -42.125, f64::MIN_POSITIVE] {
            w.write_f64(v);
        }
        let bytes = w.get_ref().to_vec();
        let mut r = BufferedReader::new(&bytes);
        for v in [0.0f64, 1.5, -42.125, f64::MIN_POSITIVE] {
            assert_eq!(r.read_f64().unwrap(), v);
        }
    }
}
