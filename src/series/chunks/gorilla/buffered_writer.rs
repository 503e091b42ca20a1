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
use std::io;

use num_traits::PrimInt;

use super::traits::BitWrite;
use super::utils::{zigzag_encode, DROP_MSB, MSB};

/// Accumulates bits MSB-first into a growable byte buffer.
#[derive(Debug, Clone, Default)]
pub struct BufferedWriter {
    bytes: Vec<u8>,
    total_bits: usize,
}

impl BufferedWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bytes),
            total_bits: 0,
        }
    }

    pub fn get_ref(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
        self.total_bits = 0;
    }

    pub fn shrink_to_fit(&mut self) {
        self.bytes.shrink_to_fit();
    }

    pub fn write_uvarint(&mut self, mut value: u64) {
        loop {
            if value < 0x80 {
                self.write_byte(value as u8);
                return;
            }
            self.write_byte((value as u8 & DROP_MSB) | MSB);
            value >>= 7;
        }
    }

    pub fn write_varint(&mut self, value: i64) {
        self.write_uvarint(zigzag_encode(value));
    }

    pub fn write_u64(&mut self, value: u64) {
        for byte in value.to_be_bytes() {
            self.write_byte(byte);
        }
    }

    pub fn write_f64(&mut self, value: f64) {
        self.write_u64(value.to_bits());
    }
}

impl BitWrite for BufferedWriter {
    fn write_bit(&mut self, bit: bool) -> io::Result<()> {
        if self.total_bits % 8 == 0 {
            self.bytes.push(0);
        }
        if bit {
            let idx = self.bytes.len() - 1;
            let slot = (self.total_bits % 8) as u32;
            self.bytes[idx] |= 1 << (7 - slot);
        }
        self.total_bits += 1;
        Ok(())
    }

    fn write<U>(&mut self, bits: u32, value: U) -> io::Result<()>
    where
        U: PrimInt,
    {
        let value = value.to_u64().unwrap_or(0);
        for i in (0..bits).rev() {
            self.write_bit((value >> i) & 1 == 1)?;
        }
        Ok(())
    }

    fn write_byte(&mut self, byte: u8) {
        let _ = self.write(8, byte);
    }

    fn byte_aligned(&self) -> bool {
        self.total_bits % 8 == 0
    }

    fn byte_align(&mut self) -> io::Result<()> {
        while !self.byte_aligned() {
            self.write_bit(false)?;
        }
        Ok(())
    }
}
