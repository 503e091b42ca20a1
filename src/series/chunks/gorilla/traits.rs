use num_traits::PrimInt;
use std::fmt::{self, Display};
use std::{error, io};

/// Error reading from a bit stream.
#[derive(Debug, PartialEq)]
pub enum Error {
    Eof,
    Overflow,
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Eof => write!(f, "encountered the end of the stream"),
            Error::Overflow => write!(f, "numeric overflow reading stream"),
        }
    }
}

impl error::Error for Error {}

/// Reads individual bits and bit-packed integers from an in-memory buffer.
pub trait BitRead {
    fn read_bit(&mut self) -> Result<bool, Error>;
    fn read_byte(&mut self) -> Result<u8, Error>;
    fn read_bits(&mut self, num: u32) -> Result<u64, Error>;
}

/// Writes a variable number of potentially un-aligned bits to an output buffer.
pub trait BitWrite {
    fn write_bit(&mut self, bit: bool) -> io::Result<()>;

    fn write<U>(&mut self, bits: u32, value: U) -> io::Result<()>
    where
        U: PrimInt;

    fn write_out<const BITS: u32, U>(&mut self, value: U) -> io::Result<()>
    where
        U: PrimInt,
    {
        self.write(BITS, value)
    }

    fn write_byte(&mut self, byte: u8);

    fn byte_aligned(&self) -> bool;

    fn byte_align(&mut self) -> io::Result<()>;
}
