//! Variable-bit-width integer encoding for timestamp deltas-of-deltas, in the
//! style of Prometheus' TSDB chunk encoding: a delta-of-delta of zero costs a
//! single bit, and the bucket widens as the magnitude grows.

use super::traits::{BitRead, BitWrite, Error};
use super::utils::sign_extend;

pub fn write_varbit_int<W: BitWrite>(w: &mut W, value: i64) -> std::io::Result<()> {
    match value {
        0 => w.write_bit(false),
        v if (-63..=64).contains(&v) => {
            w.write_out::<2, _>(0b10u8)?;
            w.write_out::<7, _>((v - (-63)) as u64)
        }
        v if (-255..=256).contains(&v) => {
            w.write_out::<3, _>(0b110u8)?;
            w.write_out::<9, _>((v - (-255)) as u64)
        }
        v if (-2047..=2048).contains(&v) => {
            w.write_out::<4, _>(0b1110u8)?;
            w.write_out::<12, _>((v - (-2047)) as u64)
        }
        v if (i32::MIN as i64..=i32::MAX as i64).contains(&v) => {
            w.write_out::<5, _>(0b11110u8)?;
            w.write_out::<32, _>(v as u32)
        }
        v => {
            w.write_out::<6, _>(0b111110u8)?;
            w.write_out::<64, _>(v as u64)
        }
    }
}

pub fn read_varbit_int<R: BitRead>(r: &mut R) -> Result<i64, Error> {
    if !r.read_bit()? {
        return Ok(0);
    }

    // Count leading `1` bits (up to 5) to select the bucket width; every
    // bucket prefix, including the widest, ends in a single `0` terminator.
    let mut ones = 1u32;
    while ones < 5 && r.read_bit()? {
        ones += 1;
    }
    if ones == 5 {
        r.read_bit()?;
    }

    match ones {
        1 => {
            let v = r.read_bits(7)? as i64;
            Ok(v + (-63))
        }
        2 => {
            let v = r.read_bits(9)? as i64;
            Ok(v + (-255))
        }
        3 => {
            let v = r.read_bits(12)? as i64;
            Ok(v + (-2047))
        }
        4 => {
            let v = r.read_bits(32)?;
            Ok(sign_extend(v, 32))
        }
        _ => {
            let v = r.read_bits(64)?;
            Ok(v as i64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::chunks::gorilla::buffered_reader::BufferedReader;
    use crate::series::chunks::gorilla::buffered_writer::BufferedWriter;
    use test_case::test_case;

    fn roundtrip(values: &[i64]) {
        let mut w = BufferedWriter::new();
        for &v in values {
            write_varbit_int(&mut w, v).unwrap();
        }
        let bytes = w.get_ref().to_vec();
        let mut r = BufferedReader::new(&bytes);
        for &v in values {
            assert_eq!(read_varbit_int(&mut r).unwrap(), v, "value {v}");
        }
    }

    #[test]
    fn zero_costs_one_bit() {
        roundtrip(&[0]);
    }

    // One value per bucket boundary, each written and read back on its own
    // bitstream so a miscounted terminator bit in one bucket can't hide
    // behind an adjacent value's bits.
    #[test_case(1; "bucket 1 low")]
    #[test_case(-1; "bucket 1 high")]
    #[test_case(64; "bucket 2 low")]
    #[test_case(-63; "bucket 2 high")]
    #[test_case(65; "bucket 3 low")]
    #[test_case(-64; "bucket 3 high")]
    #[test_case(256; "bucket 4 low")]
    #[test_case(-255; "bucket 4 high")]
    #[test_case(257; "bucket 5 low")]
    #[test_case(-256; "bucket 5 high")]
    #[test_case(2048; "bucket 5 mid")]
    #[test_case(-2047; "bucket 5 mid negative")]
    #[test_case(2049; "bucket 5 wide")]
    #[test_case(-2048; "bucket 5 wide negative")]
    #[test_case(i32::MAX as i64; "i32 max")]
    #[test_case(i32::MIN as i64; "i32 min")]
    #[test_case(i32::MAX as i64 + 1; "past i32 max")]
    #[test_case(i32::MIN as i64 - 1; "past i32 min")]
    #[test_case(i64::MAX; "i64 max")]
    #[test_case(i64::MIN; "i64 min")]
    fn bucket_boundaries(value: i64) {
        roundtrip(&[value]);
    }
}
