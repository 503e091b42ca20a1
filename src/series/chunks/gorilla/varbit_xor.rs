//! Gorilla-style XOR encoding for floating point sample values: a value
//! identical to the previous one costs a single bit, and otherwise only the
//! bits that actually changed are written, reusing the previous leading/
//! trailing zero-bit window when it still covers the new value.

use super::traits::{BitRead, BitWrite, Error};

/// Tracks the leading/trailing zero-bit window of the last non-zero XOR so
/// later calls can reuse it when it still fits.
#[derive(Debug, Clone, Copy, Default)]
pub struct XorWindow {
    pub leading: u32,
    pub trailing: u32,
}

pub fn write_varbit_xor<W: BitWrite>(
    w: &mut W,
    value: f64,
    prev: f64,
    window: &mut XorWindow,
) -> std::io::Result<()> {
    let xor = value.to_bits() ^ prev.to_bits();

    if xor == 0 {
        return w.write_bit(false);
    }
    w.write_bit(true)?;

    let leading = xor.leading_zeros().min(31);
    let trailing = xor.trailing_zeros();

    if window.leading <= leading && window.trailing <= trailing && window.leading + window.trailing > 0
    {
        w.write_bit(false)?;
        let sig_bits = 64 - window.leading - window.trailing;
        w.write::<u64>(sig_bits, xor >> window.trailing)?;
    } else {
        w.write_bit(true)?;
        w.write_out::<5, _>(leading)?;
        let sig_bits = 64 - leading - trailing;
        // Per the Gorilla paper, a significant-bit count of 64 is stored as 0
        // (it never legitimately occurs for a non-zero XOR narrower than 64).
        let stored_len = if sig_bits == 64 { 0 } else { sig_bits };
        w.write_out::<6, _>(stored_len)?;
        w.write::<u64>(sig_bits, xor >> trailing)?;
        window.leading = leading;
        window.trailing = trailing;
    }
    Ok(())
}

pub fn read_varbit_xor<R: BitRead>(
    r: &mut R,
    prev: f64,
    window: &mut XorWindow,
) -> Result<f64, Error> {
    if !r.read_bit()? {
        return Ok(prev);
    }

    let xor = if !r.read_bit()? {
        let sig_bits = 64 - window.leading - window.trailing;
        let bits = r.read_bits(sig_bits)?;
        bits << window.trailing
    } else {
        let leading = r.read_bits(5)? as u32;
        let mut sig_bits = r.read_bits(6)? as u32;
        if sig_bits == 0 {
            sig_bits = 64;
        }
        let trailing = 64 - leading - sig_bits;
        let bits = r.read_bits(sig_bits)?;
        window.leading = leading;
        window.trailing = trailing;
        bits << trailing
    };

    Ok(f64::from_bits(prev.to_bits() ^ xor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::chunks::gorilla::buffered_reader::BufferedReader;
    use crate::series::chunks::gorilla::buffered_writer::BufferedWriter;

    #[test]
    fn roundtrip_walk() {
        let values = [1.0, 1.0, 1.5, 1.5, 1.5, 2.25, -3.0, 2.25, 0.0, 100.125];
        let mut w = BufferedWriter::new();
        let mut write_window = XorWindow::default();
        let mut prev = values[0];
        w.write_f64(prev);
        for &v in &values[1..] {
            write_varbit_xor(&mut w, v, prev, &mut write_window).unwrap();
            prev = v;
        }

        let bytes = w.get_ref().to_vec();
        let mut r = BufferedReader::new(&bytes);
        let mut read_window = XorWindow::default();
        let mut prev = r.read_f64().unwrap();
        assert_eq!(prev, values[0]);
        for &expected in &values[1..] {
            let v = read_varbit_xor(&mut r, prev, &mut read_window).unwrap();
            assert_eq!(v, expected);
            prev = v;
        }
    }

    #[test]
    fn repeated_value_costs_one_bit() {
        let mut w = BufferedWriter::new();
        let mut window = XorWindow::default();
        write_varbit_xor(&mut w, 5.0, 5.0, &mut window).unwrap();
        assert!(!w.byte_aligned() || w.get_ref() == [0u8]);
    }
}
