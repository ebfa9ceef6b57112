//! Bit-granular reader and writer.
//!
//! Bits are consumed and produced most-significant-first within each byte.
//! A reader's bit length is fixed at construction from the byte length of
//! its source; reading past it is an error, never a silent zero fill.

use crate::util::{Error, Result};

/// MSB-first bit reader over a borrowed buffer.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    /// Next bit to consume, counted from the start of the buffer.
    pos: usize,
    /// Total readable bits.
    len: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0, len: data.len() * 8 }
    }

    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.len - self.pos
    }

    fn read_bit(&mut self) -> Result<u32> {
        if self.pos >= self.len {
            return Err(Error::OutOfRange {
                requested: 1,
                position: self.pos,
                length: self.len,
            });
        }
        let byte = self.data[self.pos / 8];
        let bit = (byte >> (7 - self.pos % 8)) & 1;
        self.pos += 1;
        Ok(bit as u32)
    }

    /// Read `count` bits (0..=32) as an unsigned value.
    pub fn read_bits(&mut self, count: u32) -> Result<u32> {
        debug_assert!(count <= 32);
        let mut value = 0u32;
        for _ in 0..count {
            value = (value << 1) | self.read_bit()?;
        }
        Ok(value)
    }

    /// Read `count` bits and sign-extend from bit `count - 1`.
    pub fn read_signed(&mut self, count: u32) -> Result<i32> {
        let raw = self.read_bits(count)?;
        if count == 0 || count == 32 {
            return Ok(raw as i32);
        }
        let shift = 32 - count;
        Ok(((raw << shift) as i32) >> shift)
    }
}

/// MSB-first bit packer.
#[derive(Debug, Default)]
pub struct BitWriter {
    out: Vec<u8>,
    /// Bits already placed in the trailing partial byte.
    filled: u32,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bits written so far.
    #[inline]
    pub fn bit_len(&self) -> usize {
        if self.filled == 0 {
            self.out.len() * 8
        } else {
            (self.out.len() - 1) * 8 + self.filled as usize
        }
    }

    /// Append the low `count` bits of `value`, most significant first.
    pub fn write_bits(&mut self, value: u32, count: u32) {
        debug_assert!(count <= 32);
        for i in (0..count).rev() {
            let bit = ((value >> i) & 1) as u8;
            if self.filled == 0 {
                self.out.push(bit << 7);
                self.filled = 1;
            } else {
                let last = self.out.len() - 1;
                self.out[last] |= bit << (7 - self.filled);
                self.filled = (self.filled + 1) % 8;
            }
        }
    }

    /// Finish, zero-padding the final partial byte.
    pub fn finish(self) -> Vec<u8> {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_msb_first_order() {
        let data = [0b1011_0001, 0b1000_0000];
        let mut r = BitReader::new(&data);
        assert_eq!(r.read_bits(1).unwrap(), 1);
        assert_eq!(r.read_bits(3).unwrap(), 0b011);
        assert_eq!(r.read_bits(5).unwrap(), 0b00011);
        assert_eq!(r.remaining(), 7);
    }

    #[test]
    fn test_cross_byte_read() {
        let data = [0xab, 0xcd];
        let mut r = BitReader::new(&data);
        assert_eq!(r.read_bits(16).unwrap(), 0xabcd);
    }

    #[test]
    fn test_zero_width_read() {
        let mut r = BitReader::new(&[]);
        assert_eq!(r.read_bits(0).unwrap(), 0);
        assert_eq!(r.read_signed(0).unwrap(), 0);
    }

    #[test]
    fn test_out_of_range() {
        let data = [0xff];
        let mut r = BitReader::new(&data);
        assert_eq!(r.read_bits(8).unwrap(), 0xff);
        assert!(matches!(r.read_bits(1), Err(Error::OutOfRange { .. })));
    }

    #[test]
    fn test_sign_extension() {
        // 4-bit value 0b1110 = -2
        let data = [0b1110_0000];
        let mut r = BitReader::new(&data);
        assert_eq!(r.read_signed(4).unwrap(), -2);

        let data = [0b0110_0000];
        let mut r = BitReader::new(&data);
        assert_eq!(r.read_signed(4).unwrap(), 6);
    }

    #[test]
    fn test_full_width_signed() {
        let data = 0x8000_0001u32.to_be_bytes();
        let mut r = BitReader::new(&data);
        assert_eq!(r.read_signed(32).unwrap(), i32::MIN + 1);
    }

    #[test]
    fn test_writer_round_trip_all_widths() {
        for width in 1..=32u32 {
            let probe: u32 = if width == 32 { 0xdead_beef } else { (1 << width) - 1 };
            let mut w = BitWriter::new();
            w.write_bits(probe, width);
            w.write_bits(0, 3);
            w.write_bits(probe & 0x55555555, width.min(7));
            let expect_len = (width + 3 + width.min(7)) as usize;
            assert_eq!(w.bit_len(), expect_len);
            let bytes = w.finish();
            let mut r = BitReader::new(&bytes);
            assert_eq!(r.read_bits(width).unwrap(), probe);
            assert_eq!(r.read_bits(3).unwrap(), 0);
            assert_eq!(
                r.read_bits(width.min(7)).unwrap(),
                (probe & 0x55555555) & ((1u32 << width.min(7)) - 1)
            );
        }
    }

    #[test]
    fn test_writer_signed_round_trip() {
        for &v in &[-1i32, -2, -128, 127, 0, i32::MIN, i32::MAX] {
            for width in 1..=32u32 {
                // Only test widths that can represent v
                let fits = if width == 32 {
                    true
                } else {
                    let lo = -(1i64 << (width - 1));
                    let hi = (1i64 << (width - 1)) - 1;
                    (v as i64) >= lo && (v as i64) <= hi
                };
                if !fits {
                    continue;
                }
                let mut w = BitWriter::new();
                w.write_bits(v as u32, width);
                let bytes = w.finish();
                let mut r = BitReader::new(&bytes);
                assert_eq!(r.read_signed(width).unwrap(), v, "width {width}");
            }
        }
    }
}
