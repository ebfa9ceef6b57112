//! Byte-level primitives shared by every wire structure.
//!
//! JT data is little-endian by default; a file flags its order in the file
//! header and readers must honour it. Writing always emits little-endian.
//! [`ByteCursor`] is a bounds-checked reader over a borrowed buffer that
//! carries the file's byte order, and the `put_*` helpers append
//! little-endian fields to an in-memory segment body.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use glam::Vec3;

use crate::util::{BBox3f, CountRange, Error, Result};

/// Byte order of multi-byte fields in a JT file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    #[default]
    Little,
    Big,
}

impl Endian {
    /// Value of the file-header byte-order field.
    #[inline]
    pub fn header_byte(self) -> u8 {
        match self {
            Endian::Little => 0,
            Endian::Big => 1,
        }
    }

    pub fn from_header_byte(b: u8) -> Result<Self> {
        match b {
            0 => Ok(Endian::Little),
            1 => Ok(Endian::Big),
            other => Err(Error::invalid(format!("invalid byte-order flag {other}"))),
        }
    }
}

/// Bounds-checked reader over a byte buffer.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
    order: Endian,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8], order: Endian) -> Self {
        Self { data, pos: 0, order }
    }

    #[inline]
    pub fn order(&self) -> Endian {
        self.order
    }

    /// Switch byte order mid-stream. The file header is read with the
    /// default order up to its byte-order field, then re-ordered.
    pub fn set_order(&mut self, order: Endian) {
        self.order = order;
    }

    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Borrow the next `count` bytes and advance.
    pub fn take(&mut self, count: usize) -> Result<&'a [u8]> {
        if count > self.remaining() {
            return Err(Error::OutOfRange {
                requested: count,
                position: self.pos,
                length: self.data.len(),
            });
        }
        let slice = &self.data[self.pos..self.pos + count];
        self.pos += count;
        Ok(slice)
    }

    /// Skip `count` bytes.
    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.take(count).map(|_| ())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(match self.order {
            Endian::Little => LittleEndian::read_u16(b),
            Endian::Big => BigEndian::read_u16(b),
        })
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(self.read_u16()? as i16)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(match self.order {
            Endian::Little => LittleEndian::read_u32(b),
            Endian::Big => BigEndian::read_u32(b),
        })
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(self.read_u32()? as i32)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    /// Code-text words are big-endian regardless of the file order.
    pub fn read_u32_be(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(BigEndian::read_u32(b))
    }

    pub fn read_vec3(&mut self) -> Result<Vec3> {
        let x = self.read_f32()?;
        let y = self.read_f32()?;
        let z = self.read_f32()?;
        Ok(Vec3::new(x, y, z))
    }

    pub fn read_bbox(&mut self) -> Result<BBox3f> {
        let min = self.read_vec3()?;
        let max = self.read_vec3()?;
        Ok(BBox3f::new(min, max))
    }

    pub fn read_count_range(&mut self) -> Result<CountRange> {
        let min = self.read_i32()?;
        let max = self.read_i32()?;
        Ok(CountRange::new(min, max))
    }

    /// Count-prefixed i32 array.
    pub fn read_vec_i32(&mut self) -> Result<Vec<i32>> {
        let count = self.read_len()?;
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(self.read_i32()?);
        }
        Ok(out)
    }

    /// Count-prefixed f32 array.
    pub fn read_vec_f32(&mut self) -> Result<Vec<f32>> {
        let count = self.read_len()?;
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(self.read_f32()?);
        }
        Ok(out)
    }

    /// Count-prefixed UTF-16 string.
    pub fn read_mb_string(&mut self) -> Result<String> {
        let count = self.read_len()?;
        let mut units = Vec::with_capacity(count);
        for _ in 0..count {
            units.push(self.read_u16()?);
        }
        String::from_utf16(&units).map_err(|_| Error::invalid("malformed UTF-16 string"))
    }

    /// Read an i32 length field, rejecting negatives and counts that cannot
    /// fit in the remaining bytes (each entry is at least one byte).
    fn read_len(&mut self) -> Result<usize> {
        let n = self.read_i32()?;
        if n < 0 || n as usize > self.remaining() {
            return Err(Error::invalid(format!("implausible length prefix {n}")));
        }
        Ok(n as usize)
    }
}

// Write-side helpers. Segment bodies are composed in memory before their
// headers (which carry byte counts) can be emitted, so these append to a
// Vec rather than stream to a writer.

#[inline]
pub fn put_u8(buf: &mut Vec<u8>, v: u8) {
    buf.push(v);
}

#[inline]
pub fn put_u16(buf: &mut Vec<u8>, v: u16) {
    let mut b = [0u8; 2];
    LittleEndian::write_u16(&mut b, v);
    buf.extend_from_slice(&b);
}

#[inline]
pub fn put_i16(buf: &mut Vec<u8>, v: i16) {
    put_u16(buf, v as u16);
}

#[inline]
pub fn put_u32(buf: &mut Vec<u8>, v: u32) {
    let mut b = [0u8; 4];
    LittleEndian::write_u32(&mut b, v);
    buf.extend_from_slice(&b);
}

#[inline]
pub fn put_i32(buf: &mut Vec<u8>, v: i32) {
    put_u32(buf, v as u32);
}

#[inline]
pub fn put_f32(buf: &mut Vec<u8>, v: f32) {
    put_u32(buf, v.to_bits());
}

#[inline]
pub fn put_u32_be(buf: &mut Vec<u8>, v: u32) {
    let mut b = [0u8; 4];
    BigEndian::write_u32(&mut b, v);
    buf.extend_from_slice(&b);
}

#[inline]
pub fn put_vec3(buf: &mut Vec<u8>, v: Vec3) {
    put_f32(buf, v.x);
    put_f32(buf, v.y);
    put_f32(buf, v.z);
}

#[inline]
pub fn put_bbox(buf: &mut Vec<u8>, b: &BBox3f) {
    put_vec3(buf, b.min);
    put_vec3(buf, b.max);
}

#[inline]
pub fn put_count_range(buf: &mut Vec<u8>, r: CountRange) {
    put_i32(buf, r.min);
    put_i32(buf, r.max);
}

pub fn put_vec_i32(buf: &mut Vec<u8>, values: &[i32]) {
    put_i32(buf, values.len() as i32);
    for &v in values {
        put_i32(buf, v);
    }
}

pub fn put_vec_f32(buf: &mut Vec<u8>, values: &[f32]) {
    put_i32(buf, values.len() as i32);
    for &v in values {
        put_f32(buf, v);
    }
}

pub fn put_mb_string(buf: &mut Vec<u8>, s: &str) {
    let units: Vec<u16> = s.encode_utf16().collect();
    put_i32(buf, units.len() as i32);
    for u in units {
        put_u16(buf, u);
    }
}

/// Encoded size of a count-prefixed UTF-16 string.
pub fn mb_string_len(s: &str) -> usize {
    4 + 2 * s.encode_utf16().count()
}

/// Encoded size of a count-prefixed 4-byte-element array.
#[inline]
pub fn vec32_len(count: usize) -> usize {
    4 + 4 * count
}
