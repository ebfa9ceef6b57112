//! Property atoms: the key/value payload elements referenced by the
//! property table.

use std::fmt;

use time::OffsetDateTime;

use crate::guid::Guid;
use crate::io::{self, ByteCursor};
use crate::util::Result;

/// Fields common to every property atom.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AtomData {
    pub object_id: i32,
    pub state_flags: u32,
}

impl AtomData {
    pub const SIZE: usize = 8;

    pub fn new(object_id: i32) -> Self {
        Self { object_id, state_flags: 0 }
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        io::put_i32(buf, self.object_id);
        io::put_u32(buf, self.state_flags);
    }

    pub fn decode(cur: &mut ByteCursor) -> Result<Self> {
        let object_id = cur.read_i32()?;
        let state_flags = cur.read_u32()?;
        Ok(Self { object_id, state_flags })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StringAtom {
    pub atom: AtomData,
    pub value: String,
}

impl StringAtom {
    pub fn new(object_id: i32, value: impl Into<String>) -> Self {
        Self { atom: AtomData::new(object_id), value: value.into() }
    }

    pub fn byte_count(&self) -> usize {
        AtomData::SIZE + io::mb_string_len(&self.value)
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        self.atom.encode(buf);
        io::put_mb_string(buf, &self.value);
    }

    pub fn decode(cur: &mut ByteCursor) -> Result<Self> {
        let atom = AtomData::decode(cur)?;
        let value = cur.read_mb_string()?;
        Ok(Self { atom, value })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntegerAtom {
    pub atom: AtomData,
    pub value: i32,
}

impl IntegerAtom {
    pub fn new(object_id: i32, value: i32) -> Self {
        Self { atom: AtomData::new(object_id), value }
    }

    pub fn byte_count(&self) -> usize {
        AtomData::SIZE + 4
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        self.atom.encode(buf);
        io::put_i32(buf, self.value);
    }

    pub fn decode(cur: &mut ByteCursor) -> Result<Self> {
        let atom = AtomData::decode(cur)?;
        let value = cur.read_i32()?;
        Ok(Self { atom, value })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FloatAtom {
    pub atom: AtomData,
    pub value: f32,
}

impl FloatAtom {
    pub fn new(object_id: i32, value: f32) -> Self {
        Self { atom: AtomData::new(object_id), value }
    }

    pub fn byte_count(&self) -> usize {
        AtomData::SIZE + 4
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        self.atom.encode(buf);
        io::put_f32(buf, self.value);
    }

    pub fn decode(cur: &mut ByteCursor) -> Result<Self> {
        let atom = AtomData::decode(cur)?;
        let value = cur.read_f32()?;
        Ok(Self { atom, value })
    }
}

/// Calendar timestamp with second precision, six 16-bit fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JtDate {
    pub year: i16,
    pub month: i16,
    pub day: i16,
    pub hour: i16,
    pub minute: i16,
    pub second: i16,
}

impl JtDate {
    pub const SIZE: usize = 12;

    pub fn now() -> Self {
        OffsetDateTime::now_utc().into()
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        io::put_i16(buf, self.year);
        io::put_i16(buf, self.month);
        io::put_i16(buf, self.day);
        io::put_i16(buf, self.hour);
        io::put_i16(buf, self.minute);
        io::put_i16(buf, self.second);
    }

    pub fn decode(cur: &mut ByteCursor) -> Result<Self> {
        Ok(Self {
            year: cur.read_i16()?,
            month: cur.read_i16()?,
            day: cur.read_i16()?,
            hour: cur.read_i16()?,
            minute: cur.read_i16()?,
            second: cur.read_i16()?,
        })
    }
}

impl From<OffsetDateTime> for JtDate {
    fn from(dt: OffsetDateTime) -> Self {
        Self {
            year: dt.year() as i16,
            month: u8::from(dt.month()) as i16,
            day: dt.day() as i16,
            hour: dt.hour() as i16,
            minute: dt.minute() as i16,
            second: dt.second() as i16,
        }
    }
}

impl fmt::Display for JtDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DateAtom {
    pub atom: AtomData,
    pub date: JtDate,
}

impl DateAtom {
    pub fn new(object_id: i32, date: JtDate) -> Self {
        Self { atom: AtomData::new(object_id), date }
    }

    pub fn byte_count(&self) -> usize {
        AtomData::SIZE + JtDate::SIZE
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        self.atom.encode(buf);
        self.date.encode(buf);
    }

    pub fn decode(cur: &mut ByteCursor) -> Result<Self> {
        let atom = AtomData::decode(cur)?;
        let date = JtDate::decode(cur)?;
        Ok(Self { atom, date })
    }
}

/// Pointer into another segment of the file, identified by segment GUID.
#[derive(Debug, Clone, PartialEq)]
pub struct LateLoadedAtom {
    pub atom: AtomData,
    pub segment_guid: Guid,
    pub segment_type: i32,
}

impl LateLoadedAtom {
    pub fn new(object_id: i32, segment_guid: Guid, segment_type: i32) -> Self {
        Self { atom: AtomData::new(object_id), segment_guid, segment_type }
    }

    pub fn byte_count(&self) -> usize {
        AtomData::SIZE + Guid::SIZE + 4
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        self.atom.encode(buf);
        self.segment_guid.encode(buf);
        io::put_i32(buf, self.segment_type);
    }

    pub fn decode(cur: &mut ByteCursor) -> Result<Self> {
        let atom = AtomData::decode(cur)?;
        let segment_guid = Guid::decode(cur)?;
        let segment_type = cur.read_i32()?;
        Ok(Self { atom, segment_guid, segment_type })
    }
}
