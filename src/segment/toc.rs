//! Table of contents: one entry per segment in the file.

use crate::guid::Guid;
use crate::io::{self, ByteCursor};
use crate::util::{Error, Result};

/// TOC record locating one segment. The segment type is stored in the
/// top byte of the attributes word. Offsets cover the segment header,
/// not just the payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TocEntry {
    pub segment_id: Guid,
    pub offset: i32,
    pub length: i32,
    pub attributes: u32,
}

impl TocEntry {
    pub const SIZE: usize = Guid::SIZE + 12;

    /// Entry with the offset still unassigned.
    pub fn new(segment_id: Guid, segment_type: i32, length: i32) -> Self {
        Self { segment_id, offset: -1, length, attributes: (segment_type as u32) << 24 }
    }

    pub fn segment_type(&self) -> i32 {
        (self.attributes >> 24) as i32
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        self.segment_id.encode(buf);
        io::put_i32(buf, self.offset);
        io::put_i32(buf, self.length);
        io::put_u32(buf, self.attributes);
    }

    pub fn decode(cur: &mut ByteCursor) -> Result<Self> {
        let segment_id = Guid::decode(cur)?;
        let offset = cur.read_i32()?;
        let length = cur.read_i32()?;
        let attributes = cur.read_u32()?;
        Ok(Self { segment_id, offset, length, attributes })
    }
}

/// The entry list written directly after the file header.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TocSegment {
    pub entries: Vec<TocEntry>,
}

impl TocSegment {
    /// Wraps the entry list, repeating a lone entry: single-entry
    /// tables confuse some viewers.
    pub fn new(mut entries: Vec<TocEntry>) -> Self {
        if entries.len() == 1 {
            entries.push(entries[0]);
        }
        Self { entries }
    }

    /// Assigns sequential offsets to all entries, starting at
    /// `segments_start`. Runs of entries repeating the same segment
    /// share one offset.
    pub fn assign_offsets(&mut self, segments_start: i32) {
        let mut next_offset = segments_start;
        let mut previous: Option<(Guid, i32)> = None;
        for entry in &mut self.entries {
            if let Some((id, offset)) = previous {
                if id == entry.segment_id {
                    entry.offset = offset;
                    continue;
                }
            }
            entry.offset = next_offset;
            next_offset += entry.length;
            previous = Some((entry.segment_id, entry.offset));
        }
    }

    pub fn byte_count(&self) -> usize {
        4 + self.entries.len() * TocEntry::SIZE
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        io::put_i32(buf, self.entries.len() as i32);
        for entry in &self.entries {
            entry.encode(buf);
        }
    }

    pub fn decode(cur: &mut ByteCursor) -> Result<Self> {
        let count = cur.read_i32()?;
        if count < 0 {
            return Err(Error::invalid(format!("TOC entry count {} is negative", count)));
        }
        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            entries.push(TocEntry::decode(cur)?);
        }
        Ok(Self { entries })
    }
}
