//! File, segment and element headers.

use crate::compress;
use crate::element::registry::{self, ElementKind};
use crate::guid::Guid;
use crate::io::{self, ByteCursor, Endian};
use crate::util::{Error, Result};

/// 80-character version field, a byte-order flag, a reserved word, the
/// TOC offset and the id of the LSG segment.
#[derive(Debug, Clone, PartialEq)]
pub struct FileHeader {
    pub version: String,
    pub byte_order: Endian,
    pub reserved: i32,
    pub toc_offset: i32,
    pub lsg_segment_id: Guid,
}

impl FileHeader {
    pub const SIZE: usize = 105;
    pub const VERSION: &'static str = "Version 8.1 JT";

    const VERSION_FIELD_LEN: usize = 80;
    const VERSION_ENDING: &'static [u8; 5] = b" \n\r\n ";

    /// Header for a new file whose TOC follows immediately.
    pub fn new(lsg_segment_id: Guid) -> Self {
        Self {
            version: Self::VERSION.to_string(),
            byte_order: Endian::Little,
            reserved: 0,
            toc_offset: Self::SIZE as i32,
            lsg_segment_id,
        }
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        let mut field = [b' '; Self::VERSION_FIELD_LEN];
        let text = self.version.as_bytes();
        let text_len = text.len().min(Self::VERSION_FIELD_LEN - Self::VERSION_ENDING.len());
        field[..text_len].copy_from_slice(&text[..text_len]);
        field[Self::VERSION_FIELD_LEN - Self::VERSION_ENDING.len()..]
            .copy_from_slice(Self::VERSION_ENDING);
        buf.extend_from_slice(&field);
        io::put_u8(buf, self.byte_order.header_byte());
        io::put_i32(buf, self.reserved);
        io::put_i32(buf, self.toc_offset);
        self.lsg_segment_id.encode(buf);
    }

    /// Reads the header and switches the cursor to the byte order the
    /// file declares, so every later field is read correctly.
    pub fn decode(cur: &mut ByteCursor) -> Result<Self> {
        let field = cur.take(Self::VERSION_FIELD_LEN)?;
        if !field.starts_with(b"Version ") {
            return Err(Error::InvalidMagic);
        }
        let text_len = Self::VERSION_FIELD_LEN - Self::VERSION_ENDING.len();
        let version = String::from_utf8_lossy(&field[..text_len]).trim_end().to_string();
        let byte_order = Endian::from_header_byte(cur.read_u8()?)?;
        cur.set_order(byte_order);
        let reserved = cur.read_i32()?;
        let toc_offset = cur.read_i32()?;
        let lsg_segment_id = Guid::decode(cur)?;
        Ok(Self { version, byte_order, reserved, toc_offset, lsg_segment_id })
    }
}

/// Leading header of every segment body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentHeader {
    pub segment_id: Guid,
    pub segment_type: i32,
    pub length: i32,
}

impl SegmentHeader {
    pub const SIZE: usize = Guid::SIZE + 8;

    pub fn new(segment_id: Guid, segment_type: i32, length: i32) -> Self {
        Self { segment_id, segment_type, length }
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        self.segment_id.encode(buf);
        io::put_i32(buf, self.segment_type);
        io::put_i32(buf, self.length);
    }

    pub fn decode(cur: &mut ByteCursor) -> Result<Self> {
        let segment_id = Guid::decode(cur)?;
        let segment_type = cur.read_i32()?;
        let length = cur.read_i32()?;
        Ok(Self { segment_id, segment_type, length })
    }
}

/// Per-element header inside a segment. The element lists of an LSG
/// segment are terminated by a marker record that carries the all-ones
/// GUID and no base-type byte; [`ElementHeader::decode`] returns `None`
/// for it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementHeader {
    pub length: i32,
    pub type_guid: Guid,
    pub base_type: u8,
}

impl ElementHeader {
    pub const SIZE: usize = 4 + Guid::SIZE + 1;

    /// Header for an element of the given kind with a `body_len`-byte
    /// body. The stored length covers the GUID and base-type byte too.
    pub fn for_kind(kind: ElementKind, body_len: usize) -> Self {
        let entry = registry::entry_for_kind(kind);
        Self {
            length: (body_len + Guid::SIZE + 1) as i32,
            type_guid: entry.type_id,
            base_type: entry.base_type,
        }
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        io::put_i32(buf, self.length);
        self.type_guid.encode(buf);
        io::put_u8(buf, self.base_type);
    }

    pub fn write_end_of_elements(buf: &mut Vec<u8>) {
        io::put_i32(buf, Guid::SIZE as i32);
        Guid::END_OF_ELEMENTS.encode(buf);
    }

    pub fn decode(cur: &mut ByteCursor) -> Result<Option<Self>> {
        let length = cur.read_i32()?;
        let type_guid = Guid::decode(cur)?;
        if type_guid == Guid::END_OF_ELEMENTS {
            return Ok(None);
        }
        let base_type = cur.read_u8()?;
        Ok(Some(Self { length, type_guid, base_type }))
    }
}

/// Compression header preceding LSG and Meta-Data segment payloads.
/// The declared length includes the algorithm byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogicElementHeaderZlib {
    pub compression_flag: i32,
    pub compressed_length: i32,
    pub algorithm: u8,
}

impl LogicElementHeaderZlib {
    pub const SIZE: usize = 9;

    const FLAG_NONE: i32 = 1;
    const FLAG_COMPRESSED: i32 = 2;
    const ALGORITHM_ZLIB: u8 = 2;

    pub fn for_payload(compressed_len: usize) -> Self {
        Self {
            compression_flag: Self::FLAG_COMPRESSED,
            compressed_length: compressed_len as i32 + 1,
            algorithm: Self::ALGORITHM_ZLIB,
        }
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        io::put_i32(buf, self.compression_flag);
        io::put_i32(buf, self.compressed_length);
        io::put_u8(buf, self.algorithm);
    }

    /// Reads the header and the payload it describes, inflating when
    /// the flag says so.
    pub fn read_payload(cur: &mut ByteCursor) -> Result<Vec<u8>> {
        let compression_flag = cur.read_i32()?;
        match compression_flag {
            Self::FLAG_NONE | Self::FLAG_COMPRESSED => {}
            other => {
                return Err(Error::unsupported(format!(
                    "unknown segment compression flag {}",
                    other
                )))
            }
        }
        let compressed_length = cur.read_i32()?;
        if compressed_length < 1 {
            return Err(Error::invalid(format!(
                "declared compressed length {} is too small",
                compressed_length
            )));
        }
        let algorithm = cur.read_u8()?;
        let data = cur.take(compressed_length as usize - 1)?;
        if compression_flag == Self::FLAG_NONE {
            return Ok(data.to_vec());
        }
        if algorithm != Self::ALGORITHM_ZLIB {
            return Err(Error::unsupported(format!(
                "unknown segment compression algorithm {}",
                algorithm
            )));
        }
        compress::inflate(data)
    }
}
