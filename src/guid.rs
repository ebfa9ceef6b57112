//! 16-byte object and segment identifiers.
//!
//! JT stores GUIDs in the Microsoft wire layout: the three leading fields
//! follow the file byte order while the trailing eight bytes are written
//! verbatim. The asymmetry is intentional and must be preserved.

use std::fmt;

use crate::io::{self, ByteCursor};
use crate::util::Result;

/// Format-defined object/segment identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Guid {
    pub data1: u32,
    pub data2: u16,
    pub data3: u16,
    pub data4: [u8; 8],
}

impl Guid {
    /// Encoded size in bytes.
    pub const SIZE: usize = 16;

    /// Terminates element lists inside a segment body.
    pub const END_OF_ELEMENTS: Self = Self::new(
        0xffff_ffff,
        0xffff,
        0xffff,
        [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff],
    );

    pub const fn new(data1: u32, data2: u16, data3: u16, data4: [u8; 8]) -> Self {
        Self { data1, data2, data3, data4 }
    }

    /// Fresh random identifier (version 4, CSPRNG-backed).
    pub fn random() -> Self {
        let bytes = *uuid::Uuid::new_v4().as_bytes();
        Self {
            data1: u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            data2: u16::from_be_bytes([bytes[4], bytes[5]]),
            data3: u16::from_be_bytes([bytes[6], bytes[7]]),
            data4: [
                bytes[8], bytes[9], bytes[10], bytes[11], bytes[12], bytes[13], bytes[14],
                bytes[15],
            ],
        }
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        io::put_u32(buf, self.data1);
        io::put_u16(buf, self.data2);
        io::put_u16(buf, self.data3);
        buf.extend_from_slice(&self.data4);
    }

    pub fn decode(cur: &mut ByteCursor) -> Result<Self> {
        let data1 = cur.read_u32()?;
        let data2 = cur.read_u16()?;
        let data3 = cur.read_u16()?;
        let mut data4 = [0u8; 8];
        data4.copy_from_slice(cur.take(8)?);
        Ok(Self { data1, data2, data3, data4 })
    }
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{0x{:08x},0x{:04x},0x{:04x},{{0x{:02x},0x{:02x},0x{:02x},0x{:02x},0x{:02x},0x{:02x},0x{:02x},0x{:02x}}}}}",
            self.data1,
            self.data2,
            self.data3,
            self.data4[0],
            self.data4[1],
            self.data4[2],
            self.data4[3],
            self.data4[4],
            self.data4[5],
            self.data4[6],
            self.data4[7],
        )
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
