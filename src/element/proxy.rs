//! Property proxy: the sole element kind carried by Meta-Data segments.

use crate::element::atom::JtDate;
use crate::io::{self, ByteCursor};
use crate::util::{Error, Result};

/// Value of one proxied property, tagged on the wire by a type byte.
#[derive(Debug, Clone, PartialEq)]
pub enum ProxyValue {
    String(String),
    Int(i32),
    Float(f32),
    Date(JtDate),
}

impl ProxyValue {
    fn type_byte(&self) -> u8 {
        match self {
            ProxyValue::String(_) => 1,
            ProxyValue::Int(_) => 2,
            ProxyValue::Float(_) => 3,
            ProxyValue::Date(_) => 4,
        }
    }

    fn byte_count(&self) -> usize {
        1 + match self {
            ProxyValue::String(s) => io::mb_string_len(s),
            ProxyValue::Int(_) | ProxyValue::Float(_) => 4,
            ProxyValue::Date(_) => JtDate::SIZE,
        }
    }

    fn encode(&self, buf: &mut Vec<u8>) {
        io::put_u8(buf, self.type_byte());
        match self {
            ProxyValue::String(s) => io::put_mb_string(buf, s),
            ProxyValue::Int(v) => io::put_i32(buf, *v),
            ProxyValue::Float(v) => io::put_f32(buf, *v),
            ProxyValue::Date(d) => d.encode(buf),
        }
    }

    fn decode(cur: &mut ByteCursor) -> Result<Self> {
        match cur.read_u8()? {
            1 => Ok(ProxyValue::String(cur.read_mb_string()?)),
            2 => Ok(ProxyValue::Int(cur.read_i32()?)),
            3 => Ok(ProxyValue::Float(cur.read_f32()?)),
            4 => Ok(ProxyValue::Date(JtDate::decode(cur)?)),
            t => Err(Error::invalid(format!("unknown proxy property value type {}", t))),
        }
    }
}

/// Flat key/value list keyed by strings, terminated on the wire by an
/// empty key. Keys therefore must not be empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PropertyProxyMetaDataElement {
    pub version: i16,
    pub entries: Vec<(String, ProxyValue)>,
}

impl PropertyProxyMetaDataElement {
    pub fn new(entries: Vec<(String, ProxyValue)>) -> Self {
        Self { version: 1, entries }
    }

    pub fn byte_count(&self) -> usize {
        let entries: usize = self
            .entries
            .iter()
            .map(|(key, value)| io::mb_string_len(key) + value.byte_count())
            .sum();
        2 + entries + io::mb_string_len("")
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        io::put_i16(buf, self.version);
        for (key, value) in &self.entries {
            io::put_mb_string(buf, key);
            value.encode(buf);
        }
        io::put_mb_string(buf, "");
    }

    pub fn decode(cur: &mut ByteCursor) -> Result<Self> {
        let version = cur.read_i16()?;
        let mut entries = Vec::new();
        loop {
            let key = cur.read_mb_string()?;
            if key.is_empty() {
                break;
            }
            entries.push((key, ProxyValue::decode(cur)?));
        }
        Ok(Self { version, entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::Endian;

    #[test]
    fn test_round_trip_all_value_types() {
        let element = PropertyProxyMetaDataElement::new(vec![
            ("Description".to_string(), ProxyValue::String("upper housing".to_string())),
            ("Revision".to_string(), ProxyValue::Int(4)),
            ("Mass".to_string(), ProxyValue::Float(0.82)),
            (
                "Created".to_string(),
                ProxyValue::Date(JtDate {
                    year: 2023,
                    month: 11,
                    day: 5,
                    hour: 14,
                    minute: 0,
                    second: 59,
                }),
            ),
        ]);
        let mut buf = Vec::new();
        element.encode(&mut buf);
        assert_eq!(buf.len(), element.byte_count());
        let mut cur = ByteCursor::new(&buf, Endian::Little);
        let back = PropertyProxyMetaDataElement::decode(&mut cur).unwrap();
        assert_eq!(cur.remaining(), 0);
        assert_eq!(back, element);
    }

    #[test]
    fn test_empty_element_is_version_and_terminator() {
        let element = PropertyProxyMetaDataElement::new(Vec::new());
        let mut buf = Vec::new();
        element.encode(&mut buf);
        // version, then a zero-length string
        assert_eq!(buf.len(), 2 + 4);
        let mut cur = ByteCursor::new(&buf, Endian::Little);
        assert_eq!(PropertyProxyMetaDataElement::decode(&mut cur).unwrap(), element);
    }

    #[test]
    fn test_unknown_value_type_rejected() {
        let mut buf = Vec::new();
        io::put_i16(&mut buf, 1);
        io::put_mb_string(&mut buf, "Key");
        io::put_u8(&mut buf, 9);
        let mut cur = ByteCursor::new(&buf, Endian::Little);
        assert!(PropertyProxyMetaDataElement::decode(&mut cur).is_err());
    }
}
