//! Meta-Data segment: a single property proxy element, zlib-wrapped at
//! the file level like the LSG segment.

use crate::element::registry::{self, ElementKind};
use crate::element::PropertyProxyMetaDataElement;
use crate::io::ByteCursor;
use crate::segment::header::ElementHeader;
use crate::util::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct MetaDataSegment {
    pub element: PropertyProxyMetaDataElement,
}

impl MetaDataSegment {
    pub fn new(element: PropertyProxyMetaDataElement) -> Self {
        Self { element }
    }

    pub fn byte_count(&self) -> usize {
        ElementHeader::SIZE + self.element.byte_count()
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        ElementHeader::for_kind(ElementKind::PropertyProxyMetaData, self.element.byte_count())
            .encode(buf);
        self.element.encode(buf);
    }

    pub fn decode(cur: &mut ByteCursor) -> Result<Self> {
        let header = ElementHeader::decode(cur)?
            .ok_or_else(|| Error::invalid("Meta-Data segment starts with an end marker"))?;
        let entry = registry::entry_for_type_id(&header.type_guid);
        match entry.map(|e| e.kind) {
            Some(ElementKind::PropertyProxyMetaData) => {}
            _ => {
                return Err(Error::unsupported(format!(
                    "unknown Meta-Data element object type {}",
                    header.type_guid
                )))
            }
        }
        let element = PropertyProxyMetaDataElement::decode(cur)?;
        debug_assert_eq!(cur.remaining(), 0, "trailing bytes after Meta-Data element");
        Ok(Self { element })
    }
}
