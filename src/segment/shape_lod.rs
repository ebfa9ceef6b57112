//! Shape-LOD segment: a single tri-strip element, stored uncompressed.

use crate::element::registry::{self, ElementKind};
use crate::element::TriStripSetShapeLodElement;
use crate::io::ByteCursor;
use crate::segment::header::ElementHeader;
use crate::util::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct ShapeLodSegment {
    pub element: TriStripSetShapeLodElement,
}

impl ShapeLodSegment {
    pub fn new(element: TriStripSetShapeLodElement) -> Self {
        Self { element }
    }

    pub fn byte_count(&self) -> usize {
        ElementHeader::SIZE + self.element.byte_count()
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        ElementHeader::for_kind(ElementKind::TriStripSetShapeLod, self.element.byte_count())
            .encode(buf);
        self.element.encode(buf);
    }

    pub fn decode(cur: &mut ByteCursor) -> Result<Self> {
        let header = ElementHeader::decode(cur)?
            .ok_or_else(|| Error::invalid("Shape-LOD segment starts with an end marker"))?;
        let entry = registry::entry_for_type_id(&header.type_guid);
        match entry.map(|e| e.kind) {
            Some(ElementKind::TriStripSetShapeLod) => {}
            _ => {
                return Err(Error::unsupported(format!(
                    "unknown Shape-LOD element object type {}",
                    header.type_guid
                )))
            }
        }
        let element = TriStripSetShapeLodElement::decode(cur)?;
        debug_assert_eq!(cur.remaining(), 0, "trailing bytes after Shape-LOD element");
        Ok(Self { element })
    }
}
