//! Logical scene graph segment: two element lists and the property
//! table, each list closed by an end marker.

use crate::element::{registry, GraphElement, PropertyAtom};
use crate::io::ByteCursor;
use crate::property::PropertyTable;
use crate::segment::header::ElementHeader;
use crate::util::{Error, Result};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LsgSegment {
    pub graph_elements: Vec<GraphElement>,
    pub property_atoms: Vec<PropertyAtom>,
    pub property_table: PropertyTable,
}

impl LsgSegment {
    const END_MARKER_SIZE: usize = 20;

    pub fn element_by_id(&self, object_id: i32) -> Option<&GraphElement> {
        self.graph_elements.iter().find(|e| e.object_id() == object_id)
    }

    pub fn atom_by_id(&self, object_id: i32) -> Option<&PropertyAtom> {
        self.property_atoms.iter().find(|a| a.object_id() == object_id)
    }

    pub fn byte_count(&self) -> usize {
        let graph: usize =
            self.graph_elements.iter().map(|e| ElementHeader::SIZE + e.byte_count()).sum();
        let atoms: usize =
            self.property_atoms.iter().map(|a| ElementHeader::SIZE + a.byte_count()).sum();
        graph
            + Self::END_MARKER_SIZE
            + atoms
            + Self::END_MARKER_SIZE
            + self.property_table.byte_count()
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        for element in &self.graph_elements {
            ElementHeader::for_kind(element.kind(), element.byte_count()).encode(buf);
            element.encode_body(buf);
        }
        ElementHeader::write_end_of_elements(buf);

        for atom in &self.property_atoms {
            ElementHeader::for_kind(atom.kind(), atom.byte_count()).encode(buf);
            atom.encode_body(buf);
        }
        ElementHeader::write_end_of_elements(buf);

        self.property_table.encode(buf);
    }

    /// Elements are self-delimiting, so decoding walks the lists and
    /// ignores the per-element length fields.
    pub fn decode(cur: &mut ByteCursor) -> Result<Self> {
        let mut graph_elements = Vec::new();
        while let Some(header) = ElementHeader::decode(cur)? {
            let entry = registry::entry_for_type_id(&header.type_guid).ok_or_else(|| {
                Error::unsupported(format!(
                    "unknown graph element object type {}",
                    header.type_guid
                ))
            })?;
            graph_elements.push(GraphElement::decode_body(entry.kind, cur)?);
        }

        let mut property_atoms = Vec::new();
        while let Some(header) = ElementHeader::decode(cur)? {
            let entry = registry::entry_for_type_id(&header.type_guid).ok_or_else(|| {
                Error::unsupported(format!(
                    "unknown property atom object type {}",
                    header.type_guid
                ))
            })?;
            property_atoms.push(PropertyAtom::decode_body(entry.kind, cur)?);
        }

        let property_table = PropertyTable::decode(cur)?;
        debug_assert_eq!(cur.remaining(), 0, "trailing bytes after LSG property table");

        Ok(Self { graph_elements, property_atoms, property_table })
    }
}
