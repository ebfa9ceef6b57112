//! Static table of format-defined element types.
//!
//! Every serializable element kind maps to exactly one 16-byte type id and
//! a base-type discriminant byte; parsing dispatches through the same
//! table in the other direction. The identifiers are format constants and
//! must match the published JT 8.1 values digit for digit.

use crate::guid::Guid;

/// Discriminates the element families in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    InstanceNode,
    GroupNode,
    MetaDataNode,
    PartNode,
    RangeLodNode,
    PartitionNode,
    TriStripSetShapeNode,
    MaterialAttribute,
    GeometricTransformAttribute,
    StringAtom,
    IntegerAtom,
    FloatAtom,
    DateAtom,
    LateLoadedAtom,
    PropertyProxyMetaData,
    TriStripSetShapeLod,
}

/// One registry row: type id, kind, base-type byte.
#[derive(Debug, Clone, Copy)]
pub struct TypeEntry {
    pub type_id: Guid,
    pub kind: ElementKind,
    pub base_type: u8,
}

const D4_9B6B: [u8; 8] = [0x9b, 0x6b, 0x00, 0x80, 0xc7, 0xbb, 0x59, 0x97];
const D4_A506: [u8; 8] = [0xa5, 0x06, 0x00, 0x60, 0x97, 0xbd, 0xc6, 0xe1];

pub const TYPE_TABLE: [TypeEntry; 16] = [
    TypeEntry {
        type_id: Guid::new(0x10dd_102a, 0x2ac8, 0x11d1, D4_9B6B),
        kind: ElementKind::InstanceNode,
        base_type: 0,
    },
    TypeEntry {
        type_id: Guid::new(0x10dd_103e, 0x2ac8, 0x11d1, D4_9B6B),
        kind: ElementKind::PartitionNode,
        base_type: 1,
    },
    TypeEntry {
        type_id: Guid::new(0xce35_7245, 0x38fb, 0x11d1, D4_A506),
        kind: ElementKind::MetaDataNode,
        base_type: 1,
    },
    TypeEntry {
        type_id: Guid::new(0xce35_7244, 0x38fb, 0x11d1, D4_A506),
        kind: ElementKind::PartNode,
        base_type: 1,
    },
    TypeEntry {
        type_id: Guid::new(0x10dd_104c, 0x2ac8, 0x11d1, D4_9B6B),
        kind: ElementKind::RangeLodNode,
        base_type: 1,
    },
    TypeEntry {
        type_id: Guid::new(0x10dd_101b, 0x2ac8, 0x11d1, D4_9B6B),
        kind: ElementKind::GroupNode,
        base_type: 1,
    },
    TypeEntry {
        type_id: Guid::new(0x10dd_1077, 0x2ac8, 0x11d1, D4_9B6B),
        kind: ElementKind::TriStripSetShapeNode,
        base_type: 2,
    },
    TypeEntry {
        type_id: Guid::new(0x10dd_1030, 0x2ac8, 0x11d1, D4_9B6B),
        kind: ElementKind::MaterialAttribute,
        base_type: 3,
    },
    TypeEntry {
        type_id: Guid::new(0x10dd_1083, 0x2ac8, 0x11d1, D4_9B6B),
        kind: ElementKind::GeometricTransformAttribute,
        base_type: 3,
    },
    TypeEntry {
        type_id: Guid::new(0x10dd_106e, 0x2ac8, 0x11d1, D4_9B6B),
        kind: ElementKind::StringAtom,
        base_type: 5,
    },
    TypeEntry {
        type_id: Guid::new(0x10dd_1019, 0x2ac8, 0x11d1, D4_9B6B),
        kind: ElementKind::FloatAtom,
        base_type: 5,
    },
    TypeEntry {
        type_id: Guid::new(0x10dd_102b, 0x2ac8, 0x11d1, D4_9B6B),
        kind: ElementKind::IntegerAtom,
        base_type: 5,
    },
    TypeEntry {
        type_id: Guid::new(0xce35_7246, 0x38fb, 0x11d1, D4_A506),
        kind: ElementKind::DateAtom,
        base_type: 5,
    },
    TypeEntry {
        type_id: Guid::new(0xe0b0_5be5, 0xfbbd, 0x11d1, [0xa3, 0xa7, 0x00, 0xaa, 0x00, 0xd1, 0x09, 0x54]),
        kind: ElementKind::LateLoadedAtom,
        base_type: 8,
    },
    TypeEntry {
        type_id: Guid::new(0xce35_7247, 0x38fb, 0x11d1, D4_A506),
        kind: ElementKind::PropertyProxyMetaData,
        base_type: 9,
    },
    TypeEntry {
        type_id: Guid::new(0x10dd_10ab, 0x2ac8, 0x11d1, D4_9B6B),
        kind: ElementKind::TriStripSetShapeLod,
        base_type: 4,
    },
];

/// Look up the registry row for a type id read from a stream.
pub fn entry_for_type_id(id: &Guid) -> Option<&'static TypeEntry> {
    TYPE_TABLE.iter().find(|e| e.type_id == *id)
}

/// Registry row for a kind; total over all kinds.
pub fn entry_for_kind(kind: ElementKind) -> &'static TypeEntry {
    let index = match kind {
        ElementKind::InstanceNode => 0,
        ElementKind::PartitionNode => 1,
        ElementKind::MetaDataNode => 2,
        ElementKind::PartNode => 3,
        ElementKind::RangeLodNode => 4,
        ElementKind::GroupNode => 5,
        ElementKind::TriStripSetShapeNode => 6,
        ElementKind::MaterialAttribute => 7,
        ElementKind::GeometricTransformAttribute => 8,
        ElementKind::StringAtom => 9,
        ElementKind::FloatAtom => 10,
        ElementKind::IntegerAtom => 11,
        ElementKind::DateAtom => 12,
        ElementKind::LateLoadedAtom => 13,
        ElementKind::PropertyProxyMetaData => 14,
        ElementKind::TriStripSetShapeLod => 15,
    };
    &TYPE_TABLE[index]
}
