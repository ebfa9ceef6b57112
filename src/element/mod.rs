//! Typed elements of the JT data model.
//!
//! Elements are grouped into three wire families: graph elements
//! (nodes and attributes, first list of an LSG segment), property
//! atoms (second list), and the segment-payload elements carried by
//! Shape-LOD and Meta-Data segments.

pub mod atom;
pub mod attribute;
pub mod node;
pub mod proxy;
pub mod registry;
pub mod shape;

pub use atom::{
    AtomData, DateAtom, FloatAtom, IntegerAtom, JtDate, LateLoadedAtom, StringAtom,
};
pub use attribute::{AttributeData, GeometricTransformAttribute, MaterialAttribute};
pub use node::{
    GroupNode, InstanceNode, LodData, MetaDataNode, NodeData, PartNode, PartitionNode,
    RangeLodNode, ShapeData, TriStripSetShapeNode, VertexShapeData,
};
pub use proxy::{PropertyProxyMetaDataElement, ProxyValue};
pub use registry::ElementKind;
pub use shape::{
    DecodedVertices, LosslessVertexData, QuantizationParams, TriStripSetShapeLodElement,
    VertexRepData,
};

use crate::io::ByteCursor;
use crate::util::{Error, Result};

/// Node or attribute element of the scene graph.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphElement {
    Instance(InstanceNode),
    Group(GroupNode),
    MetaData(MetaDataNode),
    Part(PartNode),
    RangeLod(RangeLodNode),
    Partition(PartitionNode),
    TriStripSetShape(TriStripSetShapeNode),
    Material(MaterialAttribute),
    Transform(GeometricTransformAttribute),
}

impl GraphElement {
    pub fn kind(&self) -> ElementKind {
        match self {
            GraphElement::Instance(_) => ElementKind::InstanceNode,
            GraphElement::Group(_) => ElementKind::GroupNode,
            GraphElement::MetaData(_) => ElementKind::MetaDataNode,
            GraphElement::Part(_) => ElementKind::PartNode,
            GraphElement::RangeLod(_) => ElementKind::RangeLodNode,
            GraphElement::Partition(_) => ElementKind::PartitionNode,
            GraphElement::TriStripSetShape(_) => ElementKind::TriStripSetShapeNode,
            GraphElement::Material(_) => ElementKind::MaterialAttribute,
            GraphElement::Transform(_) => ElementKind::GeometricTransformAttribute,
        }
    }

    pub fn object_id(&self) -> i32 {
        match self {
            GraphElement::Instance(e) => e.node.object_id,
            GraphElement::Group(e) => e.node.object_id,
            GraphElement::MetaData(e) => e.group.node.object_id,
            GraphElement::Part(e) => e.meta.group.node.object_id,
            GraphElement::RangeLod(e) => e.lod.group.node.object_id,
            GraphElement::Partition(e) => e.group.node.object_id,
            GraphElement::TriStripSetShape(e) => e.vertex.shape.node.object_id,
            GraphElement::Material(e) => e.attr.object_id,
            GraphElement::Transform(e) => e.attr.object_id,
        }
    }

    /// Shared node fields, when this element is a node at all.
    pub fn node_data(&self) -> Option<&NodeData> {
        match self {
            GraphElement::Instance(e) => Some(&e.node),
            GraphElement::Group(e) => Some(&e.node),
            GraphElement::MetaData(e) => Some(&e.group.node),
            GraphElement::Part(e) => Some(&e.meta.group.node),
            GraphElement::RangeLod(e) => Some(&e.lod.group.node),
            GraphElement::Partition(e) => Some(&e.group.node),
            GraphElement::TriStripSetShape(e) => Some(&e.vertex.shape.node),
            GraphElement::Material(_) | GraphElement::Transform(_) => None,
        }
    }

    /// Child ids of grouping nodes; empty for everything else.
    pub fn child_ids(&self) -> &[i32] {
        match self {
            GraphElement::Group(e) => &e.child_ids,
            GraphElement::MetaData(e) => &e.group.child_ids,
            GraphElement::Part(e) => &e.meta.group.child_ids,
            GraphElement::RangeLod(e) => &e.lod.group.child_ids,
            GraphElement::Partition(e) => &e.group.child_ids,
            _ => &[],
        }
    }

    pub fn byte_count(&self) -> usize {
        match self {
            GraphElement::Instance(e) => e.byte_count(),
            GraphElement::Group(e) => e.byte_count(),
            GraphElement::MetaData(e) => e.byte_count(),
            GraphElement::Part(e) => e.byte_count(),
            GraphElement::RangeLod(e) => e.byte_count(),
            GraphElement::Partition(e) => e.byte_count(),
            GraphElement::TriStripSetShape(e) => e.byte_count(),
            GraphElement::Material(e) => e.byte_count(),
            GraphElement::Transform(e) => e.byte_count(),
        }
    }

    pub fn encode_body(&self, buf: &mut Vec<u8>) {
        match self {
            GraphElement::Instance(e) => e.encode(buf),
            GraphElement::Group(e) => e.encode(buf),
            GraphElement::MetaData(e) => e.encode(buf),
            GraphElement::Part(e) => e.encode(buf),
            GraphElement::RangeLod(e) => e.encode(buf),
            GraphElement::Partition(e) => e.encode(buf),
            GraphElement::TriStripSetShape(e) => e.encode(buf),
            GraphElement::Material(e) => e.encode(buf),
            GraphElement::Transform(e) => e.encode(buf),
        }
    }

    pub fn decode_body(kind: ElementKind, cur: &mut ByteCursor) -> Result<Self> {
        match kind {
            ElementKind::InstanceNode => Ok(GraphElement::Instance(InstanceNode::decode(cur)?)),
            ElementKind::GroupNode => Ok(GraphElement::Group(GroupNode::decode(cur)?)),
            ElementKind::MetaDataNode => Ok(GraphElement::MetaData(MetaDataNode::decode(cur)?)),
            ElementKind::PartNode => Ok(GraphElement::Part(PartNode::decode(cur)?)),
            ElementKind::RangeLodNode => Ok(GraphElement::RangeLod(RangeLodNode::decode(cur)?)),
            ElementKind::PartitionNode => {
                Ok(GraphElement::Partition(PartitionNode::decode(cur)?))
            }
            ElementKind::TriStripSetShapeNode => {
                Ok(GraphElement::TriStripSetShape(TriStripSetShapeNode::decode(cur)?))
            }
            ElementKind::MaterialAttribute => {
                Ok(GraphElement::Material(MaterialAttribute::decode(cur)?))
            }
            ElementKind::GeometricTransformAttribute => {
                Ok(GraphElement::Transform(GeometricTransformAttribute::decode(cur)?))
            }
            other => Err(Error::invalid(format!(
                "{:?} cannot appear in the graph element list",
                other
            ))),
        }
    }
}

/// Property atom element.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyAtom {
    String(StringAtom),
    Integer(IntegerAtom),
    Float(FloatAtom),
    Date(DateAtom),
    LateLoaded(LateLoadedAtom),
}

impl PropertyAtom {
    pub fn kind(&self) -> ElementKind {
        match self {
            PropertyAtom::String(_) => ElementKind::StringAtom,
            PropertyAtom::Integer(_) => ElementKind::IntegerAtom,
            PropertyAtom::Float(_) => ElementKind::FloatAtom,
            PropertyAtom::Date(_) => ElementKind::DateAtom,
            PropertyAtom::LateLoaded(_) => ElementKind::LateLoadedAtom,
        }
    }

    pub fn object_id(&self) -> i32 {
        match self {
            PropertyAtom::String(a) => a.atom.object_id,
            PropertyAtom::Integer(a) => a.atom.object_id,
            PropertyAtom::Float(a) => a.atom.object_id,
            PropertyAtom::Date(a) => a.atom.object_id,
            PropertyAtom::LateLoaded(a) => a.atom.object_id,
        }
    }

    pub fn byte_count(&self) -> usize {
        match self {
            PropertyAtom::String(a) => a.byte_count(),
            PropertyAtom::Integer(a) => a.byte_count(),
            PropertyAtom::Float(a) => a.byte_count(),
            PropertyAtom::Date(a) => a.byte_count(),
            PropertyAtom::LateLoaded(a) => a.byte_count(),
        }
    }

    pub fn encode_body(&self, buf: &mut Vec<u8>) {
        match self {
            PropertyAtom::String(a) => a.encode(buf),
            PropertyAtom::Integer(a) => a.encode(buf),
            PropertyAtom::Float(a) => a.encode(buf),
            PropertyAtom::Date(a) => a.encode(buf),
            PropertyAtom::LateLoaded(a) => a.encode(buf),
        }
    }

    pub fn decode_body(kind: ElementKind, cur: &mut ByteCursor) -> Result<Self> {
        match kind {
            ElementKind::StringAtom => Ok(PropertyAtom::String(StringAtom::decode(cur)?)),
            ElementKind::IntegerAtom => Ok(PropertyAtom::Integer(IntegerAtom::decode(cur)?)),
            ElementKind::FloatAtom => Ok(PropertyAtom::Float(FloatAtom::decode(cur)?)),
            ElementKind::DateAtom => Ok(PropertyAtom::Date(DateAtom::decode(cur)?)),
            ElementKind::LateLoadedAtom => {
                Ok(PropertyAtom::LateLoaded(LateLoadedAtom::decode(cur)?))
            }
            other => Err(Error::invalid(format!(
                "{:?} cannot appear in the property atom list",
                other
            ))),
        }
    }
}
