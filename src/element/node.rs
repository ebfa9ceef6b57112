//! Scene-graph node elements.
//!
//! Node kinds layer shared field groups rather than forming a class
//! hierarchy: every node embeds [`NodeData`], grouping nodes embed
//! [`GroupNode`], and the LOD/shape kinds stack further field groups on
//! top. Byte layouts nest in the same order the groups are embedded.

use glam::Vec3;
use smallvec::SmallVec;

use crate::element::shape::QuantizationParams;
use crate::io::{self, ByteCursor};
use crate::util::{BBox3f, CountRange, Result};

/// Fields common to every node element.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeData {
    pub object_id: i32,
    pub node_flags: u32,
    pub attribute_ids: SmallVec<[i32; 4]>,
}

impl NodeData {
    pub fn new(object_id: i32) -> Self {
        Self { object_id, ..Self::default() }
    }

    pub fn byte_count(&self) -> usize {
        8 + io::vec32_len(self.attribute_ids.len())
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        io::put_i32(buf, self.object_id);
        io::put_u32(buf, self.node_flags);
        io::put_vec_i32(buf, &self.attribute_ids);
    }

    pub fn decode(cur: &mut ByteCursor) -> Result<Self> {
        let object_id = cur.read_i32()?;
        let node_flags = cur.read_u32()?;
        let attribute_ids = SmallVec::from_vec(cur.read_vec_i32()?);
        Ok(Self { object_id, node_flags, attribute_ids })
    }
}

/// Interior node holding an ordered child list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroupNode {
    pub node: NodeData,
    pub child_ids: Vec<i32>,
}

impl GroupNode {
    pub fn new(object_id: i32) -> Self {
        Self { node: NodeData::new(object_id), child_ids: Vec::new() }
    }

    pub fn byte_count(&self) -> usize {
        self.node.byte_count() + io::vec32_len(self.child_ids.len())
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        self.node.encode(buf);
        io::put_vec_i32(buf, &self.child_ids);
    }

    pub fn decode(cur: &mut ByteCursor) -> Result<Self> {
        let node = NodeData::decode(cur)?;
        let child_ids = cur.read_vec_i32()?;
        Ok(Self { node, child_ids })
    }
}

/// Reference to another node by object id; carries no children of its own.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceNode {
    pub node: NodeData,
    pub child_node_id: i32,
}

impl InstanceNode {
    pub fn new(object_id: i32, child_node_id: i32) -> Self {
        Self { node: NodeData::new(object_id), child_node_id }
    }

    pub fn byte_count(&self) -> usize {
        self.node.byte_count() + 4
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        self.node.encode(buf);
        io::put_i32(buf, self.child_node_id);
    }

    pub fn decode(cur: &mut ByteCursor) -> Result<Self> {
        let node = NodeData::decode(cur)?;
        let child_node_id = cur.read_i32()?;
        Ok(Self { node, child_node_id })
    }
}

/// Group carrying non-geometric payload.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaDataNode {
    pub group: GroupNode,
    pub version: i16,
}

impl MetaDataNode {
    pub fn new(object_id: i32) -> Self {
        Self { group: GroupNode::new(object_id), version: 1 }
    }

    pub fn byte_count(&self) -> usize {
        self.group.byte_count() + 2
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        self.group.encode(buf);
        io::put_i16(buf, self.version);
    }

    pub fn decode(cur: &mut ByteCursor) -> Result<Self> {
        let group = GroupNode::decode(cur)?;
        let version = cur.read_i16()?;
        Ok(Self { group, version })
    }
}

/// Node owning renderable geometry somewhere below it.
#[derive(Debug, Clone, PartialEq)]
pub struct PartNode {
    pub meta: MetaDataNode,
    pub version: i16,
    pub reserved: i32,
}

impl PartNode {
    pub fn new(object_id: i32) -> Self {
        Self { meta: MetaDataNode::new(object_id), version: 1, reserved: 0 }
    }

    pub fn byte_count(&self) -> usize {
        self.meta.byte_count() + 6
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        self.meta.encode(buf);
        io::put_i16(buf, self.version);
        io::put_i32(buf, self.reserved);
    }

    pub fn decode(cur: &mut ByteCursor) -> Result<Self> {
        let meta = MetaDataNode::decode(cur)?;
        let version = cur.read_i16()?;
        let reserved = cur.read_i32()?;
        Ok(Self { meta, version, reserved })
    }
}

/// Level-of-detail grouping fields shared by the LOD node family.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LodData {
    pub group: GroupNode,
    pub reserved_list: Vec<f32>,
    pub reserved: i32,
}

impl LodData {
    pub fn new(object_id: i32) -> Self {
        Self { group: GroupNode::new(object_id), ..Self::default() }
    }

    pub fn byte_count(&self) -> usize {
        self.group.byte_count() + io::vec32_len(self.reserved_list.len()) + 4
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        self.group.encode(buf);
        io::put_vec_f32(buf, &self.reserved_list);
        io::put_i32(buf, self.reserved);
    }

    pub fn decode(cur: &mut ByteCursor) -> Result<Self> {
        let group = GroupNode::decode(cur)?;
        let reserved_list = cur.read_vec_f32()?;
        let reserved = cur.read_i32()?;
        Ok(Self { group, reserved_list, reserved })
    }
}

/// LOD node with selection thresholds and a reference point.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeLodNode {
    pub lod: LodData,
    pub range_limits: Vec<f32>,
    pub center: Vec3,
}

impl RangeLodNode {
    pub fn new(object_id: i32, center: Vec3) -> Self {
        Self { lod: LodData::new(object_id), range_limits: Vec::new(), center }
    }

    pub fn byte_count(&self) -> usize {
        self.lod.byte_count() + io::vec32_len(self.range_limits.len()) + 12
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        self.lod.encode(buf);
        io::put_vec_f32(buf, &self.range_limits);
        io::put_vec3(buf, self.center);
    }

    pub fn decode(cur: &mut ByteCursor) -> Result<Self> {
        let lod = LodData::decode(cur)?;
        let range_limits = cur.read_vec_f32()?;
        let center = cur.read_vec3()?;
        Ok(Self { lod, range_limits, center })
    }
}

/// Root of a file (or of a split-off sub-file), carrying aggregates.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionNode {
    pub group: GroupNode,
    pub file_name: String,
    pub transformed_bbox: BBox3f,
    pub area: f32,
    pub vertex_counts: CountRange,
    pub node_counts: CountRange,
    pub polygon_counts: CountRange,
    pub untransformed_bbox: Option<BBox3f>,
}

impl PartitionNode {
    pub fn new(object_id: i32) -> Self {
        Self {
            group: GroupNode::new(object_id),
            file_name: String::new(),
            transformed_bbox: BBox3f::ZERO,
            area: 0.0,
            vertex_counts: CountRange::default(),
            node_counts: CountRange::default(),
            polygon_counts: CountRange::default(),
            untransformed_bbox: None,
        }
    }

    /// Detached copy of another partition's aggregates under a new id.
    /// Children and attributes are intentionally not carried over.
    pub fn like(object_id: i32, other: &PartitionNode) -> Self {
        Self {
            group: GroupNode::new(object_id),
            file_name: other.file_name.clone(),
            transformed_bbox: other.transformed_bbox,
            area: other.area,
            vertex_counts: other.vertex_counts,
            node_counts: other.node_counts,
            polygon_counts: other.polygon_counts,
            untransformed_bbox: other.untransformed_bbox,
        }
    }

    fn partition_flags(&self) -> i32 {
        self.untransformed_bbox.is_some() as i32
    }

    pub fn byte_count(&self) -> usize {
        self.group.byte_count()
            + 4
            + io::mb_string_len(&self.file_name)
            + 24
            + 4
            + 8 * 3
            + if self.untransformed_bbox.is_some() { 24 } else { 0 }
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        self.group.encode(buf);
        io::put_i32(buf, self.partition_flags());
        io::put_mb_string(buf, &self.file_name);
        io::put_bbox(buf, &self.transformed_bbox);
        io::put_f32(buf, self.area);
        io::put_count_range(buf, self.vertex_counts);
        io::put_count_range(buf, self.node_counts);
        io::put_count_range(buf, self.polygon_counts);
        if let Some(bbox) = &self.untransformed_bbox {
            io::put_bbox(buf, bbox);
        }
    }

    pub fn decode(cur: &mut ByteCursor) -> Result<Self> {
        let group = GroupNode::decode(cur)?;
        let flags = cur.read_i32()?;
        let file_name = cur.read_mb_string()?;
        let transformed_bbox = cur.read_bbox()?;
        let area = cur.read_f32()?;
        let vertex_counts = cur.read_count_range()?;
        let node_counts = cur.read_count_range()?;
        let polygon_counts = cur.read_count_range()?;
        let untransformed_bbox = if flags & 1 != 0 { Some(cur.read_bbox()?) } else { None };
        Ok(Self {
            group,
            file_name,
            transformed_bbox,
            area,
            vertex_counts,
            node_counts,
            polygon_counts,
            untransformed_bbox,
        })
    }
}

/// Statistics shared by all shape nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeData {
    pub node: NodeData,
    pub transformed_bbox: BBox3f,
    pub untransformed_bbox: BBox3f,
    pub area: f32,
    pub vertex_counts: CountRange,
    pub node_counts: CountRange,
    pub polygon_counts: CountRange,
    pub size: i32,
    pub compression_level: f32,
}

impl ShapeData {
    pub fn new(object_id: i32) -> Self {
        Self {
            node: NodeData::new(object_id),
            transformed_bbox: BBox3f::ZERO,
            untransformed_bbox: BBox3f::ZERO,
            area: 0.0,
            vertex_counts: CountRange::default(),
            node_counts: CountRange::default(),
            polygon_counts: CountRange::default(),
            size: 0,
            compression_level: 0.0,
        }
    }

    pub fn byte_count(&self) -> usize {
        self.node.byte_count() + 24 + 24 + 4 + 8 * 3 + 4 + 4
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        self.node.encode(buf);
        io::put_bbox(buf, &self.transformed_bbox);
        io::put_bbox(buf, &self.untransformed_bbox);
        io::put_f32(buf, self.area);
        io::put_count_range(buf, self.vertex_counts);
        io::put_count_range(buf, self.node_counts);
        io::put_count_range(buf, self.polygon_counts);
        io::put_i32(buf, self.size);
        io::put_f32(buf, self.compression_level);
    }

    pub fn decode(cur: &mut ByteCursor) -> Result<Self> {
        let node = NodeData::decode(cur)?;
        let transformed_bbox = cur.read_bbox()?;
        let untransformed_bbox = cur.read_bbox()?;
        let area = cur.read_f32()?;
        let vertex_counts = cur.read_count_range()?;
        let node_counts = cur.read_count_range()?;
        let polygon_counts = cur.read_count_range()?;
        let size = cur.read_i32()?;
        let compression_level = cur.read_f32()?;
        Ok(Self {
            node,
            transformed_bbox,
            untransformed_bbox,
            area,
            vertex_counts,
            node_counts,
            polygon_counts,
            size,
            compression_level,
        })
    }
}

/// Shape statistics plus per-vertex field bindings.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexShapeData {
    pub shape: ShapeData,
    pub normal_binding: i32,
    pub texture_coord_binding: i32,
    pub colour_binding: i32,
    pub quantization: QuantizationParams,
}

impl VertexShapeData {
    pub fn new(object_id: i32) -> Self {
        Self {
            shape: ShapeData::new(object_id),
            normal_binding: 0,
            texture_coord_binding: 0,
            colour_binding: 0,
            quantization: QuantizationParams::default(),
        }
    }

    pub fn byte_count(&self) -> usize {
        self.shape.byte_count() + 12 + QuantizationParams::SIZE
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        self.shape.encode(buf);
        io::put_i32(buf, self.normal_binding);
        io::put_i32(buf, self.texture_coord_binding);
        io::put_i32(buf, self.colour_binding);
        self.quantization.encode(buf);
    }

    pub fn decode(cur: &mut ByteCursor) -> Result<Self> {
        let shape = ShapeData::decode(cur)?;
        let normal_binding = cur.read_i32()?;
        let texture_coord_binding = cur.read_i32()?;
        let colour_binding = cur.read_i32()?;
        let quantization = QuantizationParams::decode(cur)?;
        Ok(Self { shape, normal_binding, texture_coord_binding, colour_binding, quantization })
    }
}

/// Tri-strip geometry node; the payload itself lives in a Shape-LOD
/// segment referenced through the property table.
#[derive(Debug, Clone, PartialEq)]
pub struct TriStripSetShapeNode {
    pub vertex: VertexShapeData,
}

impl TriStripSetShapeNode {
    pub fn new(object_id: i32) -> Self {
        Self { vertex: VertexShapeData::new(object_id) }
    }

    pub fn byte_count(&self) -> usize {
        self.vertex.byte_count()
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        self.vertex.encode(buf);
    }

    pub fn decode(cur: &mut ByteCursor) -> Result<Self> {
        Ok(Self { vertex: VertexShapeData::decode(cur)? })
    }
}
