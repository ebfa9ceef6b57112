//! Scene reader.
//!
//! [`JtFile`] parses a complete file into its segments, keeping the
//! Shape-LOD and Meta-Data payloads accessible by segment id.
//! [`JtFile::scene`] then rebuilds the [`SceneNode`] tree the writer
//! lowered, resolving property rows, materials, transforms and
//! late-loaded geometry on the way.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use memmap2::Mmap;

use crate::element::{
    GraphElement, LateLoadedAtom, MaterialAttribute, PartitionNode, PropertyAtom, ProxyValue,
    RangeLodNode, TriStripSetShapeNode,
};
use crate::guid::Guid;
use crate::io::{ByteCursor, Endian};
use crate::scene::{GeometricSet, MeasurementUnit, PropertyValue, Rgba, SceneNode};
use crate::segment::{
    FileHeader, LogicElementHeaderZlib, LsgSegment, MetaDataSegment, SegmentHeader,
    ShapeLodSegment, TocSegment, SEGMENT_TYPE_LSG, SEGMENT_TYPE_META_DATA,
    SEGMENT_TYPE_SHAPE_LOD,
};
use crate::util::{Error, Result};

const KEY_MEASUREMENT_UNITS: &str = "JT_PROP_MEASUREMENT_UNITS";
const KEY_NAME: &str = "JT_PROP_NAME";
const KEY_SHAPE_IMPL: &str = "JT_LLPROP_SHAPEIMPL";
const KEY_METADATA: &str = "JT_LLPROP_METADATA";

/// A parsed file: header, table of contents and every segment, decoded.
#[derive(Debug)]
pub struct JtFile {
    header: FileHeader,
    toc: TocSegment,
    lsg: LsgSegment,
    shape_lods: HashMap<Guid, ShapeLodSegment>,
    meta_data: HashMap<Guid, MetaDataSegment>,
}

impl JtFile {
    /// Open a file for reading with memory mapping.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_opts(path, true)
    }

    /// Open a file with optional memory mapping.
    pub fn open_opts(path: impl AsRef<Path>, use_mmap: bool) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound(path.to_path_buf())
            } else {
                Error::Io(e)
            }
        })?;

        let size = file.metadata()?.len();
        tracing::debug!("reading {} ({} bytes, mmap={})", path.display(), size, use_mmap);

        if use_mmap && size > 0 {
            // Safety: the file is opened read-only and the mapping does
            // not outlive this call.
            let mmap = unsafe { Mmap::map(&file) }.map_err(|e| Error::MmapFailed(e.to_string()))?;
            Self::parse(&mmap)
        } else {
            let mut data = Vec::with_capacity(size as usize);
            file.read_to_end(&mut data)?;
            Self::parse(&data)
        }
    }

    /// Parse a complete file image.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut cur = ByteCursor::new(data, Endian::default());
        let header = FileHeader::decode(&mut cur)?;
        let order = cur.order();

        let toc_offset = usize::try_from(header.toc_offset)
            .map_err(|_| Error::invalid(format!("TOC offset {} is negative", header.toc_offset)))?;
        let mut cur = ByteCursor::new(data, order);
        cur.skip(toc_offset)?;
        let toc = TocSegment::decode(&mut cur)?;

        let mut lsg_segments: Vec<(Guid, LsgSegment)> = Vec::new();
        let mut shape_lods = HashMap::new();
        let mut meta_data = HashMap::new();
        let mut seen = HashSet::new();
        for entry in &toc.entries {
            // Repeated entries locate the same segment.
            if !seen.insert(entry.segment_id) {
                continue;
            }
            let offset = usize::try_from(entry.offset).map_err(|_| {
                Error::invalid(format!(
                    "segment {} has unassigned offset {}",
                    entry.segment_id, entry.offset
                ))
            })?;

            let mut cur = ByteCursor::new(data, order);
            cur.skip(offset)?;
            let segment_header = SegmentHeader::decode(&mut cur)?;
            if segment_header.segment_id != entry.segment_id {
                return Err(Error::invalid(format!(
                    "segment at offset {} carries id {}, TOC says {}",
                    offset, segment_header.segment_id, entry.segment_id
                )));
            }

            match segment_header.segment_type {
                SEGMENT_TYPE_LSG => {
                    let payload = LogicElementHeaderZlib::read_payload(&mut cur)?;
                    let mut body = ByteCursor::new(&payload, order);
                    lsg_segments.push((entry.segment_id, LsgSegment::decode(&mut body)?));
                }
                SEGMENT_TYPE_META_DATA => {
                    let payload = LogicElementHeaderZlib::read_payload(&mut cur)?;
                    let mut body = ByteCursor::new(&payload, order);
                    meta_data.insert(entry.segment_id, MetaDataSegment::decode(&mut body)?);
                }
                SEGMENT_TYPE_SHAPE_LOD => {
                    let body_len = usize::try_from(segment_header.length)
                        .ok()
                        .and_then(|l| l.checked_sub(SegmentHeader::SIZE))
                        .ok_or_else(|| {
                            Error::invalid(format!(
                                "segment {} declares implausible length {}",
                                entry.segment_id, segment_header.length
                            ))
                        })?;
                    let mut body = ByteCursor::new(cur.take(body_len)?, order);
                    shape_lods.insert(entry.segment_id, ShapeLodSegment::decode(&mut body)?);
                }
                other => {
                    return Err(Error::unsupported(format!("segment type {}", other)));
                }
            }
        }

        let lsg = match lsg_segments.iter().position(|(id, _)| *id == header.lsg_segment_id) {
            Some(i) => lsg_segments.swap_remove(i).1,
            None => {
                if lsg_segments.is_empty() {
                    return Err(Error::invalid("file contains no LSG segment"));
                }
                let (id, segment) = lsg_segments.swap_remove(0);
                tracing::debug!(
                    "file header names LSG segment {}, using {}",
                    header.lsg_segment_id,
                    id
                );
                segment
            }
        };

        tracing::debug!(
            "parsed file: {} TOC entries, {} graph elements, {} shape LOD, {} metadata",
            toc.entries.len(),
            lsg.graph_elements.len(),
            shape_lods.len(),
            meta_data.len()
        );

        Ok(Self { header, toc, lsg, shape_lods, meta_data })
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    pub fn toc(&self) -> &TocSegment {
        &self.toc
    }

    pub fn lsg(&self) -> &LsgSegment {
        &self.lsg
    }

    pub fn shape_lod(&self, segment_id: &Guid) -> Option<&ShapeLodSegment> {
        self.shape_lods.get(segment_id)
    }

    pub fn meta_data(&self, segment_id: &Guid) -> Option<&MetaDataSegment> {
        self.meta_data.get(segment_id)
    }

    /// The partition element heading the scene graph, with the
    /// aggregated area, counts and bounding box of the file.
    pub fn root_partition(&self) -> Result<&PartitionNode> {
        match self.lsg.graph_elements.first() {
            Some(GraphElement::Partition(partition)) => Ok(partition),
            _ => Err(Error::invalid("LSG does not start with a partition element")),
        }
    }

    /// Rebuild the scene tree.
    ///
    /// Geometry is decoded from the Shape-LOD segments, colours from the
    /// material attributes, names and units from the injected property
    /// rows. Instances pointing at partition elements (split-mode
    /// external files) come back as leaf nodes carrying the instance's
    /// own properties; the external file is not followed.
    pub fn scene(&self) -> Result<SceneNode> {
        let partition = self.root_partition()?;
        let root_id = partition
            .group
            .child_ids
            .first()
            .copied()
            .ok_or_else(|| Error::invalid("root partition has no child node"))?;
        let mut path = HashSet::new();
        self.build_node(root_id, &mut path)
    }

    fn build_node(&self, element_id: i32, path: &mut HashSet<i32>) -> Result<SceneNode> {
        if !path.insert(element_id) {
            return Err(Error::invalid(format!(
                "scene graph cycles through element {}",
                element_id
            )));
        }
        let node = self.build_node_inner(element_id, path);
        path.remove(&element_id);
        node
    }

    fn build_node_inner(&self, element_id: i32, path: &mut HashSet<i32>) -> Result<SceneNode> {
        let element = self
            .lsg
            .element_by_id(element_id)
            .ok_or_else(|| Error::invalid(format!("child id {} names no element", element_id)))?;

        match element {
            GraphElement::MetaData(_) | GraphElement::Part(_) => {
                let mut node = SceneNode::new();
                if let Some(data) = element.node_data() {
                    for &attr_id in &data.attribute_ids {
                        if let Some(GraphElement::Transform(transform)) =
                            self.lsg.element_by_id(attr_id)
                        {
                            node.transform = Some(transform.matrix());
                        }
                    }
                }
                for &child_id in element.child_ids() {
                    match self.lsg.element_by_id(child_id) {
                        Some(GraphElement::RangeLod(lod)) => {
                            node.geometry.extend(self.geometry_under_lod(lod)?);
                        }
                        _ => node.children.push(self.build_node(child_id, path)?),
                    }
                }
                self.apply_properties(&mut node, element_id)?;
                Ok(node)
            }
            GraphElement::Instance(instance) => match self.lsg.element_by_id(instance.child_node_id)
            {
                Some(GraphElement::Partition(_)) => {
                    let mut node = SceneNode::new();
                    self.apply_properties(&mut node, element_id)?;
                    Ok(node)
                }
                Some(_) => {
                    let mut node = self.build_node(instance.child_node_id, path)?;
                    self.apply_properties(&mut node, element_id)?;
                    Ok(node)
                }
                None => Err(Error::invalid(format!(
                    "instance {} references missing element {}",
                    element_id, instance.child_node_id
                ))),
            },
            GraphElement::Partition(_) => {
                let mut node = SceneNode::new();
                self.apply_properties(&mut node, element_id)?;
                Ok(node)
            }
            other => Err(Error::invalid(format!(
                "{:?} cannot stand for a scene node",
                other.kind()
            ))),
        }
    }

    /// Collect the geometric sets below a range LOD node: one set per
    /// shape element in the group under it.
    fn geometry_under_lod(&self, lod: &RangeLodNode) -> Result<Vec<GeometricSet>> {
        let mut sets = Vec::new();
        for &group_id in &lod.lod.group.child_ids {
            match self.lsg.element_by_id(group_id) {
                Some(GraphElement::Group(group)) => {
                    for &shape_id in &group.child_ids {
                        match self.lsg.element_by_id(shape_id) {
                            Some(GraphElement::TriStripSetShape(shape)) => {
                                sets.push(self.geometric_set(shape_id, shape)?);
                            }
                            _ => {
                                return Err(Error::invalid(format!(
                                    "element {} under a geometry group is not a shape",
                                    shape_id
                                )))
                            }
                        }
                    }
                }
                Some(GraphElement::TriStripSetShape(shape)) => {
                    sets.push(self.geometric_set(group_id, shape)?);
                }
                _ => {
                    return Err(Error::invalid(format!(
                        "element {} under a LOD node is not a geometry group",
                        group_id
                    )))
                }
            }
        }
        Ok(sets)
    }

    fn geometric_set(&self, shape_id: i32, shape: &TriStripSetShapeNode) -> Result<GeometricSet> {
        let props = self.node_properties(shape_id)?;
        let segment_id = props.shape_segment.ok_or_else(|| {
            Error::invalid(format!("shape element {} has no geometry reference", shape_id))
        })?;
        let segment = self.shape_lods.get(&segment_id).ok_or_else(|| {
            Error::invalid(format!("geometry segment {} is not in this file", segment_id))
        })?;
        let decoded = segment.element.rep.decoded_vertices(self.header.byte_order)?;

        let mut set = GeometricSet::new(decoded.strips, decoded.positions);
        set.normals = decoded.normals;
        for &attr_id in &shape.vertex.shape.node.attribute_ids {
            if let Some(GraphElement::Material(material)) = self.lsg.element_by_id(attr_id) {
                set.colour = rgba_from_material(material);
            }
        }
        Ok(set)
    }

    /// Apply an element's property rows to a node. Only rows present in
    /// the table touch the node, so an instance's rows can overlay the
    /// referenced node's without clearing what they do not mention.
    fn apply_properties(&self, node: &mut SceneNode, element_id: i32) -> Result<()> {
        let props = self.node_properties(element_id)?;
        if let Some(unit) = props.unit {
            node.measurement_unit = unit;
        }
        if let Some(label) = props.label {
            node.name = Some(label);
        }
        for (key, value) in props.attributes {
            node.set_attribute(key, value);
        }
        Ok(())
    }

    fn node_properties(&self, element_id: i32) -> Result<NodeProperties> {
        let mut props = NodeProperties::default();
        let table = match self.lsg.property_table.table_for(element_id) {
            Some(table) => table,
            None => return Ok(props),
        };

        for &(key_id, value_id) in &table.pairs {
            let key = match self.lsg.atom_by_id(key_id) {
                Some(PropertyAtom::String(atom)) => atom.value.as_str(),
                Some(_) => {
                    return Err(Error::invalid(format!(
                        "property key atom {} is not a string",
                        key_id
                    )))
                }
                None => {
                    return Err(Error::invalid(format!(
                        "property table references missing atom {}",
                        key_id
                    )))
                }
            };
            let value = self.lsg.atom_by_id(value_id).ok_or_else(|| {
                Error::invalid(format!("property table references missing atom {}", value_id))
            })?;

            match key {
                KEY_MEASUREMENT_UNITS => match value {
                    PropertyAtom::String(atom) => match atom.value.parse() {
                        Ok(unit) => props.unit = Some(unit),
                        Err(_) => {
                            tracing::debug!(
                                "ignoring unknown measurement unit '{}'",
                                atom.value
                            );
                        }
                    },
                    _ => tracing::debug!("ignoring non-string measurement unit property"),
                },
                KEY_NAME => match value {
                    PropertyAtom::String(atom) => props.label = Some(parse_label(&atom.value)),
                    _ => return Err(Error::invalid("name property is not a string")),
                },
                KEY_SHAPE_IMPL => match value {
                    PropertyAtom::LateLoaded(atom) => {
                        props.shape_segment = Some(atom.segment_guid);
                    }
                    _ => {
                        return Err(Error::invalid(
                            "geometry property is not a late-loaded reference",
                        ))
                    }
                },
                KEY_METADATA => match value {
                    PropertyAtom::LateLoaded(atom) => {
                        let segment = self.meta_data.get(&atom.segment_guid).ok_or_else(|| {
                            Error::invalid(format!(
                                "metadata segment {} is not in this file",
                                atom.segment_guid
                            ))
                        })?;
                        for (key, value) in &segment.element.entries {
                            let key = key.trim_end_matches(':');
                            if key.is_empty() {
                                continue;
                            }
                            props.attributes.push((key.to_string(), proxy_to_value(value)));
                        }
                    }
                    _ => {
                        return Err(Error::invalid(
                            "metadata property is not a late-loaded reference",
                        ))
                    }
                },
                key => {
                    let name = key.trim_end_matches(':');
                    if name.is_empty() {
                        continue;
                    }
                    props.attributes.push((name.to_string(), self.plain_value(value)));
                }
            }
        }
        Ok(props)
    }

    fn plain_value(&self, atom: &PropertyAtom) -> PropertyValue {
        match atom {
            PropertyAtom::String(a) => PropertyValue::String(a.value.clone()),
            PropertyAtom::Integer(a) => PropertyValue::Int(a.value),
            PropertyAtom::Float(a) => PropertyValue::Float(a.value),
            PropertyAtom::Date(a) => PropertyValue::Date(a.date),
            PropertyAtom::LateLoaded(a) => PropertyValue::SegmentRef(self.segment_ref(a)),
        }
    }

    /// Segment header for a late-loaded reference under a user key. The
    /// TOC supplies the length; a reference pointing outside this file
    /// keeps the atom's type and no length.
    fn segment_ref(&self, atom: &LateLoadedAtom) -> SegmentHeader {
        for entry in &self.toc.entries {
            if entry.segment_id == atom.segment_guid {
                return SegmentHeader::new(entry.segment_id, entry.segment_type(), entry.length);
            }
        }
        SegmentHeader::new(atom.segment_guid, atom.segment_type, 0)
    }
}

/// Property rows of one element, sorted into the injected parts and the
/// user attributes.
#[derive(Default)]
struct NodeProperties {
    unit: Option<MeasurementUnit>,
    label: Option<String>,
    shape_segment: Option<Guid>,
    attributes: Vec<(String, PropertyValue)>,
}

/// Recover the display label from a `JT_PROP_NAME` value: drop the
/// instance counters after the first semicolon, then the node type
/// extension.
fn parse_label(text: &str) -> String {
    let stem = match text.find(';') {
        Some(i) => &text[..i],
        None => text,
    };
    let stem = stem
        .strip_suffix(".asm")
        .or_else(|| stem.strip_suffix(".part"))
        .unwrap_or(stem);
    stem.to_string()
}

fn proxy_to_value(value: &ProxyValue) -> PropertyValue {
    match value {
        ProxyValue::String(s) => PropertyValue::String(s.clone()),
        ProxyValue::Int(v) => PropertyValue::Int(*v),
        ProxyValue::Float(v) => PropertyValue::Float(*v),
        ProxyValue::Date(d) => PropertyValue::Date(*d),
    }
}

fn rgba_from_material(material: &MaterialAttribute) -> Rgba {
    let [r, g, b, a] = material.diffuse;
    Rgba::new(
        (r * 255.0).round() as u8,
        (g * 255.0).round() as u8,
        (b * 255.0).round() as u8,
        (a * 255.0).round() as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress;
    use crate::element::{IntegerAtom, MetaDataNode, StringAtom};
    use crate::property::NodePropertyTable;
    use crate::segment::TocEntry;

    /// Frame an LSG segment into a complete single-segment file image.
    fn assemble(lsg: &LsgSegment) -> Vec<u8> {
        let mut lsg_bytes = Vec::new();
        lsg.encode(&mut lsg_bytes);
        let compressed = compress::deflate(&lsg_bytes).unwrap();
        let zlib = LogicElementHeaderZlib::for_payload(compressed.len());

        let header = FileHeader::new(Guid::random());
        let lsg_header = SegmentHeader::new(
            header.lsg_segment_id,
            SEGMENT_TYPE_LSG,
            (SegmentHeader::SIZE + LogicElementHeaderZlib::SIZE + compressed.len()) as i32,
        );
        let mut toc = TocSegment::new(vec![TocEntry::new(
            lsg_header.segment_id,
            lsg_header.segment_type,
            lsg_header.length,
        )]);
        toc.assign_offsets((FileHeader::SIZE + toc.byte_count()) as i32);

        let mut bytes = Vec::new();
        header.encode(&mut bytes);
        toc.encode(&mut bytes);
        lsg_header.encode(&mut bytes);
        zlib.encode(&mut bytes);
        bytes.extend_from_slice(&compressed);
        bytes
    }

    fn lsg_with_root() -> LsgSegment {
        let mut partition = PartitionNode::new(1);
        partition.group.child_ids.push(2);
        let mut lsg = LsgSegment::default();
        lsg.graph_elements.push(GraphElement::Partition(partition));
        lsg.graph_elements.push(GraphElement::MetaData(MetaDataNode::new(2)));
        lsg
    }

    #[test]
    fn test_parse_minimal_file() {
        let file = JtFile::parse(&assemble(&lsg_with_root())).unwrap();
        assert_eq!(file.header().version, FileHeader::VERSION);
        // the lone TOC entry is written twice
        assert_eq!(file.toc().entries.len(), 2);
        assert_eq!(file.lsg().graph_elements.len(), 2);
        assert_eq!(file.root_partition().unwrap().group.child_ids, vec![2]);

        let scene = file.scene().unwrap();
        assert!(scene.children.is_empty());
        assert!(scene.geometry.is_empty());
        assert_eq!(scene.name, None);
        assert_eq!(scene.measurement_unit, MeasurementUnit::Millimeters);
    }

    #[test]
    fn test_scene_reads_name_unit_and_attributes() {
        let mut lsg = lsg_with_root();
        lsg.property_atoms = vec![
            PropertyAtom::String(StringAtom::new(3, KEY_NAME)),
            PropertyAtom::String(StringAtom::new(4, "Housing.asm;0;0:")),
            PropertyAtom::String(StringAtom::new(5, KEY_MEASUREMENT_UNITS)),
            PropertyAtom::String(StringAtom::new(6, "Meters")),
            PropertyAtom::String(StringAtom::new(7, "Revision::")),
            PropertyAtom::Integer(IntegerAtom::new(8, 4)),
        ];
        lsg.property_table
            .insert(2, NodePropertyTable { pairs: vec![(3, 4), (5, 6), (7, 8)] });

        let file = JtFile::parse(&assemble(&lsg)).unwrap();
        let scene = file.scene().unwrap();
        assert_eq!(scene.name.as_deref(), Some("Housing"));
        assert_eq!(scene.measurement_unit, MeasurementUnit::Meters);
        assert_eq!(scene.attribute("Revision"), Some(&PropertyValue::Int(4)));
        assert_eq!(scene.attributes.len(), 1);
    }

    #[test]
    fn test_unknown_unit_falls_back_to_default() {
        let mut lsg = lsg_with_root();
        lsg.property_atoms = vec![
            PropertyAtom::String(StringAtom::new(3, KEY_MEASUREMENT_UNITS)),
            PropertyAtom::String(StringAtom::new(4, "Furlongs")),
        ];
        lsg.property_table.insert(2, NodePropertyTable { pairs: vec![(3, 4)] });

        let scene = JtFile::parse(&assemble(&lsg)).unwrap().scene().unwrap();
        assert_eq!(scene.measurement_unit, MeasurementUnit::Millimeters);
    }

    #[test]
    fn test_scene_requires_partition_first() {
        let mut lsg = LsgSegment::default();
        lsg.graph_elements.push(GraphElement::MetaData(MetaDataNode::new(1)));
        let file = JtFile::parse(&assemble(&lsg)).unwrap();
        assert!(matches!(file.scene(), Err(Error::InvalidStructure(_))));
    }

    #[test]
    fn test_cycle_is_rejected() {
        let mut lsg = lsg_with_root();
        // the node lists itself as a child
        if let Some(GraphElement::MetaData(meta)) = lsg.graph_elements.last_mut() {
            meta.group.child_ids.push(2);
        }
        let file = JtFile::parse(&assemble(&lsg)).unwrap();
        match file.scene() {
            Err(Error::InvalidStructure(message)) => assert!(message.contains("cycle")),
            other => panic!("expected a cycle error, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_bad_magic() {
        match JtFile::parse(&[0u8; 200]) {
            Err(Error::InvalidMagic) => {}
            other => panic!("expected InvalidMagic, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_truncated_header() {
        assert!(matches!(
            JtFile::parse(b"Version 8.1 JT"),
            Err(Error::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_unknown_segment_type_rejected() {
        let lsg = lsg_with_root();
        let mut bytes = assemble(&lsg);
        // rewrite the first TOC entry's attributes word: type 9
        let attrs_at = FileHeader::SIZE + 4 + Guid::SIZE + 8;
        bytes[attrs_at..attrs_at + 4].copy_from_slice(&(9u32 << 24).to_le_bytes());
        // and the matching segment header's type field
        let toc_len = 4 + 2 * TocEntry::SIZE;
        let type_at = FileHeader::SIZE + toc_len + Guid::SIZE;
        bytes[type_at..type_at + 4].copy_from_slice(&9i32.to_le_bytes());
        match JtFile::parse(&bytes) {
            Err(Error::UnsupportedFormat(_)) => {}
            other => panic!("expected UnsupportedFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_label() {
        assert_eq!(parse_label("Bracket.part;0;0:"), "Bracket");
        assert_eq!(parse_label("Upper Housing.asm;0;0:"), "Upper Housing");
        assert_eq!(parse_label("v1.2.part;0;0:"), "v1.2");
        assert_eq!(parse_label("bare"), "bare");
        assert_eq!(parse_label("odd;1;2:extra"), "odd");
    }

    #[test]
    fn test_rgba_from_material() {
        let material = MaterialAttribute::from_rgba8(1, 200, 100, 50, 255);
        assert_eq!(rgba_from_material(&material), Rgba::new(200, 100, 50, 255));
    }
}
