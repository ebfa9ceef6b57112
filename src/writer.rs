//! Scene writer.
//!
//! Lowers a [`SceneNode`] tree into LSG, Shape-LOD and Meta-Data
//! segments and assembles the output file: header, table of contents,
//! then the segments in emission order. Element ids are allocated per
//! output file, starting at 1, so identical scenes produce identical
//! files.
//!
//! In split mode (`monolithic = false`) every node carrying geometry is
//! written to its own file under `<dir>/<stem>/` and the main file
//! references it through a partition element plus an instance; a node
//! id seen twice reuses the already written file.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use smallvec::SmallVec;

use crate::compress;
use crate::element::{
    DateAtom, FloatAtom, GeometricTransformAttribute, GraphElement, GroupNode, InstanceNode,
    IntegerAtom, LateLoadedAtom, MaterialAttribute, MetaDataNode, PartNode, PartitionNode,
    PropertyAtom, PropertyProxyMetaDataElement, ProxyValue, RangeLodNode, StringAtom,
    TriStripSetShapeLodElement, TriStripSetShapeNode, VertexRepData,
};
use crate::guid::Guid;
use crate::property::{NodePropertyTable, PropertyTable};
use crate::scene::{GeometricSet, MeasurementUnit, PropertyValue, SceneNode};
use crate::segment::{
    FileHeader, LogicElementHeaderZlib, LsgSegment, MetaDataSegment, SegmentHeader,
    ShapeLodSegment, TocEntry, TocSegment, SEGMENT_TYPE_LSG, SEGMENT_TYPE_META_DATA,
    SEGMENT_TYPE_SHAPE_LOD,
};
use crate::util::{BBox3f, CountRange, Error, Mat4, Result, Vec3};

/// Save behaviour switches.
#[derive(Debug, Clone, Copy)]
pub struct SaveOptions {
    /// Keep the whole scene in one file. When off, each node carrying
    /// geometry becomes its own file referenced from the main one.
    pub monolithic: bool,
    /// Move user properties out of the LSG into per-node Meta-Data
    /// segments, leaving only a late-loaded reference inline.
    pub separate_attribute_segments: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self { monolithic: true, separate_attribute_segments: false }
    }
}

/// Progress notifications emitted while saving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveEvent {
    /// A scene graph element joined the output.
    Element { object_id: i32 },
    CompressBegin,
    CompressEnd,
    WriteBegin,
    WriteEnd,
}

/// Write `node` and its subtree to `path` as a single monolithic file.
///
/// Returns the partition element heading the written scene graph, which
/// carries the aggregated area, counts and bounding box.
pub fn save(node: &SceneNode, path: impl AsRef<Path>) -> Result<PartitionNode> {
    save_with(node, path, SaveOptions::default(), None)
}

/// Write `node` to `path` with explicit options and an optional
/// progress callback.
pub fn save_with(
    node: &SceneNode,
    path: impl AsRef<Path>,
    options: SaveOptions,
    progress: Option<&mut dyn FnMut(SaveEvent)>,
) -> Result<PartitionNode> {
    save_pass(node, path.as_ref(), options, false, progress)
}

fn save_pass(
    node: &SceneNode,
    path: &Path,
    options: SaveOptions,
    strip_root_transform: bool,
    progress: Option<&mut (dyn FnMut(SaveEvent) + '_)>,
) -> Result<PartitionNode> {
    let save_path = sanitized_save_path(path);
    tracing::debug!(
        "writing scene: {} nodes -> {} (monolithic={})",
        node.subtree_len(),
        save_path.display(),
        options.monolithic
    );

    let mut pass = BuildPass {
        options,
        save_path,
        ids: IdGen::default(),
        elements: Vec::new(),
        atoms: Vec::new(),
        table: PropertyTable::default(),
        unique_property_ids: HashMap::new(),
        unique_attribute_ids: HashMap::new(),
        unique_meta_data_segments: HashMap::new(),
        saved_file_ids: HashMap::new(),
        shape_lods: Vec::new(),
        meta_data: Vec::new(),
        progress,
    };
    pass.create_element(node, 0, strip_root_transform)?;
    pass.finish()
}

/// Per-file element id source. Ids start at 1 and follow creation
/// order, which keeps output files deterministic.
#[derive(Default)]
struct IdGen {
    last: i32,
}

impl IdGen {
    fn next(&mut self) -> i32 {
        self.last += 1;
        self.last
    }
}

/// Everything accumulated while lowering one output file.
struct BuildPass<'p, 'f> {
    options: SaveOptions,
    save_path: PathBuf,
    ids: IdGen,
    elements: Vec<GraphElement>,
    atoms: Vec<PropertyAtom>,
    table: PropertyTable,
    /// Property atom dedup, keyed by type tag and printed value.
    unique_property_ids: HashMap<String, i32>,
    /// Attribute element dedup, keyed by colour or matrix string.
    unique_attribute_ids: HashMap<String, i32>,
    /// Meta-Data segment dedup, keyed by uncompressed payload.
    unique_meta_data_segments: HashMap<Vec<u8>, SegmentHeader>,
    /// Scene node id to partition element id, split mode only.
    saved_file_ids: HashMap<i32, i32>,
    shape_lods: Vec<(SegmentHeader, ShapeLodSegment)>,
    meta_data: Vec<(SegmentHeader, LogicElementHeaderZlib, Vec<u8>)>,
    progress: Option<&'p mut (dyn FnMut(SaveEvent) + 'f)>,
}

/// The attribute-bearing facets of a node, separated from the node
/// itself so instances (geometry masked) and per-shape passes (geometry
/// only, default unit) can reuse the same property lowering.
struct AttrSource<'a> {
    attributes: &'a [(String, PropertyValue)],
    unit: MeasurementUnit,
    label: Option<&'a str>,
    is_assembly: bool,
    geometry: &'a [GeometricSet],
}

impl<'a> AttrSource<'a> {
    fn node(node: &'a SceneNode) -> Self {
        Self {
            attributes: &node.attributes,
            unit: node.measurement_unit,
            label: node.label(),
            is_assembly: !node.children.is_empty(),
            geometry: &node.geometry,
        }
    }

    fn without_geometry(node: &'a SceneNode) -> Self {
        Self { geometry: &[], ..Self::node(node) }
    }

    fn shape_only(set: &'a GeometricSet) -> Self {
        Self {
            attributes: &[],
            unit: MeasurementUnit::default(),
            label: None,
            is_assembly: false,
            geometry: std::slice::from_ref(set),
        }
    }
}

/// A property value about to become an atom: either a reference into
/// the scene or one synthesized during lowering.
enum ValueRef<'a> {
    Plain(&'a PropertyValue),
    Text(String),
    Sets(&'a [GeometricSet]),
    Segment(SegmentHeader),
}

impl<'p, 'f> BuildPass<'p, 'f> {
    fn emit(&mut self, event: SaveEvent) {
        if let Some(f) = self.progress.as_deref_mut() {
            f(event);
        }
    }

    fn add_element(&mut self, element: GraphElement) {
        self.emit(SaveEvent::Element { object_id: element.object_id() });
        self.elements.push(element);
    }

    /// Lower one scene node, returning the object id of the element
    /// that stands in for it in the parent's child list.
    fn create_element(&mut self, node: &SceneNode, depth: usize, strip_transform: bool) -> Result<i32> {
        if !self.options.monolithic && !node.geometry.is_empty() {
            let partition_id = match self.saved_file_ids.get(&node.id) {
                Some(&id) => id,
                None => self.split_out(node)?,
            };

            let instance_id = self.ids.next();
            self.add_element(GraphElement::Instance(InstanceNode::new(instance_id, partition_id)));
            self.process_attributes(AttrSource::without_geometry(node), instance_id)?;
            return Ok(instance_id);
        }

        let mut child_ids = Vec::with_capacity(node.children.len());
        for child in &node.children {
            child_ids.push(self.create_element(child, depth + 1, false)?);
        }

        let node_id = self.ids.next();

        let mut attribute_ids: SmallVec<[i32; 4]> = SmallVec::new();
        let transform = if strip_transform { None } else { node.transform };
        if let Some(matrix) = transform {
            attribute_ids.push(self.transform_attribute(matrix));
        }

        if !node.geometry.is_empty() {
            child_ids.push(self.geometry_elements(node)?);
        }

        if depth == 0 {
            let partition_id = self.root_partition(node_id);
            self.process_attributes(AttrSource::node(node), partition_id)?;
        }

        let element = if node.geometry.is_empty() {
            let mut meta = MetaDataNode::new(node_id);
            meta.group.child_ids = child_ids;
            meta.group.node.attribute_ids = attribute_ids;
            GraphElement::MetaData(meta)
        } else {
            let mut part = PartNode::new(node_id);
            part.meta.group.child_ids = child_ids;
            part.meta.group.node.attribute_ids = attribute_ids;
            GraphElement::Part(part)
        };
        self.add_element(element);
        self.process_attributes(AttrSource::node(node), node_id)?;

        Ok(node_id)
    }

    /// Write `node` as its own monolithic file and register a partition
    /// element referencing it.
    fn split_out(&mut self, node: &SceneNode) -> Result<i32> {
        let stem = self
            .save_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let label = node.number.as_deref().or(node.name.as_deref()).unwrap_or("");
        let part_file_name = format!("{}_{}.jt", sanitize_file_name(label), node.id);

        let part_dir = self.save_path.parent().unwrap_or(Path::new("")).join(&stem);
        fs::create_dir_all(&part_dir)?;

        let sub = save_pass(
            node,
            &part_dir.join(&part_file_name),
            SaveOptions { monolithic: true, ..self.options },
            true,
            self.progress.as_deref_mut(),
        )?;

        let id = self.ids.next();
        let mut partition = PartitionNode::like(id, &sub);
        partition.file_name = format!(".\\{stem}\\{part_file_name}");
        self.add_element(GraphElement::Partition(partition));
        self.saved_file_ids.insert(node.id, id);
        Ok(id)
    }

    /// Group, material and shape elements for a node's geometry, capped
    /// by a range LOD node whose id is returned for the child list.
    fn geometry_elements(&mut self, node: &SceneNode) -> Result<i32> {
        let group_id = self.ids.next();
        let group_index = self.elements.len();
        let mut group = GroupNode::new(group_id);

        let mut center_sum = Vec3::ZERO;
        for set in &node.geometry {
            let material_id = self.material_attribute(set);

            let shape_id = self.ids.next();
            self.add_element(GraphElement::TriStripSetShape(shape_node_from_set(
                shape_id,
                set,
                material_id,
            )));
            group.child_ids.push(shape_id);
            center_sum += set.center();

            self.process_attributes(AttrSource::shape_only(set), shape_id)?;
        }

        // The group precedes its materials and shapes in the element
        // list even though its child list is only complete now.
        self.emit(SaveEvent::Element { object_id: group_id });
        self.elements.insert(group_index, GraphElement::Group(group));

        let lod_id = self.ids.next();
        let mut range_lod = RangeLodNode::new(lod_id, center_sum / node.geometry.len() as f32);
        range_lod.lod.group.child_ids.push(group_id);
        self.add_element(GraphElement::RangeLod(range_lod));
        Ok(lod_id)
    }

    fn material_attribute(&mut self, set: &GeometricSet) -> i32 {
        let key = set.colour.to_string();
        if let Some(&id) = self.unique_attribute_ids.get(&key) {
            return id;
        }
        let id = self.ids.next();
        self.unique_attribute_ids.insert(key, id);
        let c = set.colour;
        self.add_element(GraphElement::Material(MaterialAttribute::from_rgba8(
            id, c.r, c.g, c.b, c.a,
        )));
        id
    }

    fn transform_attribute(&mut self, matrix: Mat4) -> i32 {
        let key = matrix
            .to_cols_array()
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join("|");
        if let Some(&id) = self.unique_attribute_ids.get(&key) {
            return id;
        }
        let id = self.ids.next();
        self.unique_attribute_ids.insert(key, id);
        self.add_element(GraphElement::Transform(GeometricTransformAttribute::from_mat4(
            id, matrix,
        )));
        id
    }

    /// Aggregate shape statistics (split mode: per-file partition
    /// statistics) into the partition element heading the file.
    fn root_partition(&mut self, root_node_id: i32) -> i32 {
        let mut area = 0.0f32;
        let mut vertex_counts = CountRange::default();
        let mut node_counts = CountRange::default();
        let mut polygon_counts = CountRange::default();
        let mut bbox = BBox3f::EMPTY;

        let monolithic = self.options.monolithic;
        for element in &self.elements {
            let (a, v, n, p, b) = match element {
                GraphElement::TriStripSetShape(shape) if monolithic => {
                    let s = &shape.vertex.shape;
                    (s.area, s.vertex_counts, s.node_counts, s.polygon_counts, s.untransformed_bbox)
                }
                GraphElement::Partition(part) if !monolithic => (
                    part.area,
                    part.vertex_counts,
                    part.node_counts,
                    part.polygon_counts,
                    part.untransformed_bbox.unwrap_or(BBox3f::ZERO),
                ),
                _ => continue,
            };
            area += a;
            vertex_counts.accumulate(v);
            node_counts.accumulate(n);
            polygon_counts.accumulate(p);
            bbox.expand_by_box(&b);
        }

        let id = self.ids.next();
        let mut partition = PartitionNode::new(id);
        partition.group.child_ids.push(root_node_id);
        partition.area = area;
        partition.vertex_counts = vertex_counts;
        partition.node_counts = node_counts;
        partition.polygon_counts = polygon_counts;
        partition.untransformed_bbox = Some(bbox.or_zero());

        self.emit(SaveEvent::Element { object_id: id });
        self.elements.insert(0, GraphElement::Partition(partition));
        id
    }

    /// Turn one element's properties into key/value atom pairs in the
    /// property table, creating atoms and late-loaded segments on the
    /// way. User keys are normalized and marked with a trailing "::";
    /// the injected keys stay bare.
    fn process_attributes(&mut self, source: AttrSource<'_>, element_id: i32) -> Result<()> {
        let mut entries: Vec<(String, ValueRef<'_>)> =
            Vec::with_capacity(source.attributes.len() + 3);
        for (key, value) in source.attributes {
            if let Some(key) = normalize_key(key) {
                upsert(&mut entries, key, ValueRef::Plain(value));
            }
        }

        if self.options.separate_attribute_segments {
            let proxied = proxy_entries(&entries)?;
            entries.clear();
            if let Some(header) = self.meta_data_segment(proxied)? {
                entries.push(("JT_LLPROP_METADATA".to_string(), ValueRef::Segment(header)));
            }
        }

        upsert(
            &mut entries,
            "JT_PROP_MEASUREMENT_UNITS".to_string(),
            ValueRef::Text(source.unit.as_str().to_string()),
        );
        if let Some(label) = source.label {
            let suffix = if source.is_assembly { "asm" } else { "part" };
            upsert(
                &mut entries,
                "JT_PROP_NAME".to_string(),
                ValueRef::Text(format!("{label}.{suffix};0;0:")),
            );
        }
        if !source.geometry.is_empty() {
            upsert(
                &mut entries,
                "JT_LLPROP_SHAPEIMPL".to_string(),
                ValueRef::Sets(source.geometry),
            );
        }

        let mut pairs = Vec::with_capacity(entries.len());
        for (key, value) in &entries {
            let key_id = self.key_atom(key);
            let value_id = self.value_atom(value)?;
            pairs.push((key_id, value_id));
        }
        self.table.insert(element_id, NodePropertyTable { pairs });
        Ok(())
    }

    fn key_atom(&mut self, key: &str) -> i32 {
        let lookup = format!("String-{key}");
        if let Some(&id) = self.unique_property_ids.get(&lookup) {
            return id;
        }
        let id = self.ids.next();
        self.unique_property_ids.insert(lookup, id);
        self.atoms.push(PropertyAtom::String(StringAtom::new(id, key)));
        id
    }

    fn value_atom(&mut self, value: &ValueRef<'_>) -> Result<i32> {
        let lookup = match value {
            ValueRef::Plain(PropertyValue::String(s)) => format!("String-{s}"),
            ValueRef::Text(s) => format!("String-{s}"),
            ValueRef::Plain(PropertyValue::Int(v)) => format!("Int32-{v}"),
            ValueRef::Plain(PropertyValue::Float(v)) => format!("Float32-{v}"),
            ValueRef::Plain(PropertyValue::Date(d)) => format!("Date-{d}"),
            ValueRef::Plain(PropertyValue::GeometrySets(sets)) => {
                format!("GeometrySets-{}", leading_set(sets)?.id)
            }
            ValueRef::Sets(sets) => format!("GeometrySets-{}", leading_set(sets)?.id),
            ValueRef::Plain(PropertyValue::SegmentRef(h)) | ValueRef::Segment(h) => {
                format!("SegmentRef-{}|{}|{}", h.segment_id, h.segment_type, h.length)
            }
        };
        if let Some(&id) = self.unique_property_ids.get(&lookup) {
            return Ok(id);
        }

        let id = self.ids.next();
        self.unique_property_ids.insert(lookup, id);
        let atom = match value {
            ValueRef::Plain(PropertyValue::String(s)) => {
                PropertyAtom::String(StringAtom::new(id, s))
            }
            ValueRef::Text(s) => PropertyAtom::String(StringAtom::new(id, s)),
            ValueRef::Plain(PropertyValue::Int(v)) => {
                PropertyAtom::Integer(IntegerAtom::new(id, *v))
            }
            ValueRef::Plain(PropertyValue::Float(v)) => {
                PropertyAtom::Float(FloatAtom::new(id, *v))
            }
            ValueRef::Plain(PropertyValue::Date(d)) => PropertyAtom::Date(DateAtom::new(id, *d)),
            ValueRef::Plain(PropertyValue::GeometrySets(sets)) => {
                let header = self.shape_lod_segment(leading_set(sets)?)?;
                PropertyAtom::LateLoaded(LateLoadedAtom::new(
                    id,
                    header.segment_id,
                    header.segment_type,
                ))
            }
            ValueRef::Sets(sets) => {
                let header = self.shape_lod_segment(leading_set(sets)?)?;
                PropertyAtom::LateLoaded(LateLoadedAtom::new(
                    id,
                    header.segment_id,
                    header.segment_type,
                ))
            }
            ValueRef::Plain(PropertyValue::SegmentRef(h)) | ValueRef::Segment(h) => {
                PropertyAtom::LateLoaded(LateLoadedAtom::new(id, h.segment_id, h.segment_type))
            }
        };
        self.atoms.push(atom);
        Ok(id)
    }

    fn shape_lod_segment(&mut self, set: &GeometricSet) -> Result<SegmentHeader> {
        let rep = VertexRepData::from_strips(&set.strips, &set.positions, set.normals.as_deref())?;
        let segment = ShapeLodSegment::new(TriStripSetShapeLodElement::new(rep));
        let header = SegmentHeader::new(
            Guid::random(),
            SEGMENT_TYPE_SHAPE_LOD,
            (SegmentHeader::SIZE + segment.byte_count()) as i32,
        );
        self.shape_lods.push((header, segment));
        Ok(header)
    }

    /// Compress a property proxy into a Meta-Data segment, reusing an
    /// existing segment when the payload is byte-identical.
    fn meta_data_segment(
        &mut self,
        entries: Vec<(String, ProxyValue)>,
    ) -> Result<Option<SegmentHeader>> {
        if entries.is_empty() {
            return Ok(None);
        }

        let segment = MetaDataSegment::new(PropertyProxyMetaDataElement::new(entries));
        let mut payload = Vec::with_capacity(segment.byte_count());
        segment.encode(&mut payload);
        if let Some(header) = self.unique_meta_data_segments.get(&payload) {
            return Ok(Some(*header));
        }

        let compressed = compress::deflate(&payload)?;
        let zlib = LogicElementHeaderZlib::for_payload(compressed.len());
        let header = SegmentHeader::new(
            Guid::random(),
            SEGMENT_TYPE_META_DATA,
            (SegmentHeader::SIZE + LogicElementHeaderZlib::SIZE + compressed.len()) as i32,
        );
        self.unique_meta_data_segments.insert(payload, header);
        self.meta_data.push((header, zlib, compressed));
        Ok(Some(header))
    }

    /// Compress the LSG, lay out the table of contents and write the
    /// file. Consumes the pass and returns its root partition element.
    fn finish(mut self) -> Result<PartitionNode> {
        let file_header = FileHeader::new(Guid::random());

        let lsg = LsgSegment {
            graph_elements: std::mem::take(&mut self.elements),
            property_atoms: std::mem::take(&mut self.atoms),
            property_table: std::mem::take(&mut self.table),
        };
        let mut lsg_bytes = Vec::with_capacity(lsg.byte_count());
        lsg.encode(&mut lsg_bytes);

        self.emit(SaveEvent::CompressBegin);
        let compressed_lsg = compress::deflate(&lsg_bytes)?;
        self.emit(SaveEvent::CompressEnd);

        let zlib = LogicElementHeaderZlib::for_payload(compressed_lsg.len());
        let lsg_header = SegmentHeader::new(
            file_header.lsg_segment_id,
            SEGMENT_TYPE_LSG,
            (SegmentHeader::SIZE + LogicElementHeaderZlib::SIZE + compressed_lsg.len()) as i32,
        );

        let mut entries = Vec::with_capacity(1 + self.shape_lods.len() + self.meta_data.len());
        entries.push(TocEntry::new(lsg_header.segment_id, lsg_header.segment_type, lsg_header.length));
        for (header, _) in &self.shape_lods {
            entries.push(TocEntry::new(header.segment_id, header.segment_type, header.length));
        }
        for (header, _, _) in &self.meta_data {
            entries.push(TocEntry::new(header.segment_id, header.segment_type, header.length));
        }
        let mut toc = TocSegment::new(entries);
        toc.assign_offsets((FileHeader::SIZE + toc.byte_count()) as i32);

        tracing::debug!(
            "assembled segments: LSG {} -> {} bytes, {} shape LOD, {} metadata",
            lsg_bytes.len(),
            compressed_lsg.len(),
            self.shape_lods.len(),
            self.meta_data.len()
        );

        self.emit(SaveEvent::WriteBegin);
        let mut out = BufWriter::new(File::create(&self.save_path)?);

        let mut bytes = Vec::with_capacity(FileHeader::SIZE + toc.byte_count());
        file_header.encode(&mut bytes);
        toc.encode(&mut bytes);
        lsg_header.encode(&mut bytes);
        zlib.encode(&mut bytes);
        out.write_all(&bytes)?;
        out.write_all(&compressed_lsg)?;

        for (header, segment) in &self.shape_lods {
            bytes.clear();
            header.encode(&mut bytes);
            segment.encode(&mut bytes);
            out.write_all(&bytes)?;
        }

        for (header, zlib, compressed) in &self.meta_data {
            bytes.clear();
            header.encode(&mut bytes);
            zlib.encode(&mut bytes);
            out.write_all(&bytes)?;
            out.write_all(compressed)?;
        }

        out.flush()?;
        self.emit(SaveEvent::WriteEnd);

        match lsg.graph_elements.into_iter().next() {
            Some(GraphElement::Partition(partition)) => Ok(partition),
            _ => Err(Error::invalid("scene produced no partition element")),
        }
    }
}

fn shape_node_from_set(object_id: i32, set: &GeometricSet, material_id: i32) -> TriStripSetShapeNode {
    let mut shape = TriStripSetShapeNode::new(object_id);
    shape.vertex.normal_binding = set.normals.is_some() as i32;
    let data = &mut shape.vertex.shape;
    data.node.attribute_ids.push(material_id);
    data.untransformed_bbox = set.bbox();
    data.area = set.area();
    data.vertex_counts = CountRange::exact(set.vertex_count());
    data.node_counts = CountRange::exact(1);
    data.polygon_counts = CountRange::exact(set.triangle_count());
    data.size = set.size();
    shape
}

fn leading_set(sets: &[GeometricSet]) -> Result<&GeometricSet> {
    sets.first()
        .ok_or_else(|| Error::InvalidPropertyValue("empty geometry set list".to_string()))
}

fn proxy_entries(entries: &[(String, ValueRef<'_>)]) -> Result<Vec<(String, ProxyValue)>> {
    entries
        .iter()
        .map(|(key, value)| {
            let value = match value {
                ValueRef::Plain(PropertyValue::String(s)) => ProxyValue::String(s.clone()),
                ValueRef::Plain(PropertyValue::Int(v)) => ProxyValue::Int(*v),
                ValueRef::Plain(PropertyValue::Float(v)) => ProxyValue::Float(*v),
                ValueRef::Plain(PropertyValue::Date(d)) => ProxyValue::Date(*d),
                _ => {
                    return Err(Error::InvalidPropertyValue(format!(
                        "property '{key}' cannot move to a separate attribute segment"
                    )))
                }
            };
            Ok((key.clone(), value))
        })
        .collect()
}

/// Trim the key, drop trailing colons, collapse repeated colons, then
/// mark it as user-supplied with a trailing "::". Keys that normalize
/// to nothing are dropped.
fn normalize_key(key: &str) -> Option<String> {
    let mut key = key.trim().to_string();
    while key.ends_with(':') {
        key.pop();
    }
    while key.contains("::") {
        key = key.replace("::", ":");
    }
    if key.is_empty() {
        None
    } else {
        key.push_str("::");
        Some(key)
    }
}

fn upsert<'a>(entries: &mut Vec<(String, ValueRef<'a>)>, key: String, value: ValueRef<'a>) {
    if let Some(slot) = entries.iter_mut().find(|(k, _)| *k == key) {
        slot.1 = value;
    } else {
        entries.push((key, value));
    }
}

/// Replace characters that cannot appear in a file name. Separators
/// are rejected here too, so this applies to single path components.
fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_control() || matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// Replace characters that cannot appear anywhere in a path, keeping
/// separators intact.
fn sanitize_directory(dir: &str) -> String {
    dir.chars()
        .map(|c| {
            if c.is_control() || matches!(c, '<' | '>' | '"' | '|') {
                '_'
            } else {
                c
            }
        })
        .collect()
}

fn sanitized_save_path(path: &Path) -> PathBuf {
    let dir = path.parent().map(|p| p.to_string_lossy()).unwrap_or_default();
    let file = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    Path::new(&sanitize_directory(&dir)).join(sanitize_file_name(&file))
}
