//! User-facing scene model.
//!
//! A scene is a tree of [`SceneNode`]s, each carrying optional geometry
//! ([`GeometricSet`]s), an optional transform, named properties and
//! child nodes. The writer lowers this tree into LSG elements and the
//! reader rebuilds it from a parsed file.
//!
//! Nodes and sets receive a process-wide id at construction. Cloning
//! keeps the id, which is how the same part is placed under several
//! parents: the writer detects the repeated id and emits an instance
//! (or, in split mode, reuses the already written external file)
//! instead of duplicating the data.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI32, Ordering};

use crate::element::JtDate;
use crate::segment::SegmentHeader;
use crate::util::{triangle_area, BBox3f, Error, Mat4, Result, Vec3};

static NEXT_ID: AtomicI32 = AtomicI32::new(0);

/// Next process-wide scene object id, starting at 1.
fn next_id() -> i32 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed) + 1
}

/// Unit carried by the injected `JT_PROP_MEASUREMENT_UNITS` property.
///
/// The wire form is the variant name, spelled exactly as below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeasurementUnit {
    #[default]
    Millimeters,
    Centimeters,
    Meters,
    Inches,
    Feet,
    Yards,
    Micrometers,
    Decimeters,
    Kilometers,
    Mils,
    Miles,
}

impl MeasurementUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasurementUnit::Millimeters => "Millimeters",
            MeasurementUnit::Centimeters => "Centimeters",
            MeasurementUnit::Meters => "Meters",
            MeasurementUnit::Inches => "Inches",
            MeasurementUnit::Feet => "Feet",
            MeasurementUnit::Yards => "Yards",
            MeasurementUnit::Micrometers => "Micrometers",
            MeasurementUnit::Decimeters => "Decimeters",
            MeasurementUnit::Kilometers => "Kilometers",
            MeasurementUnit::Mils => "Mils",
            MeasurementUnit::Miles => "Miles",
        }
    }
}

impl fmt::Display for MeasurementUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MeasurementUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Millimeters" => Ok(MeasurementUnit::Millimeters),
            "Centimeters" => Ok(MeasurementUnit::Centimeters),
            "Meters" => Ok(MeasurementUnit::Meters),
            "Inches" => Ok(MeasurementUnit::Inches),
            "Feet" => Ok(MeasurementUnit::Feet),
            "Yards" => Ok(MeasurementUnit::Yards),
            "Micrometers" => Ok(MeasurementUnit::Micrometers),
            "Decimeters" => Ok(MeasurementUnit::Decimeters),
            "Kilometers" => Ok(MeasurementUnit::Kilometers),
            "Mils" => Ok(MeasurementUnit::Mils),
            "Miles" => Ok(MeasurementUnit::Miles),
            _ => Err(Error::invalid(format!("unknown measurement unit '{s}'"))),
        }
    }
}

/// 8-bit RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Rgba {
    /// Opaque mid-grey, used for sets whose colour was never assigned.
    fn default() -> Self {
        Self::new(128, 128, 128, 255)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

/// One batch of tri-strip geometry with a single colour.
///
/// `strips` index into `positions` (and `normals`, when present, which
/// must then run parallel to `positions`). The derived statistics below
/// feed the shape and partition elements the writer emits.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometricSet {
    /// Process-wide id, preserved by `clone`. Two nodes holding sets
    /// with equal leading ids share one Shape-LOD segment on save.
    pub id: i32,
    pub positions: Vec<Vec3>,
    pub normals: Option<Vec<Vec3>>,
    pub strips: Vec<Vec<i32>>,
    pub colour: Rgba,
}

impl GeometricSet {
    pub fn new(strips: Vec<Vec<i32>>, positions: Vec<Vec3>) -> Self {
        Self {
            id: next_id(),
            positions,
            normals: None,
            strips,
            colour: Rgba::default(),
        }
    }

    pub fn vertex_count(&self) -> i32 {
        self.positions.len() as i32
    }

    /// Triangles per strip is its length minus two, summed signed.
    pub fn triangle_count(&self) -> i32 {
        self.strips
            .iter()
            .map(|strip| strip.len() as i32 - 2)
            .sum()
    }

    /// Total surface area, accumulated in double precision.
    ///
    /// Out-of-range strip indices contribute nothing here; they are
    /// rejected later when the shape payload is built.
    pub fn area(&self) -> f32 {
        let mut area = 0.0f64;
        for strip in &self.strips {
            for w in strip.windows(3) {
                if let (Some(p0), Some(p1), Some(p2)) =
                    (self.position(w[0]), self.position(w[1]), self.position(w[2]))
                {
                    area += triangle_area(p0, p1, p2);
                }
            }
        }
        area as f32
    }

    /// Nominal storage size in bytes: four per position float group
    /// (doubled when normals are present) plus four per strip index.
    pub fn size(&self) -> i32 {
        let per_vertex = if self.normals.is_some() { 2 } else { 1 };
        let mut size = self.positions.len() as i32 * 4 * per_vertex;
        for strip in &self.strips {
            size += strip.len() as i32 * 4;
        }
        size
    }

    /// Bounding box of the positions, all-zero when there are none.
    pub fn bbox(&self) -> BBox3f {
        let mut bbox = BBox3f::EMPTY;
        for &p in &self.positions {
            bbox.expand_by_point(p);
        }
        bbox.or_zero()
    }

    /// The center slot in existing files holds the box extents, not the
    /// midpoint. Keep that form.
    pub fn center(&self) -> Vec3 {
        let bbox = self.bbox();
        bbox.max - bbox.min
    }

    fn position(&self, index: i32) -> Option<Vec3> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.positions.get(i))
            .copied()
    }
}

/// Value of a named node property.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    String(String),
    Int(i32),
    Float(f32),
    Date(JtDate),
    /// Late-loaded geometry reference. Written for the shape property
    /// the writer injects; a user-supplied value of this kind gets its
    /// own Shape-LOD segment, but cannot move to a separate attribute
    /// segment.
    GeometrySets(Vec<GeometricSet>),
    /// Reference to an already emitted segment. Internal to the
    /// separate-attribute-segments mode.
    SegmentRef(SegmentHeader),
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        PropertyValue::String(v.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        PropertyValue::String(v)
    }
}

impl From<i32> for PropertyValue {
    fn from(v: i32) -> Self {
        PropertyValue::Int(v)
    }
}

impl From<f32> for PropertyValue {
    fn from(v: f32) -> Self {
        PropertyValue::Float(v)
    }
}

impl From<JtDate> for PropertyValue {
    fn from(v: JtDate) -> Self {
        PropertyValue::Date(v)
    }
}

/// One node of the scene tree.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    /// Process-wide id, preserved by `clone`. In split mode a repeated
    /// id means "the same part again" and reuses the external file.
    pub id: i32,
    pub name: Option<String>,
    pub number: Option<String>,
    pub measurement_unit: MeasurementUnit,
    /// Named properties in insertion order.
    pub attributes: Vec<(String, PropertyValue)>,
    pub geometry: Vec<GeometricSet>,
    pub transform: Option<Mat4>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new() -> Self {
        Self {
            id: next_id(),
            name: None,
            number: None,
            measurement_unit: MeasurementUnit::default(),
            attributes: Vec::new(),
            geometry: Vec::new(),
            transform: None,
            children: Vec::new(),
        }
    }

    /// Set a property, replacing an existing value under the same key.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.attributes.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.attributes.push((key, value));
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&PropertyValue> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Display label: the name, falling back to the number.
    pub fn label(&self) -> Option<&str> {
        self.name.as_deref().or(self.number.as_deref())
    }

    /// Count of nodes in this subtree, this node included.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(SceneNode::subtree_len).sum::<usize>()
    }
}

impl Default for SceneNode {
    fn default() -> Self {
        Self::new()
    }
}
