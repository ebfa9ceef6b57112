//! Attribute elements attached to nodes through ordered id lists.

use glam::Mat4;

use crate::io::{self, ByteCursor};
use crate::util::Result;

/// Fields common to every attribute element.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttributeData {
    pub object_id: i32,
    pub state_flags: u8,
    pub field_inhibit_flags: u32,
}

impl AttributeData {
    pub const SIZE: usize = 9;

    pub fn new(object_id: i32) -> Self {
        Self { object_id, ..Self::default() }
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        io::put_i32(buf, self.object_id);
        io::put_u8(buf, self.state_flags);
        io::put_u32(buf, self.field_inhibit_flags);
    }

    pub fn decode(cur: &mut ByteCursor) -> Result<Self> {
        let object_id = cur.read_i32()?;
        let state_flags = cur.read_u8()?;
        let field_inhibit_flags = cur.read_u32()?;
        Ok(Self { object_id, state_flags, field_inhibit_flags })
    }
}

/// Phong material colours, RGBA components in `0.0..=1.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialAttribute {
    pub attr: AttributeData,
    pub data_flags: u16,
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub emission: [f32; 4],
    pub shininess: f32,
}

impl MaterialAttribute {
    /// Material derived from a flat 8-bit colour: the colour drives both
    /// ambient and diffuse, highlights stay a fixed light grey.
    pub fn from_rgba8(object_id: i32, r: u8, g: u8, b: u8, a: u8) -> Self {
        let base = [
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        ];
        Self {
            attr: AttributeData::new(object_id),
            data_flags: 0,
            ambient: base,
            diffuse: base,
            specular: [229.0 / 255.0, 229.0 / 255.0, 229.0 / 255.0, 1.0],
            emission: [0.0, 0.0, 0.0, 1.0],
            shininess: 10.0,
        }
    }

    pub fn byte_count(&self) -> usize {
        AttributeData::SIZE + 2 + 16 * 4 + 4
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        self.attr.encode(buf);
        io::put_u16(buf, self.data_flags);
        for c in self.ambient.iter().chain(&self.diffuse).chain(&self.specular).chain(&self.emission)
        {
            io::put_f32(buf, *c);
        }
        io::put_f32(buf, self.shininess);
    }

    pub fn decode(cur: &mut ByteCursor) -> Result<Self> {
        let attr = AttributeData::decode(cur)?;
        let data_flags = cur.read_u16()?;
        let mut colours = [[0.0f32; 4]; 4];
        for colour in colours.iter_mut() {
            for c in colour.iter_mut() {
                *c = cur.read_f32()?;
            }
        }
        let [ambient, diffuse, specular, emission] = colours;
        let shininess = cur.read_f32()?;
        Ok(Self { attr, data_flags, ambient, diffuse, specular, emission, shininess })
    }
}

const IDENTITY: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

/// 4x4 transform, row-vector convention with the translation in the
/// last row. Only elements differing from the identity go to the wire,
/// selected by a 16-bit mask whose top bit covers element 0.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometricTransformAttribute {
    pub attr: AttributeData,
    pub elements: [f32; 16],
}

impl GeometricTransformAttribute {
    pub fn new(object_id: i32, elements: [f32; 16]) -> Self {
        Self { attr: AttributeData::new(object_id), elements }
    }

    /// A glam matrix transforming column vectors stores the same 16
    /// floats as the row-vector form expected here, so the array passes
    /// through unchanged.
    pub fn from_mat4(object_id: i32, mat: Mat4) -> Self {
        Self::new(object_id, mat.to_cols_array())
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_cols_array(&self.elements)
    }

    fn element_mask(&self) -> u16 {
        let mut mask = 0u16;
        for (element, identity) in self.elements.iter().zip(&IDENTITY) {
            mask = (mask << 1) | (element != identity) as u16;
        }
        mask
    }

    pub fn byte_count(&self) -> usize {
        AttributeData::SIZE + 2 + 4 * self.element_mask().count_ones() as usize
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        self.attr.encode(buf);
        io::put_u16(buf, self.element_mask());
        for (element, identity) in self.elements.iter().zip(&IDENTITY) {
            if element != identity {
                io::put_f32(buf, *element);
            }
        }
    }

    pub fn decode(cur: &mut ByteCursor) -> Result<Self> {
        let attr = AttributeData::decode(cur)?;
        let mask = cur.read_u16()?;
        let mut elements = IDENTITY;
        for (i, element) in elements.iter_mut().enumerate() {
            if mask & (1 << (15 - i)) != 0 {
                *element = cur.read_f32()?;
            }
        }
        Ok(Self { attr, elements })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::Endian;
    use glam::Vec3;

    #[test]
    fn test_material_from_rgba8() {
        let m = MaterialAttribute::from_rgba8(5, 255, 0, 0, 255);
        assert_eq!(m.diffuse, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(m.ambient, m.diffuse);
        assert_eq!(m.emission, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(m.shininess, 10.0);
    }

    #[test]
    fn test_material_round_trip() {
        let m = MaterialAttribute::from_rgba8(5, 10, 20, 30, 255);
        let mut buf = Vec::new();
        m.encode(&mut buf);
        assert_eq!(buf.len(), m.byte_count());
        assert_eq!(buf.len(), 79);
        let mut cur = ByteCursor::new(&buf, Endian::Little);
        let back = MaterialAttribute::decode(&mut cur).unwrap();
        assert_eq!(cur.remaining(), 0);
        assert_eq!(back, m);
    }

    #[test]
    fn test_transform_identity_is_mask_only() {
        let t = GeometricTransformAttribute::new(1, IDENTITY);
        let mut buf = Vec::new();
        t.encode(&mut buf);
        assert_eq!(buf.len(), AttributeData::SIZE + 2);
        assert_eq!(&buf[AttributeData::SIZE..], &[0, 0]);
    }

    #[test]
    fn test_transform_translation_mask() {
        let t = GeometricTransformAttribute::from_mat4(
            1,
            Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)),
        );
        // translation occupies elements 12, 13 and 14
        assert_eq!(t.element_mask(), 0b0000_0000_0000_1110);
        assert_eq!(t.byte_count(), AttributeData::SIZE + 2 + 12);
    }

    #[test]
    fn test_transform_round_trip() {
        let mat = Mat4::from_translation(Vec3::new(4.0, 0.0, -2.5))
            * Mat4::from_scale(Vec3::splat(2.0));
        let t = GeometricTransformAttribute::from_mat4(7, mat);
        let mut buf = Vec::new();
        t.encode(&mut buf);
        assert_eq!(buf.len(), t.byte_count());
        let mut cur = ByteCursor::new(&buf, Endian::Little);
        let back = GeometricTransformAttribute::decode(&mut cur).unwrap();
        assert_eq!(cur.remaining(), 0);
        assert_eq!(back.elements, t.elements);
        assert_eq!(back.matrix(), mat);
    }
}
