//! Shape-LOD payload: tri-strip vertex data in its wire form.
//!
//! Strips are renumbered on construction so that vertex records can be
//! stored as one flat run per strip; the primitive list index array
//! then encodes every strip as a contiguous `[start, end)` range and
//! the indices themselves never go to the wire.

use glam::Vec3;

use crate::codec::{int32, Predictor};
use crate::compress;
use crate::io::{self, ByteCursor, Endian};
use crate::util::{Error, Result};

/// Per-field quantization bit widths. All zero means vertex data is
/// stored losslessly as raw floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuantizationParams {
    pub bits_per_vertex: u8,
    pub normal_bits_factor: u8,
    pub bits_per_texture_coord: u8,
    pub bits_per_colour: u8,
}

impl QuantizationParams {
    pub const SIZE: usize = 4;

    pub fn encode(&self, buf: &mut Vec<u8>) {
        io::put_u8(buf, self.bits_per_vertex);
        io::put_u8(buf, self.normal_bits_factor);
        io::put_u8(buf, self.bits_per_texture_coord);
        io::put_u8(buf, self.bits_per_colour);
    }

    pub fn decode(cur: &mut ByteCursor) -> Result<Self> {
        Ok(Self {
            bits_per_vertex: cur.read_u8()?,
            normal_bits_factor: cur.read_u8()?,
            bits_per_texture_coord: cur.read_u8()?,
            bits_per_colour: cur.read_u8()?,
        })
    }
}

/// Interleaved vertex records, zlib-deflated on the wire. A negative
/// stored length marks an uncompressed fallback some writers emit.
#[derive(Debug, Clone, PartialEq)]
pub struct LosslessVertexData {
    raw: Vec<u8>,
    stored: Vec<u8>,
    compressed: bool,
}

impl LosslessVertexData {
    pub fn from_raw(raw: Vec<u8>) -> Result<Self> {
        let stored = compress::deflate(&raw)?;
        Ok(Self { raw, stored, compressed: true })
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        &self.raw
    }

    pub fn byte_count(&self) -> usize {
        8 + self.stored.len()
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        io::put_i32(buf, self.raw.len() as i32);
        let stored_len = self.stored.len() as i32;
        io::put_i32(buf, if self.compressed { stored_len } else { -stored_len });
        buf.extend_from_slice(&self.stored);
    }

    pub fn decode(cur: &mut ByteCursor) -> Result<Self> {
        let raw_len = cur.read_i32()?;
        let stored_len = cur.read_i32()?;
        if stored_len > 0 {
            let stored = cur.take(stored_len as usize)?.to_vec();
            let raw = compress::inflate(&stored)?;
            if raw.len() != raw_len as usize {
                return Err(Error::invalid(format!(
                    "vertex data inflated to {} bytes, header declared {}",
                    raw.len(),
                    raw_len
                )));
            }
            Ok(Self { raw, stored, compressed: true })
        } else if stored_len < 0 {
            let raw = cur.take(stored_len.unsigned_abs() as usize)?.to_vec();
            Ok(Self { stored: raw.clone(), raw, compressed: false })
        } else {
            Ok(Self { raw: Vec::new(), stored: Vec::new(), compressed: false })
        }
    }
}

/// Vertex fields recovered from a rep-data payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DecodedVertices {
    pub positions: Vec<Vec3>,
    pub normals: Option<Vec<Vec3>>,
    pub texture_coords: Option<Vec<[f32; 2]>>,
    pub colours: Option<Vec<Vec3>>,
    pub strips: Vec<Vec<i32>>,
}

/// Tri-strip vertex payload of a Shape-LOD element.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexRepData {
    pub version: i16,
    pub normal_binding: u8,
    pub texture_coord_binding: u8,
    pub colour_binding: u8,
    pub quantization: QuantizationParams,
    pub primitive_list_indices: Vec<i32>,
    pub vertex_data: LosslessVertexData,
}

impl VertexRepData {
    /// Expands indexed strips into flat per-strip vertex runs. Shared
    /// vertices are duplicated so strips become `[start, end)` ranges.
    pub fn from_strips(
        strips: &[Vec<i32>],
        positions: &[Vec3],
        normals: Option<&[Vec3]>,
    ) -> Result<Self> {
        let total: usize = strips.iter().map(Vec::len).sum();
        let mut primitive_list_indices = Vec::with_capacity(strips.len() + 1);
        let mut raw = Vec::with_capacity(total * 12 * if normals.is_some() { 2 } else { 1 });

        let mut next_index = 0i32;
        for strip in strips {
            primitive_list_indices.push(next_index);
            next_index += strip.len() as i32;
            for &index in strip {
                let position = positions
                    .get(index as usize)
                    .ok_or_else(|| vertex_index_error(index, "position"))?;
                if let Some(normals) = normals {
                    let normal = normals
                        .get(index as usize)
                        .ok_or_else(|| vertex_index_error(index, "normal"))?;
                    io::put_vec3(&mut raw, *normal);
                }
                io::put_vec3(&mut raw, *position);
            }
        }
        if !strips.is_empty() {
            primitive_list_indices.push(next_index);
        }

        Ok(Self {
            version: 1,
            normal_binding: normals.is_some() as u8,
            texture_coord_binding: 0,
            colour_binding: 0,
            quantization: QuantizationParams::default(),
            primitive_list_indices,
            vertex_data: LosslessVertexData::from_raw(raw)?,
        })
    }

    pub fn byte_count(&self) -> usize {
        2 + 3
            + QuantizationParams::SIZE
            + int32::encoded_len(self.primitive_list_indices.len())
            + self.vertex_data.byte_count()
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        io::put_i16(buf, self.version);
        io::put_u8(buf, self.normal_binding);
        io::put_u8(buf, self.texture_coord_binding);
        io::put_u8(buf, self.colour_binding);
        self.quantization.encode(buf);
        buf.extend_from_slice(&int32::encode(&self.primitive_list_indices, Predictor::Stride1));
        self.vertex_data.encode(buf);
    }

    pub fn decode(cur: &mut ByteCursor) -> Result<Self> {
        let version = cur.read_i16()?;
        let normal_binding = cur.read_u8()?;
        let texture_coord_binding = cur.read_u8()?;
        let colour_binding = cur.read_u8()?;
        let quantization = QuantizationParams::decode(cur)?;
        let primitive_list_indices = int32::decode(cur, Predictor::Stride1)?;
        if quantization.bits_per_vertex != 0 {
            return Err(Error::NotImplemented("quantized vertex data"));
        }
        let vertex_data = LosslessVertexData::decode(cur)?;
        Ok(Self {
            version,
            normal_binding,
            texture_coord_binding,
            colour_binding,
            quantization,
            primitive_list_indices,
            vertex_data,
        })
    }

    /// Parses the raw vertex records back into field arrays. The byte
    /// order is the one the containing file was read with.
    pub fn decoded_vertices(&self, order: Endian) -> Result<DecodedVertices> {
        let read_normals = self.normal_binding == 1;
        let read_texture_coords = self.texture_coord_binding == 1;
        let read_colours = self.colour_binding == 1;

        let floats_per_vertex = 3
            + if read_normals { 3 } else { 0 }
            + if read_texture_coords { 2 } else { 0 }
            + if read_colours { 3 } else { 0 };
        let raw = self.vertex_data.vertex_bytes();
        let vertex_count = raw.len() / 4 / floats_per_vertex;

        let mut cur = ByteCursor::new(raw, order);
        let mut positions = Vec::with_capacity(vertex_count);
        let mut normals = read_normals.then(|| Vec::with_capacity(vertex_count));
        let mut texture_coords = read_texture_coords.then(|| Vec::with_capacity(vertex_count));
        let mut colours = read_colours.then(|| Vec::with_capacity(vertex_count));

        for _ in 0..vertex_count {
            if let Some(texture_coords) = texture_coords.as_mut() {
                texture_coords.push([cur.read_f32()?, cur.read_f32()?]);
            }
            if let Some(colours) = colours.as_mut() {
                colours.push(cur.read_vec3()?);
            }
            if let Some(normals) = normals.as_mut() {
                normals.push(cur.read_vec3()?);
            }
            positions.push(cur.read_vec3()?);
        }

        let mut strips = Vec::new();
        for window in self.primitive_list_indices.windows(2) {
            strips.push((window[0]..window[1]).collect());
        }

        Ok(DecodedVertices { positions, normals, texture_coords, colours, strips })
    }
}

fn vertex_index_error(index: i32, field: &str) -> Error {
    Error::invalid(format!("tri-strip references {} {} which does not exist", field, index))
}

/// Sole element of a Shape-LOD segment: rep data wrapped in two
/// version numbers, one leading and one trailing.
#[derive(Debug, Clone, PartialEq)]
pub struct TriStripSetShapeLodElement {
    pub vertex_lod_version: i16,
    pub rep: VertexRepData,
    pub version: i16,
}

impl TriStripSetShapeLodElement {
    pub fn new(rep: VertexRepData) -> Self {
        Self { vertex_lod_version: 1, rep, version: 1 }
    }

    pub fn byte_count(&self) -> usize {
        2 + self.rep.byte_count() + 2
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        io::put_i16(buf, self.vertex_lod_version);
        self.rep.encode(buf);
        io::put_i16(buf, self.version);
    }

    pub fn decode(cur: &mut ByteCursor) -> Result<Self> {
        let vertex_lod_version = cur.read_i16()?;
        let rep = VertexRepData::decode(cur)?;
        let version = cur.read_i16()?;
        Ok(Self { vertex_lod_version, rep, version })
    }
}
