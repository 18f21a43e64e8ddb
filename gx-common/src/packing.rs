//! Vertex data packing utilities
//!
//! Provides the attribute flags that select which vertex properties are
//! exported, their header names and widths, and the little-endian packing of
//! a single vertex record.
//!
//! Used by both `gx-export` (asset pipeline) and [`crate::loader`] (reading
//! files back).

use serde::{Deserialize, Serialize};

use crate::formats::{FormatError, PlyProperty, ScalarType};

// ============================================================================
// Vertex Format Constants
// ============================================================================

/// Vertex format flag: Has position (3 floats)
pub const FORMAT_POSITION: u16 = 1;
/// Vertex format flag: Has UV coordinates (2 floats)
pub const FORMAT_UV: u16 = 1 << 1;
/// Vertex format flag: Has normals (3 floats)
pub const FORMAT_NORMAL: u16 = 1 << 2;
/// Vertex format flag: Has tangents (3 floats)
pub const FORMAT_TANGENT: u16 = 1 << 3;
/// Vertex format flag: Has bitangents (3 floats)
pub const FORMAT_BITANGENT: u16 = 1 << 4;
/// Vertex format flag: Has per-vertex color (RGBA, 4 × u8)
pub const FORMAT_COLOR: u16 = 1 << 5;
/// Vertex format flag: Has 4 bone indices
pub const FORMAT_BONE_INDICES: u16 = 1 << 6;
/// Vertex format flag: Has 4 bone weights
pub const FORMAT_BONE_WEIGHTS: u16 = 1 << 7;

/// Bone slots per vertex
pub const BONE_SLOTS: usize = 4;

/// Bone index stored in an unused slot
pub const UNUSED_BONE: i32 = -1;

/// Property groups in payload order
const ATTRIBUTE_LAYOUT: [(u16, &[&str]); 8] = [
    (FORMAT_POSITION, &["x", "y", "z"]),
    (FORMAT_UV, &["s", "t"]),
    (FORMAT_NORMAL, &["nx", "ny", "nz"]),
    (FORMAT_TANGENT, &["tx", "ty", "tz"]),
    (FORMAT_BITANGENT, &["bx", "by", "bz"]),
    (FORMAT_COLOR, &["red", "green", "blue", "alpha"]),
    (FORMAT_BONE_INDICES, &["b0", "b1", "b2", "b3"]),
    (FORMAT_BONE_WEIGHTS, &["w0", "w1", "w2", "w3"]),
];

/// Width of the bone index and bone weight properties
///
/// `Wide` declares `int`/`float` and packs i32/f32. `Byte` declares `uchar`
/// for both and packs one byte each: unused bone slots become 255 and weights
/// are stored as unorm8.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoneEncoding {
    #[default]
    Wide,
    Byte,
}

impl BoneEncoding {
    pub fn index_type(self) -> ScalarType {
        match self {
            BoneEncoding::Wide => ScalarType::Int,
            BoneEncoding::Byte => ScalarType::UChar,
        }
    }

    pub fn weight_type(self) -> ScalarType {
        match self {
            BoneEncoding::Wide => ScalarType::Float,
            BoneEncoding::Byte => ScalarType::UChar,
        }
    }

    /// Largest bone index that can be stored (the byte form reserves 255 for unused)
    pub fn max_bone_index(self) -> i32 {
        match self {
            BoneEncoding::Wide => i32::MAX,
            BoneEncoding::Byte => u8::MAX as i32 - 1,
        }
    }
}

fn property_type(flag: u16, encoding: BoneEncoding) -> ScalarType {
    match flag {
        FORMAT_COLOR => ScalarType::UChar,
        FORMAT_BONE_INDICES => encoding.index_type(),
        FORMAT_BONE_WEIGHTS => encoding.weight_type(),
        _ => ScalarType::Float,
    }
}

/// Vertex property list for the header, in payload order
pub fn vertex_properties(format: u16, encoding: BoneEncoding) -> Vec<PlyProperty> {
    ATTRIBUTE_LAYOUT
        .iter()
        .filter(|(flag, _)| format & flag != 0)
        .flat_map(|&(flag, names)| {
            let ty = property_type(flag, encoding);
            names.iter().map(move |name| PlyProperty::new(ty, *name))
        })
        .collect()
}

/// Calculate vertex stride in bytes
#[inline]
pub const fn vertex_stride(format: u16, encoding: BoneEncoding) -> usize {
    let mut stride = 0;
    let bone_width = match encoding {
        BoneEncoding::Wide => 4,
        BoneEncoding::Byte => 1,
    };

    if format & FORMAT_POSITION != 0 {
        stride += 12; // Float32x3
    }
    if format & FORMAT_UV != 0 {
        stride += 8; // Float32x2
    }
    if format & FORMAT_NORMAL != 0 {
        stride += 12; // Float32x3
    }
    if format & FORMAT_TANGENT != 0 {
        stride += 12; // Float32x3
    }
    if format & FORMAT_BITANGENT != 0 {
        stride += 12; // Float32x3
    }
    if format & FORMAT_COLOR != 0 {
        stride += 4; // Unorm8x4
    }
    if format & FORMAT_BONE_INDICES != 0 {
        stride += 4 * bone_width;
    }
    if format & FORMAT_BONE_WEIGHTS != 0 {
        stride += 4 * bone_width;
    }

    stride
}

/// Recover the attribute flags and bone encoding from a header's vertex properties
///
/// Properties must appear in payload order with their canonical names.
pub fn format_from_properties(
    properties: &[PlyProperty],
) -> Result<(u16, BoneEncoding), FormatError> {
    let mut format = 0u16;
    let mut index_encoding = None;
    let mut weight_encoding = None;
    let mut cursor = 0;

    for (flag, names) in ATTRIBUTE_LAYOUT {
        let Some(first) = properties.get(cursor) else {
            break;
        };
        if first.name != names[0] {
            continue;
        }

        let group = properties
            .get(cursor..cursor + names.len())
            .ok_or_else(|| FormatError::PropertyOrder(first.name.clone()))?;
        for (property, expected) in group.iter().zip(names) {
            if property.name != *expected {
                return Err(FormatError::PropertyOrder(property.name.clone()));
            }
        }

        let ty = first.ty;
        if let Some(mismatch) = group.iter().find(|p| p.ty != ty) {
            return Err(FormatError::PropertyType {
                name: mismatch.name.clone(),
                found: mismatch.ty.name(),
                expected: ty.name(),
            });
        }

        match flag {
            FORMAT_BONE_INDICES => {
                index_encoding = Some(match ty {
                    ScalarType::Int => BoneEncoding::Wide,
                    ScalarType::UChar => BoneEncoding::Byte,
                    ScalarType::Float => return Err(type_error(first, "int or uchar")),
                });
            }
            FORMAT_BONE_WEIGHTS => {
                weight_encoding = Some(match ty {
                    ScalarType::Float => BoneEncoding::Wide,
                    ScalarType::UChar => BoneEncoding::Byte,
                    ScalarType::Int => return Err(type_error(first, "float or uchar")),
                });
            }
            _ => {
                let expected = property_type(flag, BoneEncoding::Wide);
                if ty != expected {
                    return Err(type_error(first, expected.name()));
                }
            }
        }

        format |= flag;
        cursor += names.len();
    }

    if let Some(leftover) = properties.get(cursor) {
        let known = ATTRIBUTE_LAYOUT
            .iter()
            .any(|(_, names)| names.contains(&leftover.name.as_str()));
        return Err(if known {
            FormatError::PropertyOrder(leftover.name.clone())
        } else {
            FormatError::UnknownProperty(leftover.name.clone())
        });
    }

    let encoding = match (index_encoding, weight_encoding) {
        (Some(a), Some(b)) if a != b => {
            return Err(FormatError::PropertyType {
                name: "w0".to_owned(),
                found: b.weight_type().name(),
                expected: a.weight_type().name(),
            });
        }
        (Some(a), _) | (None, Some(a)) => a,
        (None, None) => BoneEncoding::Wide,
    };

    Ok((format, encoding))
}

fn type_error(property: &PlyProperty, expected: &'static str) -> FormatError {
    FormatError::PropertyType {
        name: property.name.clone(),
        found: property.ty.name(),
        expected,
    }
}

// ============================================================================
// Vertex Record
// ============================================================================

/// One output vertex; fields outside the exported format keep their defaults
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlyVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub normal: [f32; 3],
    pub tangent: [f32; 3],
    pub bitangent: [f32; 3],
    pub color: [u8; 4],
    pub bone_indices: [i32; BONE_SLOTS],
    pub bone_weights: [f32; BONE_SLOTS],
}

impl Default for PlyVertex {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            uv: [0.0; 2],
            normal: [0.0; 3],
            tangent: [0.0; 3],
            bitangent: [0.0; 3],
            color: [0; 4],
            bone_indices: [UNUSED_BONE; BONE_SLOTS],
            bone_weights: [0.0; BONE_SLOTS],
        }
    }
}

// ============================================================================
// Basic Conversion Functions
// ============================================================================

/// Convert f32 to unsigned normalized 8-bit integer (unorm8)
///
/// Maps f32 range [0.0, 1.0] to u8 range [0, 255].
#[inline]
pub fn f32_to_unorm8(value: f32) -> u8 {
    let clamped = value.clamp(0.0, 1.0);
    (clamped * 255.0) as u8
}

#[inline]
pub fn unorm8_to_f32(value: u8) -> f32 {
    value as f32 / 255.0
}

/// Pack an RGBA color (f32x4) to Unorm8x4 format
#[inline]
pub fn pack_color_rgba_unorm8(r: f32, g: f32, b: f32, a: f32) -> [u8; 4] {
    [
        f32_to_unorm8(r),
        f32_to_unorm8(g),
        f32_to_unorm8(b),
        f32_to_unorm8(a),
    ]
}

/// Byte form of a bone index; unused and out-of-range slots become 255
#[inline]
fn bone_index_to_u8(index: i32) -> u8 {
    u8::try_from(index).unwrap_or(u8::MAX)
}

#[inline]
fn bone_index_from_u8(index: u8) -> i32 {
    if index == u8::MAX {
        UNUSED_BONE
    } else {
        index as i32
    }
}

// ============================================================================
// Full Vertex Packing
// ============================================================================

fn extend_f32s(out: &mut Vec<u8>, values: &[f32]) {
    for value in values {
        out.extend_from_slice(&value.to_le_bytes());
    }
}

/// Append one vertex to `out` in payload order
///
/// Vertex layout (in order): Position → UV → Normal → Tangent → Bitangent →
/// Color → Bone indices → Bone weights
pub fn pack_vertex(vertex: &PlyVertex, format: u16, encoding: BoneEncoding, out: &mut Vec<u8>) {
    if format & FORMAT_POSITION != 0 {
        extend_f32s(out, &vertex.position);
    }
    if format & FORMAT_UV != 0 {
        extend_f32s(out, &vertex.uv);
    }
    if format & FORMAT_NORMAL != 0 {
        extend_f32s(out, &vertex.normal);
    }
    if format & FORMAT_TANGENT != 0 {
        extend_f32s(out, &vertex.tangent);
    }
    if format & FORMAT_BITANGENT != 0 {
        extend_f32s(out, &vertex.bitangent);
    }
    if format & FORMAT_COLOR != 0 {
        out.extend_from_slice(&vertex.color);
    }
    if format & FORMAT_BONE_INDICES != 0 {
        match encoding {
            BoneEncoding::Wide => {
                for index in vertex.bone_indices {
                    out.extend_from_slice(&index.to_le_bytes());
                }
            }
            BoneEncoding::Byte => out.extend(vertex.bone_indices.map(bone_index_to_u8)),
        }
    }
    if format & FORMAT_BONE_WEIGHTS != 0 {
        match encoding {
            BoneEncoding::Wide => extend_f32s(out, &vertex.bone_weights),
            BoneEncoding::Byte => out.extend(vertex.bone_weights.map(f32_to_unorm8)),
        }
    }
}

/// Little-endian reader over one packed vertex
struct VertexReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl VertexReader<'_> {
    fn u8(&mut self) -> u8 {
        let value = self.bytes[self.pos];
        self.pos += 1;
        value
    }

    fn word(&mut self) -> [u8; 4] {
        let b = &self.bytes[self.pos..self.pos + 4];
        self.pos += 4;
        [b[0], b[1], b[2], b[3]]
    }

    fn f32s<const N: usize>(&mut self) -> [f32; N] {
        std::array::from_fn(|_| f32::from_le_bytes(self.word()))
    }
}

/// Unpack one vertex
///
/// `bytes` must hold at least `vertex_stride(format, encoding)` bytes.
pub fn unpack_vertex(bytes: &[u8], format: u16, encoding: BoneEncoding) -> PlyVertex {
    let mut reader = VertexReader { bytes, pos: 0 };
    let mut vertex = PlyVertex::default();

    if format & FORMAT_POSITION != 0 {
        vertex.position = reader.f32s();
    }
    if format & FORMAT_UV != 0 {
        vertex.uv = reader.f32s();
    }
    if format & FORMAT_NORMAL != 0 {
        vertex.normal = reader.f32s();
    }
    if format & FORMAT_TANGENT != 0 {
        vertex.tangent = reader.f32s();
    }
    if format & FORMAT_BITANGENT != 0 {
        vertex.bitangent = reader.f32s();
    }
    if format & FORMAT_COLOR != 0 {
        vertex.color = std::array::from_fn(|_| reader.u8());
    }
    if format & FORMAT_BONE_INDICES != 0 {
        vertex.bone_indices = match encoding {
            BoneEncoding::Wide => std::array::from_fn(|_| i32::from_le_bytes(reader.word())),
            BoneEncoding::Byte => std::array::from_fn(|_| bone_index_from_u8(reader.u8())),
        };
    }
    if format & FORMAT_BONE_WEIGHTS != 0 {
        vertex.bone_weights = match encoding {
            BoneEncoding::Wide => reader.f32s(),
            BoneEncoding::Byte => std::array::from_fn(|_| unorm8_to_f32(reader.u8())),
        };
    }

    vertex
}
