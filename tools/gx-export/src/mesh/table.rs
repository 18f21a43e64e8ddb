//! Unique vertex table
//!
//! Vertices are keyed by the bit patterns of their enabled fields, so two
//! corners merge only when every exported value is bit-identical. `0.0` and
//! `-0.0` stay distinct, as do NaNs with different payloads. Fields the file
//! stores as bytes are keyed on their byte value.

use gx_common::{
    f32_to_unorm8, BoneEncoding, PlyVertex, FORMAT_BITANGENT, FORMAT_BONE_INDICES, FORMAT_BONE_WEIGHTS, FORMAT_COLOR,
    FORMAT_NORMAL, FORMAT_POSITION, FORMAT_TANGENT, FORMAT_UV,
};
use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::error::{ExportError, ExportResult};

/// Words of the widest key (every attribute enabled)
const KEY_WORDS: usize = 23;

/// Enabled fields of one vertex as raw 32-bit words
pub type VertexKey = SmallVec<[u32; KEY_WORDS]>;

fn push_f32s(key: &mut VertexKey, values: &[f32]) {
    key.extend(values.iter().map(|v| v.to_bits()));
}

/// Deduplication key of `vertex` under `format` and `encoding`
pub fn vertex_key(vertex: &PlyVertex, format: u16, encoding: BoneEncoding) -> VertexKey {
    let mut key = VertexKey::new();

    if format & FORMAT_POSITION != 0 {
        push_f32s(&mut key, &vertex.position);
    }
    if format & FORMAT_UV != 0 {
        push_f32s(&mut key, &vertex.uv);
    }
    if format & FORMAT_NORMAL != 0 {
        push_f32s(&mut key, &vertex.normal);
    }
    if format & FORMAT_TANGENT != 0 {
        push_f32s(&mut key, &vertex.tangent);
    }
    if format & FORMAT_BITANGENT != 0 {
        push_f32s(&mut key, &vertex.bitangent);
    }
    if format & FORMAT_COLOR != 0 {
        key.push(u32::from_le_bytes(vertex.color));
    }
    if format & FORMAT_BONE_INDICES != 0 {
        key.extend(vertex.bone_indices.iter().map(|&b| b as u32));
    }
    if format & FORMAT_BONE_WEIGHTS != 0 {
        match encoding {
            BoneEncoding::Wide => push_f32s(&mut key, &vertex.bone_weights),
            BoneEncoding::Byte => key.push(u32::from_le_bytes(
                vertex.bone_weights.map(f32_to_unorm8),
            )),
        }
    }

    key
}

/// Insertion-ordered set of unique vertices
#[derive(Debug, Default)]
pub struct VertexTable {
    format: u16,
    encoding: BoneEncoding,
    lookup: HashMap<VertexKey, u32>,
    vertices: Vec<PlyVertex>,
}

impl VertexTable {
    pub fn new(format: u16, encoding: BoneEncoding) -> Self {
        Self {
            format,
            encoding,
            ..Self::default()
        }
    }

    /// Index of `vertex`, inserting it with the next index if unseen
    pub fn insert(&mut self, vertex: PlyVertex) -> ExportResult<u32> {
        let key = vertex_key(&vertex, self.format, self.encoding);
        let next = self.vertices.len();

        match self.lookup.entry(key) {
            hashbrown::hash_map::Entry::Occupied(entry) => Ok(*entry.get()),
            hashbrown::hash_map::Entry::Vacant(entry) => {
                let index = u32::try_from(next).map_err(|_| ExportError::TooManyVertices)?;
                entry.insert(index);
                self.vertices.push(vertex);
                Ok(index)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn into_vertices(self) -> Vec<PlyVertex> {
        self.vertices
    }
}
