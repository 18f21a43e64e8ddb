//! Types for mesh conversion

use gx_common::{vertex_stride, BoneEncoding, PlyVertex};

use super::skinning::BoneInfluence;
use crate::options::VertexAttributes;

/// One triangle corner as handed over by a mesh source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corner {
    /// Source vertex id, used to look up bone influences
    pub vertex: u32,
    pub position: [f32; 3],
    pub uv: Option<[f32; 2]>,
    pub normal: Option<[f32; 3]>,
    /// RGBA in [0, 1]
    pub color: Option<[f32; 4]>,
}

impl Corner {
    pub fn new(vertex: u32, position: [f32; 3]) -> Self {
        Self {
            vertex,
            position,
            uv: None,
            normal: None,
            color: None,
        }
    }

    pub fn with_uv(mut self, uv: [f32; 2]) -> Self {
        self.uv = Some(uv);
        self
    }

    pub fn with_normal(mut self, normal: [f32; 3]) -> Self {
        self.normal = Some(normal);
        self
    }

    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = Some(color);
        self
    }
}

pub type Triangle = [Corner; 3];

/// Triangulated source geometry plus per-source-vertex bone influences
#[derive(Debug, Clone, Default)]
pub struct SourceMesh {
    pub triangles: Vec<Triangle>,
    /// Indexed by [`Corner::vertex`]; empty when the source has no skin
    pub influences: Vec<Vec<BoneInfluence>>,
}

impl SourceMesh {
    pub fn new(triangles: Vec<Triangle>) -> Self {
        Self {
            triangles,
            influences: Vec::new(),
        }
    }

    pub fn with_influences(mut self, influences: Vec<Vec<BoneInfluence>>) -> Self {
        self.influences = influences;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    fn corners(&self) -> impl Iterator<Item = &Corner> {
        self.triangles.iter().flatten()
    }

    /// Attributes every corner can supply
    ///
    /// Tangents and bitangents are never switched on here.
    pub fn available_attributes(&self) -> VertexAttributes {
        let non_empty = !self.is_empty();
        let skinned = !self.influences.is_empty();
        VertexAttributes {
            geometry: true,
            uv: non_empty && self.corners().all(|c| c.uv.is_some()),
            normals: non_empty && self.corners().all(|c| c.normal.is_some()),
            colors: non_empty && self.corners().all(|c| c.color.is_some()),
            bone_indices: skinned,
            bone_weights: skinned,
            ..VertexAttributes::NONE
        }
    }
}

/// Deduplicated vertex table and face list, ready to write
#[derive(Debug, Clone)]
pub struct PackedMesh {
    pub format: u16,
    pub bone_encoding: BoneEncoding,
    pub vertices: Vec<PlyVertex>,
    pub faces: Vec<[u32; 3]>,
    /// Triangles that received a zero tangent frame
    pub degenerate_triangles: usize,
}

impl PackedMesh {
    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn face_count(&self) -> u32 {
        self.faces.len() as u32
    }

    pub fn stride(&self) -> usize {
        vertex_stride(self.format, self.bone_encoding)
    }
}

/// What one export produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    pub vertex_count: u32,
    pub face_count: u32,
    pub stride: usize,
    pub degenerate_triangles: usize,
    pub bytes_written: u64,
}
