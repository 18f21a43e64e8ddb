//! Shared types and utilities for the gxport mesh format
//!
//! This crate provides format-level utilities shared between:
//! - `gx-export` (asset pipeline)
//! - engine-side loaders that read the exported `.ply` meshes
//!
//! # Modules
//!
//! - [`packing`] - Vertex attribute flags, byte widths and per-vertex packing
//! - [`formats`] - PLY header emission and parsing
//! - [`loader`] - Full-file decoding back into vertices and faces

pub mod formats;
pub mod loader;
pub mod packing;

pub use loader::{decode_ply_mesh, PlyMesh};

pub use packing::{
    f32_to_unorm8, format_from_properties, pack_color_rgba_unorm8, pack_vertex, unorm8_to_f32,
    unpack_vertex, vertex_properties, vertex_stride, BoneEncoding, PlyVertex, BONE_SLOTS,
    FORMAT_BITANGENT, FORMAT_BONE_INDICES, FORMAT_BONE_WEIGHTS, FORMAT_COLOR, FORMAT_NORMAL,
    FORMAT_POSITION, FORMAT_TANGENT, FORMAT_UV, UNUSED_BONE,
};

pub use formats::{FormatError, PlyHeader, PlyProperty, ScalarType, FACE_CORNERS};
