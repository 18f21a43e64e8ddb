//! gx-export library
//!
//! Converts triangulated meshes into gxport binary PLY files: bone influence
//! reduction, flat tangent frames, exact vertex deduplication and atomic file
//! writing. Used by the `gx-export` binary and by tools that drive exports
//! programmatically.

pub mod error;
pub mod export;
pub mod formats;
pub mod manifest;
pub mod mesh;
pub mod options;
pub mod part;

/// File extension of exported meshes
pub const PLY_EXT: &str = "ply";

pub use error::{ExportError, ExportResult};
pub use export::{convert_mesh_file, load_source, pack_and_write, SourceFormat};
pub use formats::{ply_header, write_ply_file, write_ply_mesh};
pub use mesh::{
    convert_gltf, convert_obj, pack_mesh, reduce_influences, BoneInfluence, Corner,
    ExportSummary, PackedMesh, SourceMesh,
};
pub use options::{
    format_name, parse_format_string, stamp_comment, ExportOptions, TangentPolicy,
    VertexAttributes,
};

// Re-export the wire format from gx-common
pub use gx_common::{decode_ply_mesh, BoneEncoding, PlyHeader, PlyMesh, PlyVertex};
