//! Mesh converter (OBJ/glTF -> gxport .ply)
//!
//! Sources produce a [`SourceMesh`]; [`pack_mesh`] reduces bone influences,
//! derives tangent frames and deduplicates corners into a [`PackedMesh`].

mod gltf;
mod obj;
mod packer;
mod skinning;
mod table;
mod tangent;
mod types;

// Re-export public API
pub use gltf::{convert_gltf, load_gltf};
pub use obj::{convert_obj, load_obj};
pub use packer::pack_mesh;
pub use skinning::{reduce_all, reduce_influences, BoneInfluence};
pub use table::{vertex_key, VertexKey, VertexTable};
pub use tangent::{triangle_tangent_frame, TangentFrame};
pub use types::{Corner, ExportSummary, PackedMesh, SourceMesh, Triangle};
