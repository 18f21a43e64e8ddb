//! Single-mesh export entry points

use anyhow::{bail, Result};
use std::path::Path;

use crate::error::ExportResult;
use crate::formats::{validate_comment, write_ply_file};
use crate::mesh::{convert_gltf, convert_obj, load_gltf, load_obj, pack_mesh, ExportSummary, SourceMesh};
use crate::options::ExportOptions;

/// Pack `mesh` and write it to `output`
///
/// An empty mesh still produces a valid header-only file.
pub fn pack_and_write(
    mesh: &SourceMesh,
    options: &ExportOptions,
    output: &Path,
) -> ExportResult<ExportSummary> {
    let comment = options.comment.as_deref();
    if let Some(text) = comment {
        validate_comment(text)?;
    }

    if mesh.is_empty() {
        tracing::warn!("Mesh has no triangles, writing header-only file {:?}", output);
    }

    let packed = pack_mesh(mesh, options)?;
    let bytes_written = write_ply_file(output, &packed, comment)?;

    Ok(ExportSummary {
        vertex_count: packed.vertex_count(),
        face_count: packed.face_count(),
        stride: packed.stride(),
        degenerate_triangles: packed.degenerate_triangles,
        bytes_written,
    })
}

/// Mesh source formats recognized by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Obj,
    Gltf,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match ext.as_deref() {
            Some("obj") => Ok(Self::Obj),
            Some("gltf" | "glb") => Ok(Self::Gltf),
            _ => bail!("Unsupported mesh format: {:?}", path),
        }
    }
}

/// Load any supported mesh source
pub fn load_source(path: &Path) -> Result<SourceMesh> {
    match SourceFormat::from_path(path)? {
        SourceFormat::Obj => load_obj(path),
        SourceFormat::Gltf => load_gltf(path),
    }
}

/// Convert any supported mesh source to a gxport PLY mesh
pub fn convert_mesh_file(
    input: &Path,
    output: &Path,
    options: &ExportOptions,
) -> Result<ExportSummary> {
    match SourceFormat::from_path(input)? {
        SourceFormat::Obj => convert_obj(input, output, options),
        SourceFormat::Gltf => convert_gltf(input, output, options),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_format_from_extension() {
        assert_eq!(SourceFormat::from_path(Path::new("a/cube.OBJ")).unwrap(), SourceFormat::Obj);
        assert_eq!(SourceFormat::from_path(Path::new("rock.glb")).unwrap(), SourceFormat::Gltf);
        assert_eq!(SourceFormat::from_path(Path::new("rock.gltf")).unwrap(), SourceFormat::Gltf);
        assert!(SourceFormat::from_path(Path::new("rock.fbx")).is_err());
        assert!(SourceFormat::from_path(Path::new("rock")).is_err());
    }
}
