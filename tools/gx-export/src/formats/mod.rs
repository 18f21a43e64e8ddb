//! PLY mesh writing
//!
//! Re-exports the wire format from gx-common and adds the writers used by the
//! exporter.

pub use gx_common::formats::*;

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use gx_common::{pack_vertex, vertex_properties};

use crate::error::{ExportError, ExportResult};
use crate::mesh::PackedMesh;

/// Build the header for a packed mesh
///
/// Comment text must be ASCII. Each line becomes its own `comment` line.
pub fn ply_header(mesh: &PackedMesh, comment: Option<&str>) -> ExportResult<PlyHeader> {
    let header = PlyHeader::new(
        mesh.vertex_count(),
        mesh.face_count(),
        vertex_properties(mesh.format, mesh.bone_encoding),
    );

    match comment {
        Some(text) => {
            validate_comment(text)?;
            Ok(header.with_comment(text))
        }
        None => Ok(header),
    }
}

/// Reject comment text that cannot appear in an ASCII header
///
/// Lines are separated by `\n` only. A carriage return would be read back as
/// part of the line ending, so it is rejected.
pub fn validate_comment(text: &str) -> ExportResult<()> {
    if text.is_ascii() && !text.contains('\r') {
        Ok(())
    } else {
        Err(ExportError::InvalidComment(text.to_owned()))
    }
}

/// Write a complete mesh file, returning the number of bytes written
pub fn write_ply_mesh<W: Write>(
    w: &mut W,
    mesh: &PackedMesh,
    comment: Option<&str>,
) -> ExportResult<u64> {
    let header = ply_header(mesh, comment)?.to_bytes();
    w.write_all(&header)?;

    let mut vertex_data = Vec::with_capacity(mesh.vertices.len() * mesh.stride());
    for vertex in &mesh.vertices {
        pack_vertex(vertex, mesh.format, mesh.bone_encoding, &mut vertex_data);
    }
    w.write_all(&vertex_data)?;

    let mut face_data = Vec::with_capacity(mesh.faces.len() * FACE_RECORD_SIZE);
    for face in &mesh.faces {
        face_data.push(FACE_CORNERS);
        for index in face {
            face_data.extend_from_slice(&index.to_le_bytes());
        }
    }
    w.write_all(&face_data)?;

    Ok((header.len() + vertex_data.len() + face_data.len()) as u64)
}

/// Write a mesh file through a temporary file in the destination directory
///
/// The destination only appears once the whole file has been written, and is
/// left untouched when any step fails.
pub fn write_ply_file(path: &Path, mesh: &PackedMesh, comment: Option<&str>) -> ExportResult<u64> {
    let io_error = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };

    // Reject the comment before touching the filesystem
    let header_comment = comment.map(|text| validate_comment(text).map(|_| text)).transpose()?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(io_error)?;

    let temp = tempfile::Builder::new()
        .prefix(".gx-export")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(io_error)?;

    let mut writer = BufWriter::new(temp);
    let written = match write_ply_mesh(&mut writer, mesh, header_comment) {
        Ok(written) => written,
        Err(ExportError::Write(source)) => return Err(io_error(source)),
        Err(err) => return Err(err),
    };

    let temp = writer
        .into_inner()
        .map_err(|err| io_error(err.into_error()))?;
    temp.persist(path).map_err(|err| io_error(err.error))?;

    Ok(written)
}
