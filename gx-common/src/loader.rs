//! PLY mesh loader
//!
//! Decodes a complete gxport `.ply` file back into vertex records and faces.
//! The exporter's own tests read files through this, as does the
//! `gx-export inspect` command.

use crate::formats::{FormatError, PlyHeader, FACE_CORNERS, FACE_RECORD_SIZE};
use crate::packing::{format_from_properties, unpack_vertex, vertex_stride, BoneEncoding, PlyVertex};

/// A decoded mesh file
#[derive(Debug, Clone)]
pub struct PlyMesh {
    pub header: PlyHeader,
    /// Attribute flags recovered from the vertex properties
    pub format: u16,
    pub bone_encoding: BoneEncoding,
    pub vertices: Vec<PlyVertex>,
    pub faces: Vec<[u32; 3]>,
}

/// Decode a whole file
pub fn decode_ply_mesh(bytes: &[u8]) -> Result<PlyMesh, FormatError> {
    let (header, offset) = PlyHeader::parse(bytes)?;
    let (format, bone_encoding) = format_from_properties(&header.vertex_properties)?;

    let stride = vertex_stride(format, bone_encoding);
    // Records without properties all decode to the same vertex, so an
    // exporter never writes more than one of them
    if stride == 0 && header.vertex_count > 1 {
        return Err(FormatError::PropertylessVertices(header.vertex_count));
    }
    let vertex_bytes = header.vertex_count as usize * stride;
    let face_bytes = header.face_count as usize * FACE_RECORD_SIZE;
    let needed = offset + vertex_bytes + face_bytes;

    if bytes.len() < needed {
        return Err(FormatError::Truncated {
            needed,
            available: bytes.len(),
        });
    }
    if bytes.len() > needed {
        return Err(FormatError::TrailingBytes(bytes.len() - needed));
    }

    let (vertex_data, face_data) = bytes[offset..].split_at(vertex_bytes);

    let vertices = if stride == 0 {
        vec![PlyVertex::default(); header.vertex_count as usize]
    } else {
        vertex_data
            .chunks_exact(stride)
            .map(|chunk| unpack_vertex(chunk, format, bone_encoding))
            .collect()
    };

    let mut faces = Vec::with_capacity(header.face_count as usize);
    for (face, record) in face_data.chunks_exact(FACE_RECORD_SIZE).enumerate() {
        let face = face as u32;
        if record[0] != FACE_CORNERS {
            return Err(FormatError::FaceCorners {
                face,
                corners: record[0],
            });
        }

        let mut indices = [0u32; 3];
        for (corner, index) in indices.iter_mut().enumerate() {
            let at = 1 + corner * 4;
            *index = u32::from_le_bytes([
                record[at],
                record[at + 1],
                record[at + 2],
                record[at + 3],
            ]);
            if *index >= header.vertex_count {
                return Err(FormatError::IndexOutOfRange {
                    face,
                    index: *index,
                    vertex_count: header.vertex_count,
                });
            }
        }
        faces.push(indices);
    }

    Ok(PlyMesh {
        header,
        format,
        bone_encoding,
        vertices,
        faces,
    })
}
