//! Corner deduplication and face building

use glam::{Vec2, Vec3};
use gx_common::{pack_color_rgba_unorm8, PlyVertex, BONE_SLOTS};

use super::skinning::{reduce_all, BoneInfluence};
use super::table::VertexTable;
use super::tangent::{triangle_tangent_frame, TangentFrame};
use super::types::{Corner, PackedMesh, SourceMesh, Triangle};
use crate::error::{ExportError, ExportResult};
use crate::options::{ExportOptions, TangentPolicy, VertexAttributes};

/// Build the unique vertex table and face list for `mesh`
///
/// Nothing is written; see [`crate::formats::write_ply_mesh`].
pub fn pack_mesh(mesh: &SourceMesh, options: &ExportOptions) -> ExportResult<PackedMesh> {
    let attributes = options
        .attributes
        .unwrap_or_else(|| mesh.available_attributes());
    let format = attributes.format();
    let encoding = options.bone_encoding;

    let reduced = if attributes.skinned() {
        reduce_all(&mesh.influences)
    } else {
        Vec::new()
    };

    let mut table = VertexTable::new(format, encoding);
    let mut faces = Vec::with_capacity(mesh.triangles.len());
    let mut degenerate_triangles = 0;

    for (index, triangle) in mesh.triangles.iter().enumerate() {
        let frame = if attributes.needs_tangent_frame() {
            match tangent_frame(triangle, index)? {
                Some(frame) => frame,
                None if options.tangent_policy == TangentPolicy::Abort => {
                    return Err(ExportError::DegenerateUv { triangle: index });
                }
                None => {
                    degenerate_triangles += 1;
                    TangentFrame::ZERO
                }
            }
        } else {
            TangentFrame::ZERO
        };

        let mut face = [0u32; 3];
        for (slot, corner) in face.iter_mut().zip(triangle) {
            let mut vertex = corner_vertex(corner, &attributes, &frame, index)?;

            if attributes.skinned() {
                let influences = reduced.get(corner.vertex as usize).ok_or(
                    ExportError::MissingInfluences {
                        vertex: corner.vertex,
                        available: mesh.influences.len(),
                    },
                )?;
                apply_influences(&mut vertex, influences, &attributes, options, corner.vertex)?;
            }

            *slot = table.insert(vertex)?;
        }
        faces.push(face);
    }

    let corners = mesh.triangles.len() * 3;
    tracing::debug!(
        "Deduplicated {} corners into {} vertices",
        corners,
        table.len()
    );
    if degenerate_triangles > 0 {
        tracing::warn!(
            "{} triangle(s) have degenerate UVs, wrote zero tangents",
            degenerate_triangles
        );
    }

    Ok(PackedMesh {
        format,
        bone_encoding: encoding,
        vertices: table.into_vertices(),
        faces,
        degenerate_triangles,
    })
}

fn tangent_frame(triangle: &Triangle, index: usize) -> ExportResult<Option<TangentFrame>> {
    let missing = ExportError::MissingAttribute {
        attribute: "uv",
        triangle: index,
    };
    let [a, b, c] = triangle;
    let (Some(uv0), Some(uv1), Some(uv2)) = (a.uv, b.uv, c.uv) else {
        return Err(missing);
    };

    let positions = [a, b, c].map(|corner| Vec3::from_array(corner.position));
    let uvs = [uv0, uv1, uv2].map(Vec2::from_array);
    Ok(triangle_tangent_frame(positions, uvs))
}

fn corner_vertex(
    corner: &Corner,
    attributes: &VertexAttributes,
    frame: &TangentFrame,
    triangle: usize,
) -> ExportResult<PlyVertex> {
    let missing = |attribute| ExportError::MissingAttribute {
        attribute,
        triangle,
    };
    let mut vertex = PlyVertex::default();

    if attributes.geometry {
        vertex.position = corner.position;
    }
    if attributes.uv {
        vertex.uv = corner.uv.ok_or_else(|| missing("uv"))?;
    }
    if attributes.normals {
        vertex.normal = corner.normal.ok_or_else(|| missing("normal"))?;
    }
    if attributes.tangents {
        vertex.tangent = frame.tangent.to_array();
    }
    if attributes.bitangents {
        vertex.bitangent = frame.bitangent.to_array();
    }
    if attributes.colors {
        let [r, g, b, a] = corner.color.ok_or_else(|| missing("color"))?;
        vertex.color = pack_color_rgba_unorm8(r, g, b, a);
    }

    Ok(vertex)
}

fn apply_influences(
    vertex: &mut PlyVertex,
    influences: &[BoneInfluence; BONE_SLOTS],
    attributes: &VertexAttributes,
    options: &ExportOptions,
    source_vertex: u32,
) -> ExportResult<()> {
    if attributes.bone_indices {
        let max = options.bone_encoding.max_bone_index();
        for (slot, influence) in vertex.bone_indices.iter_mut().zip(influences) {
            if influence.bone > max {
                return Err(ExportError::BoneIndexOverflow {
                    bone: influence.bone,
                    vertex: source_vertex,
                    max,
                    encoding: options.bone_encoding,
                });
            }
            *slot = influence.bone;
        }
    }
    if attributes.bone_weights {
        vertex.bone_weights = influences.map(|influence| influence.weight);
    }
    Ok(())
}
