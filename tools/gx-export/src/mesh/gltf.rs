//! glTF/GLB mesh source

use anyhow::{bail, Context, Result};
use gltf::mesh::Mode;
use std::path::Path;

use super::skinning::BoneInfluence;
use super::types::{Corner, ExportSummary, SourceMesh};
use crate::export::pack_and_write;
use crate::options::ExportOptions;

/// Convert a glTF/GLB file to a gxport PLY mesh
pub fn convert_gltf(input: &Path, output: &Path, options: &ExportOptions) -> Result<ExportSummary> {
    let source = load_gltf(input)?;
    let summary = pack_and_write(&source, options, output)
        .with_context(|| format!("Failed to export glTF: {:?}", input))?;

    tracing::info!(
        "Converted mesh: {} vertices, {} faces, stride={}",
        summary.vertex_count,
        summary.face_count,
        summary.stride
    );

    Ok(summary)
}

/// Load the first mesh of a glTF/GLB file
///
/// Every triangle-list primitive contributes its triangles. Vertex ids are
/// offset per primitive so influence lists stay aligned. All JOINTS_n /
/// WEIGHTS_n sets are concatenated into one influence list per vertex.
pub fn load_gltf(input: &Path) -> Result<SourceMesh> {
    let (document, buffers, _images) =
        gltf::import(input).with_context(|| format!("Failed to load glTF: {:?}", input))?;

    // Get the first mesh
    let mesh = document
        .meshes()
        .next()
        .context("No meshes found in glTF")?;

    let mut triangles = Vec::new();
    let mut influences: Vec<Vec<BoneInfluence>> = Vec::new();
    let mut skinned = false;
    let mut base: u32 = 0;

    for primitive in mesh.primitives() {
        if primitive.mode() != Mode::Triangles {
            tracing::warn!(
                "Skipping primitive {} with unsupported mode {:?}",
                primitive.index(),
                primitive.mode()
            );
            continue;
        }

        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

        // Positions (required)
        let positions: Vec<[f32; 3]> = reader
            .read_positions()
            .context("No positions in mesh")?
            .collect();
        let count = positions.len();

        // UVs, normals and colors (optional); ignored when the count is off
        let uvs: Option<Vec<[f32; 2]>> = reader
            .read_tex_coords(0)
            .map(|iter| iter.into_f32().collect())
            .filter(|uvs: &Vec<_>| matches_count(uvs.len(), count, "TEXCOORD_0"));
        let normals: Option<Vec<[f32; 3]>> = reader
            .read_normals()
            .map(|iter| iter.collect())
            .filter(|normals: &Vec<_>| matches_count(normals.len(), count, "NORMAL"));
        let colors: Option<Vec<[f32; 4]>> = reader
            .read_colors(0)
            .map(|iter| iter.into_rgba_f32().collect())
            .filter(|colors: &Vec<_>| matches_count(colors.len(), count, "COLOR_0"));

        // Skinning data (optional) - every JOINTS_n/WEIGHTS_n pair
        let mut lists: Vec<Vec<BoneInfluence>> = vec![Vec::new(); count];
        let mut set = 0;
        loop {
            let joints: Option<Vec<[u16; 4]>> =
                reader.read_joints(set).map(|iter| iter.into_u16().collect());
            let weights: Option<Vec<[f32; 4]>> =
                reader.read_weights(set).map(|iter| iter.into_f32().collect());

            match (joints, weights) {
                (Some(joints), Some(weights)) if joints.len() == count && weights.len() == count => {
                    for (list, (j, w)) in lists.iter_mut().zip(joints.iter().zip(&weights)) {
                        list.extend((0..4).map(|k| BoneInfluence::new(j[k] as i32, w[k])));
                    }
                    skinned = true;
                }
                (None, None) => break,
                _ => {
                    tracing::warn!(
                        "Mesh has partial skinning data in set {} (joints or weights missing), ignoring it",
                        set
                    );
                }
            }
            set += 1;
        }
        influences.extend(lists);

        // Indices (optional) - unindexed primitives use vertex order
        let indices: Vec<u32> = match reader.read_indices() {
            Some(iter) => iter.into_u32().collect(),
            None => (0..count as u32).collect(),
        };
        if indices.len() % 3 != 0 {
            bail!(
                "Primitive {} has {} indices, not a multiple of 3",
                primitive.index(),
                indices.len()
            );
        }

        for chunk in indices.chunks_exact(3) {
            let mut triangle = [Corner::new(0, [0.0; 3]); 3];
            for (corner, &index) in triangle.iter_mut().zip(chunk) {
                let i = index as usize;
                if i >= count {
                    bail!(
                        "Index {} in primitive {} exceeds vertex count {}",
                        index,
                        primitive.index(),
                        count
                    );
                }
                *corner = Corner {
                    vertex: base + index,
                    position: positions[i],
                    uv: uvs.as_ref().map(|uvs| uvs[i]),
                    normal: normals.as_ref().map(|normals| normals[i]),
                    color: colors.as_ref().map(|colors| colors[i]),
                };
            }
            triangles.push(triangle);
        }

        base = u32::try_from(influences.len()).context("Mesh has too many vertices")?;
    }

    if !skinned {
        influences.clear();
    }

    Ok(SourceMesh {
        triangles,
        influences,
    })
}

fn matches_count(found: usize, expected: usize, attribute: &str) -> bool {
    if found != expected {
        tracing::warn!(
            "Mesh has mismatched {} count ({} vs {} vertices), ignoring it",
            attribute,
            found,
            expected
        );
    }
    found == expected
}
