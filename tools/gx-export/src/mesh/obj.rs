//! OBJ mesh source

use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::types::{Corner, ExportSummary, SourceMesh};
use crate::export::pack_and_write;
use crate::options::ExportOptions;

/// Convert an OBJ file to a gxport PLY mesh
pub fn convert_obj(input: &Path, output: &Path, options: &ExportOptions) -> Result<ExportSummary> {
    let source = load_obj(input)?;
    let summary = pack_and_write(&source, options, output)
        .with_context(|| format!("Failed to export OBJ: {:?}", input))?;

    tracing::info!(
        "Converted OBJ mesh: {} vertices, {} faces, stride={}",
        summary.vertex_count,
        summary.face_count,
        summary.stride
    );

    Ok(summary)
}

/// Parse an OBJ file into triangulated corners
///
/// `v x y z [r g b]` colors are carried through with alpha 1. Polygons are
/// fan-triangulated. OBJ has no skinning, so the result has no influences.
pub fn load_obj(input: &Path) -> Result<SourceMesh> {
    let file = File::open(input).with_context(|| format!("Failed to open OBJ: {:?}", input))?;
    parse_obj(BufReader::new(file)).with_context(|| format!("Failed to parse OBJ: {:?}", input))
}

pub(crate) fn parse_obj<R: BufRead>(reader: R) -> Result<SourceMesh> {
    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut colors: Vec<Option<[f32; 4]>> = Vec::new();
    let mut tex_coords: Vec<[f32; 2]> = Vec::new();
    let mut normals: Vec<[f32; 3]> = Vec::new();
    let mut triangles = Vec::new();

    for (line_number, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = line_number + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();

        match parts[0] {
            "v" => {
                let values = parse_floats(&parts[1..], line_number)?;
                match values.len() {
                    3 | 4 => colors.push(None),
                    6 => colors.push(Some([values[3], values[4], values[5], 1.0])),
                    n => bail!("Line {}: vertex has {} components", line_number, n),
                }
                positions.push([values[0], values[1], values[2]]);
            }
            "vt" => {
                let values = parse_floats(&parts[1..], line_number)?;
                if values.len() < 2 {
                    bail!("Line {}: texture coordinate needs u and v", line_number);
                }
                tex_coords.push([values[0], values[1]]);
            }
            "vn" => {
                let values = parse_floats(&parts[1..], line_number)?;
                if values.len() != 3 {
                    bail!("Line {}: normal needs 3 components", line_number);
                }
                normals.push([values[0], values[1], values[2]]);
            }
            "f" => {
                if parts.len() < 4 {
                    bail!("Line {}: face needs at least 3 vertices", line_number);
                }

                let corners = parts[1..]
                    .iter()
                    .map(|reference| -> Result<Corner> {
                        let (vi, vti, vni) = parse_obj_vertex(
                            reference,
                            positions.len(),
                            tex_coords.len(),
                            normals.len(),
                        )
                        .with_context(|| {
                            format!("Line {}: bad vertex reference {:?}", line_number, reference)
                        })?;

                        let mut corner = Corner::new(vi as u32, positions[vi]);
                        corner.color = colors[vi];
                        corner.uv = vti.map(|i| tex_coords[i]);
                        corner.normal = vni.map(|i| normals[i]);
                        Ok(corner)
                    })
                    .collect::<Result<Vec<Corner>>>()?;

                // Triangulate (fan triangulation for convex polygons)
                for i in 1..corners.len() - 1 {
                    triangles.push([corners[0], corners[i], corners[i + 1]]);
                }
            }
            _ => {}
        }
    }

    Ok(SourceMesh::new(triangles))
}

fn parse_floats(parts: &[&str], line_number: usize) -> Result<Vec<f32>> {
    parts
        .iter()
        .map(|part| {
            part.parse::<f32>()
                .with_context(|| format!("Line {}: invalid number {:?}", line_number, part))
        })
        .collect()
}

/// Resolve a 1-based or negative (relative) OBJ index against `len` elements
fn resolve_index(s: &str, len: usize) -> Option<usize> {
    let index: i64 = s.parse().ok()?;
    let resolved = match index {
        0 => return None,
        i if i > 0 => i - 1,
        i => len as i64 + i,
    };
    usize::try_from(resolved).ok().filter(|&i| i < len)
}

/// Parse OBJ vertex reference: "v", "v/vt", "v/vt/vn", or "v//vn"
fn parse_obj_vertex(
    s: &str,
    positions: usize,
    tex_coords: usize,
    normals: usize,
) -> Result<(usize, Option<usize>, Option<usize>)> {
    let mut parts = s.split('/');

    let vi = parts
        .next()
        .and_then(|p| resolve_index(p, positions))
        .context("position index out of range")?;

    let vti = match parts.next().filter(|p| !p.is_empty()) {
        Some(p) => Some(resolve_index(p, tex_coords).context("texture index out of range")?),
        None => None,
    };

    let vni = match parts.next().filter(|p| !p.is_empty()) {
        Some(p) => Some(resolve_index(p, normals).context("normal index out of range")?),
        None => None,
    };

    Ok((vi, vti, vni))
}
