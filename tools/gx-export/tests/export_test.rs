//! Library-level export tests
//!
//! Drives the packer and writer end to end and reads every file back through
//! gx-common's decoder.


use std::fs;

use gx_common::{
    decode_ply_mesh, FORMAT_BONE_INDICES, FORMAT_BONE_WEIGHTS, FORMAT_NORMAL, FORMAT_POSITION,
    FORMAT_TANGENT, FORMAT_UV, UNUSED_BONE,
};
use gx_export::mesh::load_gltf;
use gx_export::{
    convert_mesh_file, load_source, pack_and_write, parse_format_string, BoneEncoding,
    BoneInfluence, Corner, ExportError, ExportOptions, SourceMesh, TangentPolicy,
    VertexAttributes,
};
use tempfile::tempdir;

fn geometry_uv() -> VertexAttributes {
    VertexAttributes {
        geometry: true,
        uv: true,
        ..VertexAttributes::NONE
    }
}

/// Quad with four distinct UVs: two triangles sharing the 0-2 edge
fn quad() -> SourceMesh {
    let c = |i: u32, x: f32, y: f32| Corner::new(i, [x, y, 0.0]).with_uv([x, y]);
    let corners = [c(0, 0.0, 0.0), c(1, 1.0, 0.0), c(2, 1.0, 1.0), c(3, 0.0, 1.0)];
    SourceMesh::new(vec![
        [corners[0], corners[1], corners[2]],
        [corners[0], corners[2], corners[3]],
    ])
}

#[test]
fn test_quad_scenario() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("quad.ply");

    let summary = pack_and_write(&quad(), &ExportOptions::new(geometry_uv()), &path).unwrap();
    assert_eq!(summary.vertex_count, 4);
    assert_eq!(summary.face_count, 2);
    assert_eq!(summary.stride, 20);

    let bytes = fs::read(&path).unwrap();
    assert_eq!(summary.bytes_written, bytes.len() as u64);

    let mesh = decode_ply_mesh(&bytes).unwrap();
    assert_eq!(mesh.format, FORMAT_POSITION | FORMAT_UV);
    assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 2, 3]]);
    assert_eq!(mesh.vertices[2].position, [1.0, 1.0, 0.0]);
    assert_eq!(mesh.vertices[2].uv, [1.0, 1.0]);
}

#[test]
fn test_header_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("quad.ply");
    let options = ExportOptions::new(VertexAttributes {
        tangents: true,
        bitangents: true,
        ..geometry_uv()
    })
    .with_comment("line one\nline two");

    pack_and_write(&quad(), &options, &path).unwrap();
    let mesh = decode_ply_mesh(&fs::read(&path).unwrap()).unwrap();

    assert_eq!(mesh.header.comments, vec!["line one", "line two"]);
    assert_eq!(mesh.header.vertex_count, 4);
    assert_eq!(mesh.header.face_count, 2);
    let names: Vec<&str> = mesh
        .header
        .vertex_properties
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(
        names,
        ["x", "y", "z", "s", "t", "tx", "ty", "tz", "bx", "by", "bz"]
    );
    assert_eq!(mesh.vertices[0].tangent, [1.0, 0.0, 0.0]);
    assert_eq!(mesh.vertices[0].bitangent, [0.0, 1.0, 0.0]);
}

#[test]
fn test_export_is_idempotent() {
    let dir = tempdir().unwrap();
    let first = dir.path().join("first.ply");
    let second = dir.path().join("second.ply");
    let options = ExportOptions::new(VertexAttributes::default()).with_comment("stable");

    let mut mesh = quad();
    for corner in mesh.triangles.iter_mut().flatten() {
        corner.normal = Some([0.0, 0.0, 1.0]);
    }

    pack_and_write(&mesh, &options, &first).unwrap();
    pack_and_write(&mesh, &options, &second).unwrap();
    assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
}

#[test]
fn test_empty_mesh_writes_header_only_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.ply");

    let summary = pack_and_write(&SourceMesh::default(), &ExportOptions::default(), &path).unwrap();
    assert_eq!(summary.vertex_count, 0);
    assert_eq!(summary.face_count, 0);

    let bytes = fs::read(&path).unwrap();
    let text = String::from_utf8(bytes.clone()).unwrap();
    assert!(text.contains("element vertex 0\n"));
    assert!(text.contains("element face 0\n"));
    assert!(text.ends_with("end_header\n"));

    let mesh = decode_ply_mesh(&bytes).unwrap();
    assert!(mesh.vertices.is_empty() && mesh.faces.is_empty());
}

fn degenerate() -> SourceMesh {
    let c = |i: u32, x: f32, y: f32| Corner::new(i, [x, y, 0.0]).with_uv([0.5, 0.5]);
    SourceMesh::new(vec![[c(0, 0.0, 0.0), c(1, 1.0, 0.0), c(2, 0.0, 1.0)]])
}

#[test]
fn test_degenerate_uv_zero_fallback_writes_zero_tangent() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("flat.ply");
    let options = ExportOptions::new(VertexAttributes {
        tangents: true,
        ..geometry_uv()
    });

    let summary = pack_and_write(&degenerate(), &options, &path).unwrap();
    assert_eq!(summary.degenerate_triangles, 1);

    let mesh = decode_ply_mesh(&fs::read(&path).unwrap()).unwrap();
    assert_eq!(mesh.format & FORMAT_TANGENT, FORMAT_TANGENT);
    assert!(mesh.vertices.iter().all(|v| v.tangent == [0.0; 3]));
}

#[test]
fn test_degenerate_uv_abort_leaves_no_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("flat.ply");
    let options = ExportOptions::new(VertexAttributes {
        tangents: true,
        ..geometry_uv()
    })
    .with_tangent_policy(TangentPolicy::Abort);

    let err = pack_and_write(&degenerate(), &options, &path).unwrap_err();
    assert!(matches!(err, ExportError::DegenerateUv { triangle: 0 }));
    assert!(!path.exists());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_unwritable_destination_is_io_error() {
    let dir = tempdir().unwrap();
    // A regular file where the parent directory should be
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, b"").unwrap();
    let path = blocker.join("mesh.ply");

    let err = pack_and_write(&quad(), &ExportOptions::new(geometry_uv()), &path).unwrap_err();
    assert!(matches!(err, ExportError::Io { .. }));
}

#[test]
fn test_non_ascii_comment_leaves_no_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("quad.ply");
    let options = ExportOptions::new(geometry_uv()).with_comment("caf\u{e9}");

    let err = pack_and_write(&quad(), &options, &path).unwrap_err();
    assert!(matches!(err, ExportError::InvalidComment(_)));
    assert!(!path.exists());
}

#[test]
fn test_skinned_export_wide_and_byte() {
    let dir = tempdir().unwrap();
    let mesh = quad().with_influences(vec![
        vec![
            BoneInfluence::new(2, 0.1),
            BoneInfluence::new(5, 0.9),
            BoneInfluence::new(1, 0.3),
            BoneInfluence::new(7, 0.05),
            BoneInfluence::new(9, 0.4),
        ],
        vec![BoneInfluence::new(3, 1.0)],
        Vec::new(),
        vec![BoneInfluence::new(0, 0.5), BoneInfluence::new(1, 0.5)],
    ]);
    let attributes = VertexAttributes {
        geometry: true,
        bone_indices: true,
        bone_weights: true,
        ..VertexAttributes::NONE
    };

    let wide = dir.path().join("wide.ply");
    pack_and_write(&mesh, &ExportOptions::new(attributes), &wide).unwrap();
    let decoded = decode_ply_mesh(&fs::read(&wide).unwrap()).unwrap();
    assert_eq!(decoded.bone_encoding, BoneEncoding::Wide);
    assert_eq!(decoded.format, FORMAT_POSITION | FORMAT_BONE_INDICES | FORMAT_BONE_WEIGHTS);
    assert_eq!(decoded.vertices[0].bone_indices, [5, 9, 1, 2]);
    assert_eq!(decoded.vertices[0].bone_weights, [0.9, 0.4, 0.3, 0.1]);
    assert_eq!(decoded.vertices[2].bone_indices, [UNUSED_BONE; 4]);
    assert_eq!(decoded.vertices[2].bone_weights, [0.0; 4]);

    let byte = dir.path().join("byte.ply");
    let options = ExportOptions::new(attributes).with_bone_encoding(BoneEncoding::Byte);
    pack_and_write(&mesh, &options, &byte).unwrap();
    let bytes = fs::read(&byte).unwrap();
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("property uchar b0\n"));
    assert!(text.contains("property uchar w3\n"));

    let decoded = decode_ply_mesh(&bytes).unwrap();
    assert_eq!(decoded.bone_encoding, BoneEncoding::Byte);
    assert_eq!(decoded.vertices[0].bone_indices, [5, 9, 1, 2]);
    assert_eq!(decoded.vertices[3].bone_indices, [0, 1, UNUSED_BONE, UNUSED_BONE]);
}

#[test]
fn test_disabling_attributes_never_adds_vertices() {
    let dir = tempdir().unwrap();
    let obj = dir.path().join("cube.obj");
    generate_test_assets::generate_cube_obj(&obj).unwrap();

    let mut previous = u32::MAX;
    for format in ["POS_UV_NORMAL", "POS_NORMAL", "POS"] {
        let output = dir.path().join(format!("{format}.ply"));
        let options = ExportOptions::new(parse_format_string(format).unwrap());
        let summary = convert_mesh_file(&obj, &output, &options).unwrap();
        assert!(summary.vertex_count <= previous);
        previous = summary.vertex_count;
    }
    // Only the 8 corner positions remain
    assert_eq!(previous, 8);
}

#[test]
fn test_cube_obj_auto_detects_attributes() {
    let dir = tempdir().unwrap();
    let obj = dir.path().join("cube.obj");
    let output = dir.path().join("cube.ply");
    generate_test_assets::generate_cube_obj(&obj).unwrap();

    let summary = convert_mesh_file(&obj, &output, &ExportOptions::default()).unwrap();
    assert_eq!(summary.face_count, 12);
    assert_eq!(summary.vertex_count, 24);

    let mesh = decode_ply_mesh(&fs::read(&output).unwrap()).unwrap();
    assert_eq!(mesh.format, FORMAT_POSITION | FORMAT_UV | FORMAT_NORMAL);
}

#[test]
fn test_obj_vertex_colors_are_quantized() {
    let dir = tempdir().unwrap();
    let obj = dir.path().join("quad.obj");
    let output = dir.path().join("quad.ply");
    generate_test_assets::generate_colored_quad_obj(&obj).unwrap();

    let options = ExportOptions::new(parse_format_string("POS_COLOR").unwrap());
    convert_mesh_file(&obj, &output, &options).unwrap();

    let mesh = decode_ply_mesh(&fs::read(&output).unwrap()).unwrap();
    assert_eq!(mesh.vertices[0].color, [255, 0, 0, 255]);
    assert_eq!(mesh.vertices[3].color, [255, 255, 255, 255]);
}

#[test]
fn test_gltf_source_flattens_influence_sets() {
    let dir = tempdir().unwrap();
    let glb = dir.path().join("skinned.glb");
    generate_test_assets::generate_skinned_glb_file(&glb).unwrap();

    let source = load_gltf(&glb).unwrap();
    assert_eq!(source.triangles.len(), 3);
    assert_eq!(source.influences.len(), 7);
    assert_eq!(source.influences[0].len(), 8);
    assert!(source.influences[4].is_empty());

    // Second primitive's corners are offset past the quad's vertices
    let ids: Vec<u32> = source.triangles[2].iter().map(|c| c.vertex).collect();
    assert_eq!(ids, [4, 5, 6]);

    // The triangle has no normals or UVs, so only geometry and bones are detected
    let available = source.available_attributes();
    assert!(available.geometry && available.skinned());
    assert!(!available.uv && !available.normals);
}

#[test]
fn test_gltf_export_keeps_heaviest_influences() {
    let dir = tempdir().unwrap();
    let glb = dir.path().join("skinned.glb");
    let output = dir.path().join("skinned.ply");
    generate_test_assets::generate_skinned_glb_file(&glb).unwrap();

    let summary = convert_mesh_file(&glb, &output, &ExportOptions::default()).unwrap();
    assert_eq!(summary.vertex_count, 7);
    assert_eq!(summary.face_count, 3);

    let mesh = decode_ply_mesh(&fs::read(&output).unwrap()).unwrap();
    assert_eq!(mesh.vertices[0].bone_indices, [0, 4, 1, 2]);
    assert_eq!(mesh.vertices[0].bone_weights, [0.4, 0.35, 0.3, 0.2]);
    assert_eq!(mesh.vertices[2].bone_indices, [2, 3, UNUSED_BONE, UNUSED_BONE]);
    assert_eq!(mesh.vertices[4].bone_indices, [UNUSED_BONE; 4]);
}

#[test]
fn test_load_source_rejects_unknown_extension() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mesh.fbx");
    fs::write(&path, b"").unwrap();
    assert!(load_source(&path).is_err());
}
