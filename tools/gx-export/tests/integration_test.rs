//! Integration tests for the gx-export binary
//!
//! Tests the full pipeline: generate test assets -> run CLI -> verify output


use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use gx_common::{decode_ply_mesh, PlyMesh};
use tempfile::tempdir;

fn gx_export(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gx-export"))
        .args(args)
        .output()
        .expect("Failed to run gx-export")
}

fn path_arg(path: &Path) -> &str {
    path.to_str().expect("Temp path should be UTF-8")
}

fn read_mesh(path: &Path) -> PlyMesh {
    let data = fs::read(path).expect("Failed to read mesh file");
    decode_ply_mesh(&data).expect("Failed to decode mesh file")
}

/// Test OBJ -> PLY conversion
#[test]
fn test_obj_to_ply() {
    let dir = tempdir().expect("Failed to create temp dir");
    let obj_path = dir.path().join("cube.obj");
    let mesh_path = dir.path().join("cube.ply");

    generate_test_assets::generate_cube_obj(&obj_path).expect("Failed to generate OBJ");

    let output = gx_export(&["mesh", path_arg(&obj_path), "-o", path_arg(&mesh_path)]);
    assert!(output.status.success(), "gx-export mesh command failed");

    let mesh = read_mesh(&mesh_path);
    assert_eq!(mesh.header.vertex_count, 24);
    assert_eq!(mesh.header.face_count, 12);
}

/// Output defaults to the input path with a .ply extension
#[test]
fn test_default_output_path() {
    let dir = tempdir().expect("Failed to create temp dir");
    let obj_path = dir.path().join("triangle.obj");
    generate_test_assets::generate_triangle_obj(&obj_path).expect("Failed to generate OBJ");

    let output = gx_export(&["mesh", path_arg(&obj_path), "--format", "POS_UV_NORMAL_TANGENT"]);
    assert!(output.status.success());

    let mesh = read_mesh(&dir.path().join("triangle.ply"));
    assert_eq!(mesh.header.vertex_count, 3);
    assert_eq!(mesh.vertices[0].tangent, [1.0, 0.0, 0.0]);
}

#[test]
fn test_comment_and_stamp() {
    let dir = tempdir().expect("Failed to create temp dir");
    let obj_path = dir.path().join("triangle.obj");
    let mesh_path = dir.path().join("out.ply");
    generate_test_assets::generate_triangle_obj(&obj_path).expect("Failed to generate OBJ");

    let output = gx_export(&[
        "mesh",
        path_arg(&obj_path),
        "-o",
        path_arg(&mesh_path),
        "--comment",
        "hello",
        "--stamp",
    ]);
    assert!(output.status.success());

    let mesh = read_mesh(&mesh_path);
    assert_eq!(mesh.header.comments[0], "hello");
    assert!(mesh.header.comments[1].starts_with("exported "));
}

#[test]
fn test_abort_on_degenerate_uv() {
    let dir = tempdir().expect("Failed to create temp dir");
    let obj_path = dir.path().join("flat.obj");
    let mesh_path = dir.path().join("flat.ply");
    generate_test_assets::generate_degenerate_uv_obj(&obj_path).expect("Failed to generate OBJ");

    let output = gx_export(&[
        "mesh",
        path_arg(&obj_path),
        "-o",
        path_arg(&mesh_path),
        "-f",
        "POS_UV_TANGENT",
        "--abort-on-degenerate-uv",
    ]);
    assert!(!output.status.success());
    assert!(!mesh_path.exists());

    // Without the flag the zero fallback applies
    let output = gx_export(&[
        "mesh",
        path_arg(&obj_path),
        "-o",
        path_arg(&mesh_path),
        "-f",
        "POS_UV_TANGENT",
    ]);
    assert!(output.status.success());
    assert_eq!(read_mesh(&mesh_path).vertices[0].tangent, [0.0; 3]);
}

#[test]
fn test_empty_obj_writes_header_only() {
    let dir = tempdir().expect("Failed to create temp dir");
    let obj_path = dir.path().join("empty.obj");
    let mesh_path = dir.path().join("empty.ply");
    generate_test_assets::generate_empty_obj(&obj_path).expect("Failed to generate OBJ");

    let output = gx_export(&["mesh", path_arg(&obj_path), "-o", path_arg(&mesh_path)]);
    assert!(output.status.success());

    let mesh = read_mesh(&mesh_path);
    assert_eq!(mesh.header.vertex_count, 0);
    assert_eq!(mesh.header.face_count, 0);
}

#[test]
fn test_glb_with_byte_bones_and_part() {
    let dir = tempdir().expect("Failed to create temp dir");
    let glb_path = dir.path().join("rig.glb");
    let mesh_path = dir.path().join("rig.ply");
    generate_test_assets::generate_skinned_glb_file(&glb_path).expect("Failed to generate GLB");

    let output = gx_export(&[
        "mesh",
        path_arg(&glb_path),
        "-o",
        path_arg(&mesh_path),
        "--byte-bones",
        "--part",
        "skin",
    ]);
    assert!(output.status.success());

    let mesh = read_mesh(&mesh_path);
    assert_eq!(mesh.bone_encoding, gx_common::BoneEncoding::Byte);

    let part: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("rig.json")).unwrap()).unwrap();
    assert_eq!(part["name"], "rig");
    assert_eq!(part["material"], "skin");
    assert_eq!(part["path"], "rig.ply");
}

#[test]
fn test_unknown_format_token_fails() {
    let dir = tempdir().expect("Failed to create temp dir");
    let obj_path = dir.path().join("triangle.obj");
    generate_test_assets::generate_triangle_obj(&obj_path).expect("Failed to generate OBJ");

    let output = gx_export(&["mesh", path_arg(&obj_path), "-f", "POS_SPARKLE"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("SPARKLE"));
}

#[test]
fn test_inspect_prints_counts() {
    let dir = tempdir().expect("Failed to create temp dir");
    let obj_path = dir.path().join("cube.obj");
    let mesh_path = dir.path().join("cube.ply");
    generate_test_assets::generate_cube_obj(&obj_path).expect("Failed to generate OBJ");
    assert!(gx_export(&["mesh", path_arg(&obj_path), "-o", path_arg(&mesh_path)])
        .status
        .success());

    let output = gx_export(&["inspect", path_arg(&mesh_path)]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("vertices: 24"));
    assert!(stdout.contains("faces: 12"));
    assert!(stdout.contains("float nx"));
}

fn write_manifest(dir: &Path) -> std::path::PathBuf {
    generate_test_assets::generate_cube_obj(&dir.join("cube.obj")).unwrap();
    generate_test_assets::generate_triangle_obj(&dir.join("triangle.obj")).unwrap();

    let manifest = dir.join("gx.toml");
    fs::write(
        &manifest,
        r#"
[output]
dir = "build/"
comment = "test build"

[meshes]
triangle = "triangle.obj"

[meshes.cube]
path = "cube.obj"
format = "POS"

[meshes.cube.part]
material = "stone"
"#,
    )
    .unwrap();
    manifest
}

#[test]
fn test_build_from_manifest() {
    let dir = tempdir().expect("Failed to create temp dir");
    let manifest = write_manifest(dir.path());

    let output = gx_export(&["build", path_arg(&manifest), "-v"]);
    assert!(output.status.success(), "gx-export build failed");

    let build = dir.path().join("build");
    let cube = read_mesh(&build.join("cube.ply"));
    assert_eq!(cube.header.vertex_count, 8);
    assert_eq!(cube.header.comments, vec!["test build"]);
    assert!(build.join("cube.json").exists());

    let triangle = read_mesh(&build.join("triangle.ply"));
    assert_eq!(triangle.header.vertex_count, 3);
    assert!(!build.join("triangle.json").exists());
}

#[test]
fn test_build_output_override() {
    let dir = tempdir().expect("Failed to create temp dir");
    let manifest = write_manifest(dir.path());
    let out = dir.path().join("elsewhere");

    let output = gx_export(&["build", path_arg(&manifest), "-o", path_arg(&out)]);
    assert!(output.status.success());
    assert!(out.join("cube.ply").exists());
    assert!(!dir.path().join("build").exists());
}

#[test]
fn test_check_reports_missing_source() {
    let dir = tempdir().expect("Failed to create temp dir");
    let manifest = write_manifest(dir.path());
    assert!(gx_export(&["check", path_arg(&manifest)]).status.success());

    fs::remove_file(dir.path().join("cube.obj")).unwrap();
    let output = gx_export(&["check", path_arg(&manifest)]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("cube"));
}
