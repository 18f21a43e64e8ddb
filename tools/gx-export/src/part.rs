//! Part descriptor sidecars
//!
//! A part descriptor is a small JSON document that ties an exported mesh to
//! a material and shader. It is written next to the mesh as `<name>.json`.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

pub const PART_SCHEMA: &str =
    "https://raw.githubusercontent.com/Jacob-C-Smith/G10-Schema/main/part-schema.json";

pub const DEFAULT_SHADER: &str = "G10/shaders/G10 PBR.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartDescriptor {
    #[serde(rename = "$schema")]
    pub schema: String,
    pub name: String,
    pub shader: String,
    pub material: String,
    pub path: String,
}

impl PartDescriptor {
    pub fn new(name: impl Into<String>, material: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            schema: PART_SCHEMA.to_owned(),
            name: name.into(),
            shader: DEFAULT_SHADER.to_owned(),
            material: material.into(),
            path: path.into(),
        }
    }

    pub fn with_shader(mut self, shader: impl Into<String>) -> Self {
        self.shader = shader.into();
        self
    }

    /// JSON text with 4-space indentation and a trailing newline
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)?;
        out.push(b'\n');
        // serde_json only emits UTF-8
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}

/// Write a part descriptor for the mesh at `mesh_path`
///
/// The descriptor lands beside the mesh with a `.json` extension and refers
/// to the mesh by file name.
pub fn write_part(
    mesh_path: &Path,
    name: &str,
    material: &str,
    shader: Option<&str>,
) -> Result<std::path::PathBuf> {
    let file_name = mesh_path
        .file_name()
        .with_context(|| format!("Mesh path has no file name: {:?}", mesh_path))?
        .to_string_lossy();

    let mut part = PartDescriptor::new(name, material, file_name);
    if let Some(shader) = shader {
        part = part.with_shader(shader);
    }

    let json = part
        .to_json()
        .with_context(|| format!("Failed to serialize part: {}", name))?;
    let part_path = mesh_path.with_extension("json");
    fs::write(&part_path, json)
        .with_context(|| format!("Failed to write part descriptor: {:?}", part_path))?;

    tracing::info!("Wrote part descriptor {:?}", part_path);
    Ok(part_path)
}
