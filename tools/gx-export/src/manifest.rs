//! Manifest parsing and build orchestration
//!
//! Parses gx.toml and exports every mesh it lists.

use anyhow::{Context, Result};
use gx_common::BoneEncoding;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::export::{convert_mesh_file, SourceFormat};
use crate::formats::validate_comment;
use crate::mesh::ExportSummary;
use crate::options::{parse_format_string, stamp_comment, ExportOptions, TangentPolicy};
use crate::part::write_part;
use crate::PLY_EXT;

/// Root manifest structure
#[derive(Debug, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub meshes: BTreeMap<String, MeshEntry>,
    /// Directory relative paths are resolved against (the manifest's directory)
    #[serde(skip)]
    pub root: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    /// Header comment for meshes that don't set their own
    #[serde(default)]
    pub comment: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            comment: None,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("assets/")
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum MeshEntry {
    Simple(PathBuf),
    Detailed(MeshConfig),
}

#[derive(Debug, Deserialize)]
pub struct MeshConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub tangents: TangentPolicy,
    #[serde(default)]
    pub bones: BoneEncoding,
    #[serde(default)]
    pub comment: Option<String>,
    /// Append an `exported <time>` comment line
    #[serde(default)]
    pub stamp: bool,
    #[serde(default)]
    pub part: Option<PartConfig>,
}

#[derive(Debug, Deserialize)]
pub struct PartConfig {
    pub material: String,
    #[serde(default)]
    pub shader: Option<String>,
}

impl MeshEntry {
    pub fn path(&self) -> &Path {
        match self {
            MeshEntry::Simple(p) => p,
            MeshEntry::Detailed(config) => &config.path,
        }
    }

    pub fn format(&self) -> Option<&str> {
        match self {
            MeshEntry::Simple(_) => None,
            MeshEntry::Detailed(config) => config.format.as_deref(),
        }
    }

    pub fn part(&self) -> Option<&PartConfig> {
        match self {
            MeshEntry::Simple(_) => None,
            MeshEntry::Detailed(config) => config.part.as_ref(),
        }
    }

    /// Export options for this entry; `default_comment` applies when the entry has none
    pub fn options(&self, default_comment: Option<&str>) -> Result<ExportOptions> {
        let mut options = ExportOptions::default();
        if let Some(format) = self.format() {
            options.attributes = Some(parse_format_string(format)?);
        }

        let mut comment = default_comment.map(str::to_owned);
        if let MeshEntry::Detailed(config) = self {
            options.tangent_policy = config.tangents;
            options.bone_encoding = config.bones;
            if config.comment.is_some() {
                comment = config.comment.clone();
            }
            if config.stamp {
                comment = Some(stamp_comment(comment.as_deref(), chrono::Utc::now()));
            }
        }
        options.comment = comment;

        Ok(options)
    }
}

impl Manifest {
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    pub fn output_dir(&self, output_override: Option<&Path>) -> PathBuf {
        match output_override {
            Some(dir) => dir.to_path_buf(),
            None => self.resolve(&self.output.dir),
        }
    }
}

/// Load and parse a manifest file
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {:?}", path))?;
    let mut manifest: Manifest = toml::from_str(&content)
        .with_context(|| format!("Failed to parse manifest: {:?}", path))?;
    manifest.root = path.parent().map(Path::to_path_buf).unwrap_or_default();
    Ok(manifest)
}

/// Validate a manifest without building
pub fn validate(manifest: &Manifest) -> Result<()> {
    if let Some(comment) = &manifest.output.comment {
        validate_comment(comment).context("Invalid output comment")?;
    }

    for (name, entry) in &manifest.meshes {
        let source = manifest.resolve(entry.path());
        if !source.exists() {
            anyhow::bail!("Mesh '{}' source not found: {:?}", name, source);
        }
        SourceFormat::from_path(&source).with_context(|| format!("Mesh '{}'", name))?;

        let options = entry
            .options(manifest.output.comment.as_deref())
            .with_context(|| format!("Mesh '{}' has an invalid format", name))?;
        if let Some(comment) = &options.comment {
            validate_comment(comment).with_context(|| format!("Mesh '{}'", name))?;
        }
    }
    Ok(())
}

/// One mesh produced by [`build_all`]
#[derive(Debug, Clone)]
pub struct BuiltMesh {
    pub name: String,
    pub output: PathBuf,
    pub summary: ExportSummary,
}

/// Build all meshes from a manifest, in name order
pub fn build_all(manifest: &Manifest, output_override: Option<&Path>) -> Result<Vec<BuiltMesh>> {
    let output_dir = manifest.output_dir(output_override);
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;

    let mut built = Vec::with_capacity(manifest.meshes.len());
    for (name, entry) in &manifest.meshes {
        let output = output_dir.join(format!("{}.{}", name, PLY_EXT));
        tracing::info!("Converting mesh: {} -> {:?}", name, output);

        let options = entry
            .options(manifest.output.comment.as_deref())
            .with_context(|| format!("Mesh '{}'", name))?;
        let summary = convert_mesh_file(&manifest.resolve(entry.path()), &output, &options)
            .with_context(|| format!("Failed to build mesh '{}'", name))?;

        if let Some(part) = entry.part() {
            write_part(&output, name, &part.material, part.shader.as_deref())?;
        }

        built.push(BuiltMesh {
            name: name.clone(),
            output,
            summary,
        });
    }

    Ok(built)
}
