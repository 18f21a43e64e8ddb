//! gx-export - gxport mesh export tool
//!
//! Converts OBJ and glTF meshes to deduplicated binary PLY files (.ply)

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gx_common::{decode_ply_mesh, vertex_stride};
use std::path::PathBuf;

// Use modules from library
use gx_export::{
    export, manifest, options::stamp_comment, parse_format_string, part, BoneEncoding,
    ExportOptions, TangentPolicy, PLY_EXT,
};

#[derive(Parser)]
#[command(name = "gx-export")]
#[command(about = "gxport mesh export tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build meshes from a manifest file
    Build {
        /// Path to gx.toml manifest
        #[arg(default_value = "gx.toml")]
        manifest: PathBuf,

        /// Output directory (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate manifest without building
    Check {
        /// Path to gx.toml manifest
        #[arg(default_value = "gx.toml")]
        manifest: PathBuf,
    },

    /// Export a single mesh file
    Mesh {
        /// Input mesh file (OBJ/glTF/GLB)
        input: PathBuf,

        /// Output .ply file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Vertex format (e.g., POS_UV_NORMAL)
        #[arg(short, long)]
        format: Option<String>,

        /// Header comment
        #[arg(long)]
        comment: Option<String>,

        /// Append an "exported <time>" comment line
        #[arg(long)]
        stamp: bool,

        /// Fail instead of writing zero tangents for degenerate UVs
        #[arg(long)]
        abort_on_degenerate_uv: bool,

        /// Store bone indices and weights as single bytes
        #[arg(long)]
        byte_bones: bool,

        /// Also write a part descriptor using this material
        #[arg(long, value_name = "MATERIAL")]
        part: Option<String>,
    },

    /// Print the header and counts of an exported .ply file
    Inspect {
        /// Input .ply file
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            manifest,
            output,
            verbose,
        } => {
            if verbose {
                tracing::info!("Building meshes from {:?}", manifest);
            }
            let config = manifest::load_manifest(&manifest)?;
            let built = manifest::build_all(&config, output.as_deref())?;
            if verbose {
                for mesh in &built {
                    tracing::info!(
                        "{}: {} vertices, {} faces, {} bytes",
                        mesh.name,
                        mesh.summary.vertex_count,
                        mesh.summary.face_count,
                        mesh.summary.bytes_written
                    );
                }
            }
            tracing::info!("Build complete! {} mesh(es)", built.len());
        }

        Commands::Check { manifest } => {
            tracing::info!("Checking manifest {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            manifest::validate(&config)?;
            tracing::info!("Manifest is valid!");
        }

        Commands::Mesh {
            input,
            output,
            format,
            comment,
            stamp,
            abort_on_degenerate_uv,
            byte_bones,
            part,
        } => {
            let output = output.unwrap_or_else(|| input.with_extension(PLY_EXT));
            tracing::info!("Converting {:?} -> {:?}", input, output);

            let mut options = ExportOptions::default();
            if let Some(format) = format.as_deref() {
                options.attributes = Some(parse_format_string(format)?);
            }
            if abort_on_degenerate_uv {
                options.tangent_policy = TangentPolicy::Abort;
            }
            if byte_bones {
                options.bone_encoding = BoneEncoding::Byte;
            }
            options.comment = if stamp {
                Some(stamp_comment(comment.as_deref(), chrono::Utc::now()))
            } else {
                comment
            };

            export::convert_mesh_file(&input, &output, &options)?;

            if let Some(material) = part {
                let name = output
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                part::write_part(&output, &name, &material, None)?;
            }
            tracing::info!("Done!");
        }

        Commands::Inspect { input } => {
            let bytes =
                std::fs::read(&input).with_context(|| format!("Failed to read {:?}", input))?;
            let mesh = decode_ply_mesh(&bytes)
                .with_context(|| format!("Failed to decode {:?}", input))?;

            println!("{}", input.display());
            for comment in &mesh.header.comments {
                println!("  comment: {}", comment);
            }
            println!("  vertices: {}", mesh.header.vertex_count);
            println!("  faces: {}", mesh.header.face_count);
            println!(
                "  stride: {} bytes ({:?} bones)",
                vertex_stride(mesh.format, mesh.bone_encoding),
                mesh.bone_encoding
            );
            let properties: Vec<String> = mesh
                .header
                .vertex_properties
                .iter()
                .map(|p| format!("{} {}", p.ty.name(), p.name))
                .collect();
            println!("  properties: {}", properties.join(", "));
        }
    }

    Ok(())
}
