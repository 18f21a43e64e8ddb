//! Error types for mesh packing and writing

use std::path::PathBuf;

use gx_common::BoneEncoding;

/// Result type for packing and writing operations
pub type ExportResult<T> = Result<T, ExportError>;

/// Errors that abort an export; no output file is left behind
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write mesh data: {0}")]
    Write(#[from] std::io::Error),

    #[error("Triangle {triangle} has degenerate UVs (zero tangent-space determinant)")]
    DegenerateUv { triangle: usize },

    #[error("Triangle {triangle} has no {attribute}, but the export format requires it")]
    MissingAttribute {
        attribute: &'static str,
        triangle: usize,
    },

    #[error("Source vertex {vertex} has no bone influence list ({available} lists provided)")]
    MissingInfluences { vertex: u32, available: usize },

    #[error("Bone index {bone} at source vertex {vertex} exceeds {max} for {encoding:?} bone encoding")]
    BoneIndexOverflow {
        bone: i32,
        vertex: u32,
        max: i32,
        encoding: BoneEncoding,
    },

    #[error("Mesh has more unique vertices than u32 indices can address")]
    TooManyVertices,

    #[error("Comment must be ASCII text without carriage returns: {0:?}")]
    InvalidComment(String),

    #[error("Invalid format string {input:?}: unknown attribute '{token}'")]
    InvalidFormat { input: String, token: String },
}
