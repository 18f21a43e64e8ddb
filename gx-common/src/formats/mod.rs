//! gxport binary mesh format
//!
//! Exported meshes are binary little-endian PLY files with a fixed element
//! layout. The header is plain ASCII and states every count up front, so a
//! file is always written in a single pass after packing has finished.
//!
//! Vertex property names and widths are derived from the attribute flags in
//! [`crate::packing`].

mod ply;

pub use ply::*;

/// Errors produced while reading a gxport PLY file back.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("Missing 'ply' magic line")]
    BadMagic,

    #[error("Missing end_header line")]
    MissingEndHeader,

    #[error("Header contains non-ASCII bytes")]
    NonAsciiHeader,

    #[error("Unsupported format line: {0:?}")]
    UnsupportedFormat(String),

    #[error("Unexpected header line {line}: {text:?}")]
    UnexpectedLine { line: usize, text: String },

    #[error("Invalid element count in line {0:?}")]
    InvalidCount(String),

    #[error("Unknown vertex property '{0}'")]
    UnknownProperty(String),

    #[error("Vertex property '{name}' is declared as {found}, expected {expected}")]
    PropertyType {
        name: String,
        found: &'static str,
        expected: &'static str,
    },

    #[error("Vertex properties out of export order at '{0}'")]
    PropertyOrder(String),

    #[error("{0} vertices declared without vertex properties, at most 1 is possible")]
    PropertylessVertices(u32),

    #[error("Payload truncated: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },

    #[error("{0} unexpected bytes after the face payload")]
    TrailingBytes(usize),

    #[error("Face {face} has {corners} corners, expected 3")]
    FaceCorners { face: u32, corners: u8 },

    #[error("Face {face} references vertex {index}, but only {vertex_count} vertices exist")]
    IndexOutOfRange {
        face: u32,
        index: u32,
        vertex_count: u32,
    },
}
