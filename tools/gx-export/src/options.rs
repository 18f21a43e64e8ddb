//! Export configuration
//!
//! Every export receives one immutable [`ExportOptions`] value. Nothing about
//! an export is read from process-wide state.

use gx_common::{
    BoneEncoding, FORMAT_BITANGENT, FORMAT_BONE_INDICES, FORMAT_BONE_WEIGHTS, FORMAT_COLOR,
    FORMAT_NORMAL, FORMAT_POSITION, FORMAT_TANGENT, FORMAT_UV,
};
use serde::Deserialize;

use crate::error::{ExportError, ExportResult};

/// Per-vertex attributes to export
///
/// Disabled attributes are left out of both the file and the deduplication key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct VertexAttributes {
    pub geometry: bool,
    pub uv: bool,
    pub normals: bool,
    pub tangents: bool,
    pub bitangents: bool,
    pub colors: bool,
    pub bone_indices: bool,
    pub bone_weights: bool,
}

impl Default for VertexAttributes {
    fn default() -> Self {
        Self {
            geometry: true,
            uv: true,
            normals: true,
            ..Self::NONE
        }
    }
}

impl VertexAttributes {
    pub const NONE: Self = Self {
        geometry: false,
        uv: false,
        normals: false,
        tangents: false,
        bitangents: false,
        colors: false,
        bone_indices: false,
        bone_weights: false,
    };

    /// Format flags for the header and packer
    pub fn format(&self) -> u16 {
        [
            (self.geometry, FORMAT_POSITION),
            (self.uv, FORMAT_UV),
            (self.normals, FORMAT_NORMAL),
            (self.tangents, FORMAT_TANGENT),
            (self.bitangents, FORMAT_BITANGENT),
            (self.colors, FORMAT_COLOR),
            (self.bone_indices, FORMAT_BONE_INDICES),
            (self.bone_weights, FORMAT_BONE_WEIGHTS),
        ]
        .into_iter()
        .filter(|(enabled, _)| *enabled)
        .fold(0, |format, (_, flag)| format | flag)
    }

    pub fn from_format(format: u16) -> Self {
        Self {
            geometry: format & FORMAT_POSITION != 0,
            uv: format & FORMAT_UV != 0,
            normals: format & FORMAT_NORMAL != 0,
            tangents: format & FORMAT_TANGENT != 0,
            bitangents: format & FORMAT_BITANGENT != 0,
            colors: format & FORMAT_COLOR != 0,
            bone_indices: format & FORMAT_BONE_INDICES != 0,
            bone_weights: format & FORMAT_BONE_WEIGHTS != 0,
        }
    }

    pub fn needs_tangent_frame(&self) -> bool {
        self.tangents || self.bitangents
    }

    pub fn skinned(&self) -> bool {
        self.bone_indices || self.bone_weights
    }
}

/// Human-readable format name (e.g. `POS_UV_NORMAL`)
///
/// For any non-empty attribute set this parses back with [`parse_format_string`].
pub fn format_name(attributes: &VertexAttributes) -> String {
    let tokens: Vec<&str> = [
        (attributes.geometry, "POS"),
        (attributes.uv, "UV"),
        (attributes.normals, "NORMAL"),
        (attributes.tangents, "TANGENT"),
        (attributes.bitangents, "BITANGENT"),
        (attributes.colors, "COLOR"),
        (attributes.bone_indices, "BONES"),
        (attributes.bone_weights, "WEIGHTS"),
    ]
    .into_iter()
    .filter_map(|(enabled, token)| enabled.then_some(token))
    .collect();

    if tokens.is_empty() {
        "NONE".to_owned()
    } else {
        tokens.join("_")
    }
}

/// Parse format override string (e.g., "POS_UV_NORMAL_TANGENT")
///
/// Tokens are case-insensitive and may be separated by `_`, `,`, `|`, `+` or
/// whitespace. `SKINNED` enables both bone indices and bone weights.
pub fn parse_format_string(s: &str) -> ExportResult<VertexAttributes> {
    let mut attributes = VertexAttributes::NONE;

    let tokens = s
        .split(|c: char| matches!(c, '_' | ',' | '|' | '+') || c.is_whitespace())
        .filter(|token| !token.is_empty());

    for token in tokens {
        match token.to_uppercase().as_str() {
            "POS" | "POSITION" | "GEOMETRY" => attributes.geometry = true,
            "UV" | "UVS" => attributes.uv = true,
            "NORMAL" | "NORMALS" => attributes.normals = true,
            "TANGENT" | "TANGENTS" => attributes.tangents = true,
            "BITANGENT" | "BITANGENTS" => attributes.bitangents = true,
            "COLOR" | "COLORS" => attributes.colors = true,
            "BONES" => attributes.bone_indices = true,
            "WEIGHTS" => attributes.bone_weights = true,
            "SKINNED" => {
                attributes.bone_indices = true;
                attributes.bone_weights = true;
            }
            _ => {
                return Err(ExportError::InvalidFormat {
                    input: s.to_owned(),
                    token: token.to_owned(),
                })
            }
        }
    }

    Ok(attributes)
}

/// What to do with a triangle whose UVs have a zero tangent-space determinant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum TangentPolicy {
    /// Write a zero tangent and bitangent for the triangle and continue
    #[default]
    #[serde(rename = "zero", alias = "zero-fallback")]
    ZeroFallback,
    /// Fail the export
    #[serde(rename = "abort")]
    Abort,
}

/// Immutable configuration for one export call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportOptions {
    /// Attributes to export; `None` detects them from the source mesh
    pub attributes: Option<VertexAttributes>,
    pub tangent_policy: TangentPolicy,
    pub bone_encoding: BoneEncoding,
    /// Header comment, one `comment` line per line of text
    pub comment: Option<String>,
}

impl ExportOptions {
    pub fn new(attributes: VertexAttributes) -> Self {
        Self {
            attributes: Some(attributes),
            ..Self::default()
        }
    }

    pub fn with_tangent_policy(mut self, policy: TangentPolicy) -> Self {
        self.tangent_policy = policy;
        self
    }

    pub fn with_bone_encoding(mut self, encoding: BoneEncoding) -> Self {
        self.bone_encoding = encoding;
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Append an `exported <timestamp>` line to a comment
pub fn stamp_comment(comment: Option<&str>, now: chrono::DateTime<chrono::Utc>) -> String {
    let stamp = format!(
        "exported {}",
        now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
    );
    match comment {
        Some(text) if !text.is_empty() => format!("{text}\n{stamp}"),
        _ => stamp,
    }
}
