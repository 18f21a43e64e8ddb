//! Flat per-triangle tangent frames

use glam::{Vec2, Vec3};

/// Tangent and bitangent shared by the three corners of one triangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TangentFrame {
    pub tangent: Vec3,
    pub bitangent: Vec3,
}

impl TangentFrame {
    /// Frame written for degenerate triangles under the zero fallback
    pub const ZERO: Self = Self {
        tangent: Vec3::ZERO,
        bitangent: Vec3::ZERO,
    };
}

/// Tangent-space basis from positions and UVs
///
/// Returns `None` when the UV determinant is exactly zero. The vectors are
/// not normalized.
pub fn triangle_tangent_frame(positions: [Vec3; 3], uvs: [Vec2; 3]) -> Option<TangentFrame> {
    let edge1 = positions[1] - positions[0];
    let edge2 = positions[2] - positions[0];
    let delta1 = uvs[1] - uvs[0];
    let delta2 = uvs[2] - uvs[0];

    let det = delta1.x * delta2.y - delta2.x * delta1.y;
    if det == 0.0 {
        return None;
    }
    let r = 1.0 / det;

    Some(TangentFrame {
        tangent: (edge1 * delta2.y - edge2 * delta1.y) * r,
        bitangent: (edge2 * delta1.x - edge1 * delta2.x) * r,
    })
}
