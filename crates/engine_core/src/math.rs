//! Vector helpers that never normalize a near-zero vector.
//!
//! Every normalization site in the viewer goes through [`safe_normalize`] with an
//! explicit fallback, so parallel look/up vectors, stationary tangents and
//! coincident eye/target points degrade to a usable direction instead of NaN.

use glam::{Mat4, Vec3};

/// Vectors shorter than this are treated as degenerate.
pub const EPSILON: f32 = 1e-5;

/// World up axis.
pub const WORLD_UP: Vec3 = Vec3::Y;

/// Normalize `v`, or return `fallback` when `v` is too short (or not finite).
pub fn safe_normalize(v: Vec3, fallback: Vec3) -> Vec3 {
    let len_sq = v.length_squared();
    if len_sq.is_finite() && len_sq > EPSILON * EPSILON {
        v / len_sq.sqrt()
    } else {
        fallback
    }
}

/// Unit vector perpendicular to `forward` in the plane orthogonal to world up.
///
/// When `forward` is (anti)parallel to world up the cross product vanishes; the
/// hint is then projected off `forward`, and as a last resort any vector
/// orthogonal to `forward` is used.
pub fn orthonormal_right(forward: Vec3, right_hint: Vec3) -> Vec3 {
    let projected = right_hint - forward * forward.dot(right_hint);
    let fallback = safe_normalize(projected, forward.any_orthonormal_vector());
    safe_normalize(forward.cross(WORLD_UP), fallback)
}

/// Right-handed orthonormal camera basis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBasis {
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

impl Default for ViewBasis {
    /// Looking down +Z with world up.
    fn default() -> Self {
        Self {
            forward: Vec3::Z,
            right: -Vec3::X,
            up: Vec3::Y,
        }
    }
}

impl ViewBasis {
    /// Build a basis around `forward`; `right_hint` is only consulted when `forward`
    /// is vertical.
    pub fn from_forward(forward: Vec3, right_hint: Vec3) -> Self {
        let right = orthonormal_right(forward, right_hint);
        let up = safe_normalize(right.cross(forward), WORLD_UP);
        Self { forward, right, up }
    }

    /// Basis looking from `eye` towards `target`. If the two points coincide the
    /// `previous` basis is kept as-is.
    pub fn look_at(eye: Vec3, target: Vec3, previous: ViewBasis) -> Self {
        let to_target = target - eye;
        if to_target.length_squared() <= EPSILON * EPSILON {
            return previous;
        }
        Self::from_forward(to_target.normalize(), previous.right)
    }

    /// World-to-view matrix for an eye at `eye` using this basis.
    pub fn view_matrix(&self, eye: Vec3) -> Mat4 {
        Mat4::look_to_rh(eye, self.forward, self.up)
    }

    /// True when all three axes are unit length and mutually orthogonal within `tol`.
    pub fn is_orthonormal(&self, tol: f32) -> bool {
        let unit = |v: Vec3| (v.length() - 1.0).abs() <= tol;
        unit(self.forward)
            && unit(self.right)
            && unit(self.up)
            && self.forward.dot(self.right).abs() <= tol
            && self.forward.dot(self.up).abs() <= tol
            && self.right.dot(self.up).abs() <= tol
    }
}
