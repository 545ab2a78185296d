//! Per-node transform math: bind-pose composition, decomposition and head rotation.

use nalgebra::{Matrix3, Matrix4, Rotation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::rig::BindPose;

/// How the target should blend into this transform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationMarker {
    /// Regular interpolation over the configured duration.
    #[default]
    None,
    /// Reached through a Step segment; apply instantly.
    Step,
    /// Instant transition between two stacked keys; apply instantly.
    PrePost,
}

impl InterpolationMarker {
    #[inline]
    pub fn is_instant(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Transform of one node at one tick, relative to the rig root.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeTransform {
    /// Row-major 4x4 matrix, rounded to the configured precision.
    pub matrix: [f64; 16],
    pub translation: [f64; 3],
    /// Unit quaternion (x, y, z, w).
    pub rotation: [f64; 4],
    pub scale: [f64; 3],
    /// (pitch, yaw) in degrees, derived from `rotation`.
    pub head_rotation: [f64; 2],
    #[serde(default)]
    pub marker: InterpolationMarker,
}

impl Default for NodeTransform {
    /// Identity pose.
    fn default() -> Self {
        let mut matrix = [0.0; 16];
        for i in 0..4 {
            matrix[i * 5] = 1.0;
        }
        Self {
            matrix,
            translation: [0.0; 3],
            rotation: [0.0, 0.0, 0.0, 1.0],
            scale: [1.0; 3],
            head_rotation: [0.0; 2],
            marker: InterpolationMarker::None,
        }
    }
}

#[inline]
pub(crate) fn round_to(v: f64, scale: f64) -> f64 {
    let r = (v * scale).round() / scale;
    // Avoid emitting "-0".
    if r == 0.0 {
        0.0
    } else {
        r
    }
}

fn euler_rotation(degrees: [f64; 3]) -> Rotation3<f64> {
    // X applied first, then Y, then Z.
    Rotation3::from_euler_angles(
        degrees[0].to_radians(),
        degrees[1].to_radians(),
        degrees[2].to_radians(),
    )
}

/// Local matrix of a node: `T(pivot offset + position) · R(bind + rotation) · S(bind · scale)`.
///
/// `parent_origin` is the bind origin of the parent (zero for top-level nodes).
pub fn compose_local(
    bind: &BindPose,
    parent_origin: [f64; 3],
    position: [f64; 3],
    rotation: [f64; 3],
    scale: [f64; 3],
) -> Matrix4<f64> {
    let offset = Vector3::new(
        bind.origin[0] - parent_origin[0] + position[0],
        bind.origin[1] - parent_origin[1] + position[1],
        bind.origin[2] - parent_origin[2] + position[2],
    );
    let bind_rot = euler_rotation(bind.rotation);
    let anim_rot = euler_rotation(rotation);
    let rot = bind_rot * anim_rot;
    let s = Vector3::new(
        bind.scale[0] * scale[0],
        bind.scale[1] * scale[1],
        bind.scale[2] * scale[2],
    );
    Matrix4::new_translation(&offset) * rot.to_homogeneous() * Matrix4::new_nonuniform_scaling(&s)
}

impl NodeTransform {
    /// Decompose a world matrix. `None` when the matrix holds non-finite entries.
    pub fn from_matrix(m: &Matrix4<f64>, marker: InterpolationMarker, precision: f64) -> Option<Self> {
        if m.iter().any(|v| !v.is_finite()) {
            return None;
        }
        let basis: Matrix3<f64> = m.fixed_view::<3, 3>(0, 0).into_owned();
        let mut scale = [
            basis.column(0).norm(),
            basis.column(1).norm(),
            basis.column(2).norm(),
        ];
        if basis.determinant() < 0.0 {
            scale[0] = -scale[0];
        }
        let rotation = if scale.iter().any(|s| s.abs() < 1e-9) {
            // Collapsed axis: orientation is meaningless.
            UnitQuaternion::identity()
        } else {
            let mut r = basis;
            for (i, s) in scale.iter().enumerate() {
                r.set_column(i, &(basis.column(i) / *s));
            }
            UnitQuaternion::from_matrix(&r)
        };

        let forward = rotation * Vector3::z();
        let yaw = (-forward.x).atan2(forward.z).to_degrees();
        let pitch = (-forward.y).clamp(-1.0, 1.0).asin().to_degrees();

        let mut matrix = [0.0; 16];
        for row in 0..4 {
            for col in 0..4 {
                matrix[row * 4 + col] = round_to(m[(row, col)], precision);
            }
        }
        let q = rotation.quaternion();
        Some(Self {
            matrix,
            translation: [
                round_to(m[(0, 3)], precision),
                round_to(m[(1, 3)], precision),
                round_to(m[(2, 3)], precision),
            ],
            rotation: [q.i, q.j, q.k, q.w],
            scale: scale.map(|s| round_to(s, precision)),
            head_rotation: [round_to(pitch, precision), round_to(yaw, precision)],
            marker,
        })
    }

    /// Same pose, ignoring the interpolation marker.
    #[inline]
    pub fn same_pose(&self, other: &Self) -> bool {
        self.matrix == other.matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn composes_pivot_relative_to_parent() {
        let bind = BindPose {
            origin: [1.0, 2.0, 0.0],
            ..Default::default()
        };
        let m = compose_local(&bind, [1.0, 0.0, 0.0], [0.5, 0.0, 0.0], [0.0; 3], [1.0; 3]);
        assert_relative_eq!(m[(0, 3)], 0.5);
        assert_relative_eq!(m[(1, 3)], 2.0);
    }

    #[test]
    fn decomposes_rotation_and_scale() {
        let bind = BindPose::default();
        let m = compose_local(&bind, [0.0; 3], [0.0; 3], [0.0, 90.0, 0.0], [2.0, 2.0, 2.0]);
        let t = NodeTransform::from_matrix(&m, InterpolationMarker::None, 1e4).unwrap();
        assert_relative_eq!(t.scale[0], 2.0);
        // +90° about Y turns +Z into +X, which faces yaw -90.
        assert_relative_eq!(t.head_rotation[1], -90.0);
        assert_relative_eq!(t.head_rotation[0], 0.0);
        assert_eq!(t.matrix[2], 2.0);
    }

    #[test]
    fn rejects_non_finite_matrix() {
        let mut m = Matrix4::identity();
        m[(0, 0)] = f64::NAN;
        assert!(NodeTransform::from_matrix(&m, InterpolationMarker::None, 1e4).is_none());
    }

    #[test]
    fn zero_scale_keeps_identity_rotation() {
        let m = Matrix4::new_nonuniform_scaling(&Vector3::new(0.0, 0.0, 0.0));
        let t = NodeTransform::from_matrix(&m, InterpolationMarker::Step, 1e4).unwrap();
        assert_eq!(t.rotation, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(t.marker, InterpolationMarker::Step);
    }
}
