//! Rigid-body pose type and the quaternion helpers shared by the filters.

use crate::constants::{EPSILON, SLERP_EPSILON};
use crate::{Error, Result};
use nalgebra::{Isometry3, Matrix3, Matrix4, Quaternion, Rotation3, Translation3, UnitQuaternion, Vector3};

/// A position plus orientation sample from a tracker
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// Position in tracker space
    pub position: Vector3<f64>,
    /// Orientation as a unit quaternion
    pub orientation: UnitQuaternion<f64>,
}

impl Pose {
    #[must_use]
    pub const fn new(position: Vector3<f64>, orientation: UnitQuaternion<f64>) -> Self {
        Self { position, orientation }
    }

    /// Build a pose from a raw quaternion, normalizing it.
    ///
    /// Trackers frequently report quaternions that drifted slightly off the unit sphere.
    ///
    /// # Errors
    ///
    /// Returns an error if the quaternion has (near) zero norm or contains non-finite values.
    pub fn from_raw(position: Vector3<f64>, orientation: Quaternion<f64>) -> Result<Self> {
        if !orientation.coords.iter().all(|c| c.is_finite()) {
            return Err(Error::InvalidInput("Quaternion contains non-finite components".to_string()));
        }
        let orientation = UnitQuaternion::try_new(orientation, EPSILON)
            .ok_or_else(|| Error::InvalidInput("Quaternion has zero norm".to_string()))?;
        Ok(Self::new(position, orientation))
    }

    /// Pose at the origin with no rotation
    #[must_use]
    pub fn identity() -> Self {
        Self::new(Vector3::zeros(), UnitQuaternion::identity())
    }

    /// Pose with no rotation
    #[must_use]
    pub fn from_position(position: Vector3<f64>) -> Self {
        Self::new(position, UnitQuaternion::identity())
    }

    /// Rigid transform applying the rotation first, then the translation
    #[must_use]
    pub fn to_isometry(&self) -> Isometry3<f64> {
        Isometry3::from_parts(Translation3::from(self.position), self.orientation)
    }

    /// 4x4 homogeneous transform of this pose
    #[must_use]
    pub fn to_matrix(&self) -> Matrix4<f64> {
        self.to_isometry().to_homogeneous()
    }

    /// Decompose a homogeneous transform into a pose.
    ///
    /// Any per-axis scale in the upper 3x3 block is discarded.
    ///
    /// # Errors
    ///
    /// Returns an error if an axis of the rotation block is degenerate.
    pub fn from_matrix(matrix: &Matrix4<f64>) -> Result<Self> {
        let position = Vector3::new(matrix[(0, 3)], matrix[(1, 3)], matrix[(2, 3)]);

        let mut basis = Matrix3::from_fn(|r, c| matrix[(r, c)]);
        for mut column in basis.column_iter_mut() {
            let scale = column.norm();
            if !scale.is_finite() || scale < EPSILON {
                return Err(Error::InvalidInput("Transform has a degenerate rotation axis".to_string()));
            }
            column /= scale;
        }

        let rotation = Rotation3::from_matrix(&basis);
        Ok(Self::new(position, UnitQuaternion::from_rotation_matrix(&rotation)))
    }

    /// Euclidean distance between two positions
    #[must_use]
    pub fn translation_distance(&self, other: &Self) -> f64 {
        (self.position - other.position).norm()
    }

    /// Angle `acos(q1 · q2)` between two orientations, with the dot product clamped to [-1, 1]
    #[must_use]
    pub fn rotation_distance(&self, other: &Self) -> f64 {
        let dot = self.orientation.quaternion().dot(other.orientation.quaternion());
        dot.clamp(-1.0, 1.0).acos()
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

/// Normalize a quaternion back onto the unit sphere.
///
/// A (near) zero quaternion has no meaningful direction and maps to identity.
#[must_use]
pub fn renormalize(q: Quaternion<f64>) -> UnitQuaternion<f64> {
    UnitQuaternion::try_new(q, EPSILON).unwrap_or_else(UnitQuaternion::identity)
}

/// Shortest-path spherical interpolation from `from` (t = 0) to `to` (t = 1).
///
/// Falls back to a normalized lerp when the two orientations are numerically parallel,
/// where slerp is ill-conditioned.
#[must_use]
pub fn slerp(from: &UnitQuaternion<f64>, to: &UnitQuaternion<f64>, t: f64) -> UnitQuaternion<f64> {
    if let Some(q) = from.try_slerp(to, t, SLERP_EPSILON) {
        return renormalize(q.into_inner());
    }

    let target = if from.quaternion().dot(to.quaternion()) < 0.0 {
        -to.into_inner()
    } else {
        to.into_inner()
    };
    renormalize(from.quaternion().lerp(&target, t))
}
