//! Transform representing position, rotation, and scale in 3D space

use serde::{Deserialize, Serialize};

use crate::{Point3D, Quaternion, Vector3D};

/// A complete 3D transform (position + rotation + per-axis scale)
///
/// Applied to points in the order scale -> rotate -> translate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Point3D,
    pub rotation: Quaternion,
    pub scale: Vector3D,
}

impl Transform {
    /// Identity transform (origin, no rotation, unit scale)
    pub fn identity() -> Self {
        Self {
            position: Point3D::ORIGIN,
            rotation: Quaternion::IDENTITY,
            scale: Vector3D::ONE,
        }
    }

    /// Create a transform from all three parts
    pub fn new(position: Point3D, rotation: Quaternion, scale: Vector3D) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Create a transform with just position
    pub fn from_position(position: Point3D) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    /// Transform a point from local space to world space
    pub fn transform_point(&self, local: Point3D) -> Point3D {
        let scaled = local.to_vector().component_mul(&self.scale);
        self.position + self.rotation.rotate_vector(scaled)
    }

    /// Inverse transform a point from world space to local space.
    ///
    /// A zero scale component yields non-finite coordinates.
    pub fn inverse_transform_point(&self, world: Point3D) -> Point3D {
        let relative = world - self.position;
        let unrotated = self.rotation.inverse().rotate_vector(relative);
        Point3D::new(
            unrotated.x / self.scale.x,
            unrotated.y / self.scale.y,
            unrotated.z / self.scale.z,
        )
    }

    /// Interpolate between two transforms: position and scale linearly,
    /// rotation spherically
    pub fn lerp(&self, other: &Transform, t: f64) -> Self {
        Self {
            position: self.position.lerp(&other.position, t),
            rotation: self.rotation.slerp(&other.rotation, t),
            scale: self.scale.lerp(&other.scale, t),
        }
    }

    /// True when every component is finite
    pub fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.rotation.is_finite()
            && self.scale.x.is_finite()
            && self.scale.y.is_finite()
            && self.scale.z.is_finite()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}
