//! wallcal-spatial: spatial primitives for mixed-reality wall calibration
//!
//! Uses a right-handed coordinate system:
//! - X: Right (+) / Left (-)
//! - Y: Up (+) / Down (-)
//! - Z: Forward (+) / Backward (-)
//!
//! All scalar math is done in `f64`.

mod easing;
mod matrix3;
mod point3d;
mod quaternion;
mod transform;
mod vector3d;

pub use easing::Easing;
pub use matrix3::Matrix3;
pub use point3d::Point3D;
pub use quaternion::Quaternion;
pub use transform::Transform;
pub use vector3d::Vector3D;
