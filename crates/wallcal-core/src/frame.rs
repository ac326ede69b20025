//! Orthonormal frames built from three points

use wallcal_spatial::{Matrix3, Point3D, Vector3D};

use crate::error::{AlignmentError, Result};
use crate::validation::Triad;

/// Three mutually perpendicular unit axes, right-handed (`z = x × y`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthonormalFrame {
    pub x: Vector3D,
    pub y: Vector3D,
    pub z: Vector3D,
}

impl OrthonormalFrame {
    /// Basis matrix with the axes as columns
    pub fn to_basis(&self) -> Matrix3 {
        Matrix3::from_columns(self.x, self.y, self.z)
    }
}

/// Build a frame from three points without checking for degeneracy.
///
/// - x = normalize(p2 - p1)
/// - z = normalize(x × (p3 - p1))
/// - y = normalize(z × x)
///
/// Coincident `p1`/`p2` or collinear points produce zero axes. Use
/// [`try_build_frame`] when the input is not known to be well-formed.
pub fn build_frame(p1: Point3D, p2: Point3D, p3: Point3D) -> OrthonormalFrame {
    let x = (p2 - p1).normalize();
    let z = x.cross(&(p3 - p1)).normalize();
    let y = z.cross(&x).normalize();
    OrthonormalFrame { x, y, z }
}

/// Build a frame, failing when `|p2 - p1|` or `|x × (p3 - p1)|` is below
/// `epsilon`.
pub fn try_build_frame(
    p1: Point3D,
    p2: Point3D,
    p3: Point3D,
    epsilon: f64,
) -> Result<OrthonormalFrame> {
    let edge = p2 - p1;
    let edge_length = edge.magnitude();
    if edge_length < epsilon {
        return Err(AlignmentError::CollinearGeometry {
            magnitude: edge_length,
            epsilon,
        });
    }

    let x = edge / edge_length;
    let normal = x.cross(&(p3 - p1));
    let normal_length = normal.magnitude();
    if normal_length < epsilon {
        return Err(AlignmentError::CollinearGeometry {
            magnitude: normal_length,
            epsilon,
        });
    }

    let z = normal / normal_length;
    let y = z.cross(&x).normalize();
    Ok(OrthonormalFrame { x, y, z })
}

/// [`try_build_frame`] over a triad's points in order
pub fn frame_from_triad(triad: &Triad, epsilon: f64) -> Result<OrthonormalFrame> {
    try_build_frame(triad[0], triad[1], triad[2], epsilon)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec(actual: Vector3D, expected: Vector3D) {
        assert!(
            (actual - expected).magnitude() < 1e-5,
            "{:?} != {:?}",
            actual,
            expected
        );
    }

    #[test]
    fn test_xy_plane_frame() {
        let frame = build_frame(
            Point3D::new(0.0, 0.0, 0.0),
            Point3D::new(1.0, 0.0, 0.0),
            Point3D::new(0.0, 1.0, 0.0),
        );
        assert_vec(frame.x, Vector3D::new(1.0, 0.0, 0.0));
        assert_vec(frame.y, Vector3D::new(0.0, 1.0, 0.0));
        assert_vec(frame.z, Vector3D::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_xz_plane_frame_winding() {
        let frame = build_frame(
            Point3D::new(0.0, 0.0, 0.0),
            Point3D::new(1.0, 0.0, 0.0),
            Point3D::new(0.0, 0.0, 1.0),
        );
        assert_vec(frame.x, Vector3D::new(1.0, 0.0, 0.0));
        assert!((frame.z.y.abs() - 1.0).abs() < 1e-5);
        // Counter-clockwise winding seen from +y puts z on -y
        assert_vec(frame.z, Vector3D::new(0.0, -1.0, 0.0));
        assert_vec(frame.y, Vector3D::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_frame_is_orthonormal_and_right_handed() {
        let frame = build_frame(
            Point3D::new(0.3, -1.0, 2.0),
            Point3D::new(1.7, 0.4, 2.2),
            Point3D::new(-0.5, 0.9, 3.1),
        );
        let basis = frame.to_basis();
        assert!(basis.is_orthonormal(1e-12));
        assert!((basis.determinant() - 1.0).abs() < 1e-12);
        assert_vec(frame.x.cross(&frame.y), frame.z);
    }

    #[test]
    fn test_checked_matches_unchecked() {
        let (a, b, c) = (
            Point3D::new(1.0, 2.0, 3.0),
            Point3D::new(2.0, 2.5, 3.0),
            Point3D::new(1.0, 4.0, 5.0),
        );
        assert_eq!(try_build_frame(a, b, c, 1e-6).unwrap(), build_frame(a, b, c));
    }

    #[test]
    fn test_rejects_collinear() {
        let err = try_build_frame(
            Point3D::new(0.0, 0.0, 0.0),
            Point3D::new(1.0, 1.0, 1.0),
            Point3D::new(2.0, 2.0, 2.0),
            1e-6,
        )
        .unwrap_err();
        assert!(matches!(err, AlignmentError::CollinearGeometry { .. }));
    }

    #[test]
    fn test_rejects_coincident_first_edge() {
        let p = Point3D::new(4.0, 4.0, 4.0);
        let err = try_build_frame(p, p, Point3D::ORIGIN, 1e-6).unwrap_err();
        assert_eq!(
            err,
            AlignmentError::CollinearGeometry {
                magnitude: 0.0,
                epsilon: 1e-6
            }
        );
    }
}
