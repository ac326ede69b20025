//! Similarity transforms produced by the solver

use serde::{Deserialize, Serialize};
use wallcal_spatial::{Point3D, Quaternion, Transform, Vector3D};

use crate::error::{AlignmentError, Result, TransformPart};

/// Translation, rotation and a single uniform scale.
///
/// Applied to points in the order scale -> rotate -> translate. Every
/// component is finite, the rotation is a unit quaternion and the scale is
/// positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityTransform {
    translation: Vector3D,
    rotation: Quaternion,
    scale: f64,
}

impl SimilarityTransform {
    pub fn new(translation: Vector3D, rotation: Quaternion, scale: f64) -> Result<Self> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(AlignmentError::InvalidScale { scale });
        }
        if !translation.to_point().is_finite() {
            return Err(AlignmentError::NonFiniteTransform {
                part: TransformPart::Translation,
            });
        }
        // A zero quaternion has no direction to normalize to
        if !rotation.is_finite() || rotation.magnitude() == 0.0 {
            return Err(AlignmentError::NonFiniteTransform {
                part: TransformPart::Rotation,
            });
        }
        Ok(Self {
            translation,
            rotation: rotation.normalize(),
            scale,
        })
    }

    pub fn identity() -> Self {
        Self {
            translation: Vector3D::ZERO,
            rotation: Quaternion::IDENTITY,
            scale: 1.0,
        }
    }

    pub fn translation(&self) -> Vector3D {
        self.translation
    }

    pub fn rotation(&self) -> Quaternion {
        self.rotation
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn transform_point(&self, point: Point3D) -> Point3D {
        let rotated = self.rotation.rotate_vector(point.to_vector() * self.scale);
        (rotated + self.translation).to_point()
    }

    /// Node pose with this translation, rotation and uniform scale
    pub fn to_transform(&self) -> Transform {
        Transform::new(
            self.translation.to_point(),
            self.rotation,
            Vector3D::splat(self.scale),
        )
    }

    /// Distance between each mapped source point and its target counterpart
    pub fn residuals(&self, source: &[Point3D], target: &[Point3D]) -> Vec<f64> {
        source
            .iter()
            .zip(target)
            .map(|(s, t)| self.transform_point(*s).distance(t))
            .collect()
    }

    /// Root-mean-square of [`SimilarityTransform::residuals`]
    pub fn rms_error(&self, source: &[Point3D], target: &[Point3D]) -> f64 {
        let residuals = self.residuals(source, target);
        if residuals.is_empty() {
            return 0.0;
        }
        let sum_sq: f64 = residuals.iter().map(|r| r * r).sum();
        (sum_sq / residuals.len() as f64).sqrt()
    }
}

impl Default for SimilarityTransform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Payload carried by a completion notification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompletionPayload {
    pub position: Point3D,
    pub rotation: Quaternion,
    pub scale: f64,
}

impl From<&SimilarityTransform> for CompletionPayload {
    fn from(transform: &SimilarityTransform) -> Self {
        Self {
            position: transform.translation.to_point(),
            rotation: transform.rotation,
            scale: transform.scale,
        }
    }
}

impl TryFrom<CompletionPayload> for SimilarityTransform {
    type Error = AlignmentError;

    fn try_from(payload: CompletionPayload) -> Result<Self> {
        SimilarityTransform::new(payload.position.to_vector(), payload.rotation, payload.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_rejects_non_positive_scale() {
        for scale in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = SimilarityTransform::new(Vector3D::ZERO, Quaternion::IDENTITY, scale);
            assert!(matches!(result, Err(AlignmentError::InvalidScale { .. })));
        }
    }

    #[test]
    fn test_rejects_non_finite_translation_and_rotation() {
        let result = SimilarityTransform::new(
            Vector3D::new(f64::INFINITY, 0.0, 0.0),
            Quaternion::IDENTITY,
            1.0,
        );
        assert_eq!(
            result,
            Err(AlignmentError::NonFiniteTransform {
                part: TransformPart::Translation
            })
        );

        for rotation in [
            Quaternion::new(f64::NAN, 0.0, 0.0, 1.0),
            Quaternion::new(0.0, 0.0, 0.0, 0.0),
        ] {
            let result = SimilarityTransform::new(Vector3D::ZERO, rotation, 1.0);
            assert_eq!(
                result,
                Err(AlignmentError::NonFiniteTransform {
                    part: TransformPart::Rotation
                })
            );
        }
    }

    #[test]
    fn test_point_order_is_scale_rotate_translate() {
        let t = SimilarityTransform::new(
            Vector3D::new(1.0, 0.0, 0.0),
            Quaternion::from_axis_angle(Vector3D::FORWARD, PI / 2.0),
            2.0,
        )
        .unwrap();
        // (1,0,0) -> scale (2,0,0) -> rotate (0,2,0) -> translate (1,2,0)
        let p = t.transform_point(Point3D::new(1.0, 0.0, 0.0));
        assert!(p.distance(&Point3D::new(1.0, 2.0, 0.0)) < 1e-12);

        let node = t.to_transform();
        assert!(node.transform_point(Point3D::new(1.0, 0.0, 0.0)).distance(&p) < 1e-12);
    }

    #[test]
    fn test_residuals() {
        let t = SimilarityTransform::identity();
        let source = [Point3D::ORIGIN, Point3D::new(1.0, 0.0, 0.0)];
        let target = [Point3D::new(0.0, 3.0, 0.0), Point3D::new(1.0, 0.0, 4.0)];
        assert_eq!(t.residuals(&source, &target), vec![3.0, 4.0]);
        assert!((t.rms_error(&source, &target) - 12.5_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_payload_json_shape() {
        let payload = CompletionPayload::from(&SimilarityTransform::identity());
        let json = serde_json::to_value(payload).unwrap();
        assert_eq!(json["rotation"]["w"], 1.0);
        assert_eq!(json["position"]["x"], 0.0);
        assert_eq!(json["scale"], 1.0);

        let back: CompletionPayload = serde_json::from_value(json).unwrap();
        assert_eq!(SimilarityTransform::try_from(back).unwrap(), SimilarityTransform::identity());
    }
}
