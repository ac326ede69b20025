//! Marker files: the triads and target pose for one alignment request.
//!
//! ```toml
//! real = [[1.0, 1.0, 1.0], [2.0, 1.0, 1.0], [1.0, 2.0, 1.0]]
//! model = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]
//!
//! # Optional: the target's current world transform
//! [target]
//! position = [0.0, 0.0, 0.0]
//! rotation = [0.0, 0.0, 0.0, 1.0] # x, y, z, w
//! scale = [1.0, 1.0, 1.0]
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use wallcal_spatial::{Point3D, Quaternion, Transform, Vector3D};

/// Marker sets as collected. Counts are not checked here; alignment
/// validation rejects anything other than three per set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerFile {
    pub real: Vec<[f64; 3]>,
    pub model: Vec<[f64; 3]>,
    #[serde(default)]
    pub target: Option<TargetPose>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetPose {
    pub position: [f64; 3],
    pub rotation: [f64; 4],
    pub scale: [f64; 3],
}

impl Default for TargetPose {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            rotation: [0.0, 0.0, 0.0, 1.0],
            scale: [1.0; 3],
        }
    }
}

impl TargetPose {
    pub fn to_transform(&self) -> Transform {
        let [x, y, z, w] = self.rotation;
        Transform::new(
            Point3D::from(self.position),
            Quaternion::new(x, y, z, w).normalize(),
            Vector3D::new(self.scale[0], self.scale[1], self.scale[2]),
        )
    }
}

impl MarkerFile {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid marker file")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read marker file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("In {}", path.display()))
    }

    pub fn real_points(&self) -> Vec<Point3D> {
        self.real.iter().copied().map(Point3D::from).collect()
    }

    pub fn model_points(&self) -> Vec<Point3D> {
        self.model.iter().copied().map(Point3D::from).collect()
    }

    /// Target pose, identity when the file has none
    pub fn target_transform(&self) -> Transform {
        self.target
            .as_ref()
            .map(TargetPose::to_transform)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_without_target() {
        let markers = MarkerFile::parse(
            r#"
            real = [[1.0, 1.0, 1.0], [2.0, 1.0, 1.0], [1.0, 2.0, 1.0]]
            model = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]
            "#,
        )
        .unwrap();

        assert_eq!(markers.real_points()[1], Point3D::new(2.0, 1.0, 1.0));
        assert_eq!(markers.model_points().len(), 3);
        assert_eq!(markers.target_transform(), Transform::identity());
    }

    #[test]
    fn test_parse_partial_target() {
        let markers = MarkerFile::parse(
            r#"
            real = [[0.0, 0.0, 0.0]]
            model = []

            [target]
            position = [1.0, 2.0, 3.0]
            "#,
        )
        .unwrap();

        let target = markers.target_transform();
        assert_eq!(target.position, Point3D::new(1.0, 2.0, 3.0));
        assert_eq!(target.scale, Vector3D::ONE);
        assert_eq!(target.rotation, Quaternion::IDENTITY);
        // Counts are left for alignment validation
        assert_eq!(markers.real.len(), 1);
    }

    #[test]
    fn test_rejects_malformed_points() {
        assert!(MarkerFile::parse("real = [[1.0, 2.0]]\nmodel = []\n").is_err());
    }
}
