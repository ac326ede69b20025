//! Three-point similarity alignment
//!
//! Maps three model-space markers onto three measured real-world markers with
//! a translation, rotation and uniform scale:
//!
//! 1. Model markers are converted into the target's local space, so the
//!    result can be written straight into the target's local transform.
//! 2. Both triads are centered on their centroids. Residual error is spread
//!    across all three markers instead of being pinned to marker 0.
//! 3. Scale is the ratio of the marker 0-1 distances.
//! 4. Rotation maps the frame of the scaled model triad onto the frame of the
//!    real triad.
//! 5. Translation carries the scaled, rotated model centroid onto the real
//!    centroid.
//!
//! This is not a least-squares fit. Scale ignores the 0-2 and 1-2 distances,
//! so for triads that are not congruent up to scale a per-point residual
//! remains. The solver reports it but never rejects on it.

use wallcal_config::SolverConfig;
use wallcal_spatial::{Quaternion, Transform};

use crate::error::{AlignmentError, Result};
use crate::frame::frame_from_triad;
use crate::similarity::SimilarityTransform;
use crate::validation::Triad;

/// Solves the transform that maps model markers onto real markers
pub trait AlignmentSolver {
    /// `target_world` is the target's current world transform; the result is
    /// expressed in the target's local frame.
    fn solve(
        &self,
        real: &Triad,
        model: &Triad,
        target_world: &Transform,
    ) -> Result<SimilarityTransform>;
}

/// Centroid-based three-point solver.
///
/// Holds a validated copy of its thresholds.
#[derive(Debug, Clone, Default)]
pub struct ThreePointSolver {
    config: SolverConfig,
}

impl ThreePointSolver {
    pub fn new(config: &SolverConfig) -> wallcal_config::Result<Self> {
        config.validate()?;
        Ok(Self {
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }
}

impl AlignmentSolver for ThreePointSolver {
    fn solve(
        &self,
        real: &Triad,
        model: &Triad,
        target_world: &Transform,
    ) -> Result<SimilarityTransform> {
        compute_alignment(real, model, target_world, &self.config)
    }
}

/// Solve the similarity transform taking `model` (world space, converted to
/// the target's local space) onto `real`.
///
/// `config` is validated first, so thresholds that would let collinear
/// markers through are rejected as [`AlignmentError::InvalidConfig`].
pub fn compute_alignment(
    real: &Triad,
    model: &Triad,
    target_world: &Transform,
    config: &SolverConfig,
) -> Result<SimilarityTransform> {
    config
        .validate()
        .map_err(|e| AlignmentError::InvalidConfig(e.to_string()))?;

    let scale_axes = target_world.scale;
    if [scale_axes.x, scale_axes.y, scale_axes.z]
        .iter()
        .any(|s| !s.is_finite() || *s == 0.0)
    {
        return Err(AlignmentError::SingularTargetTransform { scale: scale_axes });
    }
    if !target_world.is_finite() {
        return Err(AlignmentError::NonFiniteTargetTransform);
    }

    let model_local = model.map(|p| target_world.inverse_transform_point(p));

    let real_centroid = real.centroid();
    let local_centroid = model_local.centroid();
    let real_centered = real.centered_on(real_centroid);
    let model_centered = model_local.centered_on(local_centroid);

    let model_distance = model_local.reference_distance();
    if model_distance < config.min_reference_distance {
        return Err(AlignmentError::DegenerateGeometry {
            distance: model_distance,
            minimum: config.min_reference_distance,
        });
    }
    let scale = real.reference_distance() / model_distance;

    let model_scaled = model_centered.scaled(scale);

    let real_frame = frame_from_triad(&real_centered, config.collinearity_epsilon)?;
    let model_frame = frame_from_triad(&model_scaled, config.collinearity_epsilon)?;

    // Both bases are orthonormal, so the inverse of the model basis is its
    // transpose.
    let rotation_matrix = real_frame.to_basis() * model_frame.to_basis().transpose();
    let rotation = Quaternion::from_rotation_matrix(&rotation_matrix);

    let translation =
        real_centroid.to_vector() - rotation.rotate_vector(local_centroid.to_vector() * scale);

    let transform = SimilarityTransform::new(translation, rotation, scale)?;

    tracing::debug!(
        scale,
        rms_error = transform.rms_error(model_local.points(), real.points()),
        "Solved three-point alignment"
    );

    Ok(transform)
}
