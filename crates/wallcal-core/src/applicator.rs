//! Applying solved transforms to target nodes

use std::time::Duration;
use wallcal_config::AnimationConfig;
use wallcal_spatial::{Easing, Transform};

use crate::animation::TransformAnimation;
use crate::similarity::SimilarityTransform;

/// Anything whose pose the applicator may overwrite
pub trait TargetNode {
    /// Pose relative to the parent
    fn local_transform(&self) -> Transform;

    fn set_local_transform(&mut self, transform: Transform);

    /// Pose in world space. Root nodes have no parent, so this defaults to
    /// the local transform.
    fn world_transform(&self) -> Transform {
        self.local_transform()
    }
}

/// A named root node in the scene
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub name: String,
    transform: Transform,
}

impl SceneNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::identity(),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }
}

impl TargetNode for SceneNode {
    fn local_transform(&self) -> Transform {
        self.transform
    }

    fn set_local_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }
}

/// How a solved transform reaches the target
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ApplyMode {
    /// Overwrite the pose immediately
    Instant,
    /// Interpolate from the current pose over `duration`
    Animated { duration: Duration, easing: Easing },
}

impl ApplyMode {
    pub fn from_config(config: &AnimationConfig) -> Self {
        if config.animate {
            ApplyMode::Animated {
                duration: config.duration(),
                easing: config.easing,
            }
        } else {
            ApplyMode::Instant
        }
    }
}

/// Result of handing a transform to the applicator
#[derive(Debug)]
pub enum Application {
    /// The target already holds the final pose
    Completed(SimilarityTransform),
    /// The target is untouched until the animation is advanced
    Animating(TransformAnimation),
}

/// Apply `transform` to `target`.
///
/// Instant mode writes the pose before returning. Animated mode captures the
/// current pose as the starting point and returns the task that drives the
/// interpolation; the caller advances it from its frame loop.
pub fn apply_transform<T: TargetNode + ?Sized>(
    target: &mut T,
    transform: SimilarityTransform,
    mode: ApplyMode,
) -> Application {
    match mode {
        ApplyMode::Instant => {
            target.set_local_transform(transform.to_transform());
            Application::Completed(transform)
        }
        ApplyMode::Animated { duration, easing } => Application::Animating(
            TransformAnimation::new(target.local_transform(), transform, duration, easing),
        ),
    }
}
