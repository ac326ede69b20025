//! Error types for alignment requests.

use wallcal_spatial::Vector3D;

/// Why an alignment request produced no transform.
///
/// Every variant is terminal for the request: the target is never mutated
/// and no completion notification is emitted.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AlignmentError {
    #[error("exactly 3 real and 3 model markers required, got {real} real and {model} model")]
    Validation { real: usize, model: usize },

    #[error("{set} marker {index} has a non-finite coordinate")]
    NonFiniteMarker { set: MarkerSet, index: usize },

    #[error(
        "model reference markers 0 and 1 are {distance:.3e} apart, below the minimum of {minimum:.3e}"
    )]
    DegenerateGeometry { distance: f64, minimum: f64 },

    #[error("markers are collinear or coincident (magnitude {magnitude:.3e} < {epsilon:.3e})")]
    CollinearGeometry { magnitude: f64, epsilon: f64 },

    #[error("target world transform is not invertible (scale {scale:?})")]
    SingularTargetTransform { scale: Vector3D },

    #[error("target world transform has a non-finite component")]
    NonFiniteTargetTransform,

    #[error("similarity scale must be finite and positive, got {scale}")]
    InvalidScale { scale: f64 },

    #[error("similarity {part} must be finite")]
    NonFiniteTransform { part: TransformPart },

    #[error("invalid solver configuration: {0}")]
    InvalidConfig(String),
}

impl AlignmentError {
    /// True for rejected input: marker counts, non-finite markers, or a
    /// solver configuration that fails validation
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AlignmentError::Validation { .. }
                | AlignmentError::NonFiniteMarker { .. }
                | AlignmentError::InvalidConfig(_)
        )
    }
}

/// Which marker set a diagnostic refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerSet {
    Real,
    Model,
}

impl std::fmt::Display for MarkerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarkerSet::Real => write!(f, "real"),
            MarkerSet::Model => write!(f, "model"),
        }
    }
}

/// Which part of a solved transform a diagnostic refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformPart {
    Translation,
    Rotation,
}

impl std::fmt::Display for TransformPart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransformPart::Translation => write!(f, "translation"),
            TransformPart::Rotation => write!(f, "rotation"),
        }
    }
}

pub type Result<T> = std::result::Result<T, AlignmentError>;
