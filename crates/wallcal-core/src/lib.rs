//! wallcal-core: three-point similarity alignment for mixed-reality walls.
//!
//! Calibrates a virtual wall model to a physical wall from three marker
//! correspondences:
//!
//! - **Marker validation**: exactly three finite markers per set
//! - **Frame building**: right-handed orthonormal frames from three points
//! - **Solving**: centroid-based translation, rotation and uniform scale
//! - **Application**: instant or eased animation onto a target node
//! - **Sessions**: the per-request state machine and typed notifications
//!
//! # Usage
//!
//! ```
//! use wallcal_config::AlignmentConfig;
//! use wallcal_core::{AlignmentSession, SceneNode, TargetNode};
//! use wallcal_spatial::Point3D;
//!
//! let mut config = AlignmentConfig::default();
//! config.animation.animate = false;
//!
//! let mut session = AlignmentSession::new(&config).unwrap();
//! session.subscribe(|event| println!("{:?}", event));
//!
//! let mut wall = SceneNode::new("wall");
//! let real = [
//!     Point3D::new(1.0, 1.0, 1.0),
//!     Point3D::new(2.0, 1.0, 1.0),
//!     Point3D::new(1.0, 2.0, 1.0),
//! ];
//! let model = [
//!     Point3D::new(0.0, 0.0, 0.0),
//!     Point3D::new(1.0, 0.0, 0.0),
//!     Point3D::new(0.0, 1.0, 0.0),
//! ];
//!
//! let transform = session.align(&mut wall, &real, &model).unwrap();
//! assert!((transform.scale() - 1.0).abs() < 1e-9);
//! assert_eq!(wall.local_transform(), transform.to_transform());
//! ```

pub mod anchor;
pub mod animation;
pub mod applicator;
pub mod error;
pub mod frame;
pub mod session;
pub mod similarity;
pub mod solver;
pub mod validation;

pub use anchor::{AnchorStore, CalibrationRecord, InMemoryAnchorStore};
pub use animation::{AnimationStatus, CancellationToken, TransformAnimation};
pub use applicator::{apply_transform, Application, ApplyMode, SceneNode, TargetNode};
pub use error::{AlignmentError, MarkerSet, Result, TransformPart};
pub use frame::{build_frame, try_build_frame, OrthonormalFrame};
pub use session::{AlignmentEvent, AlignmentSession, AlignmentState, ApplyKind};
pub use similarity::{CompletionPayload, SimilarityTransform};
pub use solver::{compute_alignment, AlignmentSolver, ThreePointSolver};
pub use validation::{validate_markers, Triad, MARKER_COUNT};

/// Outcome of one alignment: a transform, or the reason there is none
pub type AlignmentOutcome = Result<SimilarityTransform>;
