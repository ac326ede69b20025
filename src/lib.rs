//! wallcal: calibrate a virtual wall model to a physical wall in mixed reality
//! from three marker correspondences.
//!
//! The work is split across the workspace crates, re-exported here:
//! - [`spatial`]: points, vectors, quaternions, matrices, transforms, easing
//! - [`config`]: typed, validated configuration
//! - [`core`]: validation, frame building, solving, application, sessions

pub mod cli;
pub mod markers;

pub use wallcal_config as config;
pub use wallcal_core as core;
pub use wallcal_spatial as spatial;

pub use wallcal_config::AlignmentConfig;
pub use wallcal_core::{
    AlignmentError, AlignmentEvent, AlignmentSession, AlignmentState, CompletionPayload,
    SceneNode, SimilarityTransform, TargetNode,
};
