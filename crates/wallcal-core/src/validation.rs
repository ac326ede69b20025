//! Marker validation
//!
//! Marker collection produces loose point lists. Only lists of exactly three
//! finite points become [`Triad`]s, so the solver never sees anything else.

use std::ops::Index;
use wallcal_spatial::Point3D;

use crate::error::{AlignmentError, MarkerSet, Result};

/// Number of markers in one correspondence set
pub const MARKER_COUNT: usize = 3;

/// An ordered set of exactly three points.
///
/// Correspondence between a real and a model triad is positional:
/// `real[i]` pairs with `model[i]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triad([Point3D; MARKER_COUNT]);

impl Triad {
    pub fn new(a: Point3D, b: Point3D, c: Point3D) -> Self {
        Self([a, b, c])
    }

    /// Take exactly three points from a slice
    pub fn from_slice(points: &[Point3D]) -> Option<Self> {
        <[Point3D; MARKER_COUNT]>::try_from(points).ok().map(Self)
    }

    pub fn points(&self) -> &[Point3D; MARKER_COUNT] {
        &self.0
    }

    pub fn centroid(&self) -> Point3D {
        Point3D::centroid(&self.0)
    }

    /// Apply `f` to every point, keeping order
    pub fn map(&self, f: impl Fn(Point3D) -> Point3D) -> Self {
        Self(self.0.map(f))
    }

    /// Offsets of every point from `origin`, as points
    pub fn centered_on(&self, origin: Point3D) -> Self {
        self.map(|p| (p - origin).to_point())
    }

    /// Multiply every coordinate by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        self.map(|p| p * factor)
    }

    /// Distance between points 0 and 1, the reference pair used for scale
    pub fn reference_distance(&self) -> f64 {
        self.0[0].distance(&self.0[1])
    }

    pub fn first_non_finite(&self) -> Option<usize> {
        self.0.iter().position(|p| !p.is_finite())
    }
}

impl Index<usize> for Triad {
    type Output = Point3D;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

/// Check the exactly-three-markers precondition for both sets.
///
/// Runs before any solving so a bad request never reaches the solver or the
/// target.
pub fn validate_markers(real: &[Point3D], model: &[Point3D]) -> Result<(Triad, Triad)> {
    let (Some(real_triad), Some(model_triad)) = (Triad::from_slice(real), Triad::from_slice(model))
    else {
        return Err(AlignmentError::Validation {
            real: real.len(),
            model: model.len(),
        });
    };

    if let Some(index) = real_triad.first_non_finite() {
        return Err(AlignmentError::NonFiniteMarker {
            set: MarkerSet::Real,
            index,
        });
    }
    if let Some(index) = model_triad.first_non_finite() {
        return Err(AlignmentError::NonFiniteMarker {
            set: MarkerSet::Model,
            index,
        });
    }

    Ok((real_triad, model_triad))
}
