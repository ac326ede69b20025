//! Alignment requests from markers to completion
//!
//! An [`AlignmentSession`] runs each request through validation, solving and
//! application in that order, tracks the request state, and notifies
//! listeners with typed [`AlignmentEvent`]s.
//!
//! Only one animation runs at a time. A request that solves successfully
//! while an earlier animation is in flight cancels it and interpolates from
//! the target's current, possibly mid-animation, pose. A request that fails
//! leaves the in-flight animation running.

use std::time::Instant;
use wallcal_config::{AlignmentConfig, AnimationConfig};
use wallcal_spatial::Point3D;

use crate::anchor::{AnchorStore, CalibrationRecord};
use crate::animation::{AnimationStatus, CancellationToken, TransformAnimation};
use crate::applicator::{apply_transform, Application, ApplyMode, TargetNode};
use crate::error::{AlignmentError, Result};
use crate::similarity::{CompletionPayload, SimilarityTransform};
use crate::solver::{AlignmentSolver, ThreePointSolver};
use crate::validation::validate_markers;

/// Per-request state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignmentState {
    Idle,
    Validating,
    Solving,
    Succeeded,
    Applying(ApplyKind),
    /// Terminal: the target holds the solved pose
    Completed,
    /// Terminal: markers were too close together or collinear
    DegenerateFailed,
    /// Terminal: wrong marker count or non-finite coordinates
    ValidationFailed,
    /// Terminal: the animation was cancelled before it finished
    Cancelled,
}

impl AlignmentState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AlignmentState::Completed
                | AlignmentState::DegenerateFailed
                | AlignmentState::ValidationFailed
                | AlignmentState::Cancelled
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyKind {
    Instant,
    Animated,
}

/// Notification delivered to session listeners
#[derive(Debug, Clone, PartialEq)]
pub enum AlignmentEvent {
    /// The target reached the solved pose. Emitted exactly once per
    /// successful request.
    Completed(CompletionPayload),
    /// The request ended without touching the target
    Failed(AlignmentError),
    /// An animation was cancelled or superseded before finishing
    Cancelled,
}

type Listener = Box<dyn FnMut(&AlignmentEvent)>;

struct AnchorBinding {
    store: Box<dyn AnchorStore>,
    storage_id: String,
}

pub struct AlignmentSession<S: AlignmentSolver = ThreePointSolver> {
    solver: S,
    animation_config: AnimationConfig,
    state: AlignmentState,
    history: Vec<AlignmentState>,
    animation: Option<TransformAnimation>,
    listeners: Vec<Listener>,
    anchor: Option<AnchorBinding>,
}

impl AlignmentSession<ThreePointSolver> {
    /// Session using the three-point solver with the configured thresholds.
    /// Fails when `config` does not validate.
    pub fn new(config: &AlignmentConfig) -> wallcal_config::Result<Self> {
        Self::with_solver(ThreePointSolver::new(&config.solver)?, config.animation.clone())
    }
}

impl<S: AlignmentSolver> AlignmentSession<S> {
    pub fn with_solver(
        solver: S,
        animation_config: AnimationConfig,
    ) -> wallcal_config::Result<Self> {
        animation_config.validate()?;
        Ok(Self {
            solver,
            animation_config,
            state: AlignmentState::Idle,
            history: vec![AlignmentState::Idle],
            animation: None,
            listeners: Vec::new(),
            anchor: None,
        })
    }

    /// Persist completed calibrations to `store` under `storage_id`
    pub fn with_anchor_store(
        mut self,
        store: Box<dyn AnchorStore>,
        storage_id: impl Into<String>,
    ) -> Self {
        self.anchor = Some(AnchorBinding {
            store,
            storage_id: storage_id.into(),
        });
        self
    }

    /// Register a listener for every event
    pub fn subscribe(&mut self, listener: impl FnMut(&AlignmentEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn state(&self) -> AlignmentState {
        self.state
    }

    /// States visited by the latest request, starting from `Idle`
    pub fn history(&self) -> &[AlignmentState] {
        &self.history
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Token for the in-flight animation, if any
    pub fn cancel_token(&self) -> Option<CancellationToken> {
        self.animation.as_ref().map(|a| a.token())
    }

    /// Align using the configured apply mode
    pub fn align<T: TargetNode + ?Sized>(
        &mut self,
        target: &mut T,
        real: &[Point3D],
        model: &[Point3D],
    ) -> Result<SimilarityTransform> {
        let mode = ApplyMode::from_config(&self.animation_config);
        self.align_with_mode(target, real, model, mode)
    }

    /// Validate, solve and apply one request.
    ///
    /// On failure the target is untouched, the session lands in a terminal
    /// failure state and no completion event is emitted.
    pub fn align_with_mode<T: TargetNode + ?Sized>(
        &mut self,
        target: &mut T,
        real: &[Point3D],
        model: &[Point3D],
        mode: ApplyMode,
    ) -> Result<SimilarityTransform> {
        self.history.clear();
        self.history.push(AlignmentState::Idle);

        self.transition(AlignmentState::Validating);
        let (real, model) = match validate_markers(real, model) {
            Ok(triads) => triads,
            Err(err) => {
                tracing::warn!("Alignment rejected: {}", err);
                return Err(self.fail(AlignmentState::ValidationFailed, err));
            }
        };

        self.transition(AlignmentState::Solving);
        let transform = match self.solver.solve(&real, &model, &target.world_transform()) {
            Ok(transform) => transform,
            Err(err) => {
                tracing::warn!("Alignment failed: {}", err);
                let state = if err.is_validation() {
                    AlignmentState::ValidationFailed
                } else {
                    AlignmentState::DegenerateFailed
                };
                return Err(self.fail(state, err));
            }
        };
        self.transition(AlignmentState::Succeeded);

        if let Some(previous) = self.animation.take() {
            tracing::debug!("Superseding in-flight alignment animation");
            previous.token().cancel();
            self.emit(&AlignmentEvent::Cancelled);
        }

        match apply_transform(target, transform, mode) {
            Application::Completed(transform) => {
                self.transition(AlignmentState::Applying(ApplyKind::Instant));
                self.complete(&transform);
            }
            Application::Animating(animation) => {
                self.transition(AlignmentState::Applying(ApplyKind::Animated));
                self.animation = Some(animation);
            }
        }

        Ok(transform)
    }

    /// Advance the in-flight animation to frame time `now`
    pub fn advance<T: TargetNode + ?Sized>(&mut self, target: &mut T, now: Instant) -> AnimationStatus {
        let Some(animation) = self.animation.as_mut() else {
            return AnimationStatus::Inactive;
        };

        let status = animation.advance(target, now);
        match status {
            AnimationStatus::Completed => {
                let transform = animation.target();
                self.animation = None;
                self.complete(&transform);
            }
            AnimationStatus::Cancelled | AnimationStatus::Inactive => {
                self.animation = None;
                self.transition(AlignmentState::Cancelled);
                self.emit(&AlignmentEvent::Cancelled);
            }
            AnimationStatus::Running { .. } => {}
        }
        status
    }

    /// Stop the in-flight animation where it is
    pub fn cancel(&mut self) -> bool {
        match self.animation.take() {
            Some(animation) => {
                animation.token().cancel();
                self.transition(AlignmentState::Cancelled);
                self.emit(&AlignmentEvent::Cancelled);
                true
            }
            None => false,
        }
    }

    /// Re-apply the calibration saved for this session's storage id.
    ///
    /// The pose is written instantly and no completion event is emitted. An
    /// in-flight animation is cancelled first. A successful restore leaves
    /// the session in `Completed`, with a history of `Idle`,
    /// `Applying(Instant)`, `Completed`.
    /// Returns `Ok(None)` when no store is bound or nothing was saved; the
    /// session state is then left as it was.
    pub fn restore<T: TargetNode + ?Sized>(
        &mut self,
        target: &mut T,
    ) -> anyhow::Result<Option<SimilarityTransform>> {
        let Some(anchor) = self.anchor.as_ref() else {
            return Ok(None);
        };
        let Some(record) = anchor.store.load(&anchor.storage_id)? else {
            tracing::debug!("No saved calibration for '{}'", anchor.storage_id);
            return Ok(None);
        };

        let transform = SimilarityTransform::try_from(record.payload).map_err(|e| {
            anyhow::anyhow!(
                "Saved calibration for '{}' is invalid: {}",
                anchor.storage_id,
                e
            )
        })?;
        tracing::info!(
            "Restored calibration '{}' saved at {}",
            anchor.storage_id,
            record.saved_at
        );

        if let Some(previous) = self.animation.take() {
            previous.token().cancel();
            self.transition(AlignmentState::Cancelled);
            self.emit(&AlignmentEvent::Cancelled);
        }
        self.history.clear();
        self.history.push(AlignmentState::Idle);
        target.set_local_transform(transform.to_transform());
        self.transition(AlignmentState::Applying(ApplyKind::Instant));
        self.transition(AlignmentState::Completed);
        Ok(Some(transform))
    }

    fn complete(&mut self, transform: &SimilarityTransform) {
        self.transition(AlignmentState::Completed);
        let payload = CompletionPayload::from(transform);
        tracing::info!(
            scale = payload.scale,
            "Alignment completed at ({:.4}, {:.4}, {:.4})",
            payload.position.x,
            payload.position.y,
            payload.position.z
        );

        if let Some(anchor) = self.anchor.as_mut() {
            let record = CalibrationRecord::new(payload);
            if let Err(e) = anchor.store.save(&anchor.storage_id, &record) {
                tracing::warn!("Failed to persist calibration '{}': {}", anchor.storage_id, e);
            }
        }

        self.emit(&AlignmentEvent::Completed(payload));
    }

    fn fail(&mut self, state: AlignmentState, err: AlignmentError) -> AlignmentError {
        self.transition(state);
        self.emit(&AlignmentEvent::Failed(err.clone()));
        err
    }

    fn transition(&mut self, next: AlignmentState) {
        tracing::debug!("Alignment state {:?} -> {:?}", self.state, next);
        self.state = next;
        self.history.push(next);
    }

    fn emit(&mut self, event: &AlignmentEvent) {
        for listener in self.listeners.iter_mut() {
            listener(event);
        }
    }
}
