//! Interpolated application of a solved transform
//!
//! A [`TransformAnimation`] owns the start pose, the end pose and the timing.
//! The host's frame loop calls [`TransformAnimation::advance`] once per frame
//! with the frame timestamp. The first call captures the start time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use wallcal_spatial::{Easing, Transform};

use crate::applicator::TargetNode;
use crate::similarity::SimilarityTransform;

/// Shared flag that stops an animation at its next frame
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Outcome of one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimationStatus {
    /// Interpolating; `progress` is the un-eased fraction of the duration
    Running { progress: f64 },
    /// This frame wrote the exact end pose. Reported once.
    Completed,
    /// Stopped by its token before reaching the end. Reported once.
    Cancelled,
    /// Already finished or cancelled; the target was not touched
    Inactive,
}

#[derive(Debug)]
pub struct TransformAnimation {
    from: Transform,
    to: Transform,
    target: SimilarityTransform,
    duration: Duration,
    easing: Easing,
    started_at: Option<Instant>,
    token: CancellationToken,
    finished: bool,
}

impl TransformAnimation {
    pub fn new(
        from: Transform,
        target: SimilarityTransform,
        duration: Duration,
        easing: Easing,
    ) -> Self {
        Self {
            from,
            to: target.to_transform(),
            target,
            duration,
            easing,
            started_at: None,
            token: CancellationToken::new(),
            finished: false,
        }
    }

    /// Token that cancels this animation
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// The solved transform this animation ends on
    pub fn target(&self) -> SimilarityTransform {
        self.target
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Pose at eased fraction `t` of the way from start to end
    pub fn pose_at(&self, t: f64) -> Transform {
        self.from.lerp(&self.to, self.easing.apply(t))
    }

    /// Advance to frame time `now` and write the interpolated pose.
    ///
    /// Once `now` reaches the end, the exact end pose is written instead of
    /// an interpolated one, so no interpolation error is left behind.
    pub fn advance<T: TargetNode + ?Sized>(&mut self, node: &mut T, now: Instant) -> AnimationStatus {
        if self.finished {
            return AnimationStatus::Inactive;
        }
        if self.token.is_cancelled() {
            self.finished = true;
            return AnimationStatus::Cancelled;
        }

        let started_at = *self.started_at.get_or_insert(now);
        let elapsed = now.saturating_duration_since(started_at);

        if elapsed >= self.duration {
            node.set_local_transform(self.to);
            self.finished = true;
            return AnimationStatus::Completed;
        }

        let progress = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        node.set_local_transform(self.pose_at(progress));
        AnimationStatus::Running { progress }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::applicator::SceneNode;
    use wallcal_spatial::{Point3D, Quaternion, Vector3D};

    fn target() -> SimilarityTransform {
        SimilarityTransform::new(
            Vector3D::new(10.0, 0.0, 0.0),
            Quaternion::from_axis_angle(Vector3D::UP, std::f64::consts::FRAC_PI_2),
            3.0,
        )
        .unwrap()
    }

    fn animation(easing: Easing) -> TransformAnimation {
        TransformAnimation::new(
            Transform::identity(),
            target(),
            Duration::from_millis(1000),
            easing,
        )
    }

    #[test]
    fn test_first_frame_is_start_pose() {
        let mut node = SceneNode::new("wall");
        let mut anim = animation(Easing::EaseInOutCubic);
        let t0 = Instant::now();

        assert_eq!(
            anim.advance(&mut node, t0),
            AnimationStatus::Running { progress: 0.0 }
        );
        assert_eq!(anim.started_at(), Some(t0));
        assert!(node.local_transform().position.distance(&Point3D::ORIGIN) < 1e-12);
    }

    #[test]
    fn test_eased_interpolation() {
        let mut node = SceneNode::new("wall");
        let mut anim = animation(Easing::EaseInOutCubic);
        let t0 = Instant::now();
        anim.advance(&mut node, t0);

        anim.advance(&mut node, t0 + Duration::from_millis(250));
        // ease-in-out cubic at 0.25 is 0.0625
        let pose = node.local_transform();
        assert!((pose.position.x - 0.625).abs() < 1e-9);
        assert!((pose.scale.x - 1.125).abs() < 1e-9);

        anim.advance(&mut node, t0 + Duration::from_millis(500));
        let pose = node.local_transform();
        assert!((pose.position.x - 5.0).abs() < 1e-9);
        assert!((pose.scale.y - 2.0).abs() < 1e-9);
        let half = Quaternion::from_axis_angle(Vector3D::UP, std::f64::consts::FRAC_PI_4);
        assert!(pose.rotation.angle_to(&half) < 1e-9);
    }

    #[test]
    fn test_snaps_exactly_and_completes_once() {
        let mut node = SceneNode::new("wall");
        let mut anim = animation(Easing::EaseInOutSine);
        let t0 = Instant::now();

        for ms in [0, 16, 33, 500, 990] {
            let status = anim.advance(&mut node, t0 + Duration::from_millis(ms));
            assert!(matches!(status, AnimationStatus::Running { .. }));
        }
        assert_eq!(
            anim.advance(&mut node, t0 + Duration::from_millis(1010)),
            AnimationStatus::Completed
        );
        assert_eq!(node.local_transform(), target().to_transform());
        assert!(anim.is_finished());

        assert_eq!(
            anim.advance(&mut node, t0 + Duration::from_millis(2000)),
            AnimationStatus::Inactive
        );
    }

    #[test]
    fn test_zero_duration_completes_on_first_frame() {
        let mut node = SceneNode::new("wall");
        let mut anim = TransformAnimation::new(
            Transform::identity(),
            target(),
            Duration::ZERO,
            Easing::Linear,
        );
        assert_eq!(anim.advance(&mut node, Instant::now()), AnimationStatus::Completed);
        assert_eq!(node.local_transform(), target().to_transform());
    }

    #[test]
    fn test_cancelled_animation_stops_without_writing() {
        let mut node = SceneNode::new("wall");
        let mut anim = animation(Easing::Linear);
        let t0 = Instant::now();
        anim.advance(&mut node, t0);
        anim.advance(&mut node, t0 + Duration::from_millis(400));
        let mid_pose = node.local_transform();

        anim.token().cancel();
        assert_eq!(
            anim.advance(&mut node, t0 + Duration::from_millis(2000)),
            AnimationStatus::Cancelled
        );
        assert_eq!(node.local_transform(), mid_pose);
        assert_eq!(
            anim.advance(&mut node, t0 + Duration::from_millis(3000)),
            AnimationStatus::Inactive
        );
    }
}
