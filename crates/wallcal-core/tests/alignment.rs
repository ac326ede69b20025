//! End-to-end alignment through the public API

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use wallcal_config::AlignmentConfig;
use wallcal_core::{
    AlignmentError, AlignmentEvent, AlignmentSession, AlignmentSolver, AlignmentState,
    AnimationStatus, SceneNode, SimilarityTransform, TargetNode, ThreePointSolver, Triad,
};
use wallcal_spatial::{Point3D, Quaternion, Transform, Vector3D};

fn wall_real() -> [Point3D; 3] {
    [
        Point3D::new(1.0, 1.0, 1.0),
        Point3D::new(2.0, 1.0, 1.0),
        Point3D::new(1.0, 2.0, 1.0),
    ]
}

fn wall_model() -> [Point3D; 3] {
    [
        Point3D::new(0.0, 0.0, 0.0),
        Point3D::new(1.0, 0.0, 0.0),
        Point3D::new(0.0, 1.0, 0.0),
    ]
}

fn completion_counter(session: &mut AlignmentSession) -> Rc<Cell<usize>> {
    let count = Rc::new(Cell::new(0));
    let sink = Rc::clone(&count);
    session.subscribe(move |event| {
        if let AlignmentEvent::Completed(_) = event {
            sink.set(sink.get() + 1);
        }
    });
    count
}

#[test]
fn unit_wall_calibrates_to_offset_markers() {
    let mut config = AlignmentConfig::default();
    config.animation.animate = false;
    let mut session = AlignmentSession::new(&config).unwrap();
    let mut wall = SceneNode::new("wall");

    let t = session.align(&mut wall, &wall_real(), &wall_model()).unwrap();

    assert!((t.scale() - 1.0).abs() < 1e-3);
    assert!((t.translation() - Vector3D::new(1.0, 1.0, 1.0)).magnitude() < 1e-5);
    assert!(t.rotation().angle_to(&Quaternion::IDENTITY) < 1e-5);
    assert!(t.translation().x.is_finite());

    // The wall now places its model markers on the real ones
    let pose = wall.local_transform();
    for (m, r) in wall_model().iter().zip(wall_real().iter()) {
        assert!(pose.transform_point(*m).distance(r) < 1e-5);
    }
}

#[test]
fn animated_calibration_reaches_real_markers() {
    let mut session = AlignmentSession::new(&AlignmentConfig::default()).unwrap();
    let completions = completion_counter(&mut session);
    let mut wall = SceneNode::new("wall");

    session.align(&mut wall, &wall_real(), &wall_model()).unwrap();

    let t0 = Instant::now();
    let mut frame = 0u64;
    loop {
        let now = t0 + Duration::from_millis(frame * 16);
        match session.advance(&mut wall, now) {
            AnimationStatus::Running { .. } => frame += 1,
            AnimationStatus::Completed => break,
            other => panic!("unexpected status {:?}", other),
        }
        assert!(frame < 1000, "animation never completed");
    }

    assert_eq!(completions.get(), 1);
    assert_eq!(session.state(), AlignmentState::Completed);
    let pose = wall.local_transform();
    for (m, r) in wall_model().iter().zip(wall_real().iter()) {
        assert!(pose.transform_point(*m).distance(r) < 1e-5);
    }
}

#[test]
fn rejected_requests_emit_no_completion() {
    let mut session = AlignmentSession::new(&AlignmentConfig::default()).unwrap();
    let completions = completion_counter(&mut session);
    let start = Transform::from_position(Point3D::new(0.0, 0.0, -2.0));
    let mut wall = SceneNode::new("wall").with_transform(start);

    let real = wall_real();
    let two = &real[..2];
    let four = [wall_real().to_vec(), vec![Point3D::ORIGIN]].concat();
    assert!(matches!(
        session.align(&mut wall, two, &wall_model()),
        Err(AlignmentError::Validation { real: 2, model: 3 })
    ));
    assert!(matches!(
        session.align(&mut wall, &wall_real(), &four),
        Err(AlignmentError::Validation { real: 3, model: 4 })
    ));

    let mut close = wall_model();
    close[1] = Point3D::new(0.00009, 0.0, 0.0);
    assert!(matches!(
        session.align(&mut wall, &wall_real(), &close),
        Err(AlignmentError::DegenerateGeometry { .. })
    ));

    let collinear = [
        Point3D::new(0.0, 0.0, 0.0),
        Point3D::new(1.0, 0.0, 0.0),
        Point3D::new(3.0, 0.0, 0.0),
    ];
    assert!(matches!(
        session.align(&mut wall, &wall_real(), &collinear),
        Err(AlignmentError::CollinearGeometry { .. })
    ));

    assert!(!session.is_animating());
    assert_eq!(
        session.advance(&mut wall, Instant::now()),
        AnimationStatus::Inactive
    );
    assert_eq!(wall.local_transform(), start);
    assert_eq!(completions.get(), 0);
}

#[test]
fn non_finite_target_pose_is_rejected() {
    let mut config = AlignmentConfig::default();
    config.animation.animate = false;
    let mut session = AlignmentSession::new(&config).unwrap();
    let completions = completion_counter(&mut session);

    let mut start = Transform::from_position(Point3D::new(0.0, 0.0, -2.0));
    start.rotation = Quaternion::new(f64::NAN, 0.0, 0.0, 1.0);
    let mut wall = SceneNode::new("wall").with_transform(start);

    assert_eq!(
        session.align(&mut wall, &wall_real(), &wall_model()),
        Err(AlignmentError::NonFiniteTargetTransform)
    );
    assert_eq!(session.state(), AlignmentState::DegenerateFailed);
    assert_eq!(wall.local_transform().position, start.position);
    assert!(wall.local_transform().rotation.x.is_nan());
    assert_eq!(completions.get(), 0);
}

/// A solver that always reports the same transform, to show sessions accept
/// any `AlignmentSolver`
struct FixedSolver(SimilarityTransform);

impl AlignmentSolver for FixedSolver {
    fn solve(
        &self,
        _real: &Triad,
        _model: &Triad,
        _target_world: &Transform,
    ) -> wallcal_core::Result<SimilarityTransform> {
        Ok(self.0)
    }
}

#[test]
fn sessions_accept_custom_solvers() {
    let fixed = SimilarityTransform::new(Vector3D::new(0.0, 5.0, 0.0), Quaternion::IDENTITY, 2.0)
        .unwrap();
    let mut config = AlignmentConfig::default();
    config.animation.animate = false;
    let mut session =
        AlignmentSession::with_solver(FixedSolver(fixed), config.animation).unwrap();
    let mut wall = SceneNode::new("wall");

    let t = session.align(&mut wall, &wall_real(), &wall_model()).unwrap();
    assert_eq!(t, fixed);
    assert_eq!(wall.local_transform(), fixed.to_transform());
}

#[test]
fn solver_trait_object_matches_free_function() {
    let solver: Box<dyn AlignmentSolver> = Box::new(ThreePointSolver::default());
    let real = Triad::new(wall_real()[0], wall_real()[1], wall_real()[2]);
    let model = Triad::new(wall_model()[0], wall_model()[1], wall_model()[2]);

    let via_trait = solver.solve(&real, &model, &Transform::identity()).unwrap();
    let direct = wallcal_core::compute_alignment(
        &real,
        &model,
        &Transform::identity(),
        &Default::default(),
    )
    .unwrap();
    assert_eq!(via_trait, direct);
}
