use approx::assert_relative_eq;
use spaam_calib::{
    CalibrationError, CalibrationSettings, CalibrationStore, Calibrator, StorageError,
    TapOutcome, TargetState,
};
use spaam_core::{
    nalgebra::{Matrix3, Matrix3x4, Vector3},
    ClipProjection, Eye, Projection3x4, ScreenPoint, TrackerSample,
};
use spaam_dlt::{build_clip_projection, ConditioningIssue};

/// A display with its center of projection at the tracker origin.
#[rustfmt::skip]
fn intrinsics() -> Matrix3<f64> {
    Matrix3::new(
        650.0,   0.0, 470.0,
          0.0, 640.0, 280.0,
          0.0,   0.0,   1.0,
    )
}

fn truth() -> Projection3x4 {
    let mut p = Matrix3x4::zeros();
    p.fixed_columns_mut::<3>(0).copy_from(&intrinsics());
    Projection3x4(p)
}

/// Where a perfectly aligned user would hold the marker for the target at `screen`,
/// in tracker centimeters.
fn aligned_sample(screen: ScreenPoint, count: usize) -> TrackerSample {
    let depth = 0.5 + 0.1 * (count % 7) as f64;
    let ray = intrinsics()
        .try_inverse()
        .unwrap()
        * Vector3::new(screen.x, screen.y, 1.0);
    TrackerSample::tracked(ray * depth * 100.0)
}

fn expected_clip(settings: &CalibrationSettings) -> ClipProjection {
    build_clip_projection(
        &truth(),
        settings.near,
        settings.far,
        &settings.viewport(),
    )
}

/// Confirms the shown target (target 0 while the grid is shown) with a tracked marker.
fn tap(calibrator: &mut Calibrator, count: usize) -> Result<TapOutcome, CalibrationError> {
    let index = match calibrator.session().unwrap().target_state() {
        TargetState::Grid => 0,
        TargetState::Target(index) => index,
    };
    let screen = calibrator.grid().target(index);
    calibrator.confirm(aligned_sample(screen, count))
}

fn calibrator_in(dir: &std::path::Path) -> Calibrator {
    let settings = CalibrationSettings::default();
    let store = CalibrationStore::from_settings(dir, &settings);
    Calibrator::new(settings, store)
}

#[test]
fn confirm_without_eye_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut calibrator = calibrator_in(dir.path());
    assert!(matches!(
        calibrator.confirm(TrackerSample::tracked(Vector3::new(0.0, 0.0, 50.0))),
        Err(CalibrationError::NoEyeSelected)
    ));
}

#[test]
fn untracked_confirmations_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let mut calibrator = calibrator_in(dir.path());
    calibrator.select_eye(Eye::Left);
    assert!(matches!(
        calibrator.confirm(TrackerSample::lost()).unwrap(),
        TapOutcome::Ignored
    ));
    let session = calibrator.session().unwrap();
    assert!(session.correspondences().is_empty());
    assert_eq!(session.target_state(), TargetState::Grid);
}

#[test]
fn solves_from_the_sixth_alignment() {
    let dir = tempfile::tempdir().unwrap();
    let mut calibrator = calibrator_in(dir.path());
    calibrator.select_eye(Eye::Left);

    for i in 0..5 {
        match tap(&mut calibrator, i).unwrap() {
            TapOutcome::NotReady {
                collected,
                required,
            } => {
                assert_eq!(collected, i + 1);
                assert_eq!(required, 6);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(calibrator.projection(Eye::Left).is_identity());
    }
    assert!(!calibrator.store().path(Eye::Left).exists());

    // Every target so far lies on the top row or the first target below it, which
    // does not pin the projection down yet. The sixth alignment still replaces it.
    match tap(&mut calibrator, 5).unwrap() {
        TapOutcome::Solved(solved) => assert_eq!(solved.collected, 6),
        other => panic!("unexpected outcome {:?}", other),
    }
    assert!(!calibrator.projection(Eye::Left).is_identity());
    assert!(calibrator.store().path(Eye::Left).exists());

    let solved = match tap(&mut calibrator, 6).unwrap() {
        TapOutcome::Solved(solved) => solved,
        other => panic!("unexpected outcome {:?}", other),
    };
    assert_eq!(solved.collected, 7);
    assert!(solved.conditioning.is_well_conditioned());
    assert!(solved.reprojection.unwrap().max < 1e-6);
    assert_relative_eq!(solved.projection.0, truth().0, epsilon = 1e-6, max_relative = 1e-6);

    let expected = expected_clip(calibrator.settings());
    assert_relative_eq!(
        calibrator.projection(Eye::Left).matrix(),
        expected.matrix(),
        epsilon = 1e-6,
        max_relative = 1e-6
    );
    assert_eq!(*calibrator.projection(Eye::Left), solved.clip);
    assert!(calibrator.projection(Eye::Right).is_identity());
    assert!(!calibrator.store().path(Eye::Right).exists());
}

#[test]
fn a_lap_visits_every_target_and_returns_to_the_grid() {
    let dir = tempfile::tempdir().unwrap();
    let mut calibrator = calibrator_in(dir.path());
    calibrator.select_eye(Eye::Right);
    assert_eq!(calibrator.current_target(), None);

    for i in 0..25 {
        tap(&mut calibrator, i).unwrap();
        if i < 24 {
            assert_eq!(calibrator.current_target(), Some(calibrator.grid().target(i + 1)));
        }
    }
    let session = calibrator.session().unwrap();
    assert_eq!(session.target_state(), TargetState::Grid);
    assert_eq!(session.correspondences().len(), 25);
    let screens: Vec<_> = session.correspondences().iter().map(|p| p.screen).collect();
    let targets: Vec<_> = calibrator.grid().targets().collect();
    assert_eq!(screens, targets);

    // The next lap keeps refining with every alignment.
    tap(&mut calibrator, 25).unwrap();
    assert_eq!(calibrator.session().unwrap().correspondences().len(), 26);
}

#[test]
fn switching_eyes_starts_over() {
    let dir = tempfile::tempdir().unwrap();
    let mut calibrator = calibrator_in(dir.path());
    calibrator.select_eye(Eye::Left);
    for i in 0..7 {
        tap(&mut calibrator, i).unwrap();
    }
    let left = *calibrator.projection(Eye::Left);

    let session = calibrator.select_eye(Eye::Right);
    assert_eq!(session.eye(), Eye::Right);
    assert!(session.correspondences().is_empty());
    assert_eq!(session.target_state(), TargetState::Grid);
    for i in 0..3 {
        tap(&mut calibrator, i).unwrap();
    }
    assert_eq!(*calibrator.projection(Eye::Left), left);
    assert!(calibrator.projection(Eye::Right).is_identity());

    // Coming back to the left eye also starts with no alignments.
    calibrator.select_eye(Eye::Left);
    assert!(calibrator.session().unwrap().correspondences().is_empty());
    assert_eq!(*calibrator.projection(Eye::Left), left);
}

#[test]
fn stored_calibration_is_loaded_at_startup() {
    let dir = tempfile::tempdir().unwrap();
    let saved = {
        let mut calibrator = calibrator_in(dir.path());
        calibrator.select_eye(Eye::Right);
        for i in 0..8 {
            tap(&mut calibrator, i).unwrap();
        }
        *calibrator.projection(Eye::Right)
    };

    let calibrator = calibrator_in(dir.path());
    let loaded = calibrator.projection(Eye::Right);
    for (a, b) in loaded.0.iter().zip(saved.0) {
        assert_eq!(a.to_bits(), b.to_bits());
    }
    assert!(calibrator.projection(Eye::Left).is_identity());
}

#[test]
fn short_record_means_identity() {
    let dir = tempfile::tempdir().unwrap();
    let settings = CalibrationSettings::default();
    std::fs::write(dir.path().join(&settings.left_record), [0x3f; 127]).unwrap();
    let calibrator = calibrator_in(dir.path());
    assert!(calibrator.projection(Eye::Left).is_identity());
}

#[test]
fn persistence_failure_keeps_the_new_projection() {
    let dir = tempfile::tempdir().unwrap();
    let mut calibrator = calibrator_in(&dir.path().join("missing"));
    calibrator.select_eye(Eye::Left);
    for i in 0..5 {
        tap(&mut calibrator, i).unwrap();
    }

    let result = tap(&mut calibrator, 5);
    assert!(matches!(
        result,
        Err(CalibrationError::Storage(StorageError::Write { .. }))
    ));
    assert_eq!(calibrator.session().unwrap().correspondences().len(), 6);
    assert!(!calibrator.projection(Eye::Left).is_identity());

    // The session keeps going after the failure.
    assert!(tap(&mut calibrator, 6).is_err());
    assert_eq!(calibrator.session().unwrap().correspondences().len(), 7);
    assert_eq!(
        calibrator.session().unwrap().target_state(),
        TargetState::Target(7)
    );
    assert_relative_eq!(
        calibrator.projection(Eye::Left).matrix(),
        expected_clip(calibrator.settings()).matrix(),
        epsilon = 1e-6,
        max_relative = 1e-6
    );
}

#[test]
fn minimum_correspondences_can_be_raised() {
    let dir = tempfile::tempdir().unwrap();
    let settings = CalibrationSettings {
        minimum_correspondences: 9,
        ..Default::default()
    };
    let store = CalibrationStore::from_settings(dir.path(), &settings);
    let mut calibrator = Calibrator::new(settings, store);
    calibrator.select_eye(Eye::Left);
    for i in 0..8 {
        assert!(matches!(
            tap(&mut calibrator, i).unwrap(),
            TapOutcome::NotReady { required: 9, .. }
        ));
    }
    assert!(matches!(
        tap(&mut calibrator, 8).unwrap(),
        TapOutcome::Solved(_)
    ));
}

#[test]
fn too_few_alignments_keep_the_stored_projection() {
    let dir = tempfile::tempdir().unwrap();
    let settings = CalibrationSettings::default();
    let stored = expected_clip(&settings);
    CalibrationStore::from_settings(dir.path(), &settings)
        .save(Eye::Left, &stored)
        .unwrap();
    let path = dir.path().join(&settings.left_record);
    let bytes = std::fs::read(&path).unwrap();

    let mut calibrator = calibrator_in(dir.path());
    calibrator.select_eye(Eye::Left);
    let bits = |p: &ClipProjection| p.0.map(f64::to_bits);
    assert_eq!(bits(calibrator.projection(Eye::Left)), bits(&stored));
    for i in 0..5 {
        assert!(matches!(
            tap(&mut calibrator, i).unwrap(),
            TapOutcome::NotReady { .. }
        ));
        assert_eq!(bits(calibrator.projection(Eye::Left)), bits(&stored));
    }
    assert_eq!(std::fs::read(&path).unwrap(), bytes);
}

#[test]
fn flat_depth_is_not_solved_and_the_session_continues() {
    let dir = tempfile::tempdir().unwrap();
    let mut calibrator = calibrator_in(dir.path());
    calibrator.select_eye(Eye::Right);

    // The marker never leaves the plane 50 cm in front of the tracker.
    let flat = |i: usize| {
        let i = i as f64;
        TrackerSample::tracked(Vector3::new(4.0 * i - 10.0, 0.5 * i * i - 6.0, 50.0))
    };
    for i in 0..5 {
        calibrator.confirm(flat(i)).unwrap();
    }
    for i in 5..8 {
        match calibrator.confirm(flat(i)).unwrap() {
            TapOutcome::Degenerate {
                collected,
                conditioning,
            } => {
                assert_eq!(collected, i + 1);
                assert!(conditioning
                    .issues
                    .contains(&ConditioningIssue::FlatWorldAxis { axis: 2, scale: 0.0 }));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }
    assert!(calibrator.projection(Eye::Right).is_identity());
    assert!(!calibrator.store().path(Eye::Right).exists());
    let session = calibrator.session().unwrap();
    assert_eq!(session.correspondences().len(), 8);
    assert_eq!(session.target_state(), TargetState::Target(8));
}

#[test]
fn zero_grid_columns_still_collect_alignments() {
    let dir = tempfile::tempdir().unwrap();
    let settings = CalibrationSettings {
        grid_columns: 0,
        ..Default::default()
    };
    let store = CalibrationStore::from_settings(dir.path(), &settings);
    let mut calibrator = Calibrator::new(settings, store);
    calibrator.select_eye(Eye::Left);
    assert_eq!(calibrator.grid().len(), 5);

    let sample = TrackerSample::tracked(Vector3::new(0.0, 0.0, 50.0));
    assert!(matches!(
        calibrator.confirm(sample).unwrap(),
        TapOutcome::NotReady { collected: 1, .. }
    ));
    let screen = calibrator.session().unwrap().correspondences().as_slice()[0].screen;
    assert_eq!(screen.x, 480.0);
    assert_relative_eq!(screen.y, 466.8, epsilon = 1e-9);
}
