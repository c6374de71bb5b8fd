use crate::{
    CalibrationError, CalibrationSettings, CalibrationStore, TargetGrid, TargetSequencer,
    TargetState,
};
use log::*;
use spaam_core::{
    ClipProjection, CorrespondencePair, CorrespondenceSet, Eye, PerEye, Projection3x4,
    ScreenPoint, TrackerSample,
};
use spaam_dlt::{
    build_clip_projection, Conditioning, ReprojectionError, SolveError, SpaamDlt,
    MIN_CORRESPONDENCES,
};

/// The alignments collected for one eye since it was selected.
#[derive(Debug, Clone)]
pub struct CalibrationSession {
    eye: Eye,
    sequencer: TargetSequencer,
    correspondences: CorrespondenceSet,
}

impl CalibrationSession {
    pub fn new(eye: Eye, targets: usize) -> Self {
        Self {
            eye,
            sequencer: TargetSequencer::new(targets),
            correspondences: CorrespondenceSet::new(),
        }
    }

    pub fn eye(&self) -> Eye {
        self.eye
    }

    pub fn target_state(&self) -> TargetState {
        self.sequencer.state()
    }

    pub fn correspondences(&self) -> &CorrespondenceSet {
        &self.correspondences
    }
}

/// A successful solve after a confirmation.
#[derive(Debug, Clone)]
pub struct Solved {
    pub eye: Eye,
    /// The number of alignments the solve used.
    pub collected: usize,
    pub projection: Projection3x4,
    pub clip: ClipProjection,
    pub conditioning: Conditioning,
    pub reprojection: Option<ReprojectionError>,
}

/// What a confirmation did.
#[derive(Debug, Clone)]
pub enum TapOutcome {
    /// The marker was not tracked, so nothing happened.
    Ignored,
    /// The alignment was recorded, but there are not enough yet to solve.
    NotReady { collected: usize, required: usize },
    /// The alignment was recorded, but a world or screen axis has no spread yet.
    /// The eye's projection was left as it was.
    Degenerate {
        collected: usize,
        conditioning: Conditioning,
    },
    /// The alignment was recorded and the eye's projection replaced.
    Solved(Box<Solved>),
}

/// Drives SPAAM calibration of a stereo display.
///
/// Every confirmation with a tracked marker appends one alignment for the
/// selected eye, re-solves over all of that eye's alignments and, once there are
/// enough of them, replaces and persists the eye's projection. Switching eyes
/// discards the alignments collected so far.
#[derive(Debug)]
pub struct Calibrator {
    settings: CalibrationSettings,
    grid: TargetGrid,
    dlt: SpaamDlt,
    store: CalibrationStore,
    projections: PerEye<ClipProjection>,
    session: Option<CalibrationSession>,
}

impl Calibrator {
    /// Creates a calibrator, reading both eyes' stored projections.
    pub fn new(settings: CalibrationSettings, store: CalibrationStore) -> Self {
        let mut calibrator = Self {
            grid: settings.grid(),
            settings,
            dlt: SpaamDlt::new(),
            store,
            projections: PerEye::default(),
            session: None,
        };
        for eye in Eye::ALL {
            calibrator.reload(eye);
        }
        calibrator
    }

    pub fn settings(&self) -> &CalibrationSettings {
        &self.settings
    }

    pub fn grid(&self) -> &TargetGrid {
        &self.grid
    }

    pub fn store(&self) -> &CalibrationStore {
        &self.store
    }

    pub fn session(&self) -> Option<&CalibrationSession> {
        self.session.as_ref()
    }

    pub fn projection(&self, eye: Eye) -> &ClipProjection {
        &self.projections[eye]
    }

    pub fn projections(&self) -> &PerEye<ClipProjection> {
        &self.projections
    }

    /// Starts a fresh session for `eye` and rereads its stored projection.
    pub fn select_eye(&mut self, eye: Eye) -> &CalibrationSession {
        info!("calibrating the {} eye", eye);
        self.reload(eye);
        let targets = self.grid.len();
        self.session.insert(CalibrationSession::new(eye, targets))
    }

    /// The single target currently shown, or `None` while the whole grid is shown.
    pub fn current_target(&self) -> Option<ScreenPoint> {
        match self.session.as_ref()?.target_state() {
            TargetState::Grid => None,
            TargetState::Target(index) => Some(self.grid.target(index)),
        }
    }

    /// Handles the user confirming that the target and the marker are aligned.
    ///
    /// A storage failure is returned only after the alignment was recorded and
    /// the projection updated in memory.
    pub fn confirm(&mut self, sample: TrackerSample) -> Result<TapOutcome, CalibrationError> {
        let session = self
            .session
            .as_mut()
            .ok_or(CalibrationError::NoEyeSelected)?;
        let eye = session.eye;

        let world = match sample.world_point(self.settings.tracker_units_per_meter) {
            Some(world) => world,
            None => {
                debug!("ignoring confirmation without tracking");
                return Ok(TapOutcome::Ignored);
            }
        };
        let index = session.sequencer.target_index();
        let screen = self.grid.target(index);
        session
            .correspondences
            .push(CorrespondencePair::new(world, screen));
        session.sequencer.advance();
        let collected = session.correspondences.len();
        debug!(
            "{} eye: target {} at {:?} aligned with {:?}",
            eye, index, screen.0, world.0
        );

        let required = self.settings.minimum_correspondences.max(MIN_CORRESPONDENCES);
        if collected < required {
            info!("{} eye: {} of {} alignments", eye, collected, required);
            return Ok(TapOutcome::NotReady {
                collected,
                required,
            });
        }

        let pairs = session.correspondences.as_slice();
        let solution = match self.dlt.solve(pairs) {
            Ok(solution) => solution,
            Err(SolveError::InsufficientData { required, found }) => {
                return Ok(TapOutcome::NotReady {
                    collected: found,
                    required,
                })
            }
            Err(SolveError::Degenerate) => {
                let conditioning = Conditioning::inspect_axes(pairs);
                warn!("{} eye: not solving, {}", eye, conditioning);
                return Ok(TapOutcome::Degenerate {
                    collected,
                    conditioning,
                });
            }
            Err(e) => return Err(e.into()),
        };

        let conditioning = Conditioning::inspect(pairs, &solution.denormalized);
        if !conditioning.is_well_conditioned() {
            warn!("{} eye: {}", eye, conditioning);
        }
        let reprojection = ReprojectionError::measure(&solution.projection, pairs);
        if let Some(reprojection) = reprojection {
            info!(
                "{} eye: solved from {} alignments, reprojection error {}",
                eye, collected, reprojection
            );
        }

        let clip = build_clip_projection(
            &solution.projection,
            self.settings.near,
            self.settings.far,
            &self.settings.viewport(),
        );
        self.projections[eye] = clip;
        if let Err(e) = self.store.save(eye, &clip) {
            error!("unable to save the {} eye calibration: {}", eye, e);
            return Err(e.into());
        }

        Ok(TapOutcome::Solved(Box::new(Solved {
            eye,
            collected,
            projection: solution.projection,
            clip,
            conditioning,
            reprojection,
        })))
    }

    fn reload(&mut self, eye: Eye) {
        match self.store.load(eye) {
            Ok(Some(projection)) => {
                info!("loaded the {} eye calibration", eye);
                self.projections[eye] = projection;
            }
            Ok(None) => info!("no stored calibration for the {} eye", eye),
            Err(e) => error!("unable to load the {} eye calibration: {}", eye, e),
        }
    }
}
