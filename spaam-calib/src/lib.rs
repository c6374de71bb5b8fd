//! Calibration sessions for SPAAM on a stereo see-through display.
//!
//! The [`Calibrator`] owns everything that persists between confirmations: the
//! [`CalibrationSettings`], the per-eye projections and the [`CalibrationStore`]
//! they are written to. Selecting an eye starts a [`CalibrationSession`] which
//! walks the user through the [`TargetGrid`] with a [`TargetSequencer`].

mod error;
mod grid;
mod sequencer;
mod session;
mod settings;
mod storage;

pub use error::*;
pub use grid::*;
pub use sequencer::*;
pub use session::*;
pub use settings::*;
pub use storage::*;
