use spaam_dlt::SolveError;
use std::{io, path::PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("unable to read calibration record {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unable to write calibration record {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unable to encode calibration record: {0}")]
    Encoding(#[from] bincode::Error),
}

#[derive(Debug, Error)]
pub enum CalibrationError {
    #[error("no eye has been selected for calibration")]
    NoEyeSelected,
    #[error(transparent)]
    Solve(#[from] SolveError),
    /// The projection was updated in memory, but could not be persisted.
    #[error(transparent)]
    Storage(#[from] StorageError),
}
