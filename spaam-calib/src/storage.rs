use crate::{CalibrationSettings, StorageError};
use bincode::Options;
use log::*;
use spaam_core::{ClipProjection, Eye, PerEye};
use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// Size of a calibration record: sixteen big-endian `f64`s.
pub const RECORD_LEN: usize = 16 * core::mem::size_of::<f64>();

fn record_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_big_endian()
        .allow_trailing_bytes()
}

/// Encodes a projection as a calibration record.
pub fn encode_record(projection: &ClipProjection) -> Result<Vec<u8>, StorageError> {
    Ok(record_options().serialize(&projection.0)?)
}

/// Decodes a calibration record, returning `None` if `bytes` is too short to hold one.
///
/// Anything past the first [`RECORD_LEN`] bytes is ignored.
pub fn decode_record(bytes: &[u8]) -> Result<Option<ClipProjection>, StorageError> {
    if bytes.len() < RECORD_LEN {
        return Ok(None);
    }
    Ok(Some(ClipProjection(record_options().deserialize(bytes)?)))
}

/// The per-eye calibration records in one directory.
#[derive(Debug, Clone)]
pub struct CalibrationStore {
    directory: PathBuf,
    names: PerEye<String>,
}

impl CalibrationStore {
    pub fn new(directory: impl Into<PathBuf>, names: PerEye<String>) -> Self {
        Self {
            directory: directory.into(),
            names,
        }
    }

    pub fn from_settings(directory: impl Into<PathBuf>, settings: &CalibrationSettings) -> Self {
        Self::new(directory, settings.record_names())
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn path(&self, eye: Eye) -> PathBuf {
        self.directory.join(&self.names[eye])
    }

    /// Reads the stored projection for `eye`.
    ///
    /// A missing record, or one shorter than [`RECORD_LEN`], is not an error and
    /// gives `None`.
    pub fn load(&self, eye: Eye) -> Result<Option<ClipProjection>, StorageError> {
        let path = self.path(eye);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("no calibration record at {}", path.display());
                return Ok(None);
            }
            Err(source) => return Err(StorageError::Read { path, source }),
        };
        let projection = decode_record(&bytes)?;
        if projection.is_none() {
            warn!(
                "calibration record {} holds only {} bytes, ignoring it",
                path.display(),
                bytes.len()
            );
        }
        Ok(projection)
    }

    /// Reads the stored projection for `eye`, falling back to identity when there is none.
    pub fn load_or_identity(&self, eye: Eye) -> Result<ClipProjection, StorageError> {
        Ok(self.load(eye)?.unwrap_or_default())
    }

    /// Replaces the stored projection for `eye`.
    pub fn save(&self, eye: Eye, projection: &ClipProjection) -> Result<(), StorageError> {
        let path = self.path(eye);
        let bytes = encode_record(projection)?;
        fs::write(&path, bytes).map_err(|source| StorageError::Write { path, source })
    }
}
