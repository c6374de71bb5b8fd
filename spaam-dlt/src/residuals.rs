use core::fmt;
use spaam_core::{CorrespondencePair, Projection3x4};

/// Summary of how far the targets are from where a projection puts the tracked points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReprojectionError {
    /// Mean distance in pixels.
    pub mean: f64,
    /// Largest distance in pixels.
    pub max: f64,
}

impl ReprojectionError {
    /// Returns `None` for an empty set.
    pub fn measure(projection: &Projection3x4, pairs: &[CorrespondencePair]) -> Option<Self> {
        if pairs.is_empty() {
            return None;
        }
        let (sum, max) = pairs
            .iter()
            .map(|pair| projection.reprojection_error(pair))
            .fold((0.0, 0.0f64), |(sum, max), e| (sum + e, max.max(e)));
        Some(Self {
            mean: sum / pairs.len() as f64,
            max,
        })
    }
}

impl fmt::Display for ReprojectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mean {:.3} px, max {:.3} px", self.mean, self.max)
    }
}
