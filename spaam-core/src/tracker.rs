use crate::WorldPoint;
use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// What the marker tracker reports at the moment the user confirms an alignment.
///
/// `position` is the marker center relative to the display in whatever unit the
/// tracker uses. It is only meaningful while `tracking` is `true`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct TrackerSample {
    pub tracking: bool,
    pub position: Vector3<f64>,
}

impl TrackerSample {
    pub fn tracked(position: Vector3<f64>) -> Self {
        Self {
            tracking: true,
            position,
        }
    }

    pub fn lost() -> Self {
        Self {
            tracking: false,
            position: Vector3::zeros(),
        }
    }

    /// Converts the reported position to a [`WorldPoint`] in meters.
    ///
    /// Returns `None` if the marker was not being tracked.
    pub fn world_point(&self, units_per_meter: f64) -> Option<WorldPoint> {
        self.tracking
            .then(|| WorldPoint(Point3::from(self.position / units_per_meter)))
    }
}
