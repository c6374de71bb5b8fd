use derive_more::{AsMut, AsRef, Deref, DerefMut, From, Into};
use nalgebra::{Point2, Point3, Vector4};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// The tracked reference point in the head-relative coordinate frame of the display.
///
/// The unit of distance is meters. Trackers commonly report in other units
/// (see [`TrackerSample`](crate::TrackerSample)), so conversion happens before
/// a `WorldPoint` is created.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, AsMut, AsRef, Deref, DerefMut, From, Into)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct WorldPoint(pub Point3<f64>);

impl WorldPoint {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self(Point3::new(x, y, z))
    }

    /// Appends a `1.0` to create the homogeneous coordinate consumed by a projection matrix.
    pub fn homogeneous(self) -> Vector4<f64> {
        self.0.to_homogeneous()
    }
}

/// A pixel location on one eye of the display.
///
/// The origin is the bottom-left corner of the eye's viewport with `x` growing to
/// the right and `y` growing upwards, which matches the orthographic viewport used
/// when building a [`ClipProjection`](crate::ClipProjection).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, AsMut, AsRef, Deref, DerefMut, From, Into)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ScreenPoint(pub Point2<f64>);

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self(Point2::new(x, y))
    }
}
