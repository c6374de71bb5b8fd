use crate::{CorrespondencePair, ScreenPoint, WorldPoint};
use derive_more::{AsMut, AsRef, Deref, DerefMut, From, Into};
use nalgebra::{Matrix3x4, Matrix4, Point2, Point3, Vector3, Vector4};
use sample_consensus::Model;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Maps a [`WorldPoint`] in homogeneous coordinates to a homogeneous screen pixel.
///
/// The third row is the depth row. After sign and scale correction its first three
/// entries form a unit view direction, so evaluating it on a point gives the
/// signed distance of that point along the viewing axis.
#[derive(Debug, Clone, Copy, PartialEq, AsMut, AsRef, Deref, DerefMut, From, Into)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Projection3x4(pub Matrix3x4<f64>);

impl Projection3x4 {
    /// Evaluates the depth row on `point`.
    pub fn depth(&self, point: WorldPoint) -> f64 {
        self.0.row(2).transpose().dot(&point.homogeneous())
    }

    /// Length of the first three entries of the depth row.
    pub fn view_direction_norm(&self) -> f64 {
        self.view_direction().norm()
    }

    pub fn view_direction(&self) -> Vector3<f64> {
        self.0.fixed_slice::<1, 3>(2, 0).transpose()
    }

    /// Projects `point` to a pixel.
    ///
    /// Returns `None` when the point lies on the plane through the center of
    /// projection, where it has no image.
    pub fn project(&self, point: WorldPoint) -> Option<ScreenPoint> {
        let image = self.0 * point.homogeneous();
        if image.z == 0.0 {
            return None;
        }
        Some(ScreenPoint(Point2::new(image.x / image.z, image.y / image.z)))
    }

    /// Distance in pixels between the projection of the world point and the screen point.
    pub fn reprojection_error(&self, pair: &CorrespondencePair) -> f64 {
        self.project(pair.world)
            .map(|projected| (projected.0 - pair.screen.0).norm())
            .unwrap_or(f64::INFINITY)
    }
}

impl Model<CorrespondencePair> for Projection3x4 {
    fn residual(&self, data: &CorrespondencePair) -> f64 {
        self.reprojection_error(data)
    }
}

/// A 4x4 clip space projection in column-major order, ready to upload to a renderer.
///
/// This is also the exact layout of the persisted calibration record.
#[derive(Debug, Clone, Copy, PartialEq, AsMut, AsRef, Deref, DerefMut, From, Into)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ClipProjection(pub [f64; 16]);

impl ClipProjection {
    pub fn identity() -> Self {
        Self::from_matrix(&Matrix4::identity())
    }

    pub fn from_matrix(matrix: &Matrix4<f64>) -> Self {
        let mut array = [0.0; 16];
        array.copy_from_slice(matrix.as_slice());
        Self(array)
    }

    pub fn matrix(&self) -> Matrix4<f64> {
        Matrix4::from_column_slice(&self.0)
    }

    /// Transforms a world point into homogeneous clip coordinates.
    pub fn transform(&self, point: WorldPoint) -> Vector4<f64> {
        self.matrix() * point.homogeneous()
    }

    /// Transforms a world point into normalized device coordinates.
    pub fn to_ndc(&self, point: WorldPoint) -> Option<Point3<f64>> {
        Point3::from_homogeneous(self.transform(point))
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }
}

impl Default for ClipProjection {
    fn default() -> Self {
        Self::identity()
    }
}
