use num_traits::Float;
use spaam_core::{
    nalgebra::{Matrix3, Matrix4, SVector, Vector2, Vector3, Vector4},
    CorrespondencePair, ScreenPoint, WorldPoint,
};

/// Per-axis shift and scale that bring both halves of a correspondence set to zero
/// mean and unit standard deviation.
///
/// The statistics are population statistics, `scale = sqrt(E[(x - E[x])²])`.
/// An axis that does not vary has a scale of (nearly) zero, and nothing here
/// tries to repair that. [`SpaamDlt`](crate::SpaamDlt) refuses to solve with such
/// an axis, and [`Conditioning`](crate::Conditioning) reports which one it is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalization {
    pub world_shift: Vector3<f64>,
    pub world_scale: Vector3<f64>,
    pub screen_shift: Vector2<f64>,
    pub screen_scale: Vector2<f64>,
}

impl Normalization {
    /// Computes the statistics from scratch over every pair.
    pub fn estimate(pairs: &[CorrespondencePair]) -> Self {
        let (world_shift, world_scale) =
            shift_and_scale(pairs.iter().map(|pair| pair.world.coords));
        let (screen_shift, screen_scale) =
            shift_and_scale(pairs.iter().map(|pair| pair.screen.coords));
        Self {
            world_shift,
            world_scale,
            screen_shift,
            screen_scale,
        }
    }

    pub fn normalize_world(&self, point: WorldPoint) -> Vector3<f64> {
        (point.coords - self.world_shift).component_div(&self.world_scale)
    }

    pub fn normalize_screen(&self, point: ScreenPoint) -> Vector2<f64> {
        (point.coords - self.screen_shift).component_div(&self.screen_scale)
    }

    /// The homogeneous transform that takes a world point into the normalized frame.
    #[rustfmt::skip]
    pub fn world_matrix(&self) -> Matrix4<f64> {
        let inv = self.world_scale.map(|s| s.recip());
        let t = -self.world_shift.component_mul(&inv);
        Matrix4::new(
            inv.x,   0.0,   0.0, t.x,
              0.0, inv.y,   0.0, t.y,
              0.0,   0.0, inv.z, t.z,
              0.0,   0.0,   0.0, 1.0,
        )
    }

    /// The homogeneous transform that takes a normalized screen point back to pixels.
    #[rustfmt::skip]
    pub fn screen_matrix(&self) -> Matrix3<f64> {
        let (s, t) = (self.screen_scale, self.screen_shift);
        Matrix3::new(
            s.x, 0.0, t.x,
            0.0, s.y, t.y,
            0.0, 0.0, 1.0,
        )
    }

    /// The normalized world point with a trailing `1.0`.
    pub fn normalize_world_homogeneous(&self, point: WorldPoint) -> Vector4<f64> {
        self.normalize_world(point).push(1.0)
    }
}

fn shift_and_scale<const D: usize>(
    points: impl Iterator<Item = SVector<f64, D>> + Clone,
) -> (SVector<f64, D>, SVector<f64, D>) {
    let count = points.clone().count() as f64;
    let mean = points.clone().fold(SVector::<f64, D>::zeros(), |sum, p| sum + p) / count;
    // Deviations from the mean, so a constant axis can not round to a negative variance.
    let variance = points.fold(SVector::<f64, D>::zeros(), |sum, p| {
        let d = p - mean;
        sum + d.component_mul(&d)
    }) / count;
    (mean, variance.map(Float::sqrt))
}
