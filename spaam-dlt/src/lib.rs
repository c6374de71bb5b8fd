//! Recovers the projection of a see-through display from SPAAM alignments.
//!
//! The solver is the normalized
//! [direct linear transformation](https://en.wikipedia.org/wiki/Direct_linear_transformation)
//! described by Hartley and Zisserman. Both halves of the correspondences are
//! normalized, the homogeneous `2n x 12` system is solved for its null vector with
//! an SVD, and the result is taken back to world meters and screen pixels. The
//! sign and scale of the recovered [`Projection3x4`] are then fixed so that its
//! depth row measures metric distance in front of the viewer.
//!
//! To turn the result into something a renderer can use, see [`build_clip_projection`].

mod clip;
mod conditioning;
mod normalization;
mod residuals;

pub use clip::*;
pub use conditioning::*;
pub use normalization::*;
pub use residuals::*;

use float_ord::FloatOrd;
use log::*;
use spaam_core::{
    nalgebra::{DMatrix, Matrix3x4, SVector},
    sample_consensus::Estimator,
    CorrespondencePair, Projection3x4, WorldPoint,
};
use thiserror::Error;

/// The DLT needs eleven equations for eleven degrees of freedom, and each pair gives two.
pub const MIN_CORRESPONDENCES: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SolveError {
    #[error("need at least {required} correspondences to solve, found {found}")]
    InsufficientData { required: usize, found: usize },
    /// A world or screen axis has no spread, so the pairs can not be normalized.
    #[error("a world or screen axis does not vary across the correspondences")]
    Degenerate,
    #[error("singular value decomposition did not converge")]
    Decomposition,
}

/// Builds the homogeneous linear system whose null vector is the row-major
/// projection in the normalized frame.
///
/// Each pair contributes the two rows
///
/// ```text
/// [ 0  0  0  0  -fx -fy -fz -1   ty*fx  ty*fy  ty*fz  ty ]
/// [ fx fy fz 1   0   0   0   0  -tx*fx -tx*fy -tx*fz -tx ]
/// ```
///
/// where `f` is the normalized world point and `t` the normalized screen point.
pub fn encode_dlt_system(normalization: &Normalization, pairs: &[CorrespondencePair]) -> DMatrix<f64> {
    let mut out = DMatrix::zeros(2 * pairs.len(), 12);
    for (i, pair) in pairs.iter().enumerate() {
        let from = normalization.normalize_world_homogeneous(pair.world);
        let to = normalization.normalize_screen(pair.screen);

        let mut row = SVector::<f64, 12>::zeros();
        row.fixed_rows_mut::<4>(4).copy_from(&-from);
        row.fixed_rows_mut::<4>(8).copy_from(&(to.y * from));
        out.row_mut(2 * i).copy_from(&row.transpose());

        let mut row = SVector::<f64, 12>::zeros();
        row.fixed_rows_mut::<4>(0).copy_from(&from);
        row.fixed_rows_mut::<4>(8).copy_from(&(-to.x * from));
        out.row_mut(2 * i + 1).copy_from(&row.transpose());
    }
    out
}

/// Undoes the normalization: `screen_matrix * p * world_matrix`.
pub fn denormalize(normalization: &Normalization, normalized: &Matrix3x4<f64>) -> Matrix3x4<f64> {
    normalization.screen_matrix() * normalized * normalization.world_matrix()
}

/// Scales `projection` so the view direction in its depth row has unit length and
/// flips it if `reference` would otherwise be behind the viewer.
///
/// A vanishing view direction is not treated specially here.
pub fn correct_sign_and_scale(projection: Matrix3x4<f64>, reference: WorldPoint) -> Projection3x4 {
    let projection = Projection3x4(projection);
    let mut view_direction_norm = projection.view_direction_norm();
    if projection.depth(reference) < 0.0 {
        view_direction_norm = -view_direction_norm;
    }
    Projection3x4(projection.0 / view_direction_norm)
}

/// Every intermediate of one solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DltSolution {
    pub normalization: Normalization,
    /// The null vector reshaped into a matrix, still in the normalized frame.
    pub normalized: Matrix3x4<f64>,
    /// The solution in meters and pixels before sign and scale correction.
    pub denormalized: Matrix3x4<f64>,
    pub projection: Projection3x4,
}

/// Solves the SPAAM projection with the normalized DLT.
///
/// A world or screen axis without spread is refused with [`SolveError::Degenerate`]
/// before anything is divided by it; [`Conditioning::inspect_axes`] names the axis.
/// Other degenerate inputs (coplanar world points, every point on one line) still
/// produce a matrix, just not a meaningful one. Use [`Conditioning::inspect`] to
/// find out whether a solution can be trusted.
#[derive(Copy, Clone, Debug)]
pub struct SpaamDlt {
    pub epsilon: f64,
    pub max_iterations: usize,
}

impl SpaamDlt {
    pub fn new() -> Self {
        Default::default()
    }

    /// Computes the corrected projection from the whole set of pairs.
    ///
    /// The first pair decides the sign, so it should be the earliest confirmed alignment.
    pub fn from_correspondences(
        &self,
        pairs: &[CorrespondencePair],
    ) -> Result<Projection3x4, SolveError> {
        self.solve(pairs).map(|solution| solution.projection)
    }

    /// Like [`SpaamDlt::from_correspondences`], but keeps every intermediate.
    pub fn solve(&self, pairs: &[CorrespondencePair]) -> Result<DltSolution, SolveError> {
        let reference = match pairs.first() {
            Some(first) if pairs.len() >= MIN_CORRESPONDENCES => first.world,
            _ => {
                return Err(SolveError::InsufficientData {
                    required: MIN_CORRESPONDENCES,
                    found: pairs.len(),
                })
            }
        };

        let normalization = Normalization::estimate(pairs);
        debug!("normalization: {:?}", normalization);
        let axes =
            Conditioning::from_normalization(&normalization, Conditioning::DEFAULT_TOLERANCE);
        if !axes.is_well_conditioned() {
            debug!("refusing to solve: {}", axes);
            return Err(SolveError::Degenerate);
        }

        let system = encode_dlt_system(&normalization, pairs);
        let normalized = self.solve_normalized(system)?;
        let denormalized = denormalize(&normalization, &normalized);
        let projection = correct_sign_and_scale(denormalized, reference);
        debug!("solved projection from {} pairs: {}", pairs.len(), projection.0);

        Ok(DltSolution {
            normalization,
            normalized,
            denormalized,
            projection,
        })
    }

    /// Finds the right singular vector of the smallest singular value of `system`
    /// and reshapes it row-major into a 3x4 matrix.
    pub fn solve_normalized(&self, system: DMatrix<f64>) -> Result<Matrix3x4<f64>, SolveError> {
        let svd = system
            .try_svd(true, true, self.epsilon, self.max_iterations)
            .ok_or(SolveError::Decomposition)?;
        let v_t = svd.v_t.as_ref().ok_or(SolveError::Decomposition)?;
        let (ix, _) = svd
            .singular_values
            .iter()
            .enumerate()
            .min_by_key(|&(_, &n)| FloatOrd(n))
            .ok_or(SolveError::Decomposition)?;
        trace!("smallest singular value: {}", svd.singular_values[ix]);
        Ok(Matrix3x4::from_fn(|r, c| v_t[(ix, 4 * r + c)]))
    }
}

impl Default for SpaamDlt {
    fn default() -> Self {
        Self {
            epsilon: 1e-12,
            max_iterations: 1000,
        }
    }
}

impl Estimator<CorrespondencePair> for SpaamDlt {
    type Model = Projection3x4;
    type ModelIter = Option<Projection3x4>;
    const MIN_SAMPLES: usize = MIN_CORRESPONDENCES;

    fn estimate<I>(&self, data: I) -> Self::ModelIter
    where
        I: Iterator<Item = CorrespondencePair> + Clone,
    {
        let pairs: Vec<CorrespondencePair> = data.collect();
        self.from_correspondences(&pairs).ok()
    }
}
