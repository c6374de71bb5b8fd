use crate::Normalization;
use core::fmt;
use spaam_core::{nalgebra::Matrix3x4, CorrespondencePair};

/// A reason a DLT solution may not be trustworthy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConditioningIssue {
    /// A world axis has (nearly) the same value in every pair.
    FlatWorldAxis { axis: usize, scale: f64 },
    /// A screen axis has (nearly) the same value in every pair.
    FlatScreenAxis { axis: usize, scale: f64 },
    /// The depth row of the denormalized solution has no view direction, relative to
    /// the size of the whole matrix. Sign and scale correction divide by this.
    VanishingViewDirection { relative_norm: f64 },
}

impl fmt::Display for ConditioningIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const AXES: [&str; 3] = ["x", "y", "z"];
        match *self {
            Self::FlatWorldAxis { axis, scale } => {
                write!(f, "world {} axis does not vary (scale {:e})", AXES[axis], scale)
            }
            Self::FlatScreenAxis { axis, scale } => {
                write!(f, "screen {} axis does not vary (scale {:e})", AXES[axis], scale)
            }
            Self::VanishingViewDirection { relative_norm } => write!(
                f,
                "view direction vanishes (relative norm {:e})",
                relative_norm
            ),
        }
    }
}

/// Checks a correspondence set and its solution for the degeneracies that make the
/// DLT produce a meaningless matrix.
///
/// This only reports. No numerical result is altered by inspecting it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conditioning {
    pub issues: Vec<ConditioningIssue>,
}

impl Conditioning {
    pub const DEFAULT_TOLERANCE: f64 = 1e-9;

    /// Inspects `pairs` and the denormalized solution before sign and scale correction.
    pub fn inspect(pairs: &[CorrespondencePair], denormalized: &Matrix3x4<f64>) -> Self {
        Self::inspect_with_tolerance(pairs, denormalized, Self::DEFAULT_TOLERANCE)
    }

    pub fn inspect_with_tolerance(
        pairs: &[CorrespondencePair],
        denormalized: &Matrix3x4<f64>,
        tolerance: f64,
    ) -> Self {
        let mut report = Self::from_normalization(&Normalization::estimate(pairs), tolerance);
        let relative_norm =
            denormalized.fixed_slice::<1, 3>(2, 0).norm() / denormalized.norm();
        if !(relative_norm > tolerance) {
            report
                .issues
                .push(ConditioningIssue::VanishingViewDirection { relative_norm });
        }
        report
    }

    /// Inspects only the spread of `pairs`, for when there is no solution to look at.
    pub fn inspect_axes(pairs: &[CorrespondencePair]) -> Self {
        Self::from_normalization(&Normalization::estimate(pairs), Self::DEFAULT_TOLERANCE)
    }

    /// Reports the world and screen axes whose scale is not above `tolerance`.
    pub fn from_normalization(normalization: &Normalization, tolerance: f64) -> Self {
        // A NaN scale or norm fails every comparison, so `!(x > tolerance)` flags it too.
        let mut issues: Vec<ConditioningIssue> = normalization
            .world_scale
            .iter()
            .enumerate()
            .filter(|&(_, &scale)| !(scale > tolerance))
            .map(|(axis, &scale)| ConditioningIssue::FlatWorldAxis { axis, scale })
            .collect();
        issues.extend(
            normalization
                .screen_scale
                .iter()
                .enumerate()
                .filter(|&(_, &scale)| !(scale > tolerance))
                .map(|(axis, &scale)| ConditioningIssue::FlatScreenAxis { axis, scale }),
        );
        Self { issues }
    }

    pub fn is_well_conditioned(&self) -> bool {
        self.issues.is_empty()
    }
}

impl fmt::Display for Conditioning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.issues.is_empty() {
            return write!(f, "well conditioned");
        }
        for (i, issue) in self.issues.iter().enumerate() {
            if i != 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", issue)?;
        }
        Ok(())
    }
}
