use spaam_core::{
    nalgebra::{Matrix4, RowVector4},
    ClipProjection, Projection3x4,
};

/// The pixel rectangle covered by one eye of the display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
}

impl Viewport {
    /// A viewport with its origin in the bottom-left corner.
    pub fn screen(width: f64, height: f64) -> Self {
        Self {
            left: 0.0,
            right: width,
            bottom: 0.0,
            top: height,
        }
    }

    /// Maps pixel coordinates and the depth range `[near, far]` onto the clip cube.
    #[rustfmt::skip]
    pub fn orthographic(&self, near: f64, far: f64) -> Matrix4<f64> {
        let Self { left, right, bottom, top } = *self;
        Matrix4::new(
            2.0 / (right - left), 0.0, 0.0, (right + left) / (left - right),
            0.0, 2.0 / (top - bottom), 0.0, (top + bottom) / (bottom - top),
            0.0, 0.0, 2.0 / (near - far), (far + near) / (near - far),
            0.0, 0.0, 0.0, 1.0,
        )
    }
}

/// Expands the pixel projection into a 4x4 projection onto the clip cube.
///
/// The depth row is copied into the `w` row, and the original depth row is
/// rewritten so that points at `near` and `far` along the view direction land on
/// the near and far clip planes. The orthographic viewport transform is then
/// applied on the left. Nothing is validated: a zero-sized viewport or
/// `near == far` produces non-finite entries.
pub fn build_clip_projection(
    projection: &Projection3x4,
    near: f64,
    far: f64,
    viewport: &Viewport,
) -> ClipProjection {
    let p = &projection.0;
    let depth_row = p.row(2).into_owned();
    let norm = projection.view_direction_norm();

    let mut adjusted_depth_row: RowVector4<f64> = depth_row * (-far - near);
    adjusted_depth_row[3] += far * near * norm;

    let mut adjusted = Matrix4::zeros();
    adjusted.fixed_rows_mut::<2>(0).copy_from(&p.fixed_rows::<2>(0));
    adjusted.row_mut(2).copy_from(&adjusted_depth_row);
    adjusted.row_mut(3).copy_from(&depth_row);

    ClipProjection::from_matrix(&(viewport.orthographic(near, far) * adjusted))
}
