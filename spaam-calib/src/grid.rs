use spaam_core::ScreenPoint;

/// A rectangular grid of alignment targets centered on one eye of the display.
///
/// Targets are numbered row by row, starting with the top row and going left to
/// right within a row. Pixel coordinates have their origin in the bottom-left
/// corner, so the top row has the largest `y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetGrid {
    pub width: f64,
    pub height: f64,
    pub columns: usize,
    pub rows: usize,
    pub column_spacing: f64,
    pub row_spacing: f64,
}

impl TargetGrid {
    pub fn len(&self) -> usize {
        self.columns * self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The pixel position of target `index`.
    ///
    /// A grid without columns is laid out as a single column.
    pub fn target(&self, index: usize) -> ScreenPoint {
        let columns = self.columns.max(1);
        let column = (index % columns) as f64;
        let row = (index / columns) as f64;
        let center_column = self.columns.saturating_sub(1) as f64 / 2.0;
        let center_row = self.rows.saturating_sub(1) as f64 / 2.0;
        ScreenPoint::new(
            self.width / 2.0 + (column - center_column) * self.column_spacing,
            self.height / 2.0 + (center_row - row) * self.row_spacing,
        )
    }

    pub fn targets(&self) -> impl Iterator<Item = ScreenPoint> + '_ {
        (0..self.len()).map(move |index| self.target(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CalibrationSettings;
    use approx::assert_relative_eq;

    #[test]
    fn default_grid_positions() {
        let grid = CalibrationSettings::default().grid();
        assert_eq!(grid.len(), 25);

        let xs = [96.0, 288.0, 480.0, 672.0, 864.0];
        let ys = [466.8, 368.4, 270.0, 171.6, 73.2];
        for (index, target) in grid.targets().enumerate() {
            assert_relative_eq!(target.x, xs[index % 5], epsilon = 1e-9);
            assert_relative_eq!(target.y, ys[index / 5], epsilon = 1e-9);
        }
        assert_eq!(grid.target(12), ScreenPoint::new(480.0, 270.0));
    }

    #[test]
    fn zero_columns_do_not_divide_by_zero() {
        let grid = TargetGrid {
            columns: 0,
            ..CalibrationSettings::default().grid()
        };
        assert!(grid.is_empty());
        assert_eq!(grid.target(0).x, 480.0);
    }
}
