use crate::TargetGrid;
use serde::{Deserialize, Serialize};
use spaam_core::{Eye, PerEye};
use spaam_dlt::Viewport;

/// The settings for a calibration session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSettings {
    /// The number of alignments to collect before the first solve.
    ///
    /// Values below six have no effect, the DLT can not solve with fewer.
    #[serde(default = "default_minimum_correspondences")]
    pub minimum_correspondences: usize,
    /// Distance to the near clip plane in meters.
    #[serde(default = "default_near")]
    pub near: f64,
    /// Distance to the far clip plane in meters.
    #[serde(default = "default_far")]
    pub far: f64,
    /// Width of one eye of the display in pixels.
    #[serde(default = "default_viewport_width")]
    pub viewport_width: f64,
    /// Height of one eye of the display in pixels.
    #[serde(default = "default_viewport_height")]
    pub viewport_height: f64,
    /// How many tracker units make a meter (100 for a tracker reporting centimeters).
    #[serde(default = "default_tracker_units_per_meter")]
    pub tracker_units_per_meter: f64,
    /// Zero is treated as one.
    #[serde(default = "default_grid_columns")]
    pub grid_columns: usize,
    /// Zero is treated as one.
    #[serde(default = "default_grid_rows")]
    pub grid_rows: usize,
    /// Horizontal distance between neighbouring targets in pixels.
    #[serde(default = "default_grid_column_spacing")]
    pub grid_column_spacing: f64,
    /// Vertical distance between neighbouring targets in pixels.
    #[serde(default = "default_grid_row_spacing")]
    pub grid_row_spacing: f64,
    /// File name of the left eye calibration record.
    #[serde(default = "default_left_record")]
    pub left_record: String,
    /// File name of the right eye calibration record.
    #[serde(default = "default_right_record")]
    pub right_record: String,
}

impl CalibrationSettings {
    pub fn viewport(&self) -> Viewport {
        Viewport::screen(self.viewport_width, self.viewport_height)
    }

    /// The target grid, with at least one row and one column.
    pub fn grid(&self) -> TargetGrid {
        TargetGrid {
            width: self.viewport_width,
            height: self.viewport_height,
            columns: self.grid_columns.max(1),
            rows: self.grid_rows.max(1),
            column_spacing: self.grid_column_spacing,
            row_spacing: self.grid_row_spacing,
        }
    }

    pub fn record_names(&self) -> PerEye<String> {
        PerEye::new(self.left_record.clone(), self.right_record.clone())
    }

    pub fn record_name(&self, eye: Eye) -> &str {
        match eye {
            Eye::Left => &self.left_record,
            Eye::Right => &self.right_record,
        }
    }
}

impl Default for CalibrationSettings {
    fn default() -> Self {
        Self {
            minimum_correspondences: default_minimum_correspondences(),
            near: default_near(),
            far: default_far(),
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
            tracker_units_per_meter: default_tracker_units_per_meter(),
            grid_columns: default_grid_columns(),
            grid_rows: default_grid_rows(),
            grid_column_spacing: default_grid_column_spacing(),
            grid_row_spacing: default_grid_row_spacing(),
            left_record: default_left_record(),
            right_record: default_right_record(),
        }
    }
}

fn default_minimum_correspondences() -> usize {
    spaam_dlt::MIN_CORRESPONDENCES
}

fn default_near() -> f64 {
    0.1
}

fn default_far() -> f64 {
    100.0
}

fn default_viewport_width() -> f64 {
    960.0
}

fn default_viewport_height() -> f64 {
    540.0
}

fn default_tracker_units_per_meter() -> f64 {
    100.0
}

fn default_grid_columns() -> usize {
    5
}

fn default_grid_rows() -> usize {
    5
}

fn default_grid_column_spacing() -> f64 {
    192.0
}

fn default_grid_row_spacing() -> f64 {
    98.4
}

fn default_left_record() -> String {
    "Left.calib".to_owned()
}

fn default_right_record() -> String {
    "Right.calib".to_owned()
}
