//! Rotated region-of-interest extraction over structured grids.
//!
//! The engine turns a [`StepFrame`](iric_common::StepFrame) into co-indexed
//! X/Y/value grids, cuts out a rotated rectangle ([`Roi`]), resamples it to
//! a requested spacing while tracking which cells hold real data, and
//! expresses the result in the rectangle's own frame.
//!
//! # Example
//!
//! ```ignore
//! use roi_engine::{compute_global_value_range, Roi};
//!
//! let roi = Roi::new(120.0, 45.0, 60.0, 20.0, 30.0);
//! let (vmin, vmax) = compute_global_value_range(&source, "Depth(m)", &roi, 0.5, 0.5)?;
//! ```

pub mod error;
pub mod grid;
pub mod prepare;
pub mod range;
pub mod resample;
pub mod roi;
pub mod rotate;
pub mod spacing;

pub use error::{EngineError, Result};
pub use grid::{frame_to_grids, slice_to_bounds, RoiGrid};
pub use prepare::{prepare_rotated_grid, prepare_rotated_grid_from_grid};
pub use range::{compute_global_value_range, compute_roi_minmax};
pub use resample::{bilinear_interpolate, resample_grid, zoom};
pub use roi::{clamp_roi_to_bounds, roi_axis_bounds, roi_bounds, roi_corners, Roi};
pub use rotate::{rotate_point, rotate_xy};
pub use spacing::estimate_grid_spacing;
