//! Common types shared across the iRIC result data crates.

pub mod bounds;
pub mod frame;
pub mod grid;
pub mod location;

pub use bounds::Bounds;
pub use frame::{Column, FrameError, PointTable, StepFrame};
pub use grid::{Grid2, TraversalOrder};
pub use location::{pick_preferred_location, GridLocation, GridMode, LocationPreference};

/// Name of the child dataset that carries a CGNS node's payload.
pub const NODE_DATA: &str = " data";

/// Structural columns every point table starts with.
pub const STRUCTURAL_COLUMNS: [&str; 4] = ["I", "J", "X", "Y"];
