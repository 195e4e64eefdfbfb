//! Reader for iRIC result containers.
//!
//! iRIC solvers write their results as CGNS files, which are HDF5 files
//! following the CGNS/HDF5 node layout. This crate reads the one structured
//! zone the solvers produce:
//!
//! ```text
//! iRIC/iRICZone/
//!   GridCoordinates/CoordinateX, CoordinateY      [rows=J, cols=I]
//!   ZoneIterativeData/FlowSolutionPointers        int8 [steps, 32]
//!   FlowSolution1/ (GridLocation, Depth, ...)
//!   FlowSolution2/ ...
//! iRIC/BaseIterativeData/TimeValues               f64 [steps]
//! ```
//!
//! Every node keeps its payload in a child dataset named `" data"`.
//!
//! [`read_step_frames`] yields one [`StepFrame`](iric_common::StepFrame)
//! per step, lazily. [`resolve_case`] turns a project directory or `.ipro`
//! archive into a container path first.

pub mod case;
pub mod error;
pub mod info;
pub mod location;
pub mod native;
pub mod pointers;
pub mod reader;
pub mod time;

pub use case::{resolve_case, ResolvedCase};
pub use error::{CgnsError, CgnsResult};
pub use info::{inspect, ContainerInfo};
pub use native::silence_hdf5_errors;
pub use pointers::Probe;
pub use reader::{
    read_step_frames, read_step_frames_from_input, ReadOptions, StepFrames, StepRange, DEFAULT_ZONE_PATH,
};
