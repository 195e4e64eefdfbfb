//! Unified access to iRIC results.
//!
//! [`DataSource`] hides whether an input is a single container, a
//! `Solution<N>.cgn` series or a directory of exported `Result_<N>.csv`
//! tables, and exposes step numbers, domain bounds, value fields and
//! [`StepFrame`](iric_common::StepFrame)s. The [`export`] module writes
//! frames back out as flat tables.

pub mod config;
pub mod error;
pub mod export;
pub mod flat_table;
pub mod source;

pub use config::{ConversionOptions, DataSourceConfig};
pub use error::{DataSourceError, Result};
pub use export::{convert_project, export_flat_tables, format_time, write_flat_table};
pub use flat_table::{read_flat_table, read_flat_table_header};
pub use source::{dedupe_fields, DataSource, FrameIter, FrameSource, Frames};
