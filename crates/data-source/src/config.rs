//! Configuration for data sources and flat-table conversion.

use std::path::Path;

use cgns_reader::{ReadOptions, StepRange, DEFAULT_ZONE_PATH};
use iric_common::{GridMode, LocationPreference, TraversalOrder};
use iric_project::{has_extension, CONTAINER_EXT, DEFAULT_CASE_NAME};
use serde::{Deserialize, Serialize};

use crate::error::{DataSourceError, Result};

/// How a [`DataSource`](crate::DataSource) opens its input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSourceConfig {
    /// Zone group inside each container.
    pub zone_path: String,

    /// Case container looked up inside directories and archives.
    pub case_name: String,

    /// Sample on nodes or on cell centres.
    pub grid_location: GridMode,

    /// Flattening order of container grids into point tables.
    pub traversal: TraversalOrder,

    /// Explicit reader preference. `auto` follows `grid_location`.
    pub location_preference: LocationPreference,
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        Self {
            zone_path: DEFAULT_ZONE_PATH.to_string(),
            case_name: DEFAULT_CASE_NAME.to_string(),
            grid_location: GridMode::Node,
            traversal: TraversalOrder::RowMajor,
            location_preference: LocationPreference::Auto,
        }
    }
}

impl DataSourceConfig {
    /// Default configuration sampling on `grid_location`.
    pub fn with_grid_location(grid_location: GridMode) -> Self {
        Self {
            grid_location,
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("IRIC_ZONE_PATH") {
            if !val.trim().is_empty() {
                config.zone_path = val;
            }
        }

        if let Ok(val) = std::env::var("IRIC_CASE_NAME") {
            if !val.trim().is_empty() {
                config.case_name = val;
            }
        }

        if let Ok(val) = std::env::var("IRIC_GRID_LOCATION") {
            config.grid_location = GridMode::from_str(&val);
        }

        if let Ok(val) = std::env::var("IRIC_TRAVERSAL") {
            config.traversal = TraversalOrder::from_str(&val);
        }

        config
    }

    /// Parse a YAML document. Missing keys take their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| DataSourceError::config(format!("Invalid YAML: {}", e)))
    }

    /// Read and parse a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| DataSourceError::config(format!("Cannot read {:?}: {}", path, e)))?;
        Self::from_yaml_str(&contents)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validate_names(&self.zone_path, &self.case_name)
    }

    /// Reader preference used for container-backed sources.
    pub fn effective_preference(&self) -> LocationPreference {
        match self.location_preference {
            LocationPreference::Auto => self.grid_location.preference(),
            explicit => explicit,
        }
    }

    /// Reader options for `fields` under this configuration.
    pub fn read_options(&self, fields: &[String]) -> ReadOptions {
        ReadOptions {
            zone_path: self.zone_path.clone(),
            fields: Some(fields.to_vec()),
            location_preference: self.effective_preference(),
            traversal: self.traversal,
            ..ReadOptions::default()
        }
    }
}

fn validate_names(zone_path: &str, case_name: &str) -> Result<()> {
    if zone_path.trim_matches('/').trim().is_empty() {
        return Err(DataSourceError::config("zone_path must not be empty"));
    }
    if !has_extension(case_name, CONTAINER_EXT) {
        return Err(DataSourceError::config(format!(
            "case_name must name a .{} file, got '{}'",
            CONTAINER_EXT, case_name
        )));
    }
    Ok(())
}

/// Options for exporting a container to `Result_<step>.csv` tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    pub case_name: String,
    pub zone_path: String,

    /// Fields to export; `None` exports every field.
    pub fields: Option<Vec<String>>,

    /// First step (1-based, inclusive).
    pub step_from: usize,

    /// Last step (inclusive); `None` runs to the end.
    pub step_to: Option<usize>,

    /// Stride between exported steps.
    pub step_skip: usize,

    pub traversal: TraversalOrder,
    pub location_preference: LocationPreference,

    /// `false` exports coordinates only.
    pub include_solutions: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            case_name: DEFAULT_CASE_NAME.to_string(),
            zone_path: DEFAULT_ZONE_PATH.to_string(),
            fields: None,
            step_from: 1,
            step_to: None,
            step_skip: 1,
            traversal: TraversalOrder::RowMajor,
            location_preference: LocationPreference::Auto,
            include_solutions: true,
        }
    }
}

impl ConversionOptions {
    /// Parse a YAML document. Missing keys take their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| DataSourceError::config(format!("Invalid YAML: {}", e)))
    }

    /// Validate the options.
    pub fn validate(&self) -> Result<()> {
        validate_names(&self.zone_path, &self.case_name)?;
        if self.step_from == 0 {
            return Err(DataSourceError::config("step_from is 1-based and must be > 0"));
        }
        if self.step_skip == 0 {
            return Err(DataSourceError::config("step_skip must be > 0"));
        }
        if let Some(to) = self.step_to {
            if to < self.step_from {
                return Err(DataSourceError::config(format!(
                    "step_to ({}) is before step_from ({})",
                    to, self.step_from
                )));
            }
        }
        Ok(())
    }

    /// The reader options these conversion options describe.
    pub fn read_options(&self) -> ReadOptions {
        ReadOptions {
            zone_path: self.zone_path.clone(),
            fields: self.fields.clone(),
            step_range: StepRange {
                from: self.step_from,
                to: self.step_to,
                skip: self.step_skip,
            },
            location_preference: self.location_preference,
            include_solutions: self.include_solutions,
            traversal: self.traversal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DataSourceConfig::default();
        assert_eq!(config.zone_path, "iRIC/iRICZone");
        assert_eq!(config.case_name, "Case1.cgn");
        assert_eq!(config.grid_location, GridMode::Node);
        assert_eq!(config.effective_preference(), LocationPreference::Vertex);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_env() {
        std::env::set_var("IRIC_ZONE_PATH", "Base/Zone2");
        std::env::set_var("IRIC_GRID_LOCATION", "cell");
        std::env::set_var("IRIC_TRAVERSAL", "column_major");
        let config = DataSourceConfig::from_env();
        std::env::remove_var("IRIC_ZONE_PATH");
        std::env::remove_var("IRIC_GRID_LOCATION");
        std::env::remove_var("IRIC_TRAVERSAL");

        assert_eq!(config.zone_path, "Base/Zone2");
        assert_eq!(config.case_name, "Case1.cgn");
        assert_eq!(config.grid_location, GridMode::Cell);
        assert_eq!(config.traversal, TraversalOrder::ColumnMajor);
        assert_eq!(config.effective_preference(), LocationPreference::Cell);
    }

    #[test]
    fn test_from_yaml_partial() {
        let config = DataSourceConfig::from_yaml_str("grid_location: cell\nlocation_preference: vertex\n").unwrap();
        assert_eq!(config.grid_location, GridMode::Cell);
        assert_eq!(config.zone_path, "iRIC/iRICZone");
        assert_eq!(config.effective_preference(), LocationPreference::Vertex);

        assert!(matches!(
            DataSourceConfig::from_yaml_str("grid_location: [1, 2]"),
            Err(DataSourceError::Config(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_names() {
        let config = DataSourceConfig {
            zone_path: "/".into(),
            ..DataSourceConfig::default()
        };
        assert!(config.validate().is_err());

        let config = DataSourceConfig {
            case_name: "Case1.txt".into(),
            ..DataSourceConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_conversion_options() {
        let opts = ConversionOptions::from_yaml_str("step_from: 2\nstep_to: 4\nfields: [Depth]\n").unwrap();
        assert!(opts.validate().is_ok());
        let read = opts.read_options();
        assert_eq!(read.step_range.resolve(10), vec![2, 3, 4]);
        assert_eq!(read.fields, Some(vec!["Depth".to_string()]));

        let bad = ConversionOptions {
            step_skip: 0,
            ..ConversionOptions::default()
        };
        assert!(bad.validate().is_err());
        let backwards = ConversionOptions {
            step_from: 5,
            step_to: Some(2),
            ..ConversionOptions::default()
        };
        assert!(backwards.validate().is_err());
    }
}
