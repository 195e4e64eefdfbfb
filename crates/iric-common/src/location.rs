//! Grid-location tags (vertex vs. cell centre).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a solution field's values live on the structured grid.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GridLocation {
    /// Values on grid vertices (`Vertex`, `Node`, `Nodal`).
    Vertex,
    /// Values at cell centres (`CellCenter`, `Cell_Center`).
    CellCenter,
    /// Any other label, normalized.
    Other(String),
}

impl GridLocation {
    /// Parse a raw tag: uppercased, spaces and NULs stripped.
    ///
    /// Returns `None` for an empty tag.
    pub fn parse(raw: &str) -> Option<Self> {
        let norm: String = raw
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '\0')
            .collect::<String>()
            .to_uppercase();
        match norm.as_str() {
            "" => None,
            "VERTEX" | "NODE" | "NODAL" => Some(Self::Vertex),
            "CELLCENTER" | "CELL_CENTER" => Some(Self::CellCenter),
            _ => Some(Self::Other(norm)),
        }
    }

    pub fn is_vertex_family(&self) -> bool {
        matches!(self, Self::Vertex)
    }

    pub fn is_cell_family(&self) -> bool {
        matches!(self, Self::CellCenter)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Vertex => "VERTEX",
            Self::CellCenter => "CELLCENTER",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for GridLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller preference when a container offers both vertex and cell solutions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationPreference {
    /// Vertex first, then cell.
    #[default]
    Auto,
    Vertex,
    Cell,
}

impl LocationPreference {
    /// Parse from string (case-insensitive), defaulting to `Auto`.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "vertex" | "node" => Self::Vertex,
            "cell" => Self::Cell,
            _ => Self::Auto,
        }
    }
}

/// How a data source samples the grid: on nodes or on cell centres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridMode {
    #[default]
    Node,
    Cell,
}

impl GridMode {
    /// Parse from string (case-insensitive), defaulting to `Node`.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "cell" | "cellcenter" | "cell_center" => Self::Cell,
            _ => Self::Node,
        }
    }

    /// The reader preference matching this mode.
    pub fn preference(&self) -> LocationPreference {
        match self {
            Self::Node => LocationPreference::Vertex,
            Self::Cell => LocationPreference::Cell,
        }
    }
}

/// Pick the location to report when a step carries no tag of its own.
///
/// Priority: the preferred family if present, then the other family.
/// `Auto` behaves like `Vertex`. Labels outside both families are ignored.
pub fn pick_preferred_location(
    available: &[GridLocation],
    preference: LocationPreference,
) -> Option<GridLocation> {
    let has_vertex = available.iter().any(GridLocation::is_vertex_family);
    let has_cell = available.iter().any(GridLocation::is_cell_family);

    let order = match preference {
        LocationPreference::Cell => [GridLocation::CellCenter, GridLocation::Vertex],
        LocationPreference::Vertex | LocationPreference::Auto => {
            [GridLocation::Vertex, GridLocation::CellCenter]
        }
    };
    order.into_iter().find(|loc| match loc {
        GridLocation::Vertex => has_vertex,
        GridLocation::CellCenter => has_cell,
        GridLocation::Other(_) => false,
    })
}
