//! Section configuration types
//!
//! One struct per component, each with serde defaults, builder setters and
//! range validation.

use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};
use super::validation::Validatable;
use crate::features::network::domain::{DirectionPolicy, ImplicitNodePolicy};

// ============================================================================
// Network construction
// ============================================================================

/// Network construction configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Snapping distance for conduit endpoints, in map units
    pub tolerance: f64,

    /// Decimal places coordinates are rounded to before snapping (0..=12)
    pub coord_decimals: u32,

    /// Reference system identifier both inputs must declare (if set)
    pub crs: Option<String>,

    /// Unmatched conduit endpoints: create implicit nodes or reject
    pub implicit_nodes: ImplicitNodePolicy,

    /// How conduit flow direction is decided
    pub direction: DirectionPolicy,

    /// Attribute holding the feature identifier in feature documents
    pub id_field: String,

    /// Attribute holding the structure type code
    pub type_field: String,

    /// Type codes of structures where flow enters the network
    pub sink_types: Vec<i64>,

    /// Type codes of structures where flow leaves the network
    pub source_types: Vec<i64>,

    /// Conduit attribute holding a recorded length (pass-through)
    pub length_field: Option<String>,

    /// Conduit attribute holding a diameter (pass-through)
    pub diameter_field: Option<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.5,
            coord_decimals: 3,
            crs: None,
            implicit_nodes: ImplicitNodePolicy::Create,
            direction: DirectionPolicy::VertexOrder,
            id_field: "OBJECTID".to_string(),
            type_field: "Type".to_string(),
            // Vermont ANR stormwater codes: catch basin, culvert inlet
            sink_types: vec![2, 8],
            // outfall, culvert outlet
            source_types: vec![5, 9],
            length_field: None,
            diameter_field: None,
        }
    }
}

impl NetworkConfig {
    /// Builder: Set tolerance
    pub fn tolerance(mut self, v: f64) -> Self {
        self.tolerance = v;
        self
    }

    /// Builder: Set coord_decimals
    pub fn coord_decimals(mut self, v: u32) -> Self {
        self.coord_decimals = v;
        self
    }

    /// Builder: Set crs
    pub fn crs(mut self, v: impl Into<String>) -> Self {
        self.crs = Some(v.into());
        self
    }

    /// Builder: Set implicit_nodes
    pub fn implicit_nodes(mut self, v: ImplicitNodePolicy) -> Self {
        self.implicit_nodes = v;
        self
    }

    /// Builder: Set direction
    pub fn direction(mut self, v: DirectionPolicy) -> Self {
        self.direction = v;
        self
    }

    /// Builder: Set sink_types
    pub fn sink_types(mut self, v: Vec<i64>) -> Self {
        self.sink_types = v;
        self
    }

    /// Builder: Set source_types
    pub fn source_types(mut self, v: Vec<i64>) -> Self {
        self.source_types = v;
        self
    }
}

impl Validatable for NetworkConfig {
    fn validate(&self) -> ConfigResult<()> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ConfigError::range_with_hint(
                "network.tolerance",
                self.tolerance,
                0,
                "inf",
                "Snapping tolerance must be a non-negative distance",
            ));
        }

        if self.coord_decimals > 12 {
            return Err(ConfigError::range_with_hint(
                "network.coord_decimals",
                self.coord_decimals,
                0,
                12,
                "Rounding beyond 12 decimals exceeds f64 precision for projected coordinates",
            ));
        }

        if let Some(code) = self
            .sink_types
            .iter()
            .find(|code| self.source_types.contains(code))
        {
            return Err(ConfigError::conflict(
                format!("type code {} is listed as both sink and source", code),
                "remove it from either network.sink_types or network.source_types",
            ));
        }

        if self.id_field.is_empty() || self.type_field.is_empty() {
            return Err(ConfigError::Validation(
                "network.id_field and network.type_field must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "network"
    }
}

// ============================================================================
// Terrain
// ============================================================================

/// Terrain service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Snap pour points to the highest-accumulation cell within this many cells (0..=64)
    pub snap_radius_cells: usize,

    /// Memoise terrain catchments per outlet cell
    pub cache: bool,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            snap_radius_cells: 0,
            cache: true,
        }
    }
}

impl TerrainConfig {
    /// Builder: Set snap_radius_cells
    pub fn snap_radius_cells(mut self, v: usize) -> Self {
        self.snap_radius_cells = v;
        self
    }

    /// Builder: Set cache
    pub fn cache(mut self, v: bool) -> Self {
        self.cache = v;
        self
    }
}

impl Validatable for TerrainConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.snap_radius_cells > 64 {
            return Err(ConfigError::range_with_hint(
                "terrain.snap_radius_cells",
                self.snap_radius_cells,
                0,
                64,
                "Large snap windows move pour points into unrelated streams",
            ));
        }
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "terrain"
    }
}

// ============================================================================
// Delineation engine
// ============================================================================

/// Delineation engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelineationConfig {
    /// Distance within which a structure coincides with the pour point
    ///
    /// `None` uses the network snapping tolerance.
    pub pour_point_tolerance: Option<f64>,

    /// Recursion depth guard (`None` = node count + 1)
    pub max_depth: Option<usize>,

    /// Run batch requests on the rayon pool
    pub parallel: bool,
}

impl Default for DelineationConfig {
    fn default() -> Self {
        Self {
            pour_point_tolerance: None,
            max_depth: None,
            parallel: true,
        }
    }
}

impl DelineationConfig {
    /// Builder: Set pour_point_tolerance
    pub fn pour_point_tolerance(mut self, v: f64) -> Self {
        self.pour_point_tolerance = Some(v);
        self
    }

    /// Builder: Set max_depth
    pub fn max_depth(mut self, v: usize) -> Self {
        self.max_depth = Some(v);
        self
    }

    /// Builder: Set parallel
    pub fn parallel(mut self, v: bool) -> Self {
        self.parallel = v;
        self
    }
}

impl Validatable for DelineationConfig {
    fn validate(&self) -> ConfigResult<()> {
        if let Some(tol) = self.pour_point_tolerance {
            if !tol.is_finite() || tol < 0.0 {
                return Err(ConfigError::range_with_hint(
                    "delineation.pour_point_tolerance",
                    tol,
                    0,
                    "inf",
                    "Pour point tolerance must be a non-negative distance",
                ));
            }
        }

        if self.max_depth == Some(0) {
            return Err(ConfigError::range_with_hint(
                "delineation.max_depth",
                0,
                1,
                "node count",
                "Depth 0 would forbid even the top-level request",
            ));
        }

        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "delineation"
    }
}
