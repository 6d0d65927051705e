//! DEM preprocessing
//!
//! Reads an ESRI ASCII grid and derives the D8 flow state consumed by every
//! terrain query of a session. Depression filling is not performed; prepare
//! the DEM upstream if pits matter.

use std::path::Path;

use tracing::info;

use super::flow_grid::FlowGrid;
use crate::features::terrain::domain::{GridSpec, TerrainError};

/// Parsed ESRI ASCII raster
#[derive(Debug, Clone)]
pub struct AsciiGrid {
    pub spec: GridSpec,
    pub nodata: Option<f64>,
    /// Row-major, north row first
    pub values: Vec<f64>,
}

impl AsciiGrid {
    /// Parse the text of an `.asc` file
    pub fn parse(text: &str) -> Result<Self, TerrainError> {
        let mut ncols: Option<usize> = None;
        let mut nrows: Option<usize> = None;
        let mut xll: Option<(f64, bool)> = None; // (value, is_center)
        let mut yll: Option<(f64, bool)> = None;
        let mut cellsize: Option<f64> = None;
        let mut nodata: Option<f64> = None;

        let mut tokens = text.split_whitespace().peekable();
        // Header lines are `key value` pairs until the first numeric token
        while let Some(&key) = tokens.peek() {
            if key.parse::<f64>().is_ok() {
                break;
            }
            tokens.next();
            let value = tokens
                .next()
                .ok_or_else(|| TerrainError::parse(format!("missing value for '{}'", key)))?;
            match key.to_ascii_lowercase().as_str() {
                "ncols" => ncols = Some(parse_num(key, value)?),
                "nrows" => nrows = Some(parse_num(key, value)?),
                "xllcorner" => xll = Some((parse_num(key, value)?, false)),
                "xllcenter" => xll = Some((parse_num(key, value)?, true)),
                "yllcorner" => yll = Some((parse_num(key, value)?, false)),
                "yllcenter" => yll = Some((parse_num(key, value)?, true)),
                "cellsize" => cellsize = Some(parse_num(key, value)?),
                "nodata_value" => nodata = Some(parse_num(key, value)?),
                other => {
                    return Err(TerrainError::parse(format!(
                        "unknown header key '{}'",
                        other
                    )))
                }
            }
        }

        let ncols = ncols.ok_or_else(|| TerrainError::parse("missing ncols"))?;
        let nrows = nrows.ok_or_else(|| TerrainError::parse("missing nrows"))?;
        let cellsize = cellsize.ok_or_else(|| TerrainError::parse("missing cellsize"))?;
        let (xll, x_center) = xll.ok_or_else(|| TerrainError::parse("missing xllcorner"))?;
        let (yll, y_center) = yll.ok_or_else(|| TerrainError::parse("missing yllcorner"))?;
        if cellsize <= 0.0 {
            return Err(TerrainError::parse(format!(
                "cellsize must be positive, got {}",
                cellsize
            )));
        }

        let x_min = if x_center { xll - cellsize / 2.0 } else { xll };
        let y_min = if y_center { yll - cellsize / 2.0 } else { yll };
        let spec = GridSpec::new(x_min, y_min + nrows as f64 * cellsize, cellsize, nrows, ncols);

        let values = tokens
            .map(|t| parse_num::<f64>("cell", t))
            .collect::<Result<Vec<_>, _>>()?;
        if values.len() != spec.len() {
            return Err(TerrainError::parse(format!(
                "expected {} cell values, found {}",
                spec.len(),
                values.len()
            )));
        }

        Ok(Self {
            spec,
            nodata,
            values,
        })
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self, TerrainError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }
}

fn parse_num<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, TerrainError> {
    value
        .parse()
        .map_err(|_| TerrainError::parse(format!("invalid value '{}' for '{}'", value, key)))
}

/// One-time preparation: DEM file → `(grid, flow_direction, flow_accumulation)`
pub fn preprocess_dem(path: impl AsRef<Path>) -> Result<FlowGrid, TerrainError> {
    let path = path.as_ref();
    let dem = AsciiGrid::read(path)?;
    info!(
        "Loaded DEM {} ({}x{}, cell size {})",
        path.display(),
        dem.spec.rows,
        dem.spec.cols,
        dem.spec.cell_size
    );
    FlowGrid::from_elevations(dem.spec, &dem.values, dem.nodata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::terrain::ports::TerrainService;
    use crate::shared::Point;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const DEM: &str = "ncols 3
nrows 3
xllcorner 100.0
yllcorner 200.0
cellsize 10
NODATA_value -9999
9 8 9
6 5 6
3 2 -9999
";

    #[test]
    fn test_parse_header_and_values() {
        let grid = AsciiGrid::parse(DEM).unwrap();
        assert_eq!(grid.spec, GridSpec::new(100.0, 230.0, 10.0, 3, 3));
        assert_eq!(grid.nodata, Some(-9999.0));
        assert_eq!(grid.values.len(), 9);
    }

    #[test]
    fn test_parse_center_registration() {
        let text = "ncols 1\nnrows 1\nxllcenter 5\nyllcenter 5\ncellsize 10\n1\n";
        let grid = AsciiGrid::parse(text).unwrap();
        assert_eq!(grid.spec.x_min, 0.0);
        assert_eq!(grid.spec.y_max, 10.0);
    }

    #[test]
    fn test_parse_errors() {
        assert!(AsciiGrid::parse("ncols 2\nnrows 1\nxllcorner 0\nyllcorner 0\ncellsize 1\n1\n").is_err());
        assert!(AsciiGrid::parse("nrows 1\nxllcorner 0\nyllcorner 0\ncellsize 1\n1\n").is_err());
        assert!(AsciiGrid::parse("ncols 1\nnrows 1\nbogus 3\n").is_err());
    }

    #[test]
    fn test_preprocess_dem_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(DEM.as_bytes()).unwrap();

        let flow = preprocess_dem(file.path()).unwrap();
        // Lowest valid cell: bottom middle
        let outlet = Point::new(115.0, 205.0);
        let catchment = flow.delineate_point(&outlet).unwrap();
        assert_eq!(catchment.cell_count(), 8);
        assert!(matches!(
            flow.delineate_point(&Point::new(125.0, 205.0)),
            Err(TerrainError::NoData { .. })
        ));
    }
}
