//! # Job Configuration
//!
//! Configuration parsing for nc2series extraction jobs. A job file names the
//! input NetCDF file, the data variable, the geographic region box, how to
//! reduce the region to a single series, and where the outputs go.
//!
//! Job files may be JSON or YAML; the format is chosen by file extension.
//!
//! ## Example
//!
//! ```json
//! {
//!   "nc_path": "tas_day_CESM2_ssp245.nc",
//!   "variable_name": "tas",
//!   "region": { "lat_min": -15.0, "lat_max": 15.0, "lon_min": 90.0, "lon_max": 270.0 },
//!   "selection": { "kind": "point_index", "lat_index": 9, "lon_index": 124 },
//!   "table_path": "bohol_sea_tas.parquet",
//!   "plot": { "path": "bohol_sea_tas.png", "title": "TAS in the Pacific Ocean" }
//! }
//! ```

use crate::error::{Nc2SeriesError, Result};
use crate::mask::RegionBox;
use crate::postprocess::ProcessorConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn default_true() -> bool {
    true
}

/// Names of the three coordinate axes of the data variable.
///
/// CMIP output names them `time`, `lat`, `lon`; reanalysis files often use
/// `latitude`/`longitude` instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DimensionNames {
    #[serde(default = "DimensionNames::default_time")]
    pub time: String,
    #[serde(default = "DimensionNames::default_lat")]
    pub lat: String,
    #[serde(default = "DimensionNames::default_lon")]
    pub lon: String,
}

impl DimensionNames {
    fn default_time() -> String {
        "time".to_string()
    }
    fn default_lat() -> String {
        "lat".to_string()
    }
    fn default_lon() -> String {
        "lon".to_string()
    }
}

impl Default for DimensionNames {
    fn default() -> Self {
        Self {
            time: Self::default_time(),
            lat: Self::default_lat(),
            lon: Self::default_lon(),
        }
    }
}

/// Geographic bounds of the region of interest, degrees, inclusive edges.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RegionConfig {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl RegionConfig {
    /// Validates the bounds and produces the region box used for masking.
    pub fn to_region_box(&self) -> Result<RegionBox> {
        RegionBox::new(self.lat_min, self.lat_max, self.lon_min, self.lon_max)
    }
}

/// How the regional subset is reduced to a single time series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionConfig {
    /// A single cell addressed by its indices *within the subset grid*.
    PointIndex { lat_index: usize, lon_index: usize },
    /// The subset cell whose coordinates are closest to the given point.
    Nearest { lat: f64, lon: f64 },
    /// Unweighted mean over all subset cells at each time step.
    RegionMean,
}

impl SelectionConfig {
    /// String identifier for this selection kind.
    pub fn kind(&self) -> &'static str {
        match self {
            SelectionConfig::PointIndex { .. } => "point_index",
            SelectionConfig::Nearest { .. } => "nearest",
            SelectionConfig::RegionMean => "region_mean",
        }
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        SelectionConfig::RegionMean
    }
}

/// Where and how to render the series figure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlotConfig {
    /// Output PNG path
    pub path: String,
    /// Chart title; defaults to the variable name
    #[serde(default)]
    pub title: Option<String>,
    /// Axis label for the value axis; defaults to the variable's `units`
    #[serde(default)]
    pub y_label: Option<String>,
    #[serde(default = "PlotConfig::default_width")]
    pub width: u32,
    #[serde(default = "PlotConfig::default_height")]
    pub height: u32,
}

impl PlotConfig {
    fn default_width() -> u32 {
        1000
    }
    fn default_height() -> u32 {
        600
    }

    /// A plot config with default sizing and labels.
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            title: None,
            y_label: None,
            width: Self::default_width(),
            height: Self::default_height(),
        }
    }
}

/// Main configuration structure for nc2series jobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    /// Path to the input NetCDF file
    pub nc_path: String,
    /// Name of the data variable to extract
    pub variable_name: String,
    /// Coordinate axis names
    #[serde(default)]
    pub dimensions: DimensionNames,
    /// Geographic bounding box
    pub region: RegionConfig,
    /// Series reduction; defaults to the regional mean
    #[serde(default)]
    pub selection: SelectionConfig,
    /// Output table path (`.parquet` or `.csv`); omit to skip the table
    #[serde(default)]
    pub table_path: Option<String>,
    /// Plot output; omit to skip the figure
    #[serde(default)]
    pub plot: Option<PlotConfig>,
    /// Normalize the time axis to calendar timestamps before output
    #[serde(default = "default_true")]
    pub decode_times: bool,
    /// Post-processing steps applied to the series table before writing
    #[serde(default)]
    pub processors: Vec<ProcessorConfig>,
}

impl JobConfig {
    /// Loads a job configuration from a JSON or YAML file, chosen by
    /// extension (`.yaml`/`.yml` parse as YAML, anything else as JSON).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
            .unwrap_or(false);
        if is_yaml {
            Self::from_yaml(&content)
        } else {
            Self::from_json(&content)
        }
    }

    /// Parses a job configuration from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Nc2SeriesError::Config(format!("invalid JSON configuration: {}", e)))
    }

    /// Parses a job configuration from a YAML string.
    pub fn from_yaml(yaml_str: &str) -> Result<Self> {
        serde_yaml::from_str(yaml_str)
            .map_err(|e| Nc2SeriesError::Config(format!("invalid YAML configuration: {}", e)))
    }

    /// Serializes the configuration as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Nc2SeriesError::Config(format!("cannot serialize configuration: {}", e)))
    }

    /// Serializes the configuration as YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| Nc2SeriesError::Config(format!("cannot serialize configuration: {}", e)))
    }
}
