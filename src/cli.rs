//! # CLI Module
//!
//! Command-line interface for nc2series:
//! - Argument parsing with clap
//! - Configuration file loading (JSON/YAML) with CLI-over-file precedence
//! - Environment variable support with the NC2SERIES_ prefix
//! - Subcommands for extraction, file inspection, templates, and completions
//! - Region/point/rename argument parsers

use crate::error::{Nc2SeriesError, Result};
use crate::input::{
    DimensionNames, JobConfig, PlotConfig, RegionConfig, SelectionConfig,
};
use crate::postprocess::ProcessorConfig;
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::collections::HashMap;
use std::path::PathBuf;

/// Regional time-series extraction and plotting for climate-model NetCDF output
#[derive(Parser, Debug)]
#[command(name = "nc2series")]
#[command(about = "Extract and plot regional time series from NetCDF climate data")]
#[command(version)]
#[command(long_about = "
nc2series is a command-line tool for exploring climate-model NetCDF output.
It inspects file structure, normalizes CF time axes to calendar timestamps,
subsets a rectangular geographic region, and extracts a time series as a
Parquet/CSV table and a PNG figure.

EXAMPLES:
  # Inspect a file before extracting
  nc2series info tas_day_CESM2_ssp245.nc --detailed

  # Regional-mean series over the tropical Pacific, plotted
  nc2series extract tas_day_CESM2_ssp245.nc -n tas \\
    --region='-15:15:90:270' --mean \\
    --output tas_mean.parquet --plot tas_mean.png

  # Series at one subset cell, converted to Celsius
  nc2series extract tas_day_CESM2_ssp245.nc -n tas \\
    --region='-15:15:90:270' --point-index 9,124 \\
    --kelvin-to-celsius tas --output bohol_sea.csv

  # Using a job file
  nc2series extract --config tropical_pacific.json

  # Generate a starter job file
  nc2series template tropical-pacific --format yaml > job.yaml
")]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode - suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract a regional time series from a NetCDF file
    Extract {
        /// Input NetCDF file path
        #[arg(value_name = "INPUT", env = "NC2SERIES_INPUT")]
        input: Option<String>,

        /// NetCDF variable name to extract
        #[arg(short = 'n', long, env = "NC2SERIES_VARIABLE")]
        variable: Option<String>,

        /// Job configuration file (JSON or YAML)
        #[arg(short, long, env = "NC2SERIES_CONFIG")]
        config: Option<PathBuf>,

        /// Region box: lat_min:lat_max:lon_min:lon_max (inclusive degrees)
        #[arg(long, value_parser = parse_region, env = "NC2SERIES_REGION", allow_hyphen_values = true)]
        region: Option<RegionConfig>,

        /// Select the subset cell nearest to lat,lon
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true, conflicts_with_all = ["point_index", "mean"])]
        point: Option<PointArg>,

        /// Select a subset cell by local indices: lat_index,lon_index
        #[arg(long = "point-index", value_parser = parse_point_index, conflicts_with = "mean")]
        point_index: Option<PointIndexArg>,

        /// Reduce the region to its unweighted mean series (default)
        #[arg(long)]
        mean: bool,

        /// Output table path (.parquet or .csv)
        #[arg(short, long, env = "NC2SERIES_OUTPUT")]
        output: Option<String>,

        /// Output plot path (.png)
        #[arg(long)]
        plot: Option<String>,

        /// Plot title (defaults to the variable name)
        #[arg(long)]
        plot_title: Option<String>,

        /// Keep the time axis as raw numeric offsets
        #[arg(long)]
        raw_time: bool,

        /// Name of the time dimension (default: time, or the job file's value)
        #[arg(long)]
        time_dim: Option<String>,

        /// Name of the latitude dimension (default: lat, or the job file's value)
        #[arg(long)]
        lat_dim: Option<String>,

        /// Name of the longitude dimension (default: lon, or the job file's value)
        #[arg(long)]
        lon_dim: Option<String>,

        /// Convert a column from Kelvin to Celsius (can be repeated)
        #[arg(long = "kelvin-to-celsius")]
        kelvin_to_celsius: Vec<String>,

        /// Rename column: old_name:new_name (can be repeated)
        #[arg(long = "rename", value_parser = parse_rename_column)]
        rename_columns: Vec<RenameColumnArg>,

        /// Force overwrite existing output files
        #[arg(long, env = "NC2SERIES_FORCE")]
        force: bool,

        /// Dry run - validate configuration without reading data
        #[arg(long)]
        dry_run: bool,
    },

    /// Show information about a NetCDF file
    Info {
        /// NetCDF file path
        file: String,

        /// Show global attributes as well
        #[arg(long)]
        detailed: bool,

        /// Show only specific variable info
        #[arg(short = 'n', long)]
        variable: Option<String>,

        /// Output format for file information
        #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
        format: OutputFormat,
    },

    /// Generate job configuration templates
    Template {
        /// Template type to generate
        #[arg(value_enum)]
        template_type: TemplateType,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration format
        #[arg(long, value_enum, default_value_t = ConfigFormat::Json)]
        format: ConfigFormat,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON structured output
    Json,
    /// YAML structured output
    Yaml,
    /// CSV output (variables only)
    Csv,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TemplateType {
    /// Minimal regional-mean job
    Basic,
    /// The tropical-Pacific walkthrough job (CMIP6 tas)
    TropicalPacific,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON configuration format
    Json,
    /// YAML configuration format
    Yaml,
}

/// Nearest-point selection from the command line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointArg {
    pub lat: f64,
    pub lon: f64,
}

/// Subset-local cell selection from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointIndexArg {
    pub lat_index: usize,
    pub lon_index: usize,
}

/// Column rename from the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameColumnArg {
    pub old_name: String,
    pub new_name: String,
}

/// Parse a region box argument.
/// Format: lat_min:lat_max:lon_min:lon_max
fn parse_region(s: &str) -> std::result::Result<RegionConfig, String> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 4 {
        return Err("region must be in format 'lat_min:lat_max:lon_min:lon_max'".to_string());
    }

    let mut bounds = [0.0f64; 4];
    for (slot, part) in bounds.iter_mut().zip(&parts) {
        *slot = part
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("invalid region bound '{}'", part))?;
    }
    let [lat_min, lat_max, lon_min, lon_max] = bounds;

    if lat_min > lat_max {
        return Err("lat_min must not exceed lat_max".to_string());
    }
    if lon_min > lon_max {
        return Err("lon_min must not exceed lon_max".to_string());
    }

    Ok(RegionConfig {
        lat_min,
        lat_max,
        lon_min,
        lon_max,
    })
}

/// Parse a nearest-point argument.
/// Format: lat,lon
fn parse_point(s: &str) -> std::result::Result<PointArg, String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 2 {
        return Err("point must be in format 'lat,lon'".to_string());
    }
    let lat = parts[0]
        .trim()
        .parse::<f64>()
        .map_err(|_| "invalid latitude value")?;
    let lon = parts[1]
        .trim()
        .parse::<f64>()
        .map_err(|_| "invalid longitude value")?;
    Ok(PointArg { lat, lon })
}

/// Parse a subset-local cell argument.
/// Format: lat_index,lon_index
fn parse_point_index(s: &str) -> std::result::Result<PointIndexArg, String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 2 {
        return Err("point index must be in format 'lat_index,lon_index'".to_string());
    }
    let lat_index = parts[0]
        .trim()
        .parse::<usize>()
        .map_err(|_| "invalid latitude index")?;
    let lon_index = parts[1]
        .trim()
        .parse::<usize>()
        .map_err(|_| "invalid longitude index")?;
    Ok(PointIndexArg {
        lat_index,
        lon_index,
    })
}

/// Parse a column rename argument.
/// Format: old_name:new_name
fn parse_rename_column(s: &str) -> std::result::Result<RenameColumnArg, String> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 2 {
        return Err("column rename must be in format 'old_name:new_name'".to_string());
    }

    let old_name = parts[0].trim().to_string();
    let new_name = parts[1].trim().to_string();
    if old_name.is_empty() || new_name.is_empty() {
        return Err("column names cannot be empty".to_string());
    }

    Ok(RenameColumnArg { old_name, new_name })
}

/// CLI-side arguments of the `extract` subcommand, bundled for merging with
/// an optional job file.
#[derive(Debug, Clone, Default)]
pub struct ExtractArgs {
    pub input: Option<String>,
    pub variable: Option<String>,
    pub region: Option<RegionConfig>,
    pub point: Option<PointArg>,
    pub point_index: Option<PointIndexArg>,
    pub mean: bool,
    pub output: Option<String>,
    pub plot: Option<String>,
    pub plot_title: Option<String>,
    pub raw_time: bool,
    pub time_dim: Option<String>,
    pub lat_dim: Option<String>,
    pub lon_dim: Option<String>,
    pub kelvin_to_celsius: Vec<String>,
    pub rename_columns: Vec<RenameColumnArg>,
}

/// Merges an optional job file with command-line arguments into a complete
/// job configuration. CLI arguments take priority over file values.
pub fn build_job_config(base: Option<JobConfig>, args: &ExtractArgs) -> Result<JobConfig> {
    let from_file = base.is_some();
    let mut config = match base {
        Some(config) => config,
        None => JobConfig {
            nc_path: String::new(),
            variable_name: String::new(),
            dimensions: DimensionNames::default(),
            region: RegionConfig {
                lat_min: -90.0,
                lat_max: 90.0,
                lon_min: 0.0,
                lon_max: 360.0,
            },
            selection: SelectionConfig::default(),
            table_path: None,
            plot: None,
            decode_times: true,
            processors: Vec::new(),
        },
    };

    if let Some(input) = &args.input {
        config.nc_path = input.clone();
    }
    if let Some(variable) = &args.variable {
        config.variable_name = variable.clone();
    }
    if let Some(region) = &args.region {
        config.region = *region;
    } else if !from_file {
        return Err(Nc2SeriesError::Config(
            "no region box given (use --region or a job file)".to_string(),
        ));
    }

    if let Some(time_dim) = &args.time_dim {
        config.dimensions.time = time_dim.clone();
    }
    if let Some(lat_dim) = &args.lat_dim {
        config.dimensions.lat = lat_dim.clone();
    }
    if let Some(lon_dim) = &args.lon_dim {
        config.dimensions.lon = lon_dim.clone();
    }

    if let Some(point) = &args.point {
        config.selection = SelectionConfig::Nearest {
            lat: point.lat,
            lon: point.lon,
        };
    } else if let Some(point_index) = &args.point_index {
        config.selection = SelectionConfig::PointIndex {
            lat_index: point_index.lat_index,
            lon_index: point_index.lon_index,
        };
    } else if args.mean {
        config.selection = SelectionConfig::RegionMean;
    }

    if let Some(output) = &args.output {
        config.table_path = Some(output.clone());
    }
    if let Some(plot_path) = &args.plot {
        let mut plot = PlotConfig::new(plot_path);
        plot.title = args.plot_title.clone();
        config.plot = Some(plot);
    } else if let (Some(existing), Some(title)) = (&mut config.plot, &args.plot_title) {
        existing.title = Some(title.clone());
    }

    if args.raw_time {
        config.decode_times = false;
    }

    for column in &args.kelvin_to_celsius {
        config.processors.push(ProcessorConfig::UnitConvert {
            column: column.clone(),
            from_unit: "kelvin".to_string(),
            to_unit: "celsius".to_string(),
        });
    }
    if !args.rename_columns.is_empty() {
        let mappings: HashMap<String, String> = args
            .rename_columns
            .iter()
            .map(|r| (r.old_name.clone(), r.new_name.clone()))
            .collect();
        config
            .processors
            .push(ProcessorConfig::RenameColumns { mappings });
    }

    if config.nc_path.is_empty() {
        return Err(Nc2SeriesError::Config(
            "no input NetCDF file given (positional argument, NC2SERIES_INPUT, or job file)"
                .to_string(),
        ));
    }
    if config.variable_name.is_empty() {
        return Err(Nc2SeriesError::Config(
            "no variable name given (--variable, NC2SERIES_VARIABLE, or job file)".to_string(),
        ));
    }

    Ok(config)
}

/// Builds a starter job configuration for the given template type.
pub fn generate_template(template_type: TemplateType) -> JobConfig {
    match template_type {
        TemplateType::Basic => JobConfig {
            nc_path: "input.nc".to_string(),
            variable_name: "temperature".to_string(),
            dimensions: DimensionNames::default(),
            region: RegionConfig {
                lat_min: 30.0,
                lat_max: 60.0,
                lon_min: 0.0,
                lon_max: 30.0,
            },
            selection: SelectionConfig::RegionMean,
            table_path: Some("series.parquet".to_string()),
            plot: None,
            decode_times: true,
            processors: Vec::new(),
        },
        TemplateType::TropicalPacific => JobConfig {
            nc_path: "tas_day_CESM2-WACCM_ssp245_r1i1p1f1_gn_20150101-20241231.nc".to_string(),
            variable_name: "tas".to_string(),
            dimensions: DimensionNames::default(),
            region: RegionConfig {
                lat_min: -15.0,
                lat_max: 15.0,
                lon_min: 90.0,
                lon_max: 270.0,
            },
            selection: SelectionConfig::PointIndex {
                lat_index: 9,
                lon_index: 124,
            },
            table_path: Some("bohol_sea_tas.parquet".to_string()),
            plot: Some(PlotConfig {
                path: "bohol_sea_tas.png".to_string(),
                title: Some("TAS in the Pacific Ocean (CMIP6)".to_string()),
                y_label: Some("TAS (K)".to_string()),
                width: 1000,
                height: 600,
            }),
            decode_times: true,
            processors: Vec::new(),
        },
    }
}

/// Renders a template in the requested format.
pub fn render_template(template_type: TemplateType, format: ConfigFormat) -> Result<String> {
    let config = generate_template(template_type);
    match format {
        ConfigFormat::Json => config.to_json(),
        ConfigFormat::Yaml => config.to_yaml(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_region() {
        let region = parse_region("-15:15:90:270").unwrap();
        assert_eq!(region.lat_min, -15.0);
        assert_eq!(region.lat_max, 15.0);
        assert_eq!(region.lon_min, 90.0);
        assert_eq!(region.lon_max, 270.0);

        assert!(parse_region("-15:15:90").is_err());
        assert!(parse_region("-15:15:90:270:0").is_err());
        assert!(parse_region("a:15:90:270").is_err());
        assert!(parse_region("15:-15:90:270").is_err()); // inverted latitudes
        assert!(parse_region("-15:15:270:90").is_err()); // inverted longitudes
    }

    #[test]
    fn test_parse_point() {
        let point = parse_point("7.5,124.0").unwrap();
        assert_eq!(point.lat, 7.5);
        assert_eq!(point.lon, 124.0);

        assert!(parse_point("7.5").is_err());
        assert!(parse_point("7.5,124.0,1.0").is_err());
        assert!(parse_point("abc,124.0").is_err());
    }

    #[test]
    fn test_parse_point_index() {
        let point = parse_point_index("9,124").unwrap();
        assert_eq!(point.lat_index, 9);
        assert_eq!(point.lon_index, 124);

        assert!(parse_point_index("9").is_err());
        assert!(parse_point_index("-1,124").is_err());
        assert!(parse_point_index("9,12.5").is_err());
    }

    #[test]
    fn test_parse_rename_column() {
        let rename = parse_rename_column("tas:temperature").unwrap();
        assert_eq!(rename.old_name, "tas");
        assert_eq!(rename.new_name, "temperature");

        assert!(parse_rename_column("tas").is_err());
        assert!(parse_rename_column("tas:").is_err());
        assert!(parse_rename_column(":temperature").is_err());
    }

    #[test]
    fn test_build_job_config_requires_input_and_region() {
        // No job file and no region box
        assert!(build_job_config(None, &ExtractArgs::default()).is_err());

        // Region given, but still no input file or variable
        let args = ExtractArgs {
            region: Some(RegionConfig {
                lat_min: -15.0,
                lat_max: 15.0,
                lon_min: 90.0,
                lon_max: 270.0,
            }),
            ..Default::default()
        };
        assert!(build_job_config(None, &args).is_err());
    }

    #[test]
    fn test_build_job_config_from_cli_only() {
        let args = ExtractArgs {
            input: Some("data.nc".to_string()),
            variable: Some("tas".to_string()),
            region: Some(RegionConfig {
                lat_min: -15.0,
                lat_max: 15.0,
                lon_min: 90.0,
                lon_max: 270.0,
            }),
            point_index: Some(PointIndexArg {
                lat_index: 9,
                lon_index: 124,
            }),
            output: Some("out.parquet".to_string()),
            kelvin_to_celsius: vec!["tas".to_string()],
            ..Default::default()
        };

        let config = build_job_config(None, &args).unwrap();
        assert_eq!(config.nc_path, "data.nc");
        assert_eq!(config.dimensions, DimensionNames::default());
        assert_eq!(config.variable_name, "tas");
        assert_eq!(
            config.selection,
            SelectionConfig::PointIndex {
                lat_index: 9,
                lon_index: 124
            }
        );
        assert_eq!(config.table_path.as_deref(), Some("out.parquet"));
        assert_eq!(config.processors.len(), 1);
        assert!(config.decode_times);
    }

    #[test]
    fn test_build_job_config_cli_overrides_file() {
        let base = JobConfig::from_json(
            r#"{
                "nc_path": "file_from_config.nc",
                "variable_name": "tas",
                "region": { "lat_min": -15.0, "lat_max": 15.0, "lon_min": 90.0, "lon_max": 270.0 }
            }"#,
        )
        .unwrap();

        let args = ExtractArgs {
            input: Some("file_from_cli.nc".to_string()),
            raw_time: true,
            lat_dim: Some("latitude".to_string()),
            lon_dim: Some("longitude".to_string()),
            ..Default::default()
        };

        let config = build_job_config(Some(base), &args).unwrap();
        assert_eq!(config.nc_path, "file_from_cli.nc");
        assert_eq!(config.variable_name, "tas");
        assert_eq!(config.dimensions.time, "time");
        assert_eq!(config.dimensions.lat, "latitude");
        assert_eq!(config.dimensions.lon, "longitude");
        assert!(!config.decode_times);
        // File keeps its selection default when the CLI names none
        assert_eq!(config.selection, SelectionConfig::RegionMean);
    }

    #[test]
    fn test_dimension_flags_override_job_file_values() {
        let base = JobConfig::from_json(
            r#"{
                "nc_path": "era5.nc",
                "variable_name": "t2m",
                "dimensions": { "time": "time", "lat": "latitude", "lon": "longitude" },
                "region": { "lat_min": -15.0, "lat_max": 15.0, "lon_min": 90.0, "lon_max": 270.0 }
            }"#,
        )
        .unwrap();

        // Explicit flags win over the file, even when they name the defaults.
        let args = ExtractArgs {
            lat_dim: Some("lat".to_string()),
            lon_dim: Some("lon".to_string()),
            ..Default::default()
        };
        let config = build_job_config(Some(base.clone()), &args).unwrap();
        assert_eq!(config.dimensions.lat, "lat");
        assert_eq!(config.dimensions.lon, "lon");

        // Absent flags leave the file's names untouched.
        let config = build_job_config(Some(base), &ExtractArgs::default()).unwrap();
        assert_eq!(config.dimensions.lat, "latitude");
        assert_eq!(config.dimensions.lon, "longitude");
    }

    #[test]
    fn test_template_round_trip() {
        let json = render_template(TemplateType::TropicalPacific, ConfigFormat::Json).unwrap();
        let config = JobConfig::from_json(&json).unwrap();
        assert_eq!(config.variable_name, "tas");
        assert_eq!(config.region.lat_min, -15.0);
        assert_eq!(config.region.lon_max, 270.0);

        let yaml = render_template(TemplateType::Basic, ConfigFormat::Yaml).unwrap();
        let config = JobConfig::from_yaml(&yaml).unwrap();
        assert_eq!(config.selection, SelectionConfig::RegionMean);
    }
}
