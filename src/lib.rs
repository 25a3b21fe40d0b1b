//! # nc2series
//!
//! A Rust library for extracting regional time series from climate-model
//! output stored in NetCDF format.
//!
//! The pipeline mirrors the steps of a typical exploratory session with a
//! CMIP6 file: open the file, inspect its dimensions and variables, convert
//! the CF-encoded time axis into calendar timestamps, mask a rectangular
//! geographic region over the latitude/longitude axes, pull out a time
//! series (a single grid cell or the regional mean), and finally write the
//! series as a table and a plotted figure.
//!
//! ## Features
//!
//! - **Structure inspection**: dimensions, variables, attributes in human,
//!   JSON, YAML, or CSV form
//! - **Time normalization**: CF `units`/`calendar` decoding (standard and
//!   noleap calendars) into `chrono` timestamps, idempotent by construction
//! - **Regional subsetting**: inclusive bounding-box masks over the
//!   coordinate axes with index-based extraction
//! - **Series output**: Polars DataFrames written to Parquet or CSV, plus a
//!   PNG line chart
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nc2series::{input::JobConfig, run_series_job};
//!
//! let config = JobConfig::from_file("tropical_pacific.json")?;
//! let series = run_series_job(&config)?;
//! println!("{}", series.head(Some(5)));
//! # Ok::<(), nc2series::error::Nc2SeriesError>(())
//! ```

pub mod cli;
pub mod error;
pub mod info;
pub mod input;
pub mod mask;
pub mod output;
pub mod plot;
pub mod postprocess;
pub mod report;
pub mod subset;
pub mod timeaxis;


use crate::error::Result;
use crate::input::{JobConfig, SelectionConfig};
use crate::postprocess::ProcessingPipeline;
use crate::subset::RegionSubset;
use crate::timeaxis::TimeAxis;
use log::{debug, info};
use polars::prelude::DataFrame;

pub use crate::error::Nc2SeriesError;

/// Runs a complete extraction job and returns the final series table.
///
/// Steps, in order:
/// 1. Open the NetCDF file
/// 2. Build the regional subset from the latitude/longitude coordinates
/// 3. Read the time axis and normalize it to timestamps (unless disabled)
/// 4. Extract the configured series from the subset
/// 5. Apply the post-processing pipeline
/// 6. Write the table and render the plot, as configured
/// 7. Close the file
///
/// The file handle is released only after every read has completed; no step
/// operates on data behind a closed handle.
pub fn run_series_job(config: &JobConfig) -> Result<DataFrame> {
    info!("opening NetCDF file: {}", config.nc_path);
    let file = netcdf::open(&config.nc_path)?;

    let region = config.region.to_region_box()?;
    let subset = RegionSubset::build(&file, &config.dimensions, region)?;
    report::show_subset_summary(&subset);

    let mut time = TimeAxis::from_file(&file, &config.dimensions.time)?;
    if config.decode_times {
        time = time.normalize()?;
    } else {
        debug!("time decoding disabled, keeping raw offsets");
    }

    let extraction = match &config.selection {
        SelectionConfig::PointIndex {
            lat_index,
            lon_index,
        } => subset::extract_point_series(
            &file,
            &config.variable_name,
            &config.dimensions,
            &subset,
            *lat_index,
            *lon_index,
        )?,
        SelectionConfig::Nearest { lat, lon } => {
            let (lat_index, lon_index) = subset.nearest_cell(*lat, *lon)?;
            debug!(
                "nearest cell to ({}, {}) is subset ({}, {})",
                lat, lon, lat_index, lon_index
            );
            subset::extract_point_series(
                &file,
                &config.variable_name,
                &config.dimensions,
                &subset,
                lat_index,
                lon_index,
            )?
        }
        SelectionConfig::RegionMean => subset::extract_mean_series(
            &file,
            &config.variable_name,
            &config.dimensions,
            &subset,
        )?,
    };

    let file_units = subset::variable_units(&file, &config.variable_name);
    let units = series_units(config, file_units);

    let df = subset::series_dataframe(&time, &extraction, &config.variable_name)?;
    let pipeline = ProcessingPipeline::from_configs(&config.processors)?;
    let df = pipeline.execute(df)?;
    report::show_series_summary(&df);

    if let Some(table_path) = &config.table_path {
        output::write_series_table(&df, table_path)?;
        info!("wrote series table: {}", table_path);
    }

    if let Some(plot_config) = &config.plot {
        let plot_values = final_series_values(&df)?;
        plot::render_series_png(
            &time,
            &plot_values,
            plot_config,
            &config.variable_name,
            units.as_deref().unwrap_or(""),
        )?;
        info!("wrote series plot: {}", plot_config.path);
    }

    // All reads are done; only now is it safe to release the handle.
    file.close()?;

    Ok(df)
}

/// The units of the value column after the processing pipeline has run.
///
/// Follows the value column through renames and picks up the target unit of
/// any conversion applied to it, so the plot label agrees with the plotted
/// values.
fn series_units(config: &JobConfig, file_units: Option<String>) -> Option<String> {
    let mut units = file_units;
    let mut column = config.variable_name.clone();
    for processor in &config.processors {
        match processor {
            postprocess::ProcessorConfig::RenameColumns { mappings } => {
                if let Some(new_name) = mappings.get(&column) {
                    column = new_name.clone();
                }
            }
            postprocess::ProcessorConfig::UnitConvert {
                column: converted,
                to_unit,
                ..
            } if *converted == column => {
                units = Some(to_unit.clone());
            }
            postprocess::ProcessorConfig::UnitConvert { .. } => {}
        }
    }
    units
}

/// Pulls the value column (the last column) back out of the processed table,
/// so the plot reflects any unit conversions.
fn final_series_values(df: &DataFrame) -> Result<Vec<f64>> {
    let column = df
        .get_columns()
        .last()
        .ok_or_else(|| Nc2SeriesError::ColumnNotFound("<series values>".to_string()))?;
    let values = column
        .as_materialized_series()
        .cast(&polars::prelude::DataType::Float64)?;
    Ok(values
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect())
}
