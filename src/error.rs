//! # Error Types
//!
//! Centralized error type for nc2series operations. Library functions return
//! [`Result`] with [`Nc2SeriesError`]; the binary wraps these with `anyhow`
//! context at the command boundary.

use thiserror::Error;

/// Errors that can occur while inspecting, subsetting, or extracting from a
/// NetCDF file.
#[derive(Error, Debug)]
pub enum Nc2SeriesError {
    #[error("NetCDF error: {0}")]
    NetCdf(#[from] netcdf::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("DataFrame error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("variable '{0}' not found in NetCDF file")]
    VariableNotFound(String),

    #[error("coordinate variable '{0}' not found in NetCDF file")]
    CoordinateNotFound(String),

    #[error("variable '{variable}' has dimensions [{found}], expected [{expected}]")]
    DimensionMismatch {
        variable: String,
        expected: String,
        found: String,
    },

    #[error("invalid time units attribute '{0}': expected '<unit> since <reference>'")]
    InvalidTimeUnits(String),

    #[error("unsupported calendar '{0}' for timestamp normalization")]
    UnsupportedCalendar(String),

    #[error("time offset {0} is out of the representable timestamp range")]
    TimeOutOfRange(f64),

    #[error("invalid region box: {0}")]
    InvalidRegion(String),

    #[error("point index ({lat_index}, {lon_index}) is outside the subset grid ({lat_len} x {lon_len})")]
    PointOutOfBounds {
        lat_index: usize,
        lon_index: usize,
        lat_len: usize,
        lon_len: usize,
    },

    #[error("region box selected no grid cells")]
    EmptySubset,

    #[error("plot rendering failed: {0}")]
    Plot(String),

    #[error("column '{0}' not found in series table")]
    ColumnNotFound(String),

    #[error("unsupported output format for '{0}': expected .parquet or .csv")]
    UnsupportedOutputFormat(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for nc2series operations.
pub type Result<T> = std::result::Result<T, Nc2SeriesError>;
