//! # Regional Subsetting and Series Extraction
//!
//! Applies a [`RegionBox`](crate::mask::RegionBox) to the coordinate axes of
//! a data variable and extracts time series from the resulting subset grid.
//!
//! Subsetting is index-based: the masks over the latitude and longitude
//! arrays yield kept-index lists, and all reads address the original file
//! through those indices. Because of that, extracting a cell from the subset
//! reads exactly the same values as addressing the corresponding cell of the
//! unsubset variable. Subsetting commutes with point extraction.

use crate::error::{Nc2SeriesError, Result};
use crate::input::DimensionNames;
use crate::mask::{self, AxisSubset, RegionBox};
use crate::timeaxis::{self, TimeAxis};
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use polars::prelude::*;

/// The regional subset of a (time, lat, lon) grid: the kept indices of both
/// horizontal axes plus the box that produced them.
#[derive(Debug, Clone)]
pub struct RegionSubset {
    pub lat: AxisSubset,
    pub lon: AxisSubset,
    pub region: RegionBox,
}

impl RegionSubset {
    /// Masks the latitude and longitude coordinate variables of `file`
    /// against `region`.
    ///
    /// Returns [`Nc2SeriesError::EmptySubset`] when no cell falls inside the
    /// box.
    pub fn build(file: &netcdf::File, dims: &DimensionNames, region: RegionBox) -> Result<Self> {
        let lat_values = mask::read_coordinate(file, &dims.lat)?;
        let lon_values = mask::read_coordinate(file, &dims.lon)?;

        let lat = AxisSubset::from_bounds(&lat_values, region.lat_min, region.lat_max);
        let lon = AxisSubset::from_bounds(&lon_values, region.lon_min, region.lon_max);

        if lat.is_empty() || lon.is_empty() {
            return Err(Nc2SeriesError::EmptySubset);
        }

        debug!(
            "region subset: {} of {} latitudes, {} of {} longitudes kept",
            lat.len(),
            lat_values.len(),
            lon.len(),
            lon_values.len()
        );
        Ok(Self { lat, lon, region })
    }

    /// The (lat, lon) shape of the subset grid.
    pub fn shape(&self) -> (usize, usize) {
        (self.lat.len(), self.lon.len())
    }

    /// The subset shape with degenerate singleton axes dropped.
    pub fn squeezed_shape(&self) -> Vec<usize> {
        [self.lat.len(), self.lon.len()]
            .into_iter()
            .filter(|&n| n > 1)
            .collect()
    }

    /// Number of grid cells inside the box.
    pub fn cell_count(&self) -> usize {
        self.lat.len() * self.lon.len()
    }

    /// Maps subset-local cell indices to indices into the original grid.
    pub fn source_indices(&self, lat_index: usize, lon_index: usize) -> Result<(usize, usize)> {
        if lat_index >= self.lat.len() || lon_index >= self.lon.len() {
            return Err(Nc2SeriesError::PointOutOfBounds {
                lat_index,
                lon_index,
                lat_len: self.lat.len(),
                lon_len: self.lon.len(),
            });
        }
        Ok((self.lat.indices[lat_index], self.lon.indices[lon_index]))
    }

    /// Finds the subset-local indices of the cell closest to (`lat`, `lon`).
    pub fn nearest_cell(&self, lat: f64, lon: f64) -> Result<(usize, usize)> {
        let lat_index =
            mask::nearest_index(&self.lat.values, lat).ok_or(Nc2SeriesError::EmptySubset)?;
        let lon_index =
            mask::nearest_index(&self.lon.values, lon).ok_or(Nc2SeriesError::EmptySubset)?;
        Ok((lat_index, lon_index))
    }
}

/// A time series pulled out of the subset, with the coordinates it belongs
/// to (absent for regional means).
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesExtraction {
    pub values: Vec<f64>,
    /// Latitude of the extracted cell, for point selections
    pub lat: Option<f64>,
    /// Longitude of the extracted cell, for point selections
    pub lon: Option<f64>,
    /// Number of grid cells contributing to each value
    pub cells: usize,
}

/// Looks up the data variable and checks that its dimensions are exactly
/// (time, lat, lon) in that order.
pub fn locate_variable<'f>(
    file: &'f netcdf::File,
    name: &str,
    dims: &DimensionNames,
) -> Result<netcdf::Variable<'f>> {
    let var = file
        .variable(name)
        .ok_or_else(|| Nc2SeriesError::VariableNotFound(name.to_string()))?;

    let found: Vec<String> = var
        .dimensions()
        .iter()
        .map(|d| d.name().to_string())
        .collect();
    let expected = [dims.time.clone(), dims.lat.clone(), dims.lon.clone()];
    if found != expected {
        return Err(Nc2SeriesError::DimensionMismatch {
            variable: name.to_string(),
            expected: expected.join(", "),
            found: found.join(", "),
        });
    }
    Ok(var)
}

/// The fill value of a variable, from `_FillValue` or `missing_value`.
fn fill_value(var: &netcdf::Variable) -> Option<f64> {
    for attr_name in ["_FillValue", "missing_value"] {
        let value = var.attribute(attr_name).and_then(|a| a.value().ok());
        let fill = match value {
            Some(netcdf::AttributeValue::Double(v)) => Some(v),
            Some(netcdf::AttributeValue::Float(v)) => Some(f64::from(v)),
            Some(netcdf::AttributeValue::Int(v)) => Some(f64::from(v)),
            Some(netcdf::AttributeValue::Short(v)) => Some(f64::from(v)),
            _ => None,
        };
        if fill.is_some() {
            return fill;
        }
    }
    None
}

fn mask_fill(values: &mut [f64], fill: Option<f64>) {
    if let Some(fv) = fill {
        for v in values.iter_mut() {
            if *v == fv {
                *v = f64::NAN;
            }
        }
    }
}

/// Reads the full time series at one cell of the *original* grid.
pub fn read_cell_series(
    file: &netcdf::File,
    var_name: &str,
    dims: &DimensionNames,
    lat_source: usize,
    lon_source: usize,
) -> Result<Vec<f64>> {
    let var = locate_variable(file, var_name, dims)?;
    let mut values = var.get_values::<f64, _>((.., lat_source, lon_source))?;
    mask_fill(&mut values, fill_value(&var));
    Ok(values)
}

/// Reads a single value of the *original* grid at (time, lat, lon) indices.
pub fn read_cell_value(
    file: &netcdf::File,
    var_name: &str,
    dims: &DimensionNames,
    time_index: usize,
    lat_source: usize,
    lon_source: usize,
) -> Result<f64> {
    let var = locate_variable(file, var_name, dims)?;
    let values = var.get_values::<f64, _>((time_index, lat_source, lon_source))?;
    let mut values = values;
    mask_fill(&mut values, fill_value(&var));
    values
        .first()
        .copied()
        .ok_or_else(|| Nc2SeriesError::VariableNotFound(var_name.to_string()))
}

/// Extracts the time series at one subset cell.
pub fn extract_point_series(
    file: &netcdf::File,
    var_name: &str,
    dims: &DimensionNames,
    subset: &RegionSubset,
    lat_index: usize,
    lon_index: usize,
) -> Result<SeriesExtraction> {
    let (lat_source, lon_source) = subset.source_indices(lat_index, lon_index)?;
    let values = read_cell_series(file, var_name, dims, lat_source, lon_source)?;

    debug!(
        "point series at subset ({}, {}) -> source ({}, {}), {} steps",
        lat_index,
        lon_index,
        lat_source,
        lon_source,
        values.len()
    );
    Ok(SeriesExtraction {
        values,
        lat: Some(subset.lat.values[lat_index]),
        lon: Some(subset.lon.values[lon_index]),
        cells: 1,
    })
}

/// Extracts the unweighted regional-mean time series over all subset cells.
///
/// Fill values (already mapped to NaN) are skipped per time step; a step
/// with no valid cell yields NaN.
pub fn extract_mean_series(
    file: &netcdf::File,
    var_name: &str,
    dims: &DimensionNames,
    subset: &RegionSubset,
) -> Result<SeriesExtraction> {
    let var = locate_variable(file, var_name, dims)?;
    let fill = fill_value(&var);
    let time_len = var
        .dimensions()
        .first()
        .map(|d| d.len())
        .unwrap_or_default();

    let mut sums = vec![0.0f64; time_len];
    let mut counts = vec![0usize; time_len];

    let progress = ProgressBar::new(subset.cell_count() as u64);
    if let Ok(style) =
        ProgressStyle::with_template("{msg} [{bar:30}] {pos}/{len} cells ({eta})")
    {
        progress.set_style(style);
    }
    progress.set_message("averaging region");

    for &lat_source in &subset.lat.indices {
        for &lon_source in &subset.lon.indices {
            let mut column = var.get_values::<f64, _>((.., lat_source, lon_source))?;
            mask_fill(&mut column, fill);
            for (t, value) in column.into_iter().enumerate() {
                if value.is_finite() {
                    sums[t] += value;
                    counts[t] += 1;
                }
            }
            progress.inc(1);
        }
    }
    progress.finish_and_clear();

    let values = sums
        .into_iter()
        .zip(counts)
        .map(|(sum, n)| if n > 0 { sum / n as f64 } else { f64::NAN })
        .collect();

    Ok(SeriesExtraction {
        values,
        lat: None,
        lon: None,
        cells: subset.cell_count(),
    })
}

/// Assembles the extracted series into a DataFrame.
///
/// The time column is a datetime column when the axis has been normalized
/// and the raw numeric offsets otherwise. Point selections carry constant
/// `lat`/`lon` columns.
pub fn series_dataframe(
    time: &TimeAxis,
    extraction: &SeriesExtraction,
    var_name: &str,
) -> Result<DataFrame> {
    let mut columns: Vec<Column> = Vec::new();

    match time {
        TimeAxis::Decoded(stamps) => {
            columns.push(Series::new("time".into(), stamps.as_slice()).into());
        }
        TimeAxis::Raw { offsets, .. } => {
            columns.push(Series::new("time".into(), offsets.as_slice()).into());
        }
    }

    if let (Some(lat), Some(lon)) = (extraction.lat, extraction.lon) {
        let n = extraction.values.len();
        columns.push(Series::new("lat".into(), vec![lat; n]).into());
        columns.push(Series::new("lon".into(), vec![lon; n]).into());
    }

    columns.push(Series::new(var_name.into(), extraction.values.clone()).into());

    Ok(DataFrame::new(columns)?)
}

/// Reads the units attribute of the data variable, for plot labeling.
pub fn variable_units(file: &netcdf::File, var_name: &str) -> Option<String> {
    let var = file.variable(var_name)?;
    timeaxis::string_attribute(&var, "units")
}
