//! # Regional Masking
//!
//! Builds boolean masks over latitude and longitude coordinate arrays for a
//! rectangular geographic bounding box, and turns those masks into the index
//! lists used for data extraction.
//!
//! Membership is a pure function of the coordinate arrays and the box bounds:
//! a cell is kept when its longitude lies in `[lon_min, lon_max]` **and** its
//! latitude lies in `[lat_min, lat_max]`, both bounds inclusive. Values equal
//! to a box edge are inside the box.

use crate::error::{Nc2SeriesError, Result};
use serde::{Deserialize, Serialize};

/// A rectangular geographic bounding box in degrees.
///
/// Longitudes follow the convention of the input file (CMIP output commonly
/// uses 0..360). No wrapping is performed: a box crossing the dateline of a
/// 0..360 grid must be expressed in that grid's coordinates.
///
/// # Examples
///
/// ```rust
/// use nc2series::mask::RegionBox;
///
/// // Tropical Pacific
/// let tropics = RegionBox::new(-15.0, 15.0, 90.0, 270.0).unwrap();
/// assert!(tropics.contains(0.0, 180.0));
/// assert!(tropics.contains(15.0, 270.0)); // edges are inclusive
/// assert!(!tropics.contains(16.0, 180.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionBox {
    /// Southern edge (inclusive), degrees north
    pub lat_min: f64,
    /// Northern edge (inclusive), degrees north
    pub lat_max: f64,
    /// Western edge (inclusive), degrees east
    pub lon_min: f64,
    /// Eastern edge (inclusive), degrees east
    pub lon_max: f64,
}

impl RegionBox {
    /// Creates a region box, rejecting inverted bounds.
    pub fn new(lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64) -> Result<Self> {
        if lat_min > lat_max {
            return Err(Nc2SeriesError::InvalidRegion(format!(
                "lat_min ({}) must not exceed lat_max ({})",
                lat_min, lat_max
            )));
        }
        if lon_min > lon_max {
            return Err(Nc2SeriesError::InvalidRegion(format!(
                "lon_min ({}) must not exceed lon_max ({})",
                lon_min, lon_max
            )));
        }
        Ok(Self {
            lat_min,
            lat_max,
            lon_min,
            lon_max,
        })
    }

    /// Tests whether a (latitude, longitude) pair falls inside the box,
    /// inclusive on all four edges.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.lat_min && lat <= self.lat_max && lon >= self.lon_min && lon <= self.lon_max
    }
}

/// Builds a boolean mask over a coordinate array, true where the value lies
/// in `[min, max]` inclusive.
pub fn axis_mask(values: &[f64], min: f64, max: f64) -> Vec<bool> {
    values.iter().map(|&v| v >= min && v <= max).collect()
}

/// Converts a boolean mask into the list of kept indices.
pub fn mask_indices(mask: &[bool]) -> Vec<usize> {
    mask.iter()
        .enumerate()
        .filter(|&(_, &keep)| keep)
        .map(|(idx, _)| idx)
        .collect()
}

/// The kept indices of one coordinate axis after masking, together with the
/// coordinate values at those indices.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisSubset {
    /// Indices into the original axis, ascending
    pub indices: Vec<usize>,
    /// Coordinate values at `indices`
    pub values: Vec<f64>,
    /// Length of the original axis before masking
    pub source_len: usize,
}

impl AxisSubset {
    /// Masks an axis against `[min, max]` inclusive.
    pub fn from_bounds(values: &[f64], min: f64, max: f64) -> Self {
        let mask = axis_mask(values, min, max);
        let indices = mask_indices(&mask);
        let kept = indices.iter().map(|&i| values[i]).collect();
        Self {
            indices,
            values: kept,
            source_len: values.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Reads a 1-D coordinate variable as `f64` values.
pub fn read_coordinate(file: &netcdf::File, name: &str) -> Result<Vec<f64>> {
    let var = file
        .variable(name)
        .ok_or_else(|| Nc2SeriesError::CoordinateNotFound(name.to_string()))?;
    Ok(var.get_values::<f64, _>(..)?)
}

/// Finds the index of the coordinate value closest to `target`.
///
/// Ties resolve to the lower index. Returns `None` for an empty axis.
pub fn nearest_index(values: &[f64], target: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, &v) in values.iter().enumerate() {
        let dist = (v - target).abs();
        match best {
            Some((_, d)) if dist >= d => {}
            _ => best = Some((idx, dist)),
        }
    }
    best.map(|(idx, _)| idx)
}
