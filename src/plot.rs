//! # Series Plotting
//!
//! Renders the extracted time series as a PNG line chart. The x axis uses
//! calendar timestamps when the time axis has been normalized and the raw
//! numeric offsets otherwise.

use crate::error::{Nc2SeriesError, Result};
use crate::input::PlotConfig;
use crate::timeaxis::TimeAxis;
use chrono::NaiveDateTime;
use log::debug;
use plotters::coord::ranged1d::{Ranged, ValueFormatter};
use plotters::coord::types::{RangedCoordf64, RangedDateTime};
use plotters::prelude::*;
use std::ops::Range;

/// Renders the series to `config.path`.
///
/// Non-finite values (fill values mapped to NaN during extraction) are
/// dropped from the drawn line. At least two finite points spanning distinct
/// times are required.
pub fn render_series_png(
    time: &TimeAxis,
    values: &[f64],
    config: &PlotConfig,
    fallback_title: &str,
    fallback_y_label: &str,
) -> Result<()> {
    let title = config.title.as_deref().unwrap_or(fallback_title);
    let y_label = config.y_label.as_deref().unwrap_or(fallback_y_label);

    debug!(
        "rendering {}x{} series plot to {}",
        config.width, config.height, config.path
    );

    match time {
        TimeAxis::Decoded(stamps) => {
            let points = finite_points(stamps, values);
            draw_chart::<_, RangedDateTime<NaiveDateTime>>(
                config,
                title,
                y_label,
                "Time",
                &date_label,
                points,
            )
        }
        TimeAxis::Raw { offsets, .. } => {
            let points = finite_points(offsets, values);
            draw_chart::<_, RangedCoordf64>(
                config,
                title,
                y_label,
                "Time (raw offsets)",
                &offset_label,
                points,
            )
        }
    }
}

fn date_label(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m").to_string()
}

fn offset_label(offset: &f64) -> String {
    offset.to_string()
}

/// Pairs x coordinates with values, dropping non-finite values.
fn finite_points<X: Copy>(xs: &[X], values: &[f64]) -> Vec<(X, f64)> {
    xs.iter()
        .copied()
        .zip(values.iter().copied())
        .filter(|(_, v)| v.is_finite())
        .collect()
}

/// Draws the line chart for either x-axis kind.
fn draw_chart<X, C>(
    config: &PlotConfig,
    title: &str,
    y_label: &str,
    x_desc: &str,
    x_label_formatter: &dyn Fn(&X) -> String,
    points: Vec<(X, f64)>,
) -> Result<()>
where
    X: Clone + PartialOrd + 'static,
    C: Ranged<ValueType = X> + From<Range<X>> + ValueFormatter<X>,
{
    let (y_min, y_max) = value_bounds(&points.iter().map(|p| p.1).collect::<Vec<_>>())?;
    let (x_min, x_max) = match (points.first(), points.last()) {
        (Some((first, _)), Some((last, _))) if first < last => (first.clone(), last.clone()),
        _ => {
            return Err(Nc2SeriesError::Plot(
                "need at least two finite points spanning distinct times".to_string(),
            ));
        }
    };

    let root =
        BitMapBackend::new(&config.path, (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| Nc2SeriesError::Plot(e.to_string()))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(12)
        .x_label_area_size(42)
        .y_label_area_size(56)
        .build_cartesian_2d(C::from(x_min..x_max), y_min..y_max)
        .map_err(|e| Nc2SeriesError::Plot(e.to_string()))?;

    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc(y_label)
        .x_label_formatter(x_label_formatter)
        .draw()
        .map_err(|e| Nc2SeriesError::Plot(e.to_string()))?;

    chart
        .draw_series(LineSeries::new(points, &BLUE))
        .map_err(|e| Nc2SeriesError::Plot(e.to_string()))?;

    root.present()
        .map_err(|e| Nc2SeriesError::Plot(e.to_string()))?;
    Ok(())
}

/// Value-axis bounds with a small headroom margin.
fn value_bounds(values: &[f64]) -> Result<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if !min.is_finite() || !max.is_finite() {
        return Err(Nc2SeriesError::Plot(
            "series contains no finite values".to_string(),
        ));
    }
    let span = (max - min).abs().max(1e-9);
    Ok((min - 0.05 * span, max + 0.05 * span))
}
