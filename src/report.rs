//! Console run reporting for the extraction pipeline.

use crate::input::{JobConfig, SelectionConfig};
use crate::subset::RegionSubset;
use polars::prelude::DataFrame;
use std::time::Duration;

pub fn show_greeting(config_source: &str) {
    println!("=== NetCDF Regional Time-Series Extractor ===");
    println!("Job: {}", config_source);
}

pub fn config_echo(config: &JobConfig) {
    println!("\nConfiguration:");
    println!("  Input NetCDF: {}", config.nc_path);
    println!("  Variable: {}", config.variable_name);
    println!(
        "  Region box: lat [{}, {}], lon [{}, {}]",
        config.region.lat_min, config.region.lat_max, config.region.lon_min, config.region.lon_max
    );
    println!("  Selection: {}", config.selection.kind());
    if let SelectionConfig::PointIndex {
        lat_index,
        lon_index,
    } = &config.selection
    {
        println!("    Subset cell: ({}, {})", lat_index, lon_index);
    }
    if let SelectionConfig::Nearest { lat, lon } = &config.selection {
        println!("    Nearest to: ({}, {})", lat, lon);
    }
    println!("  Decode times: {}", config.decode_times);
    if let Some(table) = &config.table_path {
        println!("  Output table: {}", table);
    }
    if let Some(plot) = &config.plot {
        println!("  Output plot: {}", plot.path);
    }
    if !config.processors.is_empty() {
        println!("  Post-processors: {}", config.processors.len());
    }
}

pub fn show_subset_summary(subset: &RegionSubset) {
    println!("\nRegional subset:");
    println!(
        "  Latitudes kept: {} of {}",
        subset.lat.len(),
        subset.lat.source_len
    );
    println!(
        "  Longitudes kept: {} of {}",
        subset.lon.len(),
        subset.lon.source_len
    );
    let squeezed = subset.squeezed_shape();
    if squeezed.len() < 2 {
        // Singleton axes are dropped from the reported shape.
        println!(
            "  Subset shape (squeezed): ({})",
            squeezed
                .iter()
                .map(|n| n.to_string())
                .collect::<Vec<_>>()
                .join(" x ")
        );
    } else {
        println!(
            "  Subset shape: ({} x {})",
            subset.lat.len(),
            subset.lon.len()
        );
    }
}

pub fn show_series_summary(df: &DataFrame) {
    println!("\nExtracted series:");
    println!("  Rows: {}", df.height());
    println!(
        "  Columns: [{}]",
        df.get_column_names()
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
}

pub fn show_farewell_with_timing(elapsed: Duration) {
    println!(
        "\n=== Extraction completed successfully in {:.2}s ===",
        elapsed.as_secs_f64()
    );
}
