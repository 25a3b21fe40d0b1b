//! # Table Output Module
//!
//! Writes the extracted series DataFrame to disk as Parquet or CSV, chosen
//! by the output file extension.

use crate::error::{Nc2SeriesError, Result};
use log::debug;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Writes a DataFrame to `output_path`, as Parquet for `.parquet` and CSV
/// for `.csv`. Any other extension is an error.
pub fn write_series_table(df: &DataFrame, output_path: &str) -> Result<()> {
    debug!("writing series table to: {}", output_path);
    debug!("DataFrame shape: {:?}", df.shape());
    debug!("DataFrame schema:\n{:?}", df.schema());
    debug!("First few rows:\n{}", df.head(Some(5)));

    let extension = Path::new(output_path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match extension.as_deref() {
        Some("parquet") => write_parquet(df, output_path),
        Some("csv") => write_csv(df, output_path),
        _ => Err(Nc2SeriesError::UnsupportedOutputFormat(
            output_path.to_string(),
        )),
    }
}

fn write_parquet(df: &DataFrame, output_path: &str) -> Result<()> {
    let file = File::create(output_path)?;
    let mut df_clone = df.clone();
    ParquetWriter::new(file).finish(&mut df_clone)?;
    debug!("successfully wrote parquet file: {}", output_path);
    Ok(())
}

fn write_csv(df: &DataFrame, output_path: &str) -> Result<()> {
    let file = File::create(output_path)?;
    let mut df_clone = df.clone();
    CsvWriter::new(file).finish(&mut df_clone)?;
    debug!("successfully wrote csv file: {}", output_path);
    Ok(())
}
