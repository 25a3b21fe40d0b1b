//! # Post-Processing Framework
//!
//! Transformations applied to the extracted series DataFrame before it is
//! written or plotted. Processors implement a common trait and chain into a
//! pipeline; the steps can be declared in the job configuration.
//!
//! ## Built-in processors
//! - [`ColumnRenamer`]: rename columns with a mapping
//! - [`UnitConverter`]: convert between units; Kelvin to Celsius is the
//!   motivating case for near-surface air temperature

use crate::error::{Nc2SeriesError, Result};
use log::{debug, warn};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Core trait for post-processing operations on the series DataFrame.
pub trait SeriesProcessor: Send + Sync {
    /// Process the DataFrame and return the transformed result
    fn process(&self, df: DataFrame) -> Result<DataFrame>;

    /// Get the name/identifier of this processor
    fn name(&self) -> &str;

    /// Get a description of what this processor does
    fn description(&self) -> &str;
}

/// Configuration for post-processing steps
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProcessorConfig {
    /// Rename columns using a mapping
    RenameColumns { mappings: HashMap<String, String> },
    /// Convert between units
    UnitConvert {
        column: String,
        from_unit: String,
        to_unit: String,
    },
}

/// Pipeline that chains multiple processors together
pub struct ProcessingPipeline {
    processors: Vec<Box<dyn SeriesProcessor>>,
}

impl ProcessingPipeline {
    /// Create a new empty processing pipeline
    pub fn new() -> Self {
        Self {
            processors: Vec::new(),
        }
    }

    /// Create a processing pipeline from configuration
    pub fn from_configs(configs: &[ProcessorConfig]) -> Result<Self> {
        let mut pipeline = Self::new();
        for config in configs {
            pipeline.add_processor(create_processor(config)?);
        }
        Ok(pipeline)
    }

    /// Add a processor to the pipeline
    pub fn add_processor(&mut self, processor: Box<dyn SeriesProcessor>) {
        self.processors.push(processor);
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    /// Execute the pipeline on a DataFrame, in declaration order.
    pub fn execute(&self, mut df: DataFrame) -> Result<DataFrame> {
        if self.processors.is_empty() {
            return Ok(df);
        }

        debug!(
            "executing post-processing pipeline with {} processors, input shape {:?}",
            self.processors.len(),
            df.shape()
        );
        for processor in &self.processors {
            debug!("running processor '{}'", processor.name());
            df = processor.process(df)?;
        }
        Ok(df)
    }
}

impl Default for ProcessingPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper function to create a processor from configuration
pub fn create_processor(config: &ProcessorConfig) -> Result<Box<dyn SeriesProcessor>> {
    match config {
        ProcessorConfig::RenameColumns { mappings } => {
            Ok(Box::new(ColumnRenamer::new(mappings.clone())))
        }
        ProcessorConfig::UnitConvert {
            column,
            from_unit,
            to_unit,
        } => Ok(Box::new(UnitConverter::new(
            column.clone(),
            from_unit.clone(),
            to_unit.clone(),
        ))),
    }
}

/// Renames columns based on a mapping; unknown source columns are skipped
/// with a warning.
pub struct ColumnRenamer {
    mappings: HashMap<String, String>,
}

impl ColumnRenamer {
    pub fn new(mappings: HashMap<String, String>) -> Self {
        Self { mappings }
    }
}

impl SeriesProcessor for ColumnRenamer {
    fn process(&self, mut df: DataFrame) -> Result<DataFrame> {
        for (old_name, new_name) in &self.mappings {
            let column_names: Vec<&str> =
                df.get_column_names().iter().map(|s| s.as_str()).collect();
            if !column_names.contains(&old_name.as_str()) {
                warn!("column '{}' not found, skipping rename", old_name);
                continue;
            }

            debug!("renaming column '{}' to '{}'", old_name, new_name);
            df.rename(old_name, new_name.into())?;
        }
        Ok(df)
    }

    fn name(&self) -> &str {
        "ColumnRenamer"
    }

    fn description(&self) -> &str {
        "Renames columns based on provided mappings"
    }
}

/// Converts values in a column from one unit to another.
///
/// Temperature pairs use the proper affine formulas; other unit pairs fall
/// back to a multiplicative factor of 1 (no conversion).
pub struct UnitConverter {
    column: String,
    from_unit: String,
    to_unit: String,
}

impl UnitConverter {
    pub fn new(column: String, from_unit: String, to_unit: String) -> Self {
        Self {
            column,
            from_unit,
            to_unit,
        }
    }

    /// The Kelvin-to-Celsius converter for a column, the common case for
    /// CMIP temperature output.
    pub fn kelvin_to_celsius(column: &str) -> Self {
        Self::new(column.to_string(), "kelvin".to_string(), "celsius".to_string())
    }
}

impl SeriesProcessor for UnitConverter {
    fn process(&self, df: DataFrame) -> Result<DataFrame> {
        debug!(
            "converting column '{}' from {} to {}",
            self.column, self.from_unit, self.to_unit
        );

        let column_names: Vec<&str> = df.get_column_names().iter().map(|s| s.as_str()).collect();
        if !column_names.contains(&self.column.as_str()) {
            return Err(Nc2SeriesError::ColumnNotFound(self.column.clone()));
        }

        let from = self.from_unit.to_lowercase();
        let to = self.to_unit.to_lowercase();
        let expr = match (from.as_str(), to.as_str()) {
            ("kelvin", "celsius") | ("k", "c") => col(&self.column) - lit(273.15),
            ("celsius", "kelvin") | ("c", "k") => col(&self.column) + lit(273.15),
            ("celsius", "fahrenheit") | ("c", "f") => {
                col(&self.column) * lit(9.0 / 5.0) + lit(32.0)
            }
            ("fahrenheit", "celsius") | ("f", "c") => {
                (col(&self.column) - lit(32.0)) * lit(5.0 / 9.0)
            }
            _ => {
                warn!(
                    "no conversion known from '{}' to '{}', leaving '{}' unchanged",
                    self.from_unit, self.to_unit, self.column
                );
                col(&self.column)
            }
        };

        Ok(df
            .lazy()
            .with_columns([expr.alias(&self.column)])
            .collect()?)
    }

    fn name(&self) -> &str {
        "UnitConverter"
    }

    fn description(&self) -> &str {
        "Converts values in a column from one unit to another"
    }
}
