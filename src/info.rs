//! # NetCDF File Information Module
//!
//! Extracts and displays structural information about NetCDF files:
//! dimensions, variables, attributes, and metadata. This is the inspection
//! step of a walkthrough: look at the file before deciding what to subset.

use crate::error::{Nc2SeriesError, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Information about a NetCDF dimension
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetCdfDimensionInfo {
    pub name: String,
    pub length: usize,
    pub is_unlimited: bool,
}

/// Information about a NetCDF variable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetCdfVariableInfo {
    pub name: String,
    pub data_type: String,
    pub dimensions: Vec<String>,
    pub attributes: HashMap<String, String>,
    pub shape: Vec<usize>,
}

/// Complete information about a NetCDF file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetCdfInfo {
    pub path: String,
    pub dimensions: Vec<NetCdfDimensionInfo>,
    pub variables: Vec<NetCdfVariableInfo>,
    pub global_attributes: HashMap<String, String>,
    pub file_size: Option<u64>,
    pub total_variables: usize,
    pub total_dimensions: usize,
}

impl NetCdfInfo {
    /// Gathers structural information from an already open file.
    ///
    /// When `variable` is given, only that variable is described; `detailed`
    /// additionally collects the global attributes.
    pub fn from_open(
        file: &netcdf::File,
        path: &str,
        variable: Option<&str>,
        detailed: bool,
    ) -> Result<Self> {
        let mut dimensions = Vec::new();
        for dim in file.dimensions() {
            dimensions.push(NetCdfDimensionInfo {
                name: dim.name().to_string(),
                length: dim.len(),
                is_unlimited: dim.is_unlimited(),
            });
        }

        let mut variables = Vec::new();
        for var in file.variables() {
            if let Some(var_name) = variable
                && var.name() != var_name
            {
                continue;
            }

            let mut attributes = HashMap::new();
            for attr in var.attributes() {
                if let Ok(value) = attr.value() {
                    attributes.insert(attr.name().to_string(), format_attribute_value(&value));
                }
            }

            let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();

            variables.push(NetCdfVariableInfo {
                name: var.name().to_string(),
                data_type: format_variable_type(&var.vartype()),
                dimensions: var
                    .dimensions()
                    .iter()
                    .map(|d| d.name().to_string())
                    .collect(),
                attributes,
                shape,
            });
        }

        if let Some(var_name) = variable
            && variables.is_empty()
        {
            return Err(Nc2SeriesError::VariableNotFound(var_name.to_string()));
        }

        let mut global_attributes = HashMap::new();
        if detailed {
            for attr in file.attributes() {
                if let Ok(value) = attr.value() {
                    global_attributes
                        .insert(attr.name().to_string(), format_attribute_value(&value));
                }
            }
        }

        Ok(NetCdfInfo {
            path: path.to_string(),
            total_dimensions: dimensions.len(),
            total_variables: variables.len(),
            dimensions,
            variables,
            global_attributes,
            file_size: std::fs::metadata(path).ok().map(|m| m.len()),
        })
    }

    /// Opens a file, gathers its structure, and releases the handle once all
    /// reads are complete.
    pub fn from_path(path: &str, variable: Option<&str>, detailed: bool) -> Result<Self> {
        debug!("opening NetCDF file for inspection: {}", path);
        let file = netcdf::open(path)?;
        let info = Self::from_open(&file, path, variable, detailed)?;
        file.close()?;
        Ok(info)
    }

    /// The set of variable names the file exposes.
    pub fn variable_names(&self) -> Vec<&str> {
        self.variables.iter().map(|v| v.name.as_str()).collect()
    }

    /// The set of dimension names the file exposes.
    pub fn dimension_names(&self) -> Vec<&str> {
        self.dimensions.iter().map(|d| d.name.as_str()).collect()
    }
}

/// Format netcdf attribute value for display
fn format_attribute_value(value: &netcdf::AttributeValue) -> String {
    match value {
        netcdf::AttributeValue::Str(s) => s.clone(),
        other => format!("{:?}", other),
    }
}

/// Format netcdf variable type for display
fn format_variable_type(var_type: &netcdf::types::NcVariableType) -> String {
    format!("{:?}", var_type)
}

/// Print NetCDF info in human-readable format
pub fn print_file_info_human(info: &NetCdfInfo) {
    println!("NetCDF File Information:");
    println!("  Path: {}", info.path);
    if let Some(size) = info.file_size {
        println!("  File Size: {:.2} MB", size as f64 / 1_048_576.0);
    }
    println!("  Dimensions: {} total", info.total_dimensions);
    for dim in &info.dimensions {
        println!(
            "    {} ({}{})",
            dim.name,
            dim.length,
            if dim.is_unlimited { ", unlimited" } else { "" }
        );
    }
    println!("  Variables: {} total", info.total_variables);
    for var in &info.variables {
        println!(
            "    {} ({}) - dimensions: [{}]",
            var.name,
            var.data_type,
            var.dimensions.join(", ")
        );
        if !var.attributes.is_empty() {
            for (name, value) in &var.attributes {
                println!("      @{}: {}", name, value);
            }
        }
    }
    if !info.global_attributes.is_empty() {
        println!("  Global Attributes:");
        for (name, value) in &info.global_attributes {
            println!("    @{}: {}", name, value);
        }
    }
}

/// Print NetCDF info in JSON format
pub fn print_file_info_json(info: &NetCdfInfo) -> Result<()> {
    let json = serde_json::to_string_pretty(info)
        .map_err(|e| Nc2SeriesError::Config(format!("cannot serialize file info: {}", e)))?;
    println!("{}", json);
    Ok(())
}

/// Print NetCDF info in YAML format
pub fn print_file_info_yaml(info: &NetCdfInfo) -> Result<()> {
    let yaml = serde_yaml::to_string(info)
        .map_err(|e| Nc2SeriesError::Config(format!("cannot serialize file info: {}", e)))?;
    println!("{}", yaml);
    Ok(())
}

/// Print NetCDF info in CSV format (variables only)
pub fn print_file_info_csv(info: &NetCdfInfo) -> Result<()> {
    // Variables are the most useful tabular view of a file's structure.
    println!("variable_name,data_type,dimensions,shape,attributes_count");
    for var in &info.variables {
        println!(
            "{},{},\"{}\",\"{}\",{}",
            var.name,
            var.data_type,
            var.dimensions.join(";"),
            var.shape
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(";"),
            var.attributes.len()
        );
    }
    Ok(())
}
