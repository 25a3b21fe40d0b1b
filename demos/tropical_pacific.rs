//! Walkthrough of the tropical-Pacific extraction as a library consumer.
//!
//! Run with a daily CMIP6 `tas` file on a 192x288 grid:
//!
//! ```text
//! cargo run --example tropical_pacific -- tas_day_CESM2-WACCM_ssp245.nc
//! ```

use nc2series::info::{self, NetCdfInfo};
use nc2series::input::{
    DimensionNames, JobConfig, PlotConfig, RegionConfig, SelectionConfig,
};
use nc2series::run_series_job;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let nc_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tas_day_CESM2-WACCM_ssp245.nc".to_string());

    // Look at the file structure first, the way an interactive session would.
    let file_info = NetCdfInfo::from_path(&nc_path, None, false)?;
    info::print_file_info_human(&file_info);

    let config = JobConfig {
        nc_path,
        variable_name: "tas".to_string(),
        dimensions: DimensionNames::default(),
        region: RegionConfig {
            lat_min: -15.0,
            lat_max: 15.0,
            lon_min: 90.0,
            lon_max: 270.0,
        },
        // Cell (9, 124) of the subset grid sits in the Bohol Sea.
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
    };

    let series = run_series_job(&config)?;
    println!("{}", series.head(Some(10)));
    Ok(())
}
