use anyhow::Context;
use clap::{CommandFactory, Parser};
use nc2series::cli::{
    Cli, Commands, ExtractArgs, OutputFormat, build_job_config, render_template,
};
use nc2series::input::JobConfig;
use nc2series::{info, report, run_series_job};
use std::fs;
use std::io;
use std::path::Path;
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Extract {
            input,
            variable,
            config,
            region,
            point,
            point_index,
            mean,
            output,
            plot,
            plot_title,
            raw_time,
            time_dim,
            lat_dim,
            lon_dim,
            kelvin_to_celsius,
            rename_columns,
            force,
            dry_run,
        } => {
            let start = Instant::now();

            let config_source = config
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "command line".to_string());

            let base = match &config {
                Some(path) => Some(
                    JobConfig::from_file(path)
                        .with_context(|| format!("loading job file {}", path.display()))?,
                ),
                None => None,
            };

            let args = ExtractArgs {
                input,
                variable,
                region,
                point,
                point_index,
                mean,
                output,
                plot,
                plot_title,
                raw_time,
                time_dim,
                lat_dim,
                lon_dim,
                kelvin_to_celsius,
                rename_columns,
            };
            let job = build_job_config(base, &args).context("assembling job configuration")?;

            if !cli.quiet {
                report::show_greeting(&config_source);
                report::config_echo(&job);
            }

            if dry_run {
                if !Path::new(&job.nc_path).exists() {
                    anyhow::bail!("input file does not exist: {}", job.nc_path);
                }
                println!("\nDry run: configuration is valid, no data read.");
                return Ok(());
            }

            if !force {
                check_overwrite(job.table_path.as_deref())?;
                check_overwrite(job.plot.as_ref().map(|p| p.path.as_str()))?;
            }

            run_series_job(&job)
                .with_context(|| format!("extracting series from {}", job.nc_path))?;

            if !cli.quiet {
                report::show_farewell_with_timing(start.elapsed());
            }
        }

        Commands::Info {
            file,
            detailed,
            variable,
            format,
        } => {
            let file_info = info::NetCdfInfo::from_path(&file, variable.as_deref(), detailed)
                .with_context(|| format!("inspecting {}", file))?;
            match format {
                OutputFormat::Human => info::print_file_info_human(&file_info),
                OutputFormat::Json => info::print_file_info_json(&file_info)?,
                OutputFormat::Yaml => info::print_file_info_yaml(&file_info)?,
                OutputFormat::Csv => info::print_file_info_csv(&file_info)?,
            }
        }

        Commands::Template {
            template_type,
            output,
            format,
        } => {
            let rendered = render_template(template_type, format)?;
            match output {
                Some(path) => {
                    fs::write(&path, &rendered)
                        .with_context(|| format!("writing template to {}", path.display()))?;
                    println!("Template written to {}", path.display());
                }
                None => println!("{}", rendered),
            }
        }

        Commands::Completions { shell, output } => {
            let mut command = Cli::command();
            let name = command.get_name().to_string();
            match output {
                Some(path) => {
                    let mut file = fs::File::create(&path)
                        .with_context(|| format!("creating {}", path.display()))?;
                    clap_complete::generate(shell, &mut command, name, &mut file);
                    println!("Completions written to {}", path.display());
                }
                None => {
                    clap_complete::generate(shell, &mut command, name, &mut io::stdout());
                }
            }
        }
    }

    Ok(())
}

fn check_overwrite(path: Option<&str>) -> anyhow::Result<()> {
    if let Some(path) = path
        && Path::new(path).exists()
    {
        anyhow::bail!("output file already exists: {} (use --force to overwrite)", path);
    }
    Ok(())
}
