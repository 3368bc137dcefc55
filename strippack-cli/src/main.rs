use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use log::{error, info, warn};
use strippack::Error;
use strippack::io::import::read_instance;
use strippack::solver::create_backend;
use strippack_cli::batch::{collect_instance_files, instance_stem, solve_and_write};
use strippack_cli::config::SolveConfig;
use strippack_cli::io;
use strippack_cli::io::cli::Cli;
use thousands::Separable;

fn main() -> Result<()> {
    let args = Cli::parse();
    io::init_logger(args.log_level)?;

    let mut config = match &args.config_file {
        None => {
            warn!("[MAIN] No config file provided, use --config-file to provide a custom config");
            SolveConfig::default()
        }
        Some(config_file) => io::read_config(config_file)?,
    };
    if let Some(backend) = args.backend {
        config.backend = backend;
    }
    if let Some(time_limit) = args.time_limit {
        config.time_limit_secs = time_limit;
    }

    info!("[MAIN] Successfully parsed SolveConfig: {config:?}");

    let backend = create_backend(config.backend)?;
    let instance_files = collect_instance_files(&args.input)?;
    info!(
        "[MAIN] solving {} instance(s) with the {} backend",
        instance_files.len().separate_with_commas(),
        backend.name()
    );

    let (mut n_solved, mut n_skipped) = (0, 0);
    for path in &instance_files {
        let stem = instance_stem(path)?;
        let instance = match read_instance(path) {
            Ok(instance) => instance,
            Err(Error::InputFormat(msg)) => {
                error!("[MAIN] skipping {stem}: {msg}");
                n_skipped += 1;
                continue;
            }
            Err(e) => return Err(e).with_context(|| format!("could not import {stem}")),
        };
        for &rotation in config.modes.flags() {
            solve_and_write(
                &instance,
                &stem,
                rotation,
                &config,
                backend.as_ref(),
                &args.output_folder,
            )?;
            n_solved += 1;
        }
    }

    info!("[MAIN] finished, {n_solved} solve(s), {n_skipped} instance(s) skipped");
    Ok(())
}
