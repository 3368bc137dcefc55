use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;
use strippack::solver::BackendType;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Instance files, or folders whose `.txt` files are all solved
    #[arg(short, long, value_name = "FILE|FOLDER", required = true, num_args = 1..)]
    pub input: Vec<PathBuf>,
    #[arg(short, long, value_name = "FOLDER")]
    pub output_folder: PathBuf,
    #[arg(short, long, value_name = "FILE")]
    pub config_file: Option<PathBuf>,
    /// Overrides the backend of the config
    #[arg(short, long, value_name = "[milp, smt, cp]")]
    pub backend: Option<BackendType>,
    /// Overrides the time limit of the config, in seconds
    #[arg(short, long, value_name = "SECONDS")]
    pub time_limit: Option<u64>,
    #[arg(
        short,
        long,
        value_name = "[off, error, warn, info, debug, trace]",
        default_value = "info"
    )]
    pub log_level: LevelFilter,
}
