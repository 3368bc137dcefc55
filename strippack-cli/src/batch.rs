use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use itertools::Itertools;
use log::{info, warn};
use strippack::entities::{SPInstance, SPSolution};
use strippack::io::export::{export, export_instance};
use strippack::io::svg::packing_to_svg;
use strippack::solve::solve_instance;
use strippack::solver::SolverBackend;

use crate::config::SolveConfig;
use crate::io;
use crate::io::output::SPOutput;

/// Extension of the instance files picked up from a folder
pub const INSTANCE_EXTENSION: &str = "txt";

/// Output locations of one rotation mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeFolders {
    pub results: PathBuf,
    pub plots: PathBuf,
}

impl ModeFolders {
    pub fn new(output_folder: &Path, rotation: bool) -> Self {
        let suffix = match rotation {
            false => "no_rotations",
            true => "rotations",
        };
        Self {
            results: output_folder.join(format!("out_{suffix}")),
            plots: output_folder.join(format!("plots_{suffix}")),
        }
    }

    pub fn result_file(&self, stem: &str) -> PathBuf {
        self.results.join(format!("{stem}-out.txt"))
    }

    pub fn json_file(&self, stem: &str) -> PathBuf {
        self.results.join(format!("{stem}.json"))
    }

    pub fn plot_file(&self, stem: &str) -> PathBuf {
        self.plots.join(format!("{stem}-plot.svg"))
    }

    pub fn create(&self) -> Result<()> {
        for folder in [&self.results, &self.plots] {
            fs::create_dir_all(folder)
                .with_context(|| format!("could not create output folder: {}", folder.display()))?;
        }
        Ok(())
    }
}

/// Expands folders into the instance files they contain. Files are solved in order of their
/// trailing instance number (`ins-2` before `ins-10`), then by name.
pub fn collect_instance_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = vec![];
    for input in inputs {
        if input.is_dir() {
            let entries = fs::read_dir(input)
                .with_context(|| format!("could not read input folder: {}", input.display()))?;
            for entry in entries {
                let path = entry?.path();
                if path.extension().is_some_and(|ext| ext == INSTANCE_EXTENSION) {
                    files.push(path);
                }
            }
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            bail!("input does not exist: {}", input.display());
        }
    }
    if files.is_empty() {
        warn!("[MAIN] no instance files found in {inputs:?}");
    }
    Ok(files
        .into_iter()
        .unique()
        .sorted_by_cached_key(|path| (instance_number(path), path.clone()))
        .collect())
}

/// Stem of the file, used to name every output of the instance
pub fn instance_stem(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .with_context(|| format!("invalid instance file name: {}", path.display()))
}

fn instance_number(path: &Path) -> Option<u64> {
    let stem = path.file_stem()?.to_str()?;
    let prefix = stem.trim_end_matches(|c: char| c.is_ascii_digit());
    let digits = &stem[prefix.len()..];
    digits.parse().ok()
}

/// Solves the instance in one rotation mode and writes the result file, and the plot and JSON
/// output when enabled.
pub fn solve_and_write(
    instance: &SPInstance,
    stem: &str,
    rotation: bool,
    config: &SolveConfig,
    backend: &dyn SolverBackend,
    output_folder: &Path,
) -> Result<SPSolution> {
    let options = config.to_solve_options(rotation);
    let solution = solve_instance(instance, &options, backend)
        .with_context(|| format!("{stem} (rotation: {rotation})"))?;

    info!(
        "[MAIN] {stem} (rotation: {rotation}): {}, height: {}, {:.3}s",
        solution.status,
        solution
            .height()
            .map_or_else(|| "-".to_string(), |h| h.to_string()),
        solution.elapsed.as_secs_f64()
    );

    let folders = ModeFolders::new(output_folder, rotation);
    folders.create()?;
    io::write_result(&solution, &folders.result_file(stem))?;

    if config.write_json {
        let output = SPOutput {
            instance: export_instance(instance, stem),
            solution: export(instance, &solution),
            config: *config,
        };
        io::write_json(&output, &folders.json_file(stem))?;
    }

    if let (true, Some(packing)) = (config.write_svg, &solution.packing) {
        let svg = packing_to_svg(instance, packing, solution.status, config.svg_draw_options);
        io::write_svg(&svg, &folders.plot_file(stem))?;
    }

    Ok(solution)
}
