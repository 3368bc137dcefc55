use std::time::Duration;

use serde::{Deserialize, Serialize};
use strippack::formulation::FormulationConfig;
use strippack::io::svg::SvgDrawOptions;
use strippack::solve::SolveOptions;
use strippack::solver::BackendType;

/// Rotation modes in which every instance is solved
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RotationModes {
    NoRotations,
    Rotations,
    #[default]
    Both,
}

impl RotationModes {
    /// The `rotation` flags to solve with, in order
    pub fn flags(&self) -> &'static [bool] {
        match self {
            RotationModes::NoRotations => &[false],
            RotationModes::Rotations => &[true],
            RotationModes::Both => &[false, true],
        }
    }
}

/// Configuration of a batch run
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct SolveConfig {
    /// Engine used to solve the formulations
    pub backend: BackendType,
    /// Time limit of a single (instance, mode) solve, in seconds
    pub time_limit_secs: u64,
    /// Add the redundant cumulative constraint
    pub cumulative: bool,
    /// Add the lexicographic symmetry breaking constraint
    pub symmetry_breaking: bool,
    /// Formulate the rectangles in order of decreasing area
    pub sort_by_area: bool,
    pub modes: RotationModes,
    /// Write a plot of every packing found
    pub write_svg: bool,
    /// Write the instance, solution and config as JSON next to the result file
    pub write_json: bool,
    pub svg_draw_options: SvgDrawOptions,
}

impl Default for SolveConfig {
    fn default() -> Self {
        let options = SolveOptions::default();
        Self {
            backend: BackendType::default(),
            time_limit_secs: options.time_limit.as_secs(),
            cumulative: options.formulation.cumulative,
            symmetry_breaking: options.formulation.symmetry_breaking,
            sort_by_area: options.sort_by_area,
            modes: RotationModes::default(),
            write_svg: true,
            write_json: false,
            svg_draw_options: SvgDrawOptions::default(),
        }
    }
}

impl SolveConfig {
    pub fn time_limit(&self) -> Duration {
        Duration::from_secs(self.time_limit_secs)
    }

    pub fn to_solve_options(&self, rotation: bool) -> SolveOptions {
        SolveOptions {
            formulation: FormulationConfig {
                rotation,
                cumulative: self.cumulative,
                symmetry_breaking: self.symmetry_breaking,
            },
            time_limit: self.time_limit(),
            sort_by_area: self.sort_by_area,
        }
    }
}
