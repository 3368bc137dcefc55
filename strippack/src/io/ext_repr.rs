use crate::solver::SolveStatus;
use serde::{Deserialize, Serialize};

/// External representation of an instance.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ExtInstance {
    pub name: String,
    pub strip_width: u64,
    pub widths: Vec<u64>,
    pub heights: Vec<u64>,
}

/// External representation of a placed rectangle. Dimensions are the occupied ones.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExtPlacement {
    pub x: u64,
    pub y: u64,
    pub width: u64,
    pub height: u64,
    pub rotated: bool,
}

/// External representation of a solution.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ExtSolution {
    pub strip_width: u64,
    /// Absent if no packing was found
    pub height: Option<u64>,
    pub status: SolveStatus,
    pub density: Option<f64>,
    pub rotation: bool,
    pub backend: String,
    pub run_time_sec: f64,
    pub placements: Vec<ExtPlacement>,
}
