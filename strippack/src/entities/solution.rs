use crate::entities::Packing;
use crate::solver::SolveStatus;
use std::time::Duration;

/// Outcome of solving one instance in one rotation mode.
#[derive(Debug, Clone)]
pub struct SPSolution {
    pub status: SolveStatus,
    /// Validated geometry, present whenever the solver returned an assignment
    pub packing: Option<Packing>,
    /// Wall-clock time spent inside the solving engine
    pub elapsed: Duration,
    /// Whether 90° rotation of the rectangles was permitted
    pub rotation: bool,
    /// Name of the backend that produced the solution
    pub backend: String,
}

impl SPSolution {
    pub fn height(&self) -> Option<u64> {
        self.packing.as_ref().map(|p| p.height)
    }

    pub fn has_packing(&self) -> bool {
        self.packing.is_some()
    }
}
