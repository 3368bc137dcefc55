use crate::error::{Error, Result};
use crate::model::{Assignment, Model};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::Duration;

/// Lowering to a mixed-integer-linear program, solved with `microlp`
#[cfg(feature = "milp")]
pub mod milp;

/// Lowering to satisfiability modulo theories, solved with Z3
#[cfg(feature = "smt")]
pub mod smt;

/// Lowering to constraint programming, solved with Pumpkin
#[cfg(feature = "cp")]
pub mod cp;

/// Normalized outcome of a solving engine.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SolveStatus {
    /// Optimality of the returned assignment was proven
    Optimal,
    /// Time ran out, the best assignment found so far is returned
    FeasibleTimeout,
    /// No assignment exists
    Infeasible,
    /// Time ran out before any assignment was found
    TimeoutNoSolution,
}

impl SolveStatus {
    pub fn has_solution(&self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::FeasibleTimeout)
    }
}

impl Display for SolveStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SolveStatus::Optimal => "OPTIMAL",
            SolveStatus::FeasibleTimeout => "FEASIBLE_TIMEOUT",
            SolveStatus::Infeasible => "INFEASIBLE",
            SolveStatus::TimeoutNoSolution => "TIMEOUT_NO_SOLUTION",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone)]
pub struct SolverOutcome {
    pub status: SolveStatus,
    /// Values of the model variables, present iff the status has a solution
    pub assignment: Option<Assignment>,
}

impl SolverOutcome {
    pub fn without_solution(status: SolveStatus) -> Self {
        debug_assert!(!status.has_solution());
        Self {
            status,
            assignment: None,
        }
    }
}

/// Common interface for the solving engines
pub trait SolverBackend: Send + Sync {
    /// Lowers the model into the language of the engine and minimizes its objective.
    ///
    /// Blocks for at most `time_limit` (plus the time needed for the lowering).
    /// Timeouts and infeasibility are reported through the status, not as errors.
    fn solve(&self, model: &Model, time_limit: Duration) -> Result<SolverOutcome>;

    /// Get the backend name for logging
    fn name(&self) -> &str;
}

/// Available solver backends
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    #[default]
    Milp,
    Smt,
    Cp,
}

impl FromStr for BackendType {
    type Err = Error;

    /// Case-insensitive
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "milp" | "mip" => Ok(BackendType::Milp),
            "smt" | "z3" => Ok(BackendType::Smt),
            "cp" | "pumpkin" => Ok(BackendType::Cp),
            _ => Err(Error::Backend(format!(
                "unknown backend '{s}', expected 'milp', 'smt' or 'cp'"
            ))),
        }
    }
}

impl Display for BackendType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendType::Milp => write!(f, "milp"),
            BackendType::Smt => write!(f, "smt"),
            BackendType::Cp => write!(f, "cp"),
        }
    }
}

/// Creates a backend of the given type, if it was compiled in.
pub fn create_backend(backend_type: BackendType) -> Result<Box<dyn SolverBackend>> {
    match backend_type {
        #[cfg(feature = "milp")]
        BackendType::Milp => Ok(Box::new(milp::MilpBackend::default())),
        #[cfg(feature = "smt")]
        BackendType::Smt => Ok(Box::new(smt::SmtBackend::default())),
        #[cfg(feature = "cp")]
        BackendType::Cp => Ok(Box::new(cp::CpBackend)),
        #[allow(unreachable_patterns)]
        other => Err(Error::Backend(format!(
            "backend '{other}' is not available (compile with the '{other}' feature)"
        ))),
    }
}
