use crate::decode::decode;
use crate::entities::{SPInstance, SPSolution};
use crate::error::{Error, Result};
use crate::formulation::{FormulationConfig, formulate};
use crate::solver::SolverBackend;
use crate::util::assertions;
use crate::util::assertions::validate_packing;
use log::info;
use std::time::{Duration, Instant};

/// Default time limit of a single solve
pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(300);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SolveOptions {
    pub formulation: FormulationConfig,
    pub time_limit: Duration,
    /// Formulate the rectangles in order of decreasing area. The resulting packing is always
    /// reported in the order of the instance.
    pub sort_by_area: bool,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            formulation: FormulationConfig::default(),
            time_limit: DEFAULT_TIME_LIMIT,
            sort_by_area: true,
        }
    }
}

/// Formulates the instance, solves it with the backend and decodes and validates the result.
///
/// Timeouts and infeasibility are reported through the status of the solution. An assignment
/// which does not decode into a valid packing is an error.
pub fn solve_instance(
    instance: &SPInstance,
    options: &SolveOptions,
    backend: &dyn SolverBackend,
) -> Result<SPSolution> {
    let (working, order) = match options.sort_by_area {
        true => instance.sorted_by_area(),
        false => (instance.clone(), (0..instance.n_items()).collect()),
    };
    let formulation = formulate(&working, &options.formulation)?;

    let start = Instant::now();
    let outcome = backend.solve(&formulation.model, options.time_limit)?;
    let elapsed = start.elapsed();

    let packing = match (outcome.status.has_solution(), outcome.assignment) {
        (true, Some(assignment)) => {
            let packing = decode(&formulation.vars, &assignment, working.width)?;
            validate_packing(&working, &packing, options.formulation.rotation)?;
            debug_assert!(assertions::assignment_satisfies_model(&formulation, &assignment));
            debug_assert!(assertions::height_within_bounds(&formulation, &packing));
            Some(packing.reindexed(&order))
        }
        (false, None) => None,
        (_, assignment) => {
            return Err(Error::Backend(format!(
                "{} returned status {} {} an assignment",
                backend.name(),
                outcome.status,
                match assignment.is_some() {
                    true => "with",
                    false => "without",
                }
            )));
        }
    };

    match &packing {
        Some(p) => info!(
            "[SOLVE] {} ({}): height {} in [{}, {}], {} rotated, {:.3}s",
            outcome.status,
            backend.name(),
            p.height,
            formulation.bounds.lower,
            formulation.bounds.upper,
            p.n_rotated(),
            elapsed.as_secs_f64()
        ),
        None => info!(
            "[SOLVE] {} ({}), no packing after {:.3}s",
            outcome.status,
            backend.name(),
            elapsed.as_secs_f64()
        ),
    }

    Ok(SPSolution {
        status: outcome.status,
        packing,
        elapsed,
        rotation: options.formulation.rotation,
        backend: backend.name().to_string(),
    })
}

#[cfg(all(test, feature = "milp"))]
mod tests {
    use super::*;
    use crate::model::{Assignment, Model};
    use crate::solver::milp::MilpBackend;
    use crate::solver::{SolveStatus, SolverOutcome};
    use crate::ValidationError;

    /// Backend returning a fixed assignment, regardless of the model.
    struct Scripted(SolverOutcome);

    impl SolverBackend for Scripted {
        fn solve(&self, _model: &Model, _time_limit: Duration) -> Result<SolverOutcome> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    #[test]
    fn result_is_reported_in_input_order() {
        // smallest rectangle first, sorting moves it to the back
        let instance = SPInstance::new(5, &[1, 5], &[1, 3]).unwrap();
        let solution = solve_instance(&instance, &SolveOptions::default(), &MilpBackend).unwrap();
        assert_eq!(solution.status, SolveStatus::Optimal);
        let packing = solution.packing.unwrap();
        assert_eq!(packing.height, 4);
        assert_eq!((packing.placements[0].width, packing.placements[0].height), (1, 1));
        assert_eq!(validate_packing(&instance, &packing, false), Ok(()));
    }

    #[test]
    fn invalid_assignment_is_a_hard_error() {
        // two rectangles stacked on the same spot
        let instance = SPInstance::new(4, &[2, 2], &[2, 2]).unwrap();
        let options = SolveOptions {
            formulation: FormulationConfig {
                rotation: false,
                cumulative: false,
                symmetry_breaking: false,
            },
            sort_by_area: false,
            ..Default::default()
        };
        // x0, x1, y0, y1, height
        let backend = Scripted(SolverOutcome {
            status: SolveStatus::Optimal,
            assignment: Some(Assignment::from_values(vec![0, 0, 0, 0, 2])),
        });
        let err = solve_instance(&instance, &options, &backend).unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::Overlap(0, 1))
        ));
    }

    #[test]
    fn loose_height_is_a_hard_error() {
        // the declared height exceeds the top of the only rectangle
        let instance = SPInstance::new(4, &[2], &[2]).unwrap();
        let options = SolveOptions {
            formulation: FormulationConfig {
                rotation: false,
                cumulative: false,
                symmetry_breaking: false,
            },
            ..Default::default()
        };
        // x0, y0, height
        let backend = Scripted(SolverOutcome {
            status: SolveStatus::FeasibleTimeout,
            assignment: Some(Assignment::from_values(vec![0, 0, 3])),
        });
        let err = solve_instance(&instance, &options, &backend).unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::HeightNotTight {
                declared: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn inconsistent_outcome_is_a_backend_error() {
        let instance = SPInstance::new(4, &[2], &[2]).unwrap();
        let backend = Scripted(SolverOutcome {
            status: SolveStatus::Optimal,
            assignment: None,
        });
        let err = solve_instance(&instance, &SolveOptions::default(), &backend).unwrap_err();
        assert!(matches!(err, Error::Backend(_)));
    }
}
