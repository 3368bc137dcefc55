use crate::error::{Error, Result};
use crate::model::{
    Assignment, Constraint, LinExpr, LinearConstraint, Model, Relation, Task, Variable,
};
use crate::solver::{SolveStatus, SolverBackend, SolverOutcome};
use itertools::Itertools;
use log::{debug, info};
use pumpkin_solver::constraints;
use pumpkin_solver::optimisation::OptimisationDirection;
use pumpkin_solver::optimisation::linear_sat_unsat::LinearSatUnsat;
use pumpkin_solver::predicate;
use pumpkin_solver::proof::ConstraintTag;
use pumpkin_solver::results::{OptimisationResult, ProblemSolution, SolutionReference};
use pumpkin_solver::termination::TimeBudget;
use pumpkin_solver::variables::{AffineView, DomainId, Literal, TransformableVariable};
use pumpkin_solver::{DefaultBrancher, Solver};
use std::time::{Duration, Instant};

/// Propagation-based backend (lazy clause generation with Pumpkin). Cumulative and maximum
/// constraints are posted as the engine's global constraints, disjunctions, conditionals and
/// lexicographic order as half-reified linear constraints tied together by clauses.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpBackend;

impl SolverBackend for CpBackend {
    fn solve(&self, model: &Model, time_limit: Duration) -> Result<SolverOutcome> {
        if time_limit.is_zero() {
            return Ok(SolverOutcome::without_solution(SolveStatus::TimeoutNoSolution));
        }

        let mut encoder = CpEncoder::new(model)?;
        for tc in model.constraints() {
            encoder.constraint(&tc.constraint)?;
        }
        info!(
            "[CP] posted {} variables and {} constraints",
            model.variables().len(),
            model.constraints().len()
        );
        if encoder.conflict {
            debug!("[CP] conflict at the root while posting");
            return Ok(SolverOutcome::without_solution(SolveStatus::Infeasible));
        }

        let start = Instant::now();
        let objective = encoder.vars[model.objective().index()];
        let mut brancher = encoder.solver.default_brancher();
        let mut termination = TimeBudget::starting_now(time_limit);
        let callback: fn(&Solver, SolutionReference, &DefaultBrancher) = |_, _, _| {};
        let result = encoder.solver.optimise(
            &mut brancher,
            &mut termination,
            LinearSatUnsat::new(OptimisationDirection::Minimise, objective, callback),
        );

        let read = |solution: &dyn Fn(DomainId) -> i32| {
            Assignment::from_values(encoder.vars.iter().map(|&v| solution(v) as i64).collect())
        };
        let outcome = match result {
            OptimisationResult::Optimal(solution) => SolverOutcome {
                status: SolveStatus::Optimal,
                assignment: Some(read(&|v| solution.get_integer_value(v))),
            },
            OptimisationResult::Satisfiable(solution) => SolverOutcome {
                status: SolveStatus::FeasibleTimeout,
                assignment: Some(read(&|v| solution.get_integer_value(v))),
            },
            OptimisationResult::Unsatisfiable => {
                SolverOutcome::without_solution(SolveStatus::Infeasible)
            }
            OptimisationResult::Unknown => {
                SolverOutcome::without_solution(SolveStatus::TimeoutNoSolution)
            }
        };
        debug!(
            "[CP] {} after {:.3}s",
            outcome.status,
            start.elapsed().as_secs_f64()
        );
        Ok(outcome)
    }

    fn name(&self) -> &str {
        "cp"
    }
}

/// Converts a coefficient, bound or constant to the integer width of the engine.
fn small(value: i64) -> Result<i32> {
    i32::try_from(value)
        .map_err(|_| Error::Backend(format!("{value} exceeds the integer range of the cp engine")))
}

struct CpEncoder<'m> {
    solver: Solver,
    variables: &'m [Variable],
    vars: Vec<DomainId>,
    /// Set once the engine detected infeasibility while a constraint was posted
    conflict: bool,
}

impl<'m> CpEncoder<'m> {
    fn new(model: &'m Model) -> Result<Self> {
        let mut solver = Solver::default();
        let vars = model
            .variables()
            .iter()
            .map(|v| {
                let (lb, ub) = v.domain.bounds();
                Ok(solver.new_named_bounded_integer(small(lb)?, small(ub)?, v.name.as_str()))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            solver,
            variables: model.variables(),
            vars,
            conflict: false,
        })
    }

    fn posted<E: std::fmt::Debug>(&mut self, result: std::result::Result<(), E>) {
        if let Err(e) = result {
            debug!("[CP] posting failed: {e:?}");
            self.conflict = true;
        }
    }

    /// Terms of `e` as scaled views, and the right hand side of `e <= 0` or `e == 0`.
    fn terms(&self, e: &LinExpr) -> Result<(Vec<AffineView<DomainId>>, i32)> {
        let terms = e
            .terms()
            .iter()
            .map(|&(v, coef)| Ok(self.vars[v.index()].scaled(small(coef)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok((terms, small(-e.constant_part())?))
    }

    /// Single view equal to `e`. Expressions over more than one variable get an auxiliary one.
    fn view(&mut self, e: &LinExpr) -> Result<AffineView<DomainId>> {
        if let [(v, coef)] = e.terms() {
            return Ok(self.vars[v.index()]
                .scaled(small(*coef)?)
                .offset(small(e.constant_part())?));
        }
        let (lo, hi) = e.range(self.variables);
        let aux = self.solver.new_bounded_integer(small(lo)?, small(hi)?);
        // e - aux == 0
        let (mut terms, rhs) = self.terms(e)?;
        terms.push(aux.scaled(-1));
        let tag = self.solver.new_constraint_tag();
        let result = self
            .solver
            .add_constraint(constraints::equals(terms, rhs, tag))
            .post();
        self.posted(result);
        Ok(aux.scaled(1))
    }

    /// Posts `c`, or `guard => c` if a guard is given.
    fn linear(&mut self, c: &LinearConstraint, guard: Option<Literal>) -> Result<()> {
        let tag = self.solver.new_constraint_tag();
        if c.expr.terms().is_empty() {
            let holds = match c.relation {
                Relation::Le => c.expr.constant_part() <= 0,
                Relation::Eq => c.expr.constant_part() == 0,
            };
            match (holds, guard) {
                (true, _) => {}
                (false, Some(lit)) => self.clause(vec![!lit], tag),
                (false, None) => self.conflict = true,
            }
            return Ok(());
        }

        let (terms, rhs) = self.terms(&c.expr)?;
        let result = match (c.relation, guard) {
            (Relation::Le, None) => self
                .solver
                .add_constraint(constraints::less_than_or_equals(terms, rhs, tag))
                .post(),
            (Relation::Le, Some(lit)) => self
                .solver
                .add_constraint(constraints::less_than_or_equals(terms, rhs, tag))
                .implied_by(lit),
            (Relation::Eq, None) => self
                .solver
                .add_constraint(constraints::equals(terms, rhs, tag))
                .post(),
            (Relation::Eq, Some(lit)) => self
                .solver
                .add_constraint(constraints::equals(terms, rhs, tag))
                .implied_by(lit),
        };
        self.posted(result);
        Ok(())
    }

    fn clause(&mut self, literals: Vec<Literal>, tag: ConstraintTag) {
        let result = self
            .solver
            .add_constraint(constraints::clause(literals, tag))
            .post();
        self.posted(result);
    }

    fn constraint(&mut self, constraint: &Constraint) -> Result<()> {
        match constraint {
            Constraint::Linear(c) => self.linear(c, None)?,
            Constraint::Disjunction(cs) => {
                let literals = cs.iter().map(|_| self.solver.new_literal()).collect_vec();
                for (c, &lit) in cs.iter().zip(&literals) {
                    self.linear(c, Some(lit))?;
                }
                let tag = self.solver.new_constraint_tag();
                self.clause(literals, tag);
            }
            Constraint::Conditional {
                flag,
                then,
                otherwise,
            } => {
                let flag = self.vars[flag.index()];
                let tag = self.solver.new_constraint_tag();
                let lit = self
                    .solver
                    .new_literal_for_predicate(predicate![flag >= 1], tag);
                for c in then {
                    self.linear(c, Some(lit))?;
                }
                for c in otherwise {
                    self.linear(c, Some(!lit))?;
                }
            }
            Constraint::Maximum { target, exprs } => {
                let views = exprs.iter().map(|e| self.view(e)).collect::<Result<Vec<_>>>()?;
                let tag = self.solver.new_constraint_tag();
                let result = self
                    .solver
                    .add_constraint(constraints::maximum(views, self.vars[target.index()], tag))
                    .post();
                self.posted(result);
            }
            Constraint::Cumulative { tasks, capacity } => self.cumulative(tasks, *capacity)?,
            Constraint::LexLeq { lhs, rhs } => {
                if lhs.len() != rhs.len() {
                    return Err(Error::ModelConstruction(format!(
                        "lexicographic constraint compares {} with {} expressions",
                        lhs.len(),
                        rhs.len()
                    )));
                }
                self.lex_leq(lhs, rhs)?;
            }
        }
        Ok(())
    }

    /// Native cumulative. Durations and demands which are not constant are replaced by their
    /// lower bounds: every task keeps occupying a subset of its original profile.
    fn cumulative(&mut self, tasks: &[Task], capacity: i64) -> Result<()> {
        let mut starts = vec![];
        let mut durations = vec![];
        let mut demands = vec![];
        for task in tasks {
            let duration = task.duration.range(self.variables).0;
            let demand = task.demand.range(self.variables).0;
            if duration <= 0 || demand <= 0 {
                continue;
            }
            starts.push(self.view(&task.start)?);
            durations.push(small(duration)?);
            demands.push(small(demand)?);
        }
        if starts.is_empty() {
            return Ok(());
        }
        let tag = self.solver.new_constraint_tag();
        let result = self
            .solver
            .add_constraint(constraints::cumulative(
                starts,
                durations,
                demands,
                small(capacity)?,
                tag,
            ))
            .post();
        self.posted(result);
        Ok(())
    }

    /// `q_k` states that the first `k` pairs are equal, `lt_k` that `a_k < b_k`:
    /// `q_k => a_k <= b_k`, `q_{k+1} => a_k == b_k`, `lt_k => a_k + 1 <= b_k` and
    /// `q_k => lt_k or q_{k+1}`, with `q_0` true.
    fn lex_leq(&mut self, lhs: &[LinExpr], rhs: &[LinExpr]) -> Result<()> {
        let mut prefix: Option<Literal> = None;
        for (a, b) in lhs.iter().zip(rhs) {
            self.linear(&LinearConstraint::le(a.clone(), b.clone()), prefix)?;

            let lt = self.solver.new_literal();
            self.linear(&LinearConstraint::le(a.clone() + 1i64, b.clone()), Some(lt))?;
            let next = self.solver.new_literal();
            self.linear(&LinearConstraint::equal(a.clone(), b.clone()), Some(next))?;

            let tag = self.solver.new_constraint_tag();
            let clause = match prefix {
                Some(q) => vec![!q, lt, next],
                None => vec![lt, next],
            };
            self.clause(clause, tag);
            prefix = Some(next);
        }
        Ok(())
    }
}
