use crate::error::{Error, Result};
use crate::model::{
    Assignment, Constraint, Domain, LinExpr, LinearConstraint, Model, Relation, Task, VarId,
    Variable,
};
use crate::solver::{SolveStatus, SolverBackend, SolverOutcome};
use good_lp::{
    Expression, ProblemVariables, ResolutionError, Solution, SolutionStatus, SolverModel,
    WithTimeLimit, constraint, microlp, variable,
};
use itertools::Itertools;
use log::{debug, info, warn};
use std::time::{Duration, Instant};
use thousands::Separable;

/// Mixed-integer-linear backend. Disjunctions, conditionals, maxima, cumulative and
/// lexicographic constraints are lowered into indicator columns and big-M rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct MilpBackend;

impl SolverBackend for MilpBackend {
    fn solve(&self, model: &Model, time_limit: Duration) -> Result<SolverOutcome> {
        let program = MilpProgram::lower(model)?;
        info!(
            "[MILP] lowered to {} columns and {} rows",
            program.columns.len().separate_with_commas(),
            program.rows.len().separate_with_commas()
        );

        if time_limit.is_zero() {
            return Ok(SolverOutcome::without_solution(SolveStatus::TimeoutNoSolution));
        }

        let start = Instant::now();
        let outcome = match program.solve_within(time_limit)? {
            (status, Some(values)) => SolverOutcome {
                status,
                assignment: Some(Assignment::from_values(
                    values[..program.n_model_vars].to_vec(),
                )),
            },
            (status, None) => {
                if status == SolveStatus::TimeoutNoSolution {
                    warn!("[MILP] time limit of {time_limit:?} reached without a solution");
                }
                SolverOutcome::without_solution(status)
            }
        };
        debug!(
            "[MILP] {} after {:.3}s",
            outcome.status,
            start.elapsed().as_secs_f64()
        );
        Ok(outcome)
    }

    fn name(&self) -> &str {
        "milp"
    }
}

/// A named `expr <= 0` or `expr == 0` row.
#[derive(Debug, Clone)]
pub struct Row {
    pub name: String,
    pub constraint: LinearConstraint,
}

/// Mixed-integer-linear program minimizing a single column.
///
/// The first columns coincide with the variables of the model it was lowered from, auxiliary
/// indicator and product columns follow.
#[derive(Debug, Clone)]
pub struct MilpProgram {
    pub columns: Vec<Variable>,
    pub rows: Vec<Row>,
    pub objective: VarId,
    n_model_vars: usize,
    big_m: i64,
}

impl MilpProgram {
    pub fn lower(model: &Model) -> Result<Self> {
        let mut program = MilpProgram {
            columns: model.variables().to_vec(),
            rows: vec![],
            objective: model.objective(),
            n_model_vars: model.variables().len(),
            big_m: model.big_m(),
        };
        for tc in model.constraints() {
            program.lower_constraint(&tc.name, &tc.constraint)?;
        }
        Ok(program)
    }

    pub fn n_model_vars(&self) -> usize {
        self.n_model_vars
    }

    /// Whether the values (one per column) satisfy every row and column domain.
    pub fn is_satisfied_by(&self, values: &[i64]) -> bool {
        let assignment = Assignment::from_values(values.to_vec());
        values.len() == self.columns.len()
            && self.columns.iter().zip(values).all(|(c, v)| c.domain.contains(*v))
            && self.rows.iter().all(|r| r.constraint.is_satisfied(&assignment))
    }

    fn lower_constraint(&mut self, name: &str, constraint: &Constraint) -> Result<()> {
        match constraint {
            Constraint::Linear(c) => self.add_row(name.to_string(), c.clone()),
            Constraint::Disjunction(members) => self.lower_disjunction(name, members),
            Constraint::Conditional {
                flag,
                then,
                otherwise,
            } => {
                let on = LinExpr::var(*flag);
                let off = LinExpr::constant(1) - *flag;
                for (k, row) in then.iter().flat_map(|c| c.as_le_rows()).enumerate() {
                    self.add_guarded(format!("{name}_then{k}"), row, off.clone());
                }
                for (k, row) in otherwise.iter().flat_map(|c| c.as_le_rows()).enumerate() {
                    self.add_guarded(format!("{name}_else{k}"), row, on.clone());
                }
            }
            Constraint::Maximum { target, exprs } => self.lower_maximum(name, *target, exprs),
            Constraint::Cumulative { tasks, capacity } => {
                self.lower_cumulative(name, tasks, *capacity)
            }
            Constraint::LexLeq { lhs, rhs } => {
                if lhs.len() != rhs.len() {
                    return Err(Error::ModelConstruction(format!(
                        "lexicographic constraint {name} compares {} with {} expressions",
                        lhs.len(),
                        rhs.len()
                    )));
                }
                self.lower_lex_leq(name, lhs, rhs)
            }
        }
        Ok(())
    }

    /// `z_k = 1` relaxes member `k`, at most all but one member may be relaxed.
    fn lower_disjunction(&mut self, name: &str, members: &[LinearConstraint]) {
        let z = (0..members.len())
            .map(|k| self.add_column(format!("{name}_z{k}"), Domain::Boolean))
            .collect_vec();
        for (k, member) in members.iter().enumerate() {
            for (r, row) in member.as_le_rows().into_iter().enumerate() {
                let relaxed = row - LinExpr::term(z[k], self.big_m);
                self.add_row(format!("{name}_{k}_{r}"), LinearConstraint::le(relaxed, 0i64));
            }
        }
        let n_relaxed = members.len() as i64 - 1;
        self.add_row(format!("{name}_any"), LinearConstraint::le(sum(&z), n_relaxed));
    }

    /// `target >= e_k` for every `k`, and `target <= e_k` for the selected `k`.
    fn lower_maximum(&mut self, name: &str, target: VarId, exprs: &[LinExpr]) {
        let mut selectors = vec![];
        for (k, e) in exprs.iter().enumerate() {
            self.add_row(
                format!("{name}_ge{k}"),
                LinearConstraint::le(e.clone(), target),
            );
            let s = self.add_column(format!("{name}_s{k}"), Domain::Boolean);
            let row = LinExpr::var(target) - e.clone();
            self.add_guarded(format!("{name}_le{k}"), row, LinExpr::constant(1) - s);
            selectors.push(s);
        }
        self.add_row(
            format!("{name}_select"),
            LinearConstraint::equal(sum(&selectors), 1i64),
        );
    }

    /// For every ordered pair `(i, j)`: `a = 1` only if task `i` starts after `j`, `b = 1` only
    /// if `i` ends before `j` starts. If neither, `i` covers the start of `j` and its demand is
    /// counted in the load at that moment.
    fn lower_cumulative(&mut self, name: &str, tasks: &[Task], capacity: i64) {
        for (j, tj) in tasks.iter().enumerate() {
            let mut load = tj.demand.clone();
            for (i, ti) in tasks.iter().enumerate().filter(|(i, _)| *i != j) {
                let a = self.add_column(format!("{name}_after_{i}_{j}"), Domain::Boolean);
                let b = self.add_column(format!("{name}_before_{i}_{j}"), Domain::Boolean);
                let o = self.add_column(format!("{name}_cover_{i}_{j}"), Domain::Boolean);

                let after = tj.start.clone() - ti.start.clone() + 1i64;
                self.add_guarded(format!("{name}_a_{i}_{j}"), after, LinExpr::constant(1) - a);
                let before = ti.start.clone() + ti.duration.clone() - tj.start.clone();
                self.add_guarded(format!("{name}_b_{i}_{j}"), before, LinExpr::constant(1) - b);
                self.add_row(
                    format!("{name}_o_{i}_{j}"),
                    LinearConstraint::le(LinExpr::constant(1) - a - b, o),
                );

                load = match ti.demand.as_constant() {
                    Some(demand) => load + LinExpr::term(o, demand),
                    None => {
                        // p >= demand_i when covering, p >= 0 otherwise
                        let (_, hi) = self.range(&ti.demand);
                        let p = self.add_column(
                            format!("{name}_load_{i}_{j}"),
                            Domain::Integer { lb: 0, ub: hi.max(0) },
                        );
                        let row = ti.demand.clone() - p;
                        self.add_guarded(
                            format!("{name}_p_{i}_{j}"),
                            row,
                            LinExpr::constant(1) - o,
                        );
                        load + p
                    }
                };
            }
            self.add_row(
                format!("{name}_cap_{j}"),
                LinearConstraint::le(load, capacity),
            );
        }
    }

    /// `q_k = 1` when the prefixes before `k` are equal (`q_0 = 1`). Then `a_k <= b_k`, and
    /// `a_k < b_k` unless the next prefix is equal too.
    fn lower_lex_leq(&mut self, name: &str, lhs: &[LinExpr], rhs: &[LinExpr]) {
        let n = lhs.len();
        let q = std::iter::once(LinExpr::constant(1))
            .chain((1..n).map(|k| LinExpr::var(self.add_column(format!("{name}_q{k}"), Domain::Boolean))))
            .collect_vec();

        for k in 0..n {
            let diff = lhs[k].clone() - rhs[k].clone();
            let not_equal_prefix = LinExpr::constant(1) - q[k].clone();
            self.add_guarded(format!("{name}_leq{k}"), diff.clone(), not_equal_prefix.clone());
            if k + 1 < n {
                let strict = diff + 1i64;
                self.add_guarded(
                    format!("{name}_lt{k}"),
                    strict,
                    not_equal_prefix + q[k + 1].clone(),
                );
            }
        }
    }

    /// Adds `row <= M·guard` with `M` the largest value `row` can take, so the row only binds
    /// when `guard == 0`. `guard` has to be non-negative.
    fn add_guarded(&mut self, name: String, row: LinExpr, guard: LinExpr) {
        let (_, hi) = self.range(&row);
        let m = hi.max(0);
        self.add_row(name, LinearConstraint::le(row, guard * m));
    }

    fn add_column(&mut self, name: String, domain: Domain) -> VarId {
        self.columns.push(Variable::new(name, domain));
        VarId(self.columns.len() - 1)
    }

    fn add_row(&mut self, name: String, constraint: LinearConstraint) {
        self.rows.push(Row { name, constraint });
    }

    fn range(&self, e: &LinExpr) -> (i64, i64) {
        e.range(&self.columns)
    }

    /// Solves the program with `microlp` within the time limit, on the calling thread.
    /// Returns the normalized status, with the value of every column if a solution was found.
    fn solve_within(&self, time_limit: Duration) -> Result<(SolveStatus, Option<Vec<i64>>)> {
        let mut vars = ProblemVariables::new();
        let cols = self
            .columns
            .iter()
            .map(|c| {
                let def = match c.domain {
                    Domain::Boolean => variable().binary(),
                    Domain::Integer { lb, ub } => variable().integer().min(lb as f64).max(ub as f64),
                };
                vars.add(def.name(c.name.clone()))
            })
            .collect_vec();

        let to_expr = |e: &LinExpr| -> Expression {
            e.terms()
                .iter()
                .map(|&(v, coef)| coef as f64 * cols[v.index()])
                .sum::<Expression>()
                + e.constant_part() as f64
        };

        let mut problem = vars
            .minimise(cols[self.objective.index()])
            .using(microlp)
            .with_time_limit(time_limit.as_secs_f64());
        for row in &self.rows {
            let expr = to_expr(&row.constraint.expr);
            problem = match row.constraint.relation {
                Relation::Le => problem.with(constraint!(expr <= 0.0)),
                Relation::Eq => problem.with(constraint!(expr == 0.0)),
            };
        }

        match problem.solve() {
            Ok(solution) => {
                let values = cols
                    .iter()
                    .map(|v| solution.value(*v).round() as i64)
                    .collect_vec();
                let status = match solution.status() {
                    // the gap is left at zero
                    SolutionStatus::Optimal | SolutionStatus::GapLimit => SolveStatus::Optimal,
                    SolutionStatus::TimeLimit => SolveStatus::FeasibleTimeout,
                };
                Ok((status, Some(values)))
            }
            Err(ResolutionError::Infeasible) => Ok((SolveStatus::Infeasible, None)),
            // an interrupted search carries no values
            Err(ResolutionError::Other(msg)) => {
                debug!("[MILP] microlp stopped: {msg}");
                Ok((SolveStatus::TimeoutNoSolution, None))
            }
            Err(e) => Err(Error::Backend(format!("microlp: {e}"))),
        }
    }
}

fn sum(vars: &[VarId]) -> LinExpr {
    vars.iter().fold(LinExpr::default(), |acc, &v| acc + v)
}
