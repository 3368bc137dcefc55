use crate::error::{Error, Result};
use crate::model::{Assignment, Constraint, LinExpr, LinearConstraint, Model, Relation, Task};
use crate::solver::{SolveStatus, SolverBackend, SolverOutcome};
use itertools::Itertools;
use log::{debug, info};
use std::time::{Duration, Instant};
use z3::ast::{Ast, Bool, Int};
use z3::{Config, Context, Optimize, Params, SatResult};

/// Z3 backend. Disjunctions, conditionals, cumulative sums and lexicographic order are asserted
/// natively.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmtBackend;

impl SolverBackend for SmtBackend {
    fn solve(&self, model: &Model, time_limit: Duration) -> Result<SolverOutcome> {
        if time_limit.is_zero() {
            return Ok(SolverOutcome::without_solution(SolveStatus::TimeoutNoSolution));
        }

        let ctx = Context::new(&Config::new());
        let encoder = SmtEncoder::new(&ctx, model);
        let opt = Optimize::new(&ctx);

        let mut params = Params::new(&ctx);
        params.set_u32("timeout", u32::try_from(time_limit.as_millis()).unwrap_or(u32::MAX));
        opt.set_params(&params);

        for domain in encoder.domains(model) {
            opt.assert(&domain);
        }
        for tc in model.constraints() {
            opt.assert(&encoder.constraint(&tc.constraint)?);
        }
        opt.minimize(&encoder.vars[model.objective().index()]);
        info!(
            "[SMT] asserted {} variables and {} constraints",
            model.variables().len(),
            model.constraints().len()
        );

        let start = Instant::now();
        let result = opt.check(&[]);
        // an interrupted search may still hold its best model
        let assignment = match result {
            SatResult::Unsat => None,
            SatResult::Sat | SatResult::Unknown => {
                opt.get_model().map(|m| encoder.read(&m)).transpose()?
            }
        };
        let outcome = normalize(result, assignment)?;
        debug!(
            "[SMT] {} after {:.3}s",
            outcome.status,
            start.elapsed().as_secs_f64()
        );
        Ok(outcome)
    }

    fn name(&self) -> &str {
        "smt"
    }
}

/// Maps the answer of the optimizer, and the model it holds if any, onto the four-way status.
fn normalize(result: SatResult, assignment: Option<Assignment>) -> Result<SolverOutcome> {
    let outcome = match (result, assignment) {
        (SatResult::Sat, Some(assignment)) => SolverOutcome {
            status: SolveStatus::Optimal,
            assignment: Some(assignment),
        },
        (SatResult::Sat, None) => {
            return Err(Error::Backend("z3 reported sat without a model".into()));
        }
        (SatResult::Unsat, _) => SolverOutcome::without_solution(SolveStatus::Infeasible),
        (SatResult::Unknown, Some(assignment)) => SolverOutcome {
            status: SolveStatus::FeasibleTimeout,
            assignment: Some(assignment),
        },
        (SatResult::Unknown, None) => {
            SolverOutcome::without_solution(SolveStatus::TimeoutNoSolution)
        }
    };
    Ok(outcome)
}

struct SmtEncoder<'ctx> {
    ctx: &'ctx Context,
    vars: Vec<Int<'ctx>>,
}

impl<'ctx> SmtEncoder<'ctx> {
    fn new(ctx: &'ctx Context, model: &Model) -> Self {
        let vars = model
            .variables()
            .iter()
            .map(|v| Int::new_const(ctx, v.name.as_str()))
            .collect();
        Self { ctx, vars }
    }

    fn int(&self, value: i64) -> Int<'ctx> {
        Int::from_i64(self.ctx, value)
    }

    fn domains(&self, model: &Model) -> Vec<Bool<'ctx>> {
        model
            .variables()
            .iter()
            .zip(&self.vars)
            .flat_map(|(v, var)| {
                let (lb, ub) = v.domain.bounds();
                [self.int(lb).le(var), var.le(&self.int(ub))]
            })
            .collect()
    }

    fn expr(&self, e: &LinExpr) -> Int<'ctx> {
        let terms = e
            .terms()
            .iter()
            .map(|&(v, coef)| match coef {
                1 => self.vars[v.index()].clone(),
                _ => Int::mul(self.ctx, &[&self.int(coef), &self.vars[v.index()]]),
            })
            .chain(std::iter::once(self.int(e.constant_part())))
            .collect_vec();
        Int::add(self.ctx, &terms.iter().collect_vec())
    }

    fn linear(&self, c: &LinearConstraint) -> Bool<'ctx> {
        let e = self.expr(&c.expr);
        match c.relation {
            Relation::Le => e.le(&self.int(0)),
            Relation::Eq => e._eq(&self.int(0)),
        }
    }

    fn and(&self, bs: &[Bool<'ctx>]) -> Bool<'ctx> {
        match bs {
            [] => Bool::from_bool(self.ctx, true),
            _ => Bool::and(self.ctx, &bs.iter().collect_vec()),
        }
    }

    fn or(&self, bs: &[Bool<'ctx>]) -> Bool<'ctx> {
        match bs {
            [] => Bool::from_bool(self.ctx, false),
            _ => Bool::or(self.ctx, &bs.iter().collect_vec()),
        }
    }

    fn all(&self, cs: &[LinearConstraint]) -> Bool<'ctx> {
        self.and(&cs.iter().map(|c| self.linear(c)).collect_vec())
    }

    fn constraint(&self, constraint: &Constraint) -> Result<Bool<'ctx>> {
        let encoded = match constraint {
            Constraint::Linear(c) => self.linear(c),
            Constraint::Disjunction(cs) => self.or(&cs.iter().map(|c| self.linear(c)).collect_vec()),
            Constraint::Conditional {
                flag,
                then,
                otherwise,
            } => {
                let flag = self.vars[flag.index()]._eq(&self.int(1));
                flag.ite(&self.all(then), &self.all(otherwise))
            }
            Constraint::Maximum { target, exprs } => {
                let target = &self.vars[target.index()];
                let exprs = exprs.iter().map(|e| self.expr(e)).collect_vec();
                let bounded = exprs.iter().map(|e| e.le(target)).collect_vec();
                let attained = exprs.iter().map(|e| e._eq(target)).collect_vec();
                self.and(&[self.and(&bounded), self.or(&attained)])
            }
            Constraint::Cumulative { tasks, capacity } => self.cumulative(tasks, *capacity),
            Constraint::LexLeq { lhs, rhs } => {
                if lhs.len() != rhs.len() {
                    return Err(Error::ModelConstruction(format!(
                        "lexicographic constraint compares {} with {} expressions",
                        lhs.len(),
                        rhs.len()
                    )));
                }
                // built back to front: a_k < b_k or (a_k == b_k and rest)
                lhs.iter()
                    .zip(rhs)
                    .rev()
                    .fold(Bool::from_bool(self.ctx, true), |rest, (a, b)| {
                        let (a, b) = (self.expr(a), self.expr(b));
                        self.or(&[a.lt(&b), self.and(&[a._eq(&b), rest])])
                    })
            }
        };
        Ok(encoded)
    }

    /// At the start of every task, the demands of the tasks running at that moment fit within
    /// the capacity.
    fn cumulative(&self, tasks: &[Task], capacity: i64) -> Bool<'ctx> {
        let starts = tasks.iter().map(|t| self.expr(&t.start)).collect_vec();
        let ends = tasks
            .iter()
            .map(|t| self.expr(&(t.start.clone() + t.duration.clone())))
            .collect_vec();
        let demands = tasks.iter().map(|t| self.expr(&t.demand)).collect_vec();

        let per_start = starts
            .iter()
            .map(|at| {
                let load = starts
                    .iter()
                    .zip(&ends)
                    .zip(&demands)
                    .map(|((s, e), d)| {
                        let running = self.and(&[s.le(at), at.lt(e)]);
                        running.ite(d, &self.int(0))
                    })
                    .collect_vec();
                Int::add(self.ctx, &load.iter().collect_vec()).le(&self.int(capacity))
            })
            .collect_vec();
        self.and(&per_start)
    }

    fn read(&self, z3_model: &z3::Model<'ctx>) -> Result<Assignment> {
        let values = self
            .vars
            .iter()
            .map(|v| {
                z3_model
                    .eval(v, true)
                    .and_then(|value| value.as_i64())
                    .ok_or_else(|| Error::Backend(format!("z3 model has no integer value for {v}")))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Assignment::from_values(values))
    }
}
