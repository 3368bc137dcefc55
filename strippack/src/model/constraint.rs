use crate::model::{Assignment, LinExpr, LinearConstraint, VarId};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

/// A job of a [`Constraint::Cumulative`]: occupies `demand` units of the resource during
/// `[start, start + duration)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub start: LinExpr,
    pub duration: LinExpr,
    pub demand: LinExpr,
}

/// Engine-agnostic constraint. Every backend has to lower all of the variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    Linear(LinearConstraint),
    /// At least one of the constraints holds
    Disjunction(Vec<LinearConstraint>),
    /// `flag => then` and `!flag => otherwise`
    Conditional {
        flag: VarId,
        then: Vec<LinearConstraint>,
        otherwise: Vec<LinearConstraint>,
    },
    /// At the start of every task, the summed demand of all tasks running at that moment does
    /// not exceed `capacity`
    Cumulative { tasks: Vec<Task>, capacity: i64 },
    /// `target == max(exprs)`
    Maximum { target: VarId, exprs: Vec<LinExpr> },
    /// `lhs` is lexicographically smaller than or equal to `rhs`
    LexLeq { lhs: Vec<LinExpr>, rhs: Vec<LinExpr> },
}

impl Constraint {
    pub fn is_satisfied(&self, a: &Assignment) -> bool {
        match self {
            Constraint::Linear(c) => c.is_satisfied(a),
            Constraint::Disjunction(cs) => cs.iter().any(|c| c.is_satisfied(a)),
            Constraint::Conditional {
                flag,
                then,
                otherwise,
            } => match a.flag(*flag) {
                true => then.iter().all(|c| c.is_satisfied(a)),
                false => otherwise.iter().all(|c| c.is_satisfied(a)),
            },
            Constraint::Cumulative { tasks, capacity } => {
                let evaluated: Vec<(i64, i64, i64)> = tasks
                    .iter()
                    .map(|t| (t.start.eval(a), t.duration.eval(a), t.demand.eval(a)))
                    .collect();
                evaluated.iter().all(|&(t, _, _)| {
                    let load: i64 = evaluated
                        .iter()
                        .filter(|&&(s, d, _)| s <= t && t < s + d)
                        .map(|&(_, _, demand)| demand)
                        .sum();
                    load <= *capacity
                })
            }
            Constraint::Maximum { target, exprs } => {
                exprs.iter().map(|e| e.eval(a)).max() == Some(a.value(*target))
            }
            Constraint::LexLeq { lhs, rhs } => {
                let l = lhs.iter().map(|e| e.eval(a));
                let r = rhs.iter().map(|e| e.eval(a));
                l.cmp(r) != Ordering::Greater
            }
        }
    }

    /// All variables the constraint refers to, possibly with duplicates.
    pub fn vars(&self) -> Vec<VarId> {
        let lin = |cs: &[LinearConstraint]| cs.iter().flat_map(|c| c.expr.vars()).collect::<Vec<_>>();
        match self {
            Constraint::Linear(c) => c.expr.vars().collect(),
            Constraint::Disjunction(cs) => lin(cs),
            Constraint::Conditional {
                flag,
                then,
                otherwise,
            } => std::iter::once(*flag)
                .chain(lin(then))
                .chain(lin(otherwise))
                .collect(),
            Constraint::Cumulative { tasks, .. } => tasks
                .iter()
                .flat_map(|t| t.start.vars().chain(t.duration.vars()).chain(t.demand.vars()))
                .collect(),
            Constraint::Maximum { target, exprs } => std::iter::once(*target)
                .chain(exprs.iter().flat_map(|e| e.vars()))
                .collect(),
            Constraint::LexLeq { lhs, rhs } => {
                lhs.iter().chain(rhs).flat_map(|e| e.vars()).collect()
            }
        }
    }
}

impl From<LinearConstraint> for Constraint {
    fn from(c: LinearConstraint) -> Self {
        Constraint::Linear(c)
    }
}

/// Family a constraint belongs to. Used for reporting and for locating violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConstraintKind {
    Containment,
    NonOverlap,
    HeightDefinition,
    Cumulative,
    Rotation,
    Symmetry,
}

impl Display for ConstraintKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ConstraintKind::Containment => "containment",
            ConstraintKind::NonOverlap => "non-overlap",
            ConstraintKind::HeightDefinition => "height definition",
            ConstraintKind::Cumulative => "cumulative",
            ConstraintKind::Rotation => "rotation",
            ConstraintKind::Symmetry => "symmetry breaking",
        };
        write!(f, "{s}")
    }
}

/// A constraint together with its family and a human readable name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedConstraint {
    pub kind: ConstraintKind,
    pub name: String,
    pub constraint: Constraint,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment(values: &[i64]) -> Assignment {
        Assignment::from_values(values.to_vec())
    }

    #[test]
    fn disjunction_needs_a_single_member() {
        let (a, b) = (VarId(0), VarId(1));
        let c = Constraint::Disjunction(vec![
            LinearConstraint::le(LinExpr::var(a) + 2i64, b),
            LinearConstraint::le(LinExpr::var(b) + 2i64, a),
        ]);
        assert!(c.is_satisfied(&assignment(&[0, 2])));
        assert!(c.is_satisfied(&assignment(&[5, 2])));
        assert!(!c.is_satisfied(&assignment(&[1, 2])));
    }

    #[test]
    fn conditional_follows_the_flag() {
        let (flag, w) = (VarId(0), VarId(1));
        let c = Constraint::Conditional {
            flag,
            then: vec![LinearConstraint::equal(w, 3i64)],
            otherwise: vec![LinearConstraint::equal(w, 5i64)],
        };
        assert!(c.is_satisfied(&assignment(&[1, 3])));
        assert!(c.is_satisfied(&assignment(&[0, 5])));
        assert!(!c.is_satisfied(&assignment(&[1, 5])));
    }

    #[test]
    fn cumulative_counts_running_tasks_only() {
        // two tasks of demand 6 on a capacity of 10
        let (s0, s1) = (VarId(0), VarId(1));
        let task = |s: VarId| Task {
            start: LinExpr::var(s),
            duration: LinExpr::constant(2),
            demand: LinExpr::constant(6),
        };
        let c = Constraint::Cumulative {
            tasks: vec![task(s0), task(s1)],
            capacity: 10,
        };
        assert!(c.is_satisfied(&assignment(&[0, 2])));
        assert!(!c.is_satisfied(&assignment(&[0, 1])));
        assert!(!c.is_satisfied(&assignment(&[3, 3])));
    }

    #[test]
    fn maximum_and_lex() {
        let (h, a, b) = (VarId(0), VarId(1), VarId(2));
        let max = Constraint::Maximum {
            target: h,
            exprs: vec![LinExpr::var(a) + 1i64, LinExpr::var(b)],
        };
        assert!(max.is_satisfied(&assignment(&[4, 3, 2])));
        assert!(!max.is_satisfied(&assignment(&[5, 3, 2])));

        let lex = Constraint::LexLeq {
            lhs: vec![LinExpr::var(a), LinExpr::var(b)],
            rhs: vec![LinExpr::constant(3), LinExpr::constant(1)],
        };
        assert!(lex.is_satisfied(&assignment(&[0, 2, 9])));
        assert!(lex.is_satisfied(&assignment(&[0, 3, 1])));
        assert!(!lex.is_satisfied(&assignment(&[0, 3, 2])));
    }
}
