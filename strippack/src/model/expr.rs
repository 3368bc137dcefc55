use crate::model::{Assignment, Variable};
use itertools::Itertools;
use std::fmt::{Display, Formatter};
use std::ops::{Add, Mul, Neg, Sub};

/// Index of a variable within a [`Model`](crate::model::Model).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub(crate) usize);

impl VarId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Integer linear expression: `Σ coef·var + constant`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinExpr {
    terms: Vec<(VarId, i64)>,
    constant: i64,
}

impl LinExpr {
    pub fn constant(value: i64) -> Self {
        Self {
            terms: vec![],
            constant: value,
        }
    }

    pub fn var(var: VarId) -> Self {
        Self::term(var, 1)
    }

    pub fn term(var: VarId, coef: i64) -> Self {
        Self {
            terms: vec![(var, coef)],
            constant: 0,
        }
        .normalized()
    }

    pub fn terms(&self) -> &[(VarId, i64)] {
        &self.terms
    }

    pub fn constant_part(&self) -> i64 {
        self.constant
    }

    /// Returns the value of the expression if it does not depend on any variable.
    pub fn as_constant(&self) -> Option<i64> {
        self.terms.is_empty().then_some(self.constant)
    }

    /// Returns the variable if the expression is exactly `1·var`.
    pub fn as_var(&self) -> Option<VarId> {
        match (self.terms.as_slice(), self.constant) {
            ([(v, 1)], 0) => Some(*v),
            _ => None,
        }
    }

    pub fn eval(&self, assignment: &Assignment) -> i64 {
        self.constant
            + self
                .terms
                .iter()
                .map(|&(v, c)| c * assignment.value(v))
                .sum::<i64>()
    }

    /// Smallest and largest value the expression can take over the variable domains.
    pub fn range(&self, variables: &[Variable]) -> (i64, i64) {
        self.terms
            .iter()
            .fold((self.constant, self.constant), |(lo, hi), &(v, c)| {
                let (lb, ub) = variables[v.0].domain.bounds();
                match c >= 0 {
                    true => (lo + c * lb, hi + c * ub),
                    false => (lo + c * ub, hi + c * lb),
                }
            })
    }

    pub fn vars(&self) -> impl Iterator<Item = VarId> + '_ {
        self.terms.iter().map(|(v, _)| *v)
    }

    /// Merges duplicate variables and drops zero coefficients.
    fn normalized(mut self) -> Self {
        self.terms.sort_by_key(|(v, _)| *v);
        self.terms = self
            .terms
            .into_iter()
            .coalesce(|(v1, c1), (v2, c2)| match v1 == v2 {
                true => Ok((v1, c1 + c2)),
                false => Err(((v1, c1), (v2, c2))),
            })
            .filter(|(_, c)| *c != 0)
            .collect();
        self
    }
}

impl From<VarId> for LinExpr {
    fn from(var: VarId) -> Self {
        LinExpr::var(var)
    }
}

impl From<i64> for LinExpr {
    fn from(value: i64) -> Self {
        LinExpr::constant(value)
    }
}

impl<T: Into<LinExpr>> Add<T> for LinExpr {
    type Output = LinExpr;

    fn add(mut self, rhs: T) -> LinExpr {
        let rhs = rhs.into();
        self.terms.extend(rhs.terms);
        self.constant += rhs.constant;
        self.normalized()
    }
}

impl<T: Into<LinExpr>> Sub<T> for LinExpr {
    type Output = LinExpr;

    fn sub(self, rhs: T) -> LinExpr {
        self + (-rhs.into())
    }
}

impl Neg for LinExpr {
    type Output = LinExpr;

    fn neg(self) -> LinExpr {
        self * -1
    }
}

impl Mul<i64> for LinExpr {
    type Output = LinExpr;

    fn mul(mut self, rhs: i64) -> LinExpr {
        self.terms.iter_mut().for_each(|(_, c)| *c *= rhs);
        self.constant *= rhs;
        self.normalized()
    }
}

impl Display for LinExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let terms = self
            .terms
            .iter()
            .map(|(v, c)| format!("{c}·v{}", v.0))
            .chain((self.constant != 0 || self.terms.is_empty()).then(|| self.constant.to_string()))
            .join(" + ");
        write!(f, "{terms}")
    }
}

/// Relation between a [`LinExpr`] and zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// `expr <= 0`
    Le,
    /// `expr == 0`
    Eq,
}

/// A linear (in)equality, normalized as `expr <= 0` or `expr == 0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearConstraint {
    pub expr: LinExpr,
    pub relation: Relation,
}

impl LinearConstraint {
    /// `lhs <= rhs`
    pub fn le(lhs: impl Into<LinExpr>, rhs: impl Into<LinExpr>) -> Self {
        Self {
            expr: lhs.into() - rhs.into(),
            relation: Relation::Le,
        }
    }

    /// `lhs == rhs`
    pub fn equal(lhs: impl Into<LinExpr>, rhs: impl Into<LinExpr>) -> Self {
        Self {
            expr: lhs.into() - rhs.into(),
            relation: Relation::Eq,
        }
    }

    pub fn is_satisfied(&self, assignment: &Assignment) -> bool {
        let value = self.expr.eval(assignment);
        match self.relation {
            Relation::Le => value <= 0,
            Relation::Eq => value == 0,
        }
    }

    /// Splits the constraint into `expr <= 0` rows only.
    pub fn as_le_rows(&self) -> Vec<LinExpr> {
        match self.relation {
            Relation::Le => vec![self.expr.clone()],
            Relation::Eq => vec![self.expr.clone(), -self.expr.clone()],
        }
    }
}

impl Display for LinearConstraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.relation {
            Relation::Le => write!(f, "{} <= 0", self.expr),
            Relation::Eq => write!(f, "{} == 0", self.expr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Domain;

    #[test]
    fn arithmetic_merges_terms() {
        let (a, b) = (VarId(0), VarId(1));
        let e = LinExpr::var(a) + b + 3i64 - LinExpr::term(a, 2) + LinExpr::var(a);
        assert_eq!(e.terms(), &[(b, 1)]);
        assert_eq!(e.constant_part(), 3);
        assert_eq!((LinExpr::var(a) - a).as_constant(), Some(0));
    }

    #[test]
    fn eval_and_range() {
        let (a, b) = (VarId(0), VarId(1));
        let variables = vec![
            Variable::new("a", Domain::Integer { lb: 0, ub: 10 }),
            Variable::new("b", Domain::Boolean),
        ];
        let e = LinExpr::term(a, 2) - LinExpr::term(b, 5) + 1i64;
        assert_eq!(e.range(&variables), (-4, 21));

        let assignment = Assignment::from_values(vec![3, 1]);
        assert_eq!(e.eval(&assignment), 2);
        assert!(!LinearConstraint::le(e.clone(), 1i64).is_satisfied(&assignment));
        assert!(LinearConstraint::equal(e, 2i64).is_satisfied(&assignment));
    }
}
