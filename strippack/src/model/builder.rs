use crate::error::{Error, Result};
use crate::model::{Constraint, ConstraintKind, TaggedConstraint, VarId};
use itertools::Itertools;
use log::debug;
use std::collections::BTreeMap;

/// Set of values a variable may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Integer { lb: i64, ub: i64 },
    Boolean,
}

impl Domain {
    pub fn bounds(&self) -> (i64, i64) {
        match self {
            Domain::Integer { lb, ub } => (*lb, *ub),
            Domain::Boolean => (0, 1),
        }
    }

    pub fn contains(&self, value: i64) -> bool {
        let (lb, ub) = self.bounds();
        (lb..=ub).contains(&value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub domain: Domain,
}

impl Variable {
    pub fn new(name: impl Into<String>, domain: Domain) -> Self {
        Self {
            name: name.into(),
            domain,
        }
    }
}

/// Accumulates variables and constraints. Consumed by [`ModelBuilder::build`], which produces
/// an immutable [`Model`].
#[derive(Debug, Clone)]
pub struct ModelBuilder {
    variables: Vec<Variable>,
    constraints: Vec<TaggedConstraint>,
    objective: Option<VarId>,
    big_m: i64,
}

impl ModelBuilder {
    pub fn new(big_m: i64) -> Self {
        Self {
            variables: vec![],
            constraints: vec![],
            objective: None,
            big_m,
        }
    }

    pub fn int_var(&mut self, name: impl Into<String>, lb: i64, ub: i64) -> VarId {
        self.push_var(Variable::new(name, Domain::Integer { lb, ub }))
    }

    pub fn bool_var(&mut self, name: impl Into<String>) -> VarId {
        self.push_var(Variable::new(name, Domain::Boolean))
    }

    fn push_var(&mut self, variable: Variable) -> VarId {
        self.variables.push(variable);
        VarId(self.variables.len() - 1)
    }

    pub fn add(
        &mut self,
        kind: ConstraintKind,
        name: impl Into<String>,
        constraint: impl Into<Constraint>,
    ) {
        self.constraints.push(TaggedConstraint {
            kind,
            name: name.into(),
            constraint: constraint.into(),
        });
    }

    pub fn minimize(&mut self, var: VarId) {
        self.objective = Some(var);
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn build(self) -> Result<Model> {
        let objective = self
            .objective
            .ok_or_else(|| Error::ModelConstruction("no objective was set".into()))?;

        if let Some(v) = self.variables.iter().find(|v| {
            let (lb, ub) = v.domain.bounds();
            lb > ub
        }) {
            return Err(Error::ModelConstruction(format!(
                "variable {} has an empty domain {:?}",
                v.name, v.domain
            )));
        }

        let n_vars = self.variables.len();
        let dangling = std::iter::once(objective)
            .chain(self.constraints.iter().flat_map(|c| c.constraint.vars()))
            .find(|v| v.0 >= n_vars);
        if let Some(v) = dangling {
            return Err(Error::ModelConstruction(format!(
                "reference to unknown variable v{} ({n_vars} variables)",
                v.0
            )));
        }

        if self.big_m <= 0 {
            return Err(Error::ModelConstruction(format!(
                "big-M constant must be positive, got {}",
                self.big_m
            )));
        }

        let model = Model {
            variables: self.variables,
            constraints: self.constraints,
            objective,
            big_m: self.big_m,
        };
        debug!(
            "[MODEL] built with {} variables and {} constraints",
            model.variables.len(),
            model.constraints.len()
        );
        Ok(model)
    }
}

/// Immutable optimization model: minimize a single variable subject to a list of constraints.
#[derive(Debug, Clone)]
pub struct Model {
    variables: Vec<Variable>,
    constraints: Vec<TaggedConstraint>,
    objective: VarId,
    big_m: i64,
}

impl Model {
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, var: VarId) -> &Variable {
        &self.variables[var.0]
    }

    pub fn constraints(&self) -> &[TaggedConstraint] {
        &self.constraints
    }

    /// Variable to be minimized
    pub fn objective(&self) -> VarId {
        self.objective
    }

    /// Constant used to relax disjunctions in linear lowerings
    pub fn big_m(&self) -> i64 {
        self.big_m
    }

    pub fn count_by_kind(&self) -> BTreeMap<ConstraintKind, usize> {
        self.constraints.iter().counts_by(|c| c.kind).into_iter().collect()
    }

    /// First domain or constraint violated by the assignment, if any.
    pub fn first_violation(&self, assignment: &Assignment) -> Option<String> {
        if assignment.len() != self.variables.len() {
            return Some(format!(
                "assignment has {} values for {} variables",
                assignment.len(),
                self.variables.len()
            ));
        }
        let domain_violation = self
            .variables
            .iter()
            .zip(assignment.values())
            .find(|(v, val)| !v.domain.contains(**val))
            .map(|(v, val)| format!("{} = {val} outside of {:?}", v.name, v.domain));

        domain_violation.or_else(|| {
            self.constraints
                .iter()
                .find(|c| !c.constraint.is_satisfied(assignment))
                .map(|c| format!("{} constraint {} violated", c.kind, c.name))
        })
    }
}

/// Value for every variable of a [`Model`], indexed by [`VarId`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Assignment {
    values: Vec<i64>,
}

impl Assignment {
    pub fn from_values(values: Vec<i64>) -> Self {
        Self { values }
    }

    pub fn value(&self, var: VarId) -> i64 {
        self.values[var.0]
    }

    pub fn flag(&self, var: VarId) -> bool {
        self.values[var.0] != 0
    }

    pub fn set(&mut self, var: VarId, value: i64) {
        self.values[var.0] = value;
    }

    pub fn values(&self) -> &[i64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LinExpr, LinearConstraint};

    #[test]
    fn build_requires_an_objective() {
        let mut builder = ModelBuilder::new(10);
        builder.int_var("x", 0, 5);
        assert!(matches!(builder.build(), Err(Error::ModelConstruction(_))));
    }

    #[test]
    fn build_rejects_empty_domains_and_dangling_vars() {
        let mut builder = ModelBuilder::new(10);
        let x = builder.int_var("x", 3, 2);
        builder.minimize(x);
        assert!(builder.build().is_err());

        let mut builder = ModelBuilder::new(10);
        let x = builder.int_var("x", 0, 2);
        builder.minimize(x);
        builder.add(
            ConstraintKind::Containment,
            "dangling",
            LinearConstraint::le(VarId(7), x),
        );
        assert!(builder.build().is_err());
    }

    #[test]
    fn first_violation_reports_domains_then_constraints() {
        let mut builder = ModelBuilder::new(10);
        let x = builder.int_var("x", 0, 5);
        let y = builder.int_var("y", 0, 5);
        builder.add(
            ConstraintKind::Containment,
            "x+y<=6",
            LinearConstraint::le(LinExpr::var(x) + y, 6i64),
        );
        builder.minimize(y);
        let model = builder.build().unwrap();

        assert_eq!(model.first_violation(&Assignment::from_values(vec![2, 3])), None);
        assert!(
            model
                .first_violation(&Assignment::from_values(vec![9, 0]))
                .unwrap()
                .contains("outside")
        );
        assert!(
            model
                .first_violation(&Assignment::from_values(vec![4, 4]))
                .unwrap()
                .contains("x+y<=6")
        );
        assert_eq!(model.count_by_kind()[&ConstraintKind::Containment], 1);
    }
}
