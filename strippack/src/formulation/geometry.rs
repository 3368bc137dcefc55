use crate::formulation::PlacementVars;
use crate::model::{Constraint, ConstraintKind, LinExpr, LinearConstraint, ModelBuilder};
use itertools::Itertools;

/// Keeps every rectangle inside the strip: `x + effW <= width` and `y + effH <= height`.
pub fn add_containment(builder: &mut ModelBuilder, vars: &PlacementVars, width: i64) {
    for i in 0..vars.n_items() {
        builder.add(
            ConstraintKind::Containment,
            format!("fit_x_{i}"),
            LinearConstraint::le(LinExpr::var(vars.x[i]) + vars.eff_width[i].clone(), width),
        );
        builder.add(
            ConstraintKind::Containment,
            format!("fit_y_{i}"),
            LinearConstraint::le(
                LinExpr::var(vars.y[i]) + vars.eff_height[i].clone(),
                vars.height,
            ),
        );
    }
}

/// For every pair of rectangles: one is left of or below the other.
///
/// The disjunction is symmetric in both rectangles, so it is emitted once per unordered pair.
pub fn add_non_overlap(builder: &mut ModelBuilder, vars: &PlacementVars) {
    for (i, j) in (0..vars.n_items()).tuple_combinations() {
        builder.add(
            ConstraintKind::NonOverlap,
            format!("no_overlap_{i}_{j}"),
            Constraint::Disjunction(separations(vars, i, j)),
        );
    }
}

/// The four ways in which rectangles `i` and `j` can be separated.
pub fn separations(vars: &PlacementVars, i: usize, j: usize) -> Vec<LinearConstraint> {
    let left = |a: usize, b: usize| {
        LinearConstraint::le(LinExpr::var(vars.x[a]) + vars.eff_width[a].clone(), vars.x[b])
    };
    let below = |a: usize, b: usize| {
        LinearConstraint::le(LinExpr::var(vars.y[a]) + vars.eff_height[a].clone(), vars.y[b])
    };
    vec![left(i, j), left(j, i), below(i, j), below(j, i)]
}

/// Defines the strip height as the top of the highest rectangle.
pub fn add_height_definition(builder: &mut ModelBuilder, vars: &PlacementVars) {
    let tops = (0..vars.n_items())
        .map(|i| LinExpr::var(vars.y[i]) + vars.eff_height[i].clone())
        .collect_vec();
    builder.add(
        ConstraintKind::HeightDefinition,
        "height",
        Constraint::Maximum {
            target: vars.height,
            exprs: tops,
        },
    );
}
