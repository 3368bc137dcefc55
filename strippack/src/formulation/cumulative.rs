use crate::formulation::PlacementVars;
use crate::model::{Constraint, ConstraintKind, LinExpr, ModelBuilder, Task};

/// Views the strip as a resource of capacity `width` along the vertical axis: every rectangle is
/// a task starting at `y`, lasting `effH` and consuming `effW`.
///
/// Implied by non-overlap, it only strengthens the propagation of the engines.
pub fn add_cumulative(builder: &mut ModelBuilder, vars: &PlacementVars, width: i64) {
    let tasks = (0..vars.n_items())
        .map(|i| Task {
            start: LinExpr::var(vars.y[i]),
            duration: vars.eff_height[i].clone(),
            demand: vars.eff_width[i].clone(),
        })
        .collect();
    builder.add(
        ConstraintKind::Cumulative,
        "cumulative_y",
        Constraint::Cumulative {
            tasks,
            capacity: width,
        },
    );
}
