use crate::formulation::PlacementVars;
use crate::model::{Constraint, ConstraintKind, LinExpr, ModelBuilder};
use itertools::Itertools;

/// Requires the x-coordinates to be lexicographically smaller than or equal to those of the
/// horizontally mirrored layout, `x'[i] = width - x[i] - effW[i]`.
///
/// Mirroring maps feasible layouts onto feasible layouts of the same height, and either a layout
/// or its mirror satisfies the ordering, so no optimum is cut off.
pub fn add_symmetry_breaking(builder: &mut ModelBuilder, vars: &PlacementVars, width: i64) {
    let lhs = vars.x.iter().map(|&x| LinExpr::var(x)).collect_vec();
    let rhs = mirrored_x(vars, width);
    builder.add(
        ConstraintKind::Symmetry,
        "lex_mirror_x",
        Constraint::LexLeq { lhs, rhs },
    );
}

pub fn mirrored_x(vars: &PlacementVars, width: i64) -> Vec<LinExpr> {
    (0..vars.n_items())
        .map(|i| LinExpr::constant(width) - vars.x[i] - vars.eff_width[i].clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::bounds::shelf_packing;
    use crate::decode::encode;
    use crate::entities::{Packing, SPInstance};
    use crate::formulation::{FormulationConfig, formulate};
    use crate::model::ConstraintKind;
    use test_case::test_case;

    fn satisfies_lex(instance: &SPInstance, packing: &Packing) -> bool {
        let f = formulate(instance, &FormulationConfig::default()).unwrap();
        let assignment = encode(&f.vars, &f.model, packing);
        f.model
            .constraints()
            .iter()
            .filter(|c| c.kind == ConstraintKind::Symmetry)
            .all(|c| c.constraint.is_satisfied(&assignment))
    }

    #[test_case(10, &[4, 6, 4], &[3, 2, 2]; "three rectangles")]
    #[test_case(8, &[3, 3, 3, 3, 5, 5], &[3, 4, 5, 6, 3, 5]; "six rectangles")]
    #[test_case(9, &[2, 2, 2], &[1, 2, 3]; "narrow rectangles")]
    #[test_case(5, &[5], &[7]; "full width")]
    fn layout_or_mirror_satisfies_lex(width: u64, widths: &[u64], heights: &[u64]) {
        let instance = SPInstance::new(width, widths, heights).unwrap();
        let packing = shelf_packing(&instance);
        let mirrored = packing.mirrored();

        assert!(satisfies_lex(&instance, &packing) || satisfies_lex(&instance, &mirrored));
    }

    #[test]
    fn asymmetric_layout_only_one_side() {
        let instance = SPInstance::new(10, &[4, 6, 4], &[3, 2, 2]).unwrap();
        let packing = shelf_packing(&instance);
        // rectangle 0 at x = 0 with mirror 6: strictly smaller
        assert_eq!(packing.placements[0].x, 0);
        assert!(satisfies_lex(&instance, &packing));
        assert!(!satisfies_lex(&instance, &packing.mirrored()));
    }
}
