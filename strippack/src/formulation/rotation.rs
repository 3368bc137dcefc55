use crate::entities::SPInstance;
use crate::error::{Error, Result};
use crate::formulation::{PlacementVars, to_i64};
use crate::model::{Constraint, ConstraintKind, LinearConstraint, ModelBuilder};

/// Ties the effective dimensions of every rectangle to its rotation flag.
/// Squares are never rotated.
pub fn add_rotation_link(
    builder: &mut ModelBuilder,
    instance: &SPInstance,
    vars: &PlacementVars,
) -> Result<()> {
    let rotated = vars.rotated.as_ref().ok_or_else(|| {
        Error::ModelConstruction("rotation link requested without rotation flags".into())
    })?;

    for (i, item) in instance.items().iter().enumerate() {
        let (bw, bh) = (
            to_i64(item.width, "rectangle width")?,
            to_i64(item.height, "rectangle height")?,
        );
        let (eff_w, eff_h) = (&vars.eff_width[i], &vars.eff_height[i]);
        let upright = vec![
            LinearConstraint::equal(eff_w.clone(), bw),
            LinearConstraint::equal(eff_h.clone(), bh),
        ];

        match item.is_square() {
            true => {
                let mut fixed = upright;
                fixed.push(LinearConstraint::equal(rotated[i], 0i64));
                for (k, c) in fixed.into_iter().enumerate() {
                    builder.add(ConstraintKind::Rotation, format!("square_{i}_{k}"), c);
                }
            }
            false => {
                let turned = vec![
                    LinearConstraint::equal(eff_w.clone(), bh),
                    LinearConstraint::equal(eff_h.clone(), bw),
                ];
                builder.add(
                    ConstraintKind::Rotation,
                    format!("rotation_{i}"),
                    Constraint::Conditional {
                        flag: rotated[i],
                        then: turned,
                        otherwise: upright,
                    },
                );
            }
        }
    }
    Ok(())
}
