use crate::entities::{Packing, Placement};
use crate::error::{Result, ValidationError};
use crate::formulation::PlacementVars;
use crate::model::{Assignment, LinExpr, Model};

/// Reads the layout out of a solver assignment.
///
/// The declared height is taken from the height variable as is, tightness is left to the validator.
pub fn decode(vars: &PlacementVars, assignment: &Assignment, width: u64) -> Result<Packing> {
    let placements = (0..vars.n_items())
        .map(|i| {
            let rotated = vars
                .rotated
                .as_ref()
                .is_some_and(|r| assignment.flag(r[i]));
            Ok(Placement {
                x: non_negative(format!("x_{i}"), assignment.value(vars.x[i]))?,
                y: non_negative(format!("y_{i}"), assignment.value(vars.y[i]))?,
                width: non_negative(format!("w_{i}"), vars.eff_width[i].eval(assignment))?,
                height: non_negative(format!("h_{i}"), vars.eff_height[i].eval(assignment))?,
                rotated,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let height = non_negative("height".into(), assignment.value(vars.height))?;

    Ok(Packing {
        width,
        height,
        placements,
    })
}

/// Inverse of [`decode`]: an assignment of the model variables describing the packing.
/// Variables which do not describe the layout are left at zero.
pub fn encode(vars: &PlacementVars, model: &Model, packing: &Packing) -> Assignment {
    let mut assignment = Assignment::from_values(vec![0; model.variables().len()]);
    let set_expr = |a: &mut Assignment, e: &LinExpr, value: u64| {
        if let Some(v) = e.as_var() {
            a.set(v, value as i64);
        }
    };

    for (i, p) in packing.placements.iter().enumerate().take(vars.n_items()) {
        assignment.set(vars.x[i], p.x as i64);
        assignment.set(vars.y[i], p.y as i64);
        set_expr(&mut assignment, &vars.eff_width[i], p.width);
        set_expr(&mut assignment, &vars.eff_height[i], p.height);
        if let Some(rotated) = &vars.rotated {
            assignment.set(rotated[i], p.rotated as i64);
        }
    }
    assignment.set(vars.height, packing.height as i64);
    assignment
}

fn non_negative(name: String, value: i64) -> Result<u64> {
    u64::try_from(value).map_err(|_| ValidationError::InvalidValue { name, value }.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::SPInstance;
    use crate::formulation::{FormulationConfig, formulate};
    use crate::util::assertions::validate_packing;
    use test_case::test_case;

    fn layout() -> Packing {
        let p = |x, y, width, height, rotated| Placement {
            x,
            y,
            width,
            height,
            rotated,
        };
        Packing::fitted(
            10,
            vec![
                p(0, 0, 4, 3, false),
                p(4, 0, 6, 2, false),
                p(4, 2, 2, 4, true),
            ],
        )
    }

    #[test_case(false, false; "fixed, plain")]
    #[test_case(true, false; "rotation, plain")]
    #[test_case(true, true; "rotation, all constraints")]
    fn decode_inverts_encode(rotation: bool, extras: bool) {
        let instance = SPInstance::new(10, &[4, 6, 4], &[3, 2, 2]).unwrap();
        let config = FormulationConfig {
            rotation,
            cumulative: extras,
            symmetry_breaking: extras,
        };
        let f = formulate(&instance, &config).unwrap();
        let packing = match rotation {
            true => layout(),
            false => shelf(),
        };
        let assignment = encode(&f.vars, &f.model, &packing);
        assert_eq!(decode(&f.vars, &assignment, 10).unwrap(), packing);
        assert_eq!(validate_packing(&instance, &packing, rotation), Ok(()));
        if !extras {
            assert_eq!(f.model.first_violation(&assignment), None);
        }
    }

    fn shelf() -> Packing {
        let instance = SPInstance::new(10, &[4, 6, 4], &[3, 2, 2]).unwrap();
        crate::bounds::shelf_packing(&instance)
    }

    #[test]
    fn negative_coordinates_are_rejected() {
        let instance = SPInstance::new(10, &[4], &[3]).unwrap();
        let f = formulate(&instance, &FormulationConfig::default()).unwrap();
        let mut assignment = encode(&f.vars, &f.model, &crate::bounds::shelf_packing(&instance));
        assignment.set(f.vars.x[0], -1);
        assert!(matches!(
            decode(&f.vars, &assignment, 10),
            Err(crate::Error::Validation(ValidationError::InvalidValue { .. }))
        ));
    }
}
