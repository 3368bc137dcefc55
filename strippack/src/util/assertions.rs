use crate::entities::{Packing, SPInstance};
use crate::error::ValidationError;
use crate::formulation::Formulation;
use crate::model::Assignment;
use itertools::Itertools;
use log::error;

//Checks to verify the correctness of decoded packings, independent of the model and the engine.
//Also used in debug_assert!() blocks

/// Re-checks every invariant of a packing against its instance.
pub fn validate_packing(
    instance: &SPInstance,
    packing: &Packing,
    rotation: bool,
) -> Result<(), ValidationError> {
    if packing.placements.len() != instance.n_items() {
        return Err(ValidationError::PlacementCount {
            expected: instance.n_items(),
            found: packing.placements.len(),
        });
    }
    if packing.width != instance.width {
        return Err(ValidationError::StripWidth {
            expected: instance.width,
            found: packing.width,
        });
    }
    for (i, (item, p)) in instance.items().iter().zip(&packing.placements).enumerate() {
        if p.rotated && !rotation {
            return Err(ValidationError::RotationDisabled(i));
        }
        if p.rotated && item.is_square() {
            return Err(ValidationError::RotatedSquare(i));
        }
        if (p.width, p.height) != item.oriented(p.rotated) {
            return Err(ValidationError::RotationMismatch(i));
        }
        if p.x_max() > packing.width || p.y_max() > packing.height {
            return Err(ValidationError::OutOfStrip(i));
        }
    }
    if let Some((i, j)) = packing
        .placements
        .iter()
        .enumerate()
        .tuple_combinations()
        .find(|((_, a), (_, b))| a.overlaps(b))
        .map(|((i, _), (j, _))| (i, j))
    {
        return Err(ValidationError::Overlap(i, j));
    }

    let top = packing.placements.iter().map(|p| p.y_max()).max().unwrap_or(0);
    if top != packing.height {
        return Err(ValidationError::HeightNotTight {
            declared: packing.height,
            actual: top,
        });
    }
    Ok(())
}

/// Whether the assignment respects every domain and constraint of the formulation.
pub fn assignment_satisfies_model(formulation: &Formulation, assignment: &Assignment) -> bool {
    match formulation.model.first_violation(assignment) {
        None => true,
        Some(violation) => {
            error!("[ASSERT] assignment violates the model: {violation}");
            false
        }
    }
}

/// Whether the height of the packing lies within the bounds derived for the instance.
pub fn height_within_bounds(formulation: &Formulation, packing: &Packing) -> bool {
    formulation.bounds.contains(packing.height)
}
