use crate::entities::{Packing, Placement, SPInstance};
use itertools::Itertools;
use log::debug;
use std::cmp::Reverse;

/// Valid bounds on the optimal strip height of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeightBounds {
    /// Total area of the rectangles divided by the strip width, rounded up
    pub lower: u64,
    /// Sum of the heights of the tallest rectangles, one per possible shelf
    pub upper: u64,
}

impl HeightBounds {
    pub fn compute(instance: &SPInstance) -> Self {
        let lower = instance.total_area().div_ceil(instance.width);

        let levels = n_shelves_estimate(instance);
        let upper = instance
            .base_heights()
            .sorted_by_key(|&h| Reverse(h))
            .take(levels.min(instance.n_items()))
            .sum();

        debug!("[BOUNDS] height in [{lower}, {upper}] ({levels} shelves estimated)");
        Self { lower, upper }
    }

    /// Constant for the big-M lowering of the non-overlap disjunction.
    /// Dominates every horizontal separation (at most the strip width) and every vertical one
    /// (at most the upper bound).
    pub fn big_m(&self, width: u64) -> u64 {
        u64::max(self.upper, width)
    }

    pub fn contains(&self, height: u64) -> bool {
        (self.lower..=self.upper).contains(&height)
    }
}

/// Worst-case number of shelves needed by a next-fit shelf packing.
fn n_shelves_estimate(instance: &SPInstance) -> usize {
    let full_rows = instance.total_width() / instance.width;
    2 * (full_rows as usize + 1)
}

/// Next-fit decreasing-height shelf packing, without rotations.
///
/// Rectangles are sorted by decreasing height and placed left to right on the current shelf;
/// a new shelf is opened on top as soon as a rectangle does not fit horizontally.
/// Every two consecutive shelves together hold more than the strip width, so the resulting height
/// never exceeds [`HeightBounds::upper`].
pub fn shelf_packing(instance: &SPInstance) -> Packing {
    let order = (0..instance.n_items()).sorted_by_key(|&i| Reverse(instance.item(i).height));

    let mut placements = vec![None; instance.n_items()];
    let (mut shelf_y, mut shelf_height, mut cursor) = (0, 0, 0);

    for i in order {
        let item = instance.item(i);
        if cursor + item.width > instance.width {
            shelf_y += shelf_height;
            shelf_height = 0;
            cursor = 0;
        }
        if cursor == 0 {
            // first rectangle determines the height of the shelf
            shelf_height = item.height;
        }
        placements[i] = Some(Placement {
            x: cursor,
            y: shelf_y,
            width: item.width,
            height: item.height,
            rotated: false,
        });
        cursor += item.width;
    }

    let placements = placements.into_iter().flatten().collect_vec();
    Packing::fitted(instance.width, placements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::assertions::validate_packing;
    use test_case::test_case;

    #[test_case(10, &[4, 6, 4], &[3, 2, 2], 4; "three rectangles")]
    #[test_case(5, &[5], &[7], 7; "single rectangle")]
    #[test_case(7, &[2, 2, 2], &[2, 2, 2], 2; "exact fit rounds up")]
    #[test_case(3, &[1, 1, 1, 1], &[1, 1, 1, 1], 2; "area not divisible")]
    fn lower_bound_is_ceiled_area(width: u64, widths: &[u64], heights: &[u64], expected: u64) {
        let instance = SPInstance::new(width, widths, heights).unwrap();
        let bounds = HeightBounds::compute(&instance);
        assert_eq!(bounds.lower, expected);
        assert_eq!(
            bounds.lower,
            instance.total_area().div_ceil(instance.width),
        );
    }

    #[test]
    fn upper_bound_sums_tallest_levels() {
        // total width 14 over a strip of 10 -> 2 * (1 + 1) = 4 levels, only 3 rectangles
        let instance = SPInstance::new(10, &[4, 6, 4], &[3, 2, 2]).unwrap();
        assert_eq!(HeightBounds::compute(&instance).upper, 7);

        // total width 4 over a strip of 10 -> 2 levels out of 4 rectangles
        let instance = SPInstance::new(10, &[1, 1, 1, 1], &[5, 1, 4, 2]).unwrap();
        assert_eq!(HeightBounds::compute(&instance).upper, 9);
    }

    #[test_case(10, &[4, 6, 4], &[3, 2, 2]; "three rectangles")]
    #[test_case(8, &[3, 3, 3, 3, 5, 5], &[3, 4, 5, 6, 3, 5]; "ins-1 like")]
    #[test_case(9, &[9, 1, 1, 8, 3, 6], &[1, 9, 9, 1, 4, 2]; "tall and flat")]
    #[test_case(4, &[4, 4, 4], &[1, 2, 3]; "full width")]
    fn shelf_packing_is_feasible_and_within_bounds(width: u64, widths: &[u64], heights: &[u64]) {
        let instance = SPInstance::new(width, widths, heights).unwrap();
        let bounds = HeightBounds::compute(&instance);
        let packing = shelf_packing(&instance);

        assert_eq!(validate_packing(&instance, &packing, false), Ok(()));
        assert!(packing.height >= bounds.lower);
        assert!(packing.height <= bounds.upper);
    }

    #[test]
    fn big_m_dominates_width_and_height() {
        let instance = SPInstance::new(20, &[2, 3], &[1, 1]).unwrap();
        let bounds = HeightBounds::compute(&instance);
        assert_eq!(bounds.big_m(instance.width), 20);
        assert!(bounds.contains(1));
        assert!(!bounds.contains(3));
    }
}
