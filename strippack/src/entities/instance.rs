use crate::error::{Error, Result};
use itertools::Itertools;
use std::cmp::Reverse;

/// Base dimensions of a rectangle, before any rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Item {
    pub width: u64,
    pub height: u64,
}

impl Item {
    pub fn new(width: u64, height: u64) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> u64 {
        self.width * self.height
    }

    pub fn is_square(&self) -> bool {
        self.width == self.height
    }

    /// Dimensions as (width, height) in the requested orientation.
    pub fn oriented(&self, rotated: bool) -> (u64, u64) {
        match rotated {
            false => (self.width, self.height),
            true => (self.height, self.width),
        }
    }
}

/// Instance of the Strip Packing Problem: a set of rectangles to be packed into a strip with a
/// fixed width and variable height.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SPInstance {
    /// The width of the strip (fixed)
    pub width: u64,
    items: Vec<Item>,
}

impl SPInstance {
    pub fn new(width: u64, base_widths: &[u64], base_heights: &[u64]) -> Result<Self> {
        if width == 0 {
            return Err(Error::InputFormat("strip width must be positive".into()));
        }
        if base_widths.len() != base_heights.len() {
            return Err(Error::InputFormat(format!(
                "{} widths but {} heights",
                base_widths.len(),
                base_heights.len()
            )));
        }
        if base_widths.is_empty() {
            return Err(Error::InputFormat("instance contains no rectangles".into()));
        }
        let items = base_widths
            .iter()
            .zip(base_heights)
            .map(|(&w, &h)| Item::new(w, h))
            .collect_vec();

        for (i, item) in items.iter().enumerate() {
            if item.width == 0 || item.height == 0 {
                return Err(Error::InputFormat(format!(
                    "rectangle {i} has an empty dimension ({}x{})",
                    item.width, item.height
                )));
            }
            if item.width > width {
                return Err(Error::InputFormat(format!(
                    "rectangle {i} ({}x{}) is wider than the strip ({width})",
                    item.width, item.height
                )));
            }
        }

        Ok(Self { width, items })
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item(&self, id: usize) -> &Item {
        &self.items[id]
    }

    pub fn n_items(&self) -> usize {
        self.items.len()
    }

    pub fn base_widths(&self) -> impl Iterator<Item = u64> + '_ {
        self.items.iter().map(|i| i.width)
    }

    pub fn base_heights(&self) -> impl Iterator<Item = u64> + '_ {
        self.items.iter().map(|i| i.height)
    }

    pub fn total_area(&self) -> u64 {
        self.items.iter().map(Item::area).sum()
    }

    pub fn total_width(&self) -> u64 {
        self.base_widths().sum()
    }

    /// Returns a copy of the instance with the rectangles ordered by decreasing area,
    /// together with the original index of every rectangle in the new order.
    pub fn sorted_by_area(&self) -> (SPInstance, Vec<usize>) {
        let order = (0..self.n_items())
            .sorted_by_key(|&i| Reverse(self.items[i].area()))
            .collect_vec();
        let items = order.iter().map(|&i| self.items[i]).collect_vec();
        (
            SPInstance {
                width: self.width,
                items,
            },
            order,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_lengths() {
        let err = SPInstance::new(10, &[1, 2], &[3]).unwrap_err();
        assert!(matches!(err, Error::InputFormat(_)));
    }

    #[test]
    fn rejects_piece_wider_than_strip() {
        assert!(SPInstance::new(5, &[6], &[1]).is_err());
        assert!(SPInstance::new(0, &[1], &[1]).is_err());
        assert!(SPInstance::new(5, &[], &[]).is_err());
        assert!(SPInstance::new(5, &[2, 0], &[1, 1]).is_err());
    }

    #[test]
    fn sorted_by_area_keeps_ties_stable() {
        let instance = SPInstance::new(10, &[1, 4, 2, 2], &[1, 1, 2, 3]).unwrap();
        let (sorted, order) = instance.sorted_by_area();
        assert_eq!(order, vec![3, 1, 2, 0]);
        assert_eq!(sorted.item(0), &Item::new(2, 3));
        assert_eq!(sorted.total_area(), instance.total_area());
    }
}
