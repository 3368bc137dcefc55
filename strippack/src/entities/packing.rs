use crate::entities::SPInstance;
use itertools::Itertools;

/// Position and occupied dimensions of a single rectangle in the strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placement {
    /// x-coordinate of the bottom-left corner
    pub x: u64,
    /// y-coordinate of the bottom-left corner
    pub y: u64,
    /// Effective (occupied) width
    pub width: u64,
    /// Effective (occupied) height
    pub height: u64,
    pub rotated: bool,
}

impl Placement {
    pub fn x_max(&self) -> u64 {
        self.x + self.width
    }

    pub fn y_max(&self) -> u64 {
        self.y + self.height
    }

    /// Whether the interiors of both rectangles intersect. Touching edges do not count.
    pub fn overlaps(&self, other: &Placement) -> bool {
        self.x < other.x_max()
            && other.x < self.x_max()
            && self.y < other.y_max()
            && other.y < self.y_max()
    }
}

/// Geometry of a complete packing: every rectangle of an instance placed in the strip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packing {
    pub width: u64,
    pub height: u64,
    /// Indexed in the same order as the rectangles of the instance
    pub placements: Vec<Placement>,
}

impl Packing {
    /// Builds a packing whose height is the top of its highest rectangle.
    pub fn fitted(width: u64, placements: Vec<Placement>) -> Self {
        let height = placements.iter().map(Placement::y_max).max().unwrap_or(0);
        Self {
            width,
            height,
            placements,
        }
    }

    /// The packing reflected over the vertical axis in the middle of the strip.
    pub fn mirrored(&self) -> Packing {
        let placements = self
            .placements
            .iter()
            .map(|p| Placement {
                x: self.width - p.x_max(),
                ..*p
            })
            .collect_vec();
        Packing {
            placements,
            ..self.clone()
        }
    }

    /// Reorders the placements: the placement at position `k` moves to position `order[k]`.
    pub fn reindexed(&self, order: &[usize]) -> Packing {
        debug_assert_eq!(order.len(), self.placements.len());
        let mut placements = self.placements.clone();
        for (k, &target) in order.iter().enumerate() {
            placements[target] = self.placements[k];
        }
        Packing {
            placements,
            ..self.clone()
        }
    }

    /// Fraction of the used strip area covered by rectangles.
    pub fn density(&self, instance: &SPInstance) -> f64 {
        match self.width * self.height {
            0 => 0.0,
            area => instance.total_area() as f64 / area as f64,
        }
    }

    pub fn n_rotated(&self) -> usize {
        self.placements.iter().filter(|p| p.rotated).count()
    }
}
