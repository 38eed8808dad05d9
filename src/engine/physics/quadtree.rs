//! Flat Barnes–Hut quadtree over one step's body positions.
//!
//! Cells live in a single arena and the body indices of a cell form one
//! contiguous run of `order`, so walks never chase boxed children. Every cell
//! also carries the tight bounding box of its points and whether all of them
//! are pinned, which the collision walk prunes on.

use std::ops::Range;

use eframe::egui::{Vec2, vec2};

const LEAF_CAPACITY: usize = 8;
const MAX_DEPTH: usize = 12;

/// Square region a cell subdivides.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct Square {
    pub(super) center: Vec2,
    pub(super) half: f32,
}

impl Square {
    fn enclosing(extent: Extent) -> Option<Self> {
        if !extent.is_finite() {
            return None;
        }
        let span = (extent.max - extent.min).max(vec2(1.0, 1.0));
        Some(Self {
            center: (extent.min + extent.max) * 0.5,
            half: span.max_elem() * 0.5 + 1.0,
        })
    }

    pub(super) fn contains(self, point: Vec2) -> bool {
        let offset = (point - self.center).abs();
        offset.x <= self.half && offset.y <= self.half
    }

    pub(super) fn side(self) -> f32 {
        self.half * 2.0
    }

    fn quadrant_of(self, point: Vec2) -> usize {
        usize::from(point.x >= self.center.x) | (usize::from(point.y >= self.center.y) << 1)
    }

    fn quadrant(self, quadrant: usize) -> Self {
        let quarter = self.half * 0.5;
        let sign = |bit: usize| if quadrant & bit == 0 { -quarter } else { quarter };
        Self {
            center: self.center + vec2(sign(1), sign(2)),
            half: quarter,
        }
    }
}

/// Axis-aligned box around the points actually inside a cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct Extent {
    pub(super) min: Vec2,
    pub(super) max: Vec2,
}

impl Extent {
    const EMPTY: Self = Self {
        min: Vec2::splat(f32::INFINITY),
        max: Vec2::splat(f32::NEG_INFINITY),
    };

    fn include(self, point: Vec2) -> Self {
        Self {
            min: self.min.min(point),
            max: self.max.max(point),
        }
    }

    fn is_finite(self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// Squared gap between two boxes, zero when they touch or overlap.
    pub(super) fn gap_sq(self, other: Self) -> f32 {
        let gap = (self.min - other.max).max(other.min - self.max).max(Vec2::ZERO);
        gap.length_sq()
    }
}

#[derive(Clone, Debug)]
pub(super) struct Cell {
    pub(super) square: Square,
    pub(super) extent: Extent,
    pub(super) center_of_mass: Vec2,
    pub(super) mass: f32,
    /// Every body in the cell is pinned.
    pub(super) fixed: bool,
    items: Range<usize>,
    children: Range<usize>,
}

impl Cell {
    fn new(square: Square, items: Range<usize>) -> Self {
        Self {
            square,
            extent: Extent::EMPTY,
            center_of_mass: Vec2::ZERO,
            mass: 0.0,
            fixed: false,
            items,
            children: 0..0,
        }
    }

    pub(super) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

#[derive(Debug)]
pub(super) struct QuadTree {
    cells: Vec<Cell>,
    order: Vec<usize>,
}

impl QuadTree {
    /// Builds the tree over `points`. `pinned[i]` marks bodies that collision
    /// must not move. Returns `None` when there is nothing finite to index.
    pub(super) fn build(points: &[Vec2], pinned: &[bool]) -> Option<Self> {
        debug_assert_eq!(points.len(), pinned.len());
        let extent = points
            .iter()
            .fold(Extent::EMPTY, |extent, point| extent.include(*point));
        let square = Square::enclosing(extent)?;

        let mut tree = Self {
            cells: Vec::with_capacity(points.len().max(1) * 2),
            order: (0..points.len()).collect(),
        };
        tree.cells.push(Cell::new(square, 0..points.len()));
        tree.split(0, points, pinned, 0);
        Some(tree)
    }

    fn split(&mut self, cell: usize, points: &[Vec2], pinned: &[bool], depth: usize) {
        let square = self.cells[cell].square;
        let items = self.cells[cell].items.clone();

        let mut extent = Extent::EMPTY;
        let mut sum = Vec2::ZERO;
        let mut fixed = true;
        for &index in &self.order[items.clone()] {
            extent = extent.include(points[index]);
            sum += points[index];
            fixed &= pinned[index];
        }
        let mass = items.len() as f32;
        {
            let target = &mut self.cells[cell];
            target.extent = extent;
            target.mass = mass;
            target.center_of_mass = if mass > 0.0 { sum / mass } else { sum };
            target.fixed = fixed;
        }

        if depth >= MAX_DEPTH || items.len() <= LEAF_CAPACITY {
            return;
        }

        let run = &mut self.order[items.clone()];
        run.sort_by_key(|&index| square.quadrant_of(points[index]));
        let mut counts = [0usize; 4];
        for &index in run.iter() {
            counts[square.quadrant_of(points[index])] += 1;
        }
        // Coincident points cannot be separated by subdividing.
        if counts.iter().filter(|&&count| count > 0).count() <= 1 {
            return;
        }

        let first_child = self.cells.len();
        let mut start = items.start;
        for (quadrant, count) in counts.into_iter().enumerate() {
            if count > 0 {
                self.cells
                    .push(Cell::new(square.quadrant(quadrant), start..start + count));
            }
            start += count;
        }
        let children = first_child..self.cells.len();
        self.cells[cell].children = children.clone();

        for child in children {
            self.split(child, points, pinned, depth + 1);
        }
    }

    pub(super) fn root(&self) -> &Cell {
        &self.cells[0]
    }

    pub(super) fn children<'a>(&'a self, cell: &Cell) -> &'a [Cell] {
        &self.cells[cell.children.clone()]
    }

    /// Body indices under `cell`, including those of its descendants.
    pub(super) fn items(&self, cell: &Cell) -> &[usize] {
        &self.order[cell.items.clone()]
    }
}
