//! Grid Primitives
//!
//! Integer positions, axis-aligned bounds and the Manhattan path helper
//! used to lay traces between two grid points.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// A cell on the integer board grid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

impl GridPosition {
    pub const ORIGIN: GridPosition = GridPosition { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan (taxicab) distance to another position, saturating at `u32::MAX`
    pub fn manhattan_distance(&self, other: &GridPosition) -> u32 {
        self.x.abs_diff(other.x).saturating_add(self.y.abs_diff(other.y))
    }

    /// Rotate this offset about the origin by `degrees`.
    ///
    /// Only quarter turns move the offset; any other angle leaves it as is.
    /// Negation saturates, so `i32::MIN` maps to `i32::MAX`.
    pub fn rotated(self, degrees: i32) -> GridPosition {
        match degrees.rem_euclid(360) {
            90 => GridPosition::new(self.y.saturating_neg(), self.x),
            180 => GridPosition::new(self.x.saturating_neg(), self.y.saturating_neg()),
            270 => GridPosition::new(self.y, self.x.saturating_neg()),
            _ => self,
        }
    }
}

// Position arithmetic saturates at the edges of the grid.
impl Add for GridPosition {
    type Output = GridPosition;

    fn add(self, rhs: GridPosition) -> GridPosition {
        GridPosition::new(self.x.saturating_add(rhs.x), self.y.saturating_add(rhs.y))
    }
}

impl Sub for GridPosition {
    type Output = GridPosition;

    fn sub(self, rhs: GridPosition) -> GridPosition {
        GridPosition::new(self.x.saturating_sub(rhs.x), self.y.saturating_sub(rhs.y))
    }
}

impl fmt::Display for GridPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for GridPosition {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// Axis-aligned integer rectangle; `max_x`/`max_y` are exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl Bounds {
    pub fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Bounds of `width` x `height` cells anchored at the origin
    pub fn from_size(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn width(&self) -> i32 {
        self.max_x.saturating_sub(self.min_x)
    }

    pub fn height(&self) -> i32 {
        self.max_y.saturating_sub(self.min_y)
    }

    pub fn min(&self) -> GridPosition {
        GridPosition::new(self.min_x, self.min_y)
    }

    pub fn max(&self) -> GridPosition {
        GridPosition::new(self.max_x, self.max_y)
    }

    pub fn contains(&self, position: GridPosition) -> bool {
        position.x >= self.min_x
            && position.x < self.max_x
            && position.y >= self.min_y
            && position.y < self.max_y
    }

    /// Widen (never narrow) so that `position` is contained. The exclusive
    /// max saturates at `i32::MAX`, so a cell on that edge stays outside.
    pub fn include(&mut self, position: GridPosition) {
        self.min_x = self.min_x.min(position.x);
        self.min_y = self.min_y.min(position.y);
        self.max_x = self.max_x.max(position.x.saturating_add(1));
        self.max_y = self.max_y.max(position.y.saturating_add(1));
    }

    /// Builder-style variant of [`Bounds::include`]
    pub fn including(mut self, position: GridPosition) -> Self {
        self.include(position);
        self
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::from_size(10, 10)
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}) x [{}, {})",
            self.min_x, self.max_x, self.min_y, self.max_y
        )
    }
}

/// Split a wire from `start` to `end` into axis-aligned legs.
///
/// Runs horizontally first, then vertically. A straight run yields one leg
/// and a zero-length request yields none.
pub fn manhattan_path(start: GridPosition, end: GridPosition) -> Vec<(GridPosition, GridPosition)> {
    if start == end {
        return Vec::new();
    }
    if start.x == end.x || start.y == end.y {
        return vec![(start, end)];
    }

    let corner = GridPosition::new(end.x, start.y);
    vec![(start, corner), (corner, end)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manhattan_distance() {
        let a = GridPosition::new(1, 2);
        let b = GridPosition::new(-2, 6);
        assert_eq!(a.manhattan_distance(&b), 7);
        assert_eq!(b.manhattan_distance(&a), 7);
        assert_eq!(a.manhattan_distance(&a), 0);
    }

    #[test]
    fn test_quarter_turn_rotation() {
        let offset = GridPosition::new(1, 0);
        assert_eq!(offset.rotated(0), GridPosition::new(1, 0));
        assert_eq!(offset.rotated(90), GridPosition::new(0, 1));
        assert_eq!(offset.rotated(180), GridPosition::new(-1, 0));
        assert_eq!(offset.rotated(270), GridPosition::new(0, -1));
        assert_eq!(offset.rotated(-90), GridPosition::new(0, -1));
        assert_eq!(offset.rotated(450), GridPosition::new(0, 1));
    }

    #[test]
    fn test_off_axis_rotation_is_identity() {
        let offset = GridPosition::new(2, 3);
        assert_eq!(offset.rotated(45), offset);
    }

    #[test]
    fn test_bounds_dimensions() {
        let bounds = Bounds::new(-2, 1, 5, 4);
        assert_eq!(bounds.width(), 7);
        assert_eq!(bounds.height(), 3);
        assert!(bounds.contains(GridPosition::new(-2, 1)));
        assert!(bounds.contains(GridPosition::new(4, 3)));
        assert!(!bounds.contains(GridPosition::new(5, 3)));
        assert!(!bounds.contains(GridPosition::new(0, 4)));
    }

    #[test]
    fn test_bounds_include_only_widens() {
        let mut bounds = Bounds::from_size(4, 4);
        bounds.include(GridPosition::new(1, 1));
        assert_eq!(bounds, Bounds::from_size(4, 4));

        bounds.include(GridPosition::new(7, 5));
        assert_eq!(bounds.max(), GridPosition::new(8, 6));

        bounds.include(GridPosition::new(-3, -1));
        assert_eq!(bounds.min(), GridPosition::new(-3, -1));
        assert_eq!(bounds.max(), GridPosition::new(8, 6));
    }

    #[test]
    fn test_arithmetic_saturates_at_grid_edge() {
        let edge = GridPosition::new(i32::MAX, i32::MIN);
        assert_eq!(edge + GridPosition::new(1, -1), edge);
        assert_eq!(edge - GridPosition::new(-1, 1), edge);
        assert_eq!(GridPosition::new(0, i32::MIN).rotated(90), GridPosition::new(i32::MAX, 0));
        assert_eq!(GridPosition::ORIGIN.manhattan_distance(&edge), u32::MAX);

        let mut bounds = Bounds::from_size(4, 4);
        bounds.include(GridPosition::new(i32::MAX, i32::MIN));
        assert_eq!(bounds.max_x, i32::MAX);
        assert_eq!(bounds.min_y, i32::MIN);
        assert_eq!(bounds.height(), i32::MAX);
    }

    #[test]
    fn test_manhattan_path_shapes() {
        let a = GridPosition::new(0, 0);
        assert!(manhattan_path(a, a).is_empty());

        let straight = manhattan_path(a, GridPosition::new(0, 4));
        assert_eq!(straight, vec![(a, GridPosition::new(0, 4))]);

        let bent = manhattan_path(a, GridPosition::new(3, 2));
        assert_eq!(bent.len(), 2);
        assert_eq!(bent[0], (a, GridPosition::new(3, 0)));
        assert_eq!(bent[1], (GridPosition::new(3, 0), GridPosition::new(3, 2)));
        for (start, end) in bent {
            assert!(start.x == end.x || start.y == end.y);
        }
    }
}
