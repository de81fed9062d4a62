//! Grid Positions and Directions
//!
//! Integer cell coordinates for the board. Screen convention:
//! x grows to the right, y grows downward.

use std::fmt;
use std::ops::Add;
use serde::{Serialize, Deserialize};

/// A cell on the board.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct GridPos {
    /// Column (cells from the left edge)
    pub x: i32,
    /// Row (cells from the top edge)
    pub y: i32,
}

impl GridPos {
    /// Top-left cell
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    /// Create a new position.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Neighbouring cell one step in `direction`.
    #[inline]
    pub fn step(self, direction: Direction) -> Self {
        self + direction.offset()
    }

    /// Check if the position lies on a square board of `cells_per_side`.
    #[inline]
    pub fn is_on_board(self, cells_per_side: u32) -> bool {
        let side = cells_per_side as i64;
        self.x >= 0 && self.y >= 0 && (self.x as i64) < side && (self.y as i64) < side
    }

    /// Manhattan distance to another cell.
    #[inline]
    pub fn manhattan(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl Add for GridPos {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x.wrapping_add(other.x),
            y: self.y.wrapping_add(other.y),
        }
    }
}

impl fmt::Debug for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for GridPos {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

// =============================================================================
// DIRECTION
// =============================================================================

/// Heading of the snake.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    /// Towards row 0
    Up = 0,
    /// Towards the last row
    Down = 1,
    /// Towards column 0
    Left = 2,
    /// Towards the last column
    #[default]
    Right = 3,
}

impl Direction {
    /// All four directions in a fixed order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// The reverse heading.
    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Unit step for this heading.
    #[inline]
    pub fn offset(self) -> GridPos {
        match self {
            Direction::Up => GridPos::new(0, -1),
            Direction::Down => GridPos::new(0, 1),
            Direction::Left => GridPos::new(-1, 0),
            Direction::Right => GridPos::new(1, 0),
        }
    }

    /// Check if `other` points straight back.
    #[inline]
    pub fn is_opposite(self, other: Direction) -> bool {
        self.opposite() == other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step() {
        let p = GridPos::new(10, 10);
        assert_eq!(p.step(Direction::Up), GridPos::new(10, 9));
        assert_eq!(p.step(Direction::Down), GridPos::new(10, 11));
        assert_eq!(p.step(Direction::Left), GridPos::new(9, 10));
        assert_eq!(p.step(Direction::Right), GridPos::new(11, 10));
    }

    #[test]
    fn test_opposite_is_involution() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            assert!(dir.is_opposite(dir.opposite()));
            assert!(!dir.is_opposite(dir));
        }
    }

    #[test]
    fn test_board_bounds_are_cell_based() {
        assert!(GridPos::new(0, 0).is_on_board(20));
        assert!(GridPos::new(19, 19).is_on_board(20));
        assert!(!GridPos::new(20, 5).is_on_board(20));
        assert!(!GridPos::new(5, 20).is_on_board(20));
        assert!(!GridPos::new(-1, 5).is_on_board(20));
        assert!(!GridPos::new(5, -1).is_on_board(20));
    }

    #[test]
    fn test_manhattan() {
        assert_eq!(GridPos::new(0, 0).manhattan(GridPos::new(3, -4)), 7);
    }
}
